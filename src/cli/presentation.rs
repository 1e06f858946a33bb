//! CLI presentation: text and json formatters per command family.

mod config;
mod studio;

pub use config::{format_config_json, format_config_toml};
pub use studio::{
    format_prompts_json, format_prompts_text, format_render_json, format_render_text,
    format_section_heading, RenderReport,
};
