//! CLI domain: parse, route, output, and presentation only.
//! No domain orchestration; single route table dispatches to the studio.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::map_error;
pub use parse::{Cli, Commands};
pub use presentation::{
    format_config_json, format_config_toml, format_prompts_json, format_prompts_text,
    format_render_json, format_render_text, format_section_heading, RenderReport,
};
pub use route::RunContext;
