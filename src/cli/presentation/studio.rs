//! Studio presentation: prompt pair and render report formatters.

use crate::error::StudioError;
use crate::types::{GeneratedPrompts, LifecycleState, ProductDetails};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde::Serialize;

/// Outcome of one `render` command.
#[derive(Debug, Clone, Serialize)]
pub struct RenderReport {
    pub product: ProductDetails,
    pub prompts: GeneratedPrompts,
    pub state: LifecycleState,
    pub image: Option<String>,
    pub video: Option<String>,
    pub error: Option<String>,
}

pub fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

fn to_json<T: Serialize>(value: &T) -> Result<String, StudioError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| StudioError::InvalidInput(format!("Failed to serialize output: {}", e)))
}

pub fn format_prompts_text(product: &ProductDetails, prompts: &GeneratedPrompts) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{}\n\n",
        format_section_heading(&format!("Prompts for {}", product.name))
    ));
    out.push_str(&format!("{}\n", "Image".bold()));
    out.push_str(&format!("  {}\n\n", prompts.image_prompt));
    out.push_str(&format!("{}\n", "Video".bold()));
    out.push_str(&format!("  {}", prompts.video_prompt));
    out
}

pub fn format_prompts_json(
    product: &ProductDetails,
    prompts: &GeneratedPrompts,
) -> Result<String, StudioError> {
    to_json(&serde_json::json!({
        "product": product,
        "prompts": prompts,
    }))
}

pub fn format_render_text(report: &RenderReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{}\n\n",
        format_section_heading(&format!("Media for {}", report.product.name))
    ));

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Asset", "Result"]);
    for (label, url) in [("Image", &report.image), ("Video", &report.video)] {
        let cell = match url {
            Some(url) => url.clone(),
            None => format!("{}", "not produced".red()),
        };
        table.add_row(vec![label.to_string(), cell]);
    }
    out.push_str(&format!("{}\n", table));

    if let Some(ref error) = report.error {
        out.push_str(&format!("\n{} {}\n", "Error:".red().bold(), error));
    }
    out.push_str(&format!("\nState: {}", report.state));
    out
}

pub fn format_render_json(report: &RenderReport) -> Result<String, StudioError> {
    to_json(report)
}
