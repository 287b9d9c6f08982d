//! Turning records into page content

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::fallback::FallbackRecord;
use crate::hazard::HazardType;
use crate::location::LocationString;
use crate::page::Page;

/// Token in SMS templates replaced by the sender's location
pub const LOCATION_PLACEHOLDER: &str = "[LOCATION]";

/// Substitute `location` for every `[LOCATION]` token in `template`.
pub fn fill_sms_template(template: &str, location: &str) -> String {
    template.replace(LOCATION_PLACEHOLDER, location)
}

/// Populate the result panel from a record.
///
/// The steps list is rebuilt from scratch on every call, so rendering the
/// same inputs twice leaves the page in the same state.
pub async fn render_result(page: &Page, record: &FallbackRecord, hazard: HazardType, location: &LocationString) {
    let title = if record.title.is_empty() {
        hazard.default_title()
    } else {
        record.title.clone()
    };
    let sms_text = fill_sms_template(&record.sms_template, &location.to_string());

    debug!("Rendering {} result with {} steps", hazard, record.steps.len());
    page.show_result(title, record.summary.clone(), record.steps.clone(), sms_text)
        .await;
}

/// Richer guidance returned by the instructions endpoint
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Instructions {
    pub title: String,
    pub summary: String,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

/// Compose the HTML fragment for the instructions panel.
/// Empty step or warning lists drop their whole block.
pub fn instructions_html(info: &Instructions) -> String {
    let mut html = format!(
        "<h3>{}</h3>\n<p class=\"summary\">{}</p>\n",
        escape_html(&info.title),
        escape_html(&info.summary)
    );

    if !info.steps.is_empty() {
        html.push_str("<div class=\"steps\">\n<h4>Steps to Take:</h4>\n<ol>");
        for step in &info.steps {
            html.push_str(&format!("<li>{}</li>", escape_html(step)));
        }
        html.push_str("</ol>\n</div>\n");
    }

    if !info.warnings.is_empty() {
        html.push_str("<div class=\"warnings\">\n<h4>⚠ Important Warnings:</h4>\n<ul>");
        for warning in &info.warnings {
            html.push_str(&format!("<li>{}</li>", escape_html(warning)));
        }
        html.push_str("</ul>\n</div>\n");
    }

    html
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
