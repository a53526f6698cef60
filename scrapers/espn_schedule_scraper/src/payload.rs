//! Locates the page state that ESPN inlines into its HTML.
//!
//! Every schedule and game page carries one `<script>` that assigns a JSON
//! document to a global, e.g. `window['__espnfitt__']={...};`. The extractor
//! returns the right-hand side of that assignment as raw JSON text.

use regex::Regex;
use scraper::{Html, Selector};

pub const ESPN_PAYLOAD_GLOBAL: &str = "__espnfitt__";

#[derive(Debug, Clone)]
pub struct PayloadExtractor {
    assignment: Regex,
}

impl Default for PayloadExtractor {
    fn default() -> Self {
        Self::new(ESPN_PAYLOAD_GLOBAL)
    }
}

impl PayloadExtractor {
    /// Matches `window['name']=`, `window["name"] =` and `window.name=`.
    pub fn new(global: &str) -> Self {
        let name = regex::escape(global);
        let pattern = format!(
            r#"window\s*(?:\.\s*{name}|\[\s*['"]{name}['"]\s*\])\s*="#,
            name = name
        );
        let assignment = Regex::new(&pattern).expect("escaped identifier forms a valid pattern");
        Self { assignment }
    }

    /// Returns the JSON text assigned to the global, or `None` when no script assigns it.
    pub fn extract(&self, html: &str) -> Option<String> {
        let document = Html::parse_document(html);
        let script_selector = Selector::parse("script").unwrap();

        document.select(&script_selector).find_map(|script| {
            let text = script.text().collect::<String>();
            let assignment = self.assignment.find_iter(&text).last()?;
            let payload = text[assignment.end()..]
                .trim()
                .trim_end_matches(';')
                .trim_end();
            if payload.is_empty() {
                None
            } else {
                Some(payload.to_string())
            }
        })
    }
}

/// Shorthand for the ESPN global.
pub fn extract_payload(html: &str) -> Option<String> {
    PayloadExtractor::default().extract(html)
}
