use serde::Serialize;
use serde_json::Value;

/// Combined answer from the two providers. A provider that failed is
/// represented by an `{ "error": ... }` object so the report always carries
/// both sections.
#[derive(Clone, Debug, Serialize)]
pub struct NumberReport {
    #[serde(rename = "PHONE_NUMBER")]
    pub phone_number: String,
    #[serde(rename = "NAME_FINDER")]
    pub name_finder: Value,
    #[serde(rename = "AADHAAR_INFO")]
    pub aadhaar_info: Value,
}

impl NumberReport {
    pub fn render_text(&self) -> String {
        format!(
            "--- INFORA PRO REPORT ---\nPhone: {}\n\n{}",
            self.phone_number,
            serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
        )
    }

    /// One-line per-provider status for the search log.
    pub fn outcome_summary(&self) -> String {
        format!(
            "name:{} aadhaar:{}",
            section_status(&self.name_finder),
            section_status(&self.aadhaar_info)
        )
    }
}

fn section_status(section: &Value) -> &'static str {
    match section {
        Value::Object(map) if map.contains_key("error") => "failed",
        _ => "ok",
    }
}
