use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

/// Where a target was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetSource {
    pub href: String,
}

/// A content region measured for reading time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    pub id: String,
    pub source: TargetSource,
    pub snippet: String,
}

impl Target {
    /// Builds a target whose id is the base64 encoding of the selector's JSON
    /// form, stable for one render of the page.
    pub fn from_selector(
        selector: &serde_json::Value,
        href: impl Into<String>,
        snippet: impl Into<String>,
    ) -> Self {
        Self {
            id: target_id(selector),
            source: TargetSource { href: href.into() },
            snippet: snippet.into(),
        }
    }
}

pub fn target_id(selector: &serde_json::Value) -> String {
    STANDARD.encode(selector.to_string())
}
