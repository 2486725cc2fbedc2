//! The localization overlay: a JSON object keyed by mod name.
//!
//! Two historical value shapes are accepted and normalized into
//! [`OverlayEntry`]:
//!
//! ```json
//! { "NormalEx": "标准示例" }
//! { "NormalEx": { "displayName": "标准示例", "descriptionSupplement": "补充说明" } }
//! ```

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::{error::ParseError, model::OverlayEntry};

/// Overlay entries by mod name. Entries with no usable field are not stored.
pub type OverlayMap = HashMap<String, OverlayEntry>;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OverlayValue {
    Name(String),
    #[serde(rename_all = "camelCase")]
    Detailed {
        #[serde(default)]
        display_name: Option<String>,
        #[serde(default)]
        description_supplement: Option<String>,
    },
}

impl From<OverlayValue> for OverlayEntry {
    fn from(value: OverlayValue) -> Self {
        match value {
            OverlayValue::Name(name) => OverlayEntry::new(&name, ""),
            OverlayValue::Detailed {
                display_name,
                description_supplement,
            } => OverlayEntry::new(
                display_name.as_deref().unwrap_or_default(),
                description_supplement.as_deref().unwrap_or_default(),
            ),
        }
    }
}

/// Parses the overlay document.
///
/// A document that is not a JSON object is an error. Individual values of an
/// unknown shape are skipped so one bad key does not discard the rest.
pub fn parse_overlay(json: &str) -> Result<OverlayMap, ParseError> {
    let raw: BTreeMap<String, serde_json::Value> = serde_json::from_str(json)?;
    let mut overlay = OverlayMap::with_capacity(raw.len());
    for (name, value) in raw {
        if value.is_null() {
            continue;
        }
        match serde_json::from_value::<OverlayValue>(value) {
            Ok(value) => {
                let entry = OverlayEntry::from(value);
                if !entry.is_empty() {
                    overlay.insert(name, entry);
                }
            }
            Err(e) => warn!("Skipping overlay entry for {}: {}", name, e),
        }
    }
    debug!("Loaded {} overlay entries", overlay.len());
    Ok(overlay)
}
