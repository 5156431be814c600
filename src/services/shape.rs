use serde_json::Value;

use super::rules::{first_text, label_rules};

/// Top-level array fields that may hold the predictions, in priority order.
const LIST_FIELDS: &[&str] = &["predictions", "results"];

/// Locate the per-item prediction list inside a provider payload.
///
/// Looks for a `predictions` array, then a `results` array, then treats a
/// body that carries a label as a single item. Anything else yields an
/// empty list.
pub fn resolve_items(body: &Value) -> Vec<&Value> {
    for field in LIST_FIELDS {
        if let Some(items) = body.get(*field).and_then(Value::as_array) {
            log::debug!("🔎 Provider predictions found under '{}' ({} items)", field, items.len());
            return items.iter().collect();
        }
    }

    if body.is_object() && first_text(label_rules(), body).is_some() {
        log::debug!("🔎 Provider body looks like a single labeled item");
        return vec![body];
    }

    log::debug!("🔎 No recognizable prediction list in provider body");
    Vec::new()
}
