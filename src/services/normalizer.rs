use serde_json::Value;

use super::confidence::normalize_confidence;
use super::rules::{
    calorie_rules, confidence_rules, first_number, first_text, label_rules, sub_items,
};
use crate::models::Prediction;

/// Map one raw provider item to a `Prediction`.
///
/// Missing fields stay `None`; nothing here can fail.
pub fn normalize_prediction(item: &Value) -> Prediction {
    // Some providers return a bare list of names.
    if let Some(name) = item.as_str().map(str::trim).filter(|s| !s.is_empty()) {
        return Prediction {
            food: Some(name.to_string()),
            ..Default::default()
        };
    }

    let mut prediction = Prediction {
        food: first_text(label_rules(), item),
        confidence: resolve_confidence(item),
        ..Default::default()
    };

    if let Some(raw) = first_number(calorie_rules(), item) {
        prediction = prediction.with_calories(raw);
    }

    prediction
}

/// Item-level confidence, falling back to the best sub-item when the item
/// has none or reports zero.
///
/// Each sub-item resolves its own confidence alias first; the comparison is
/// made on normalized values so mixed units compare correctly.
fn resolve_confidence(item: &Value) -> Option<f64> {
    let own = first_number(confidence_rules(), item);
    if let Some(v) = own.filter(|v| *v != 0.0) {
        return normalize_confidence(v);
    }

    let best_sub = sub_items(item)
        .into_iter()
        .filter_map(|sub| first_number(confidence_rules(), sub))
        .filter_map(normalize_confidence)
        .fold(None, |best: Option<f64>, c| Some(best.map_or(c, |b| b.max(c))));

    best_sub.or_else(|| own.and_then(normalize_confidence))
}

pub fn normalize_all(items: &[&Value]) -> Vec<Prediction> {
    items.iter().map(|item| normalize_prediction(item)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CALORIE_ANOMALY_NOTE;
    use serde_json::json;

    #[test]
    fn test_flat_item() {
        let p = normalize_prediction(&json!({
            "label": "Menemen",
            "calories": 312.6,
            "confidence": 87
        }));
        assert_eq!(p.food.as_deref(), Some("Menemen"));
        assert_eq!(p.calories, Some(313));
        assert_eq!(p.calories_raw, Some(312.6));
        assert!((p.confidence.unwrap() - 0.87).abs() < 1e-12);
        assert!(p.note.is_none());
    }

    #[test]
    fn test_calories_beats_kcal() {
        let p = normalize_prediction(&json!({ "name": "Soup", "kcal": 999, "calories": 120 }));
        assert_eq!(p.calories, Some(120));
    }

    #[test]
    fn test_anomaly_note_kept_without_correction() {
        let p = normalize_prediction(&json!({ "food": "Lasagna tray", "calories": 6789.4 }));
        assert_eq!(p.calories, Some(6789));
        assert_eq!(p.calories_raw, Some(6789.4));
        assert_eq!(p.note.as_deref(), Some(CALORIE_ANOMALY_NOTE));

        let p = normalize_prediction(&json!({ "food": "Cake", "calories": 5000.0 }));
        assert_eq!(p.calories, Some(5000));
        assert!(p.note.is_none());
    }

    #[test]
    fn test_composite_dish() {
        let p = normalize_prediction(&json!({
            "group": "breakfast",
            "items": [
                { "name": "egg", "nutrition": { "calories": 78 }, "score": 0.6 },
                { "name": "toast", "nutrition": { "calories": 120 }, "score": 0.9 }
            ]
        }));
        assert_eq!(p.food.as_deref(), Some("breakfast"));
        assert_eq!(p.calories, Some(78));
        assert_eq!(p.confidence, Some(0.9));
    }

    #[test]
    fn test_zero_confidence_defers_to_sub_items() {
        let p = normalize_prediction(&json!({ "confidence": 0, "items": [{ "prob": 45 }] }));
        assert!((p.confidence.unwrap() - 0.45).abs() < 1e-12);

        // known zero stays zero when nothing better exists
        let p = normalize_prediction(&json!({ "confidence": 0 }));
        assert_eq!(p.confidence, Some(0.0));
    }

    #[test]
    fn test_sub_item_uses_its_own_first_alias() {
        let p = normalize_prediction(&json!({
            "label": "x",
            "items": [{ "confidence": 0.3, "score": 80 }]
        }));
        assert_eq!(p.confidence, Some(0.3));
    }

    #[test]
    fn test_sub_items_compared_after_normalizing() {
        let p = normalize_prediction(&json!({
            "label": "x",
            "items": [{ "confidence": 0.95 }, { "confidence": 40 }]
        }));
        assert_eq!(p.confidence, Some(0.95));

        let p = normalize_prediction(&json!({
            "label": "x",
            "items": [{ "score": 0.2 }],
            "components": [{ "prob": 70 }]
        }));
        assert!((p.confidence.unwrap() - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_missing_signals_are_null() {
        let p = normalize_prediction(&json!({ "id": 17 }));
        assert_eq!(p, Prediction::default());

        let p = normalize_prediction(&json!(42));
        assert_eq!(p, Prediction::default());
    }

    #[test]
    fn test_bare_string_item() {
        let p = normalize_prediction(&json!("  pilav "));
        assert_eq!(p.food.as_deref(), Some("pilav"));
        assert!(p.calories.is_none());
        assert!(p.confidence.is_none());
    }

    #[test]
    fn test_normalize_all_keeps_order() {
        let a = json!({ "label": "a" });
        let b = json!({ "label": "b" });
        let out = normalize_all(&[&a, &b]);
        let labels: Vec<_> = out.iter().filter_map(|p| p.food.as_deref()).collect();
        assert_eq!(labels, vec!["a", "b"]);
    }
}
