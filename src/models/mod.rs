use serde::{Deserialize, Serialize};

/// Calorie value above which a prediction gets an advisory note.
pub const CALORIE_ANOMALY_THRESHOLD: i64 = 5000;

pub const CALORIE_ANOMALY_NOTE: &str =
    "Estimated calories exceed 5000 kcal; this may be a whole-recipe total or a unit mismatch.";

/// One canonical food-recognition result.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub food: Option<String>,
    pub calories: Option<i64>,  // rounded, always >= 0
    pub calories_raw: Option<f64>,
    pub confidence: Option<f64>,  // always within [0, 1]
    pub note: Option<String>,
}

impl Prediction {
    /// Builds the calorie fields from a raw provider estimate.
    /// The value is never corrected, only flagged.
    pub fn with_calories(mut self, raw: f64) -> Self {
        let rounded = raw.round() as i64;
        self.calories = Some(rounded);
        self.calories_raw = Some(raw);
        self.note = if rounded > CALORIE_ANOMALY_THRESHOLD {
            Some(CALORIE_ANOMALY_NOTE.to_string())
        } else {
            None
        };
        self
    }
}

/// Which request format the provider accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Binary,  // raw image/jpeg body
    Json,    // {"image_base64": ...}
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Strategy::Binary => "binary",
            Strategy::Json => "json",
        };
        write!(f, "{}", s)
    }
}

/// Result of one estimation call.
#[derive(Debug, Clone)]
pub struct Estimation {
    pub predictions: Vec<Prediction>,
    pub raw: serde_json::Value,
    pub strategy: Strategy,
}

/// Success envelope returned by the estimate endpoint.
#[derive(Debug, Serialize)]
pub struct EstimateResponse {
    pub success: bool,
    pub predictions: Vec<Prediction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<serde_json::Value>,
}

/// Failure envelope returned by the estimate endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
