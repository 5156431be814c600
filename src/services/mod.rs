pub mod confidence;
pub mod estimation; // Preprocess → provider → normalize pipeline
pub mod normalizer;
pub mod preprocess;
pub mod rules; // Field alias rule tables
pub mod shape;
pub mod transport; // Binary / base64 JSON provider calls

pub use estimation::{EstimateError, EstimationService, FoodEstimator};
