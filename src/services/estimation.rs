use crate::config::Config;
use crate::models::Estimation;

use super::normalizer::normalize_all;
use super::preprocess::prepare_image_blocking;
use super::shape::resolve_items;
use super::transport::{TransportError, TransportNegotiator};

#[derive(Debug, thiserror::Error)]
pub enum EstimateError {
    #[error("food vision provider URL is not configured")]
    NotConfigured,
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Trait for food-image calorie estimators
#[async_trait::async_trait]
pub trait FoodEstimator: Send + Sync {
    async fn estimate(&self, image: Vec<u8>) -> Result<Estimation, EstimateError>;
}

/// Preprocess → provider call → shape resolution → per-item normalization.
pub struct EstimationService {
    negotiator: Option<TransportNegotiator>,
}

impl EstimationService {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let negotiator = match &config.provider_url {
            Some(url) => Some(TransportNegotiator::new(
                url.clone(),
                config.api_key.clone(),
                config.provider_timeout,
            )?),
            None => None,
        };

        Ok(Self { negotiator })
    }

    pub fn is_configured(&self) -> bool {
        self.negotiator.is_some()
    }
}

#[async_trait::async_trait]
impl FoodEstimator for EstimationService {
    async fn estimate(&self, image: Vec<u8>) -> Result<Estimation, EstimateError> {
        let negotiator = self.negotiator.as_ref().ok_or(EstimateError::NotConfigured)?;

        log::debug!("📸 Starting estimation for {} byte image", image.len());
        let prepared = prepare_image_blocking(image).await;

        let (strategy, raw) = negotiator.negotiate(&prepared).await?;

        let items = resolve_items(&raw);
        let predictions = normalize_all(&items);
        log::info!(
            "🍽️ Estimation finished via {} upload: {} prediction(s)",
            strategy,
            predictions.len()
        );

        Ok(Estimation {
            predictions,
            raw,
            strategy,
        })
    }
}
