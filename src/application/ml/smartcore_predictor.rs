use super::predictor::ProfitPredictor;
use crate::domain::errors::ArtifactError;
use crate::domain::ml::{FeatureVector, ModelArtifact};
use crate::infrastructure::model_store::ModelStore;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info, warn};

/// Neutral score returned on every failure path.
pub const NEUTRAL_PROFIT: f64 = 0.0;

/// Fail-soft random forest predictor backed by the model store.
///
/// The artifact is loaded lazily on the first call and cached until
/// [`ProfitPredictor::invalidate`] is called. Failed loads are not cached.
pub struct SmartCorePredictor {
    store: ModelStore,
    model: RwLock<Option<Arc<ModelArtifact>>>,
}

impl SmartCorePredictor {
    pub fn new(model_path: impl Into<PathBuf>) -> Self {
        Self {
            store: ModelStore::new(model_path),
            model: RwLock::new(None),
        }
    }

    /// Scores raw positional arguments `amount slippage gas_price volatility`.
    ///
    /// Invalid input short-circuits to the neutral score without touching the model.
    pub fn predict_args<S: AsRef<str>>(&self, args: &[S]) -> f64 {
        match FeatureVector::parse(args) {
            Ok(features) => self.predict(&features),
            Err(e) => {
                debug!("Rejected predictor input: {}", e);
                NEUTRAL_PROFIT
            }
        }
    }

    /// Whether a model is currently cached.
    pub fn is_loaded(&self) -> bool {
        self.model
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn cached_model(&self) -> Result<Arc<ModelArtifact>, ArtifactError> {
        if let Some(model) = self
            .model
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            return Ok(Arc::clone(model));
        }

        let mut slot = self.model.write().unwrap_or_else(PoisonError::into_inner);
        // Another caller may have loaded it while we waited for the write lock
        if let Some(model) = slot.as_ref() {
            return Ok(Arc::clone(model));
        }

        let model = Arc::new(self.store.load()?);
        info!("Successfully loaded ML model from {:?}", self.store.path());
        *slot = Some(Arc::clone(&model));
        Ok(model)
    }

    fn try_predict(&self, features: &FeatureVector) -> Result<f64, ArtifactError> {
        let model = self.cached_model()?;
        let prediction = catch_unwind(AssertUnwindSafe(|| model.predict(features))).map_err(
            |_| ArtifactError::Inference {
                reason: "model panicked during inference".to_string(),
            },
        )??;

        if !prediction.is_finite() {
            return Err(ArtifactError::Inference {
                reason: format!("non-finite prediction {}", prediction),
            });
        }
        Ok(prediction)
    }
}

impl ProfitPredictor for SmartCorePredictor {
    fn predict(&self, features: &FeatureVector) -> f64 {
        match self.try_predict(features) {
            Ok(prediction) => prediction,
            Err(ArtifactError::NotFound { path }) => {
                warn!(
                    "ML Model file not found at {:?}. Predictor will return neutral.",
                    path
                );
                NEUTRAL_PROFIT
            }
            Err(e) => {
                warn!("Prediction failed, returning neutral score: {}", e);
                NEUTRAL_PROFIT
            }
        }
    }

    fn invalidate(&self) {
        let mut slot = self.model.write().unwrap_or_else(PoisonError::into_inner);
        if slot.take().is_some() {
            info!("Invalidated cached ML model");
        }
    }

    fn name(&self) -> &str {
        "SmartCore Random Forest"
    }

    fn version(&self) -> &str {
        "v1.0"
    }
}
