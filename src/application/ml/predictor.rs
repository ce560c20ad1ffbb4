use crate::domain::ml::FeatureVector;

/// Interface for profit estimation models.
///
/// Implementations are fail-soft: any failure yields the neutral score `0.0`.
pub trait ProfitPredictor: Send + Sync {
    /// Expected profit for the trade described by `features`
    fn predict(&self, features: &FeatureVector) -> f64;

    /// Drop any cached model state (e.g. after a retraining run)
    fn invalidate(&self) {}

    /// Get model name/type
    fn name(&self) -> &str;

    /// Get model version/id
    fn version(&self) -> &str;
}

/// Execution threshold applied to predicted profit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfitGate {
    pub min_profit: f64,
}

impl ProfitGate {
    pub fn new(min_profit: f64) -> Self {
        Self { min_profit }
    }

    pub fn should_execute(&self, predicted: f64) -> bool {
        predicted.is_finite() && predicted >= self.min_profit
    }
}
