use crate::domain::errors::{ArtifactError, InputError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered list of feature names.
/// This order MUST match the column order the model was fitted on.
/// Any change here is a breaking change for persisted models.
pub const FEATURE_NAMES: &[&str] = &["amount", "slippage", "gas_price", "volatility"];

/// Number of positional arguments expected by the predictor.
pub const FEATURE_COUNT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Feature {
    Amount,
    Slippage,
    GasPrice,
    Volatility,
}

impl Feature {
    /// All features in contract order.
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::Amount,
        Feature::Slippage,
        Feature::GasPrice,
        Feature::Volatility,
    ];

    pub fn column_name(self) -> &'static str {
        FEATURE_NAMES[self.index()]
    }

    /// Position of the feature in the contract.
    pub fn index(self) -> usize {
        match self {
            Feature::Amount => 0,
            Feature::Slippage => 1,
            Feature::GasPrice => 2,
            Feature::Volatility => 3,
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// Numeric input to the profit model.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureVector {
    pub amount: f64,
    pub slippage: f64,
    pub gas_price: f64,
    pub volatility: f64,
}

impl FeatureVector {
    pub fn new(amount: f64, slippage: f64, gas_price: f64, volatility: f64) -> Self {
        Self {
            amount,
            slippage,
            gas_price,
            volatility,
        }
    }

    /// Parses the four positional arguments `amount slippage gas_price volatility`.
    /// Extra trailing arguments are ignored.
    pub fn parse<S: AsRef<str>>(args: &[S]) -> Result<Self, InputError> {
        if args.len() < FEATURE_COUNT {
            return Err(InputError::MissingArguments {
                expected: FEATURE_COUNT,
                got: args.len(),
            });
        }

        let mut values = [0.0; FEATURE_COUNT];
        for (feature, raw) in Feature::ALL.into_iter().zip(args) {
            let raw = raw.as_ref().trim();
            let value: f64 = raw.parse().map_err(|_| InputError::NotANumber {
                feature,
                value: raw.to_string(),
            })?;
            if !value.is_finite() {
                return Err(InputError::NotFinite { feature, value });
            }
            values[feature.index()] = value;
        }

        Ok(Self::new(values[0], values[1], values[2], values[3]))
    }

    pub fn get(&self, feature: Feature) -> f64 {
        match feature {
            Feature::Amount => self.amount,
            Feature::Slippage => self.slippage,
            Feature::GasPrice => self.gas_price,
            Feature::Volatility => self.volatility,
        }
    }

    pub fn set(&mut self, feature: Feature, value: f64) {
        match feature {
            Feature::Amount => self.amount = value,
            Feature::Slippage => self.slippage = value,
            Feature::GasPrice => self.gas_price = value,
            Feature::Volatility => self.volatility = value,
        }
    }

    /// Full vector in contract order.
    pub fn to_vec(&self) -> Vec<f64> {
        Feature::ALL.iter().map(|f| self.get(*f)).collect()
    }

    /// Values for the features of `schema`, in schema order.
    pub fn project(&self, schema: &FeatureSchema) -> Vec<f64> {
        schema.features().iter().map(|f| self.get(*f)).collect()
    }
}

/// One labeled row of historical (or synthetic) trade outcome.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingExample {
    pub features: FeatureVector,
    pub profit: f64,
}

/// Schema descriptor persisted next to every model.
///
/// Features are a non-empty subset of the contract, always kept in contract order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSchema {
    features: Vec<Feature>,
    label: String,
}

impl FeatureSchema {
    /// Full contract schema.
    pub fn contract(label: impl Into<String>) -> Self {
        Self {
            features: Feature::ALL.to_vec(),
            label: label.into(),
        }
    }

    /// Builds a schema from the contract features found in a corpus.
    /// Returns `None` when no contract feature is available.
    pub fn from_available(available: &[Feature], label: impl Into<String>) -> Option<Self> {
        let mut features: Vec<Feature> = available.to_vec();
        features.sort();
        features.dedup();
        if features.is_empty() {
            return None;
        }
        Some(Self {
            features,
            label: label.into(),
        })
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn to_descriptor(&self) -> SchemaDescriptor {
        SchemaDescriptor {
            features: self
                .features
                .iter()
                .map(|f| f.column_name().to_string())
                .collect(),
            label: self.label.clone(),
        }
    }

    /// Validates a stored descriptor against the contract.
    pub fn from_descriptor(descriptor: &SchemaDescriptor) -> Result<Self, ArtifactError> {
        if descriptor.features.is_empty() {
            return Err(ArtifactError::SchemaMismatch {
                reason: "stored schema has no features".to_string(),
            });
        }

        let mut features = Vec::with_capacity(descriptor.features.len());
        for name in &descriptor.features {
            let feature = Feature::ALL
                .into_iter()
                .find(|f| f.column_name() == name)
                .ok_or_else(|| ArtifactError::SchemaMismatch {
                    reason: format!("unknown feature '{}'", name),
                })?;
            features.push(feature);
        }

        if features.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ArtifactError::SchemaMismatch {
                reason: format!(
                    "stored feature order {:?} does not follow contract order {:?}",
                    descriptor.features, FEATURE_NAMES
                ),
            });
        }

        Ok(Self {
            features,
            label: descriptor.label.clone(),
        })
    }
}

impl fmt::Display for FeatureSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.features.iter().map(|f| f.column_name()).collect();
        write!(f, "[{}] -> {}", names.join(", "), self.label)
    }
}

/// On-disk form of [`FeatureSchema`]: plain names so that unknown entries
/// surface as a schema mismatch rather than a decode failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDescriptor {
    pub features: Vec<String>,
    pub label: String,
}
