use crate::domain::errors::ArtifactError;
use crate::domain::ml::feature_contract::{FeatureSchema, FeatureVector, SchemaDescriptor};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smartcore::ensemble::random_forest_regressor::RandomForestRegressor;
use smartcore::linalg::basic::matrix::DenseMatrix;
use std::fmt;
use std::path::Path;

/// Random forest over the projected feature matrix.
pub type ProfitForest = RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

/// A trained profit model together with the schema it was fitted on.
///
/// Never mutated after creation. Retraining produces a new artifact.
pub struct ModelArtifact {
    schema: FeatureSchema,
    model: ProfitForest,
    n_features: usize,
    trained_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct StoredArtifactRef<'a> {
    schema: SchemaDescriptor,
    n_features: usize,
    trained_at: DateTime<Utc>,
    model: &'a ProfitForest,
}

#[derive(Deserialize)]
struct StoredArtifact {
    schema: SchemaDescriptor,
    n_features: usize,
    trained_at: DateTime<Utc>,
    model: ProfitForest,
}

impl ModelArtifact {
    /// `model` must have been fitted on rows projected through `schema`.
    pub fn new(schema: FeatureSchema, model: ProfitForest, trained_at: DateTime<Utc>) -> Self {
        let n_features = schema.len();
        Self {
            schema,
            model,
            n_features,
            trained_at,
        }
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn trained_at(&self) -> DateTime<Utc> {
        self.trained_at
    }

    /// Scores one feature vector, projected through the artifact's own schema.
    pub fn predict(&self, features: &FeatureVector) -> Result<f64, ArtifactError> {
        let row = features.project(&self.schema);
        let predictions = self.predict_rows(vec![row])?;
        predictions
            .first()
            .copied()
            .ok_or_else(|| ArtifactError::Inference {
                reason: "No prediction returned".to_string(),
            })
    }

    /// Scores already-projected rows (schema order).
    pub fn predict_rows(&self, rows: Vec<Vec<f64>>) -> Result<Vec<f64>, ArtifactError> {
        if let Some(row) = rows.iter().find(|r| r.len() != self.n_features) {
            return Err(ArtifactError::Inference {
                reason: format!(
                    "row has {} values, model expects {}",
                    row.len(),
                    self.n_features
                ),
            });
        }

        let matrix = DenseMatrix::from_2d_vec(&rows).map_err(|e| {
            ArtifactError::Inference {
                reason: format!("Matrix creation failed: {}", e),
            }
        })?;

        self.model
            .predict(&matrix)
            .map_err(|e| ArtifactError::Inference {
                reason: format!("Prediction failed: {}", e),
            })
    }

    pub fn to_json(&self) -> Result<Vec<u8>, ArtifactError> {
        let stored = StoredArtifactRef {
            schema: self.schema.to_descriptor(),
            n_features: self.n_features,
            trained_at: self.trained_at,
            model: &self.model,
        };
        serde_json::to_vec(&stored).map_err(|e| ArtifactError::Serialize {
            reason: e.to_string(),
        })
    }

    /// Decodes an artifact read from `path`. Decode failures are `Corrupt`,
    /// a readable file with an incompatible schema is `SchemaMismatch`.
    pub fn from_json(bytes: &[u8], path: &Path) -> Result<Self, ArtifactError> {
        let stored: StoredArtifact =
            serde_json::from_slice(bytes).map_err(|e| ArtifactError::Corrupt {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let schema = FeatureSchema::from_descriptor(&stored.schema)?;
        if stored.n_features != schema.len() {
            return Err(ArtifactError::SchemaMismatch {
                reason: format!(
                    "stored schema {} has {} features, model was fitted on {}",
                    schema,
                    schema.len(),
                    stored.n_features
                ),
            });
        }

        Ok(Self {
            schema,
            model: stored.model,
            n_features: stored.n_features,
            trained_at: stored.trained_at,
        })
    }
}

impl fmt::Debug for ModelArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelArtifact")
            .field("schema", &self.schema)
            .field("n_features", &self.n_features)
            .field("trained_at", &self.trained_at)
            .finish_non_exhaustive()
    }
}
