pub mod artifact;
pub mod corpus;
pub mod feature_contract;

pub use artifact::{ModelArtifact, ProfitForest};
pub use corpus::{CorpusOrigin, TrainingCorpus};
pub use feature_contract::{
    FEATURE_COUNT, FEATURE_NAMES, Feature, FeatureSchema, FeatureVector, SchemaDescriptor,
    TrainingExample,
};
