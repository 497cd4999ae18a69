pub mod deriver;
pub mod engineer;

pub use deriver::{DerivedFeatures, EncodingState, FeatureDeriver};
pub use engineer::{FeatureEngineer, CANDIDATE_FEATURES};
