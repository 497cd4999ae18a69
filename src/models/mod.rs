pub mod boosted;
pub mod classifier_trait;
pub mod factory;
pub mod forest;
pub mod logistic;
pub mod params;
pub mod search;
pub mod tuned;

pub use classifier_trait::ClassifierModel;
pub use factory::FittedModel;
pub use params::{ModelKind, ModelParams};
pub use tuned::TunedClassifier;
