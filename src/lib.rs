//! employability: graduate employment prediction.
//!
//! This crate turns raw graduate records into engineered features, tunes and
//! calibrates gradient-boosted, random-forest and logistic classifiers, and
//! combines them in a stacking ensemble that outputs calibrated employment
//! probabilities.
//!
//! `EmploymentPredictor` is the top-level entry point; the submodules expose
//! the individual pipeline stages for finer-grained use and testing.
pub mod calibration;
pub mod config;
pub mod ensemble;
pub mod error;
pub mod features;
pub mod io;
pub mod models;
pub mod predictor;
pub mod preprocessing;
pub mod record;
pub mod stats;

pub use config::TrainingConfig;
pub use error::PredictorError;
pub use predictor::EmploymentPredictor;
pub use record::GraduateRecord;
