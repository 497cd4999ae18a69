//! Training configuration.

use serde::{Deserialize, Serialize};

/// Knobs for the training pipeline. `Default` matches the production setup:
/// a stacking ensemble, a 20% held-out evaluation split, 20 search trials
/// over 3 cross-validation folds, all seeded from `random_state`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Train the stacking ensemble; `false` fits a single tuned model.
    pub use_ensemble: bool,
    /// Seed for every random decision in the pipeline.
    pub random_state: u64,
    /// Fraction of rows held out for evaluation.
    pub test_size: f64,
    /// Candidates drawn per algorithm during randomized search.
    pub search_trials: usize,
    /// Stratified folds for search scoring and calibration.
    pub cv_folds: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        TrainingConfig {
            use_ensemble: true,
            random_state: 42,
            test_size: 0.2,
            search_trials: 20,
            cv_folds: 3,
        }
    }
}
