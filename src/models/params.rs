//! The closed algorithm set and per-algorithm hyper-parameters.
//!
//! Each `ModelKind` owns a fixed candidate grid for randomized search; the
//! grids follow the search spaces of the system this pipeline replaces. The
//! logistic model has no search space and always fits its single default
//! candidate.

use std::str::FromStr;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Supported algorithms. Resolved to a concrete model at fit time; string
/// dispatch exists only at the configuration boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    /// Boosted trees, depth-and-shrinkage-leaning grid.
    ExtremeBoost,
    /// Boosted trees, many-shallow-trees grid.
    LightBoost,
    /// Boosted trees, conservative classic grid.
    GradientBoost,
    /// Bootstrap-bagged decision trees.
    RandomForest,
    /// L2-regularized logistic regression.
    Logistic,
}

impl ModelKind {
    pub fn name(&self) -> &'static str {
        match self {
            ModelKind::ExtremeBoost => "extreme_boost",
            ModelKind::LightBoost => "light_boost",
            ModelKind::GradientBoost => "gradient_boost",
            ModelKind::RandomForest => "random_forest",
            ModelKind::Logistic => "logistic",
        }
    }

    /// Whether randomized search has anything to explore for this kind.
    pub fn has_search_space(&self) -> bool {
        !matches!(self, ModelKind::Logistic)
    }
}

impl FromStr for ModelKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "extreme_boost" => Ok(ModelKind::ExtremeBoost),
            "light_boost" => Ok(ModelKind::LightBoost),
            "gradient_boost" => Ok(ModelKind::GradientBoost),
            "random_forest" => Ok(ModelKind::RandomForest),
            "logistic" => Ok(ModelKind::Logistic),
            _ => Err(format!("Unknown model kind: {}", s)),
        }
    }
}

/// Hyper-parameters for one concrete model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ModelParams {
    ExtremeBoost {
        iterations: usize,
        max_depth: u32,
        learning_rate: f32,
    },
    LightBoost {
        iterations: usize,
        max_depth: u32,
        learning_rate: f32,
    },
    GradientBoost {
        iterations: usize,
        max_depth: u32,
        learning_rate: f32,
    },
    RandomForest {
        n_trees: usize,
        max_depth: Option<usize>,
    },
    Logistic {
        max_iterations: u64,
        l2_penalty: f64,
    },
}

impl ModelParams {
    pub fn kind(&self) -> ModelKind {
        match self {
            ModelParams::ExtremeBoost { .. } => ModelKind::ExtremeBoost,
            ModelParams::LightBoost { .. } => ModelKind::LightBoost,
            ModelParams::GradientBoost { .. } => ModelKind::GradientBoost,
            ModelParams::RandomForest { .. } => ModelKind::RandomForest,
            ModelParams::Logistic { .. } => ModelKind::Logistic,
        }
    }

    pub fn default_for(kind: ModelKind) -> Self {
        match kind {
            ModelKind::ExtremeBoost => ModelParams::ExtremeBoost {
                iterations: 200,
                max_depth: 5,
                learning_rate: 0.1,
            },
            ModelKind::LightBoost => ModelParams::LightBoost {
                iterations: 300,
                max_depth: 3,
                learning_rate: 0.1,
            },
            ModelKind::GradientBoost => ModelParams::GradientBoost {
                iterations: 100,
                max_depth: 3,
                learning_rate: 0.1,
            },
            ModelKind::RandomForest => ModelParams::RandomForest {
                n_trees: 200,
                max_depth: Some(10),
            },
            ModelKind::Logistic => ModelParams::Logistic {
                max_iterations: 1000,
                l2_penalty: 1.0,
            },
        }
    }

    /// Draw one candidate from the kind's fixed grid.
    pub fn sample(kind: ModelKind, rng: &mut StdRng) -> Self {
        match kind {
            ModelKind::ExtremeBoost => ModelParams::ExtremeBoost {
                iterations: *[100, 200, 300, 500].choose(rng).unwrap(),
                max_depth: *[3, 5, 7, 9].choose(rng).unwrap(),
                learning_rate: *[0.01, 0.05, 0.1, 0.2].choose(rng).unwrap(),
            },
            ModelKind::LightBoost => ModelParams::LightBoost {
                iterations: *[100, 200, 300, 500].choose(rng).unwrap(),
                max_depth: *[2, 3, 4, 5].choose(rng).unwrap(),
                learning_rate: *[0.01, 0.05, 0.1, 0.2].choose(rng).unwrap(),
            },
            ModelKind::GradientBoost => ModelParams::GradientBoost {
                iterations: *[100, 200, 300].choose(rng).unwrap(),
                max_depth: *[3, 5, 7, 9].choose(rng).unwrap(),
                learning_rate: *[0.01, 0.05, 0.1, 0.2].choose(rng).unwrap(),
            },
            ModelKind::RandomForest => ModelParams::RandomForest {
                n_trees: *[100, 200, 300].choose(rng).unwrap(),
                max_depth: *[Some(5), Some(10), Some(15), Some(20), None]
                    .choose(rng)
                    .unwrap(),
            },
            ModelKind::Logistic => ModelParams::default_for(ModelKind::Logistic),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn kind_round_trips_through_from_str() {
        for kind in [
            ModelKind::ExtremeBoost,
            ModelKind::LightBoost,
            ModelKind::GradientBoost,
            ModelKind::RandomForest,
            ModelKind::Logistic,
        ] {
            assert_eq!(kind.name().parse::<ModelKind>().unwrap(), kind);
        }
        assert!("svm".parse::<ModelKind>().is_err());
    }

    #[test]
    fn sampling_is_deterministic_per_seed() {
        let mut a = StdRng::seed_from_u64(3);
        let mut b = StdRng::seed_from_u64(3);
        for _ in 0..10 {
            assert_eq!(
                ModelParams::sample(ModelKind::ExtremeBoost, &mut a),
                ModelParams::sample(ModelKind::ExtremeBoost, &mut b)
            );
        }
    }

    #[test]
    fn logistic_has_no_search_space() {
        assert!(!ModelKind::Logistic.has_search_space());
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            ModelParams::sample(ModelKind::Logistic, &mut rng),
            ModelParams::default_for(ModelKind::Logistic)
        );
    }
}
