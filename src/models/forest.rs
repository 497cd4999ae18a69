//! Random forest built by bootstrap-bagging `linfa-trees` decision trees.
//!
//! The probability of employment is the share of trees voting for the
//! positive class. Bootstrap resampling is seeded, so fitting is fully
//! reproducible.

use linfa::prelude::*;
use linfa_trees::{DecisionTree, SplitQuality};
use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::PredictorError;
use crate::models::classifier_trait::ClassifierModel;
use crate::models::params::ModelParams;

#[derive(Serialize, Deserialize)]
pub struct RandomForestClassifier {
    trees: Vec<DecisionTree<f64, usize>>,
    params: ModelParams,
}

impl RandomForestClassifier {
    pub fn fit(
        params: &ModelParams,
        x: &Array2<f64>,
        y: &[bool],
        seed: u64,
    ) -> anyhow::Result<Self> {
        let (n_trees, max_depth) = match params {
            ModelParams::RandomForest { n_trees, max_depth } => (*n_trees, *max_depth),
            other => anyhow::bail!(
                "expected random-forest params, got {:?}",
                other.kind().name()
            ),
        };
        if x.nrows() == 0 {
            return Err(PredictorError::EmptyDataset.into());
        }
        if x.nrows() != y.len() {
            return Err(PredictorError::LengthMismatch {
                expected: x.nrows(),
                actual: y.len(),
            }
            .into());
        }

        let targets: Vec<usize> = y.iter().map(|&b| b as usize).collect();
        let n = x.nrows();
        let mut rng = StdRng::seed_from_u64(seed);
        let mut trees = Vec::with_capacity(n_trees);

        for _ in 0..n_trees {
            let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
            let xb = x.select(Axis(0), &sample);
            let yb = Array1::from_iter(sample.iter().map(|&i| targets[i]));
            let dataset = Dataset::new(xb, yb);
            let tree = DecisionTree::params()
                .split_quality(SplitQuality::Gini)
                .max_depth(max_depth)
                .fit(&dataset)?;
            trees.push(tree);
        }

        Ok(RandomForestClassifier {
            trees,
            params: params.clone(),
        })
    }

    pub fn params(&self) -> &ModelParams {
        &self.params
    }
}

impl ClassifierModel for RandomForestClassifier {
    fn predict_proba(&self, x: &Array2<f64>) -> anyhow::Result<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(PredictorError::NotFitted.into());
        }
        let mut votes = vec![0usize; x.nrows()];
        for tree in &self.trees {
            let predicted = tree.predict(x);
            for (i, &label) in predicted.iter().enumerate() {
                votes[i] += label;
            }
        }
        let n_trees = self.trees.len() as f64;
        Ok(Array1::from_iter(
            votes.into_iter().map(|v| v as f64 / n_trees),
        ))
    }

    fn name(&self) -> &str {
        self.params.kind().name()
    }
}
