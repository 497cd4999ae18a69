//! Isotonic probability calibration.
//!
//! Pool-adjacent-violators regression fitted on out-of-fold classifier
//! scores. Prediction interpolates linearly between the fitted blocks and
//! clamps outside the observed score range, so calibrated outputs always
//! stay inside [0, 1].

use anyhow::ensure;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Block {
    x_left: f64,
    x_right: f64,
    value: f64,
}

/// A fitted monotone score-to-probability mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IsotonicRegression {
    blocks: Vec<Block>,
}

impl IsotonicRegression {
    /// Fit on raw scores and binary targets by pool-adjacent-violators.
    pub fn fit(scores: &[f64], targets: &[bool]) -> anyhow::Result<Self> {
        ensure!(!scores.is_empty(), "isotonic fit requires at least one point");
        ensure!(
            scores.len() == targets.len(),
            "isotonic fit: {} scores but {} targets",
            scores.len(),
            targets.len()
        );

        let mut order: Vec<usize> = (0..scores.len()).collect();
        order.sort_by(|&a, &b| {
            scores[a]
                .partial_cmp(&scores[b])
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(targets[a].cmp(&targets[b]))
        });

        // Each point starts as its own block; merge while the mean of the
        // last block drops below its predecessor.
        struct Pool {
            sum: f64,
            weight: f64,
            x_left: f64,
            x_right: f64,
        }
        let mut pools: Vec<Pool> = Vec::with_capacity(order.len());
        for &i in &order {
            pools.push(Pool {
                sum: targets[i] as u8 as f64,
                weight: 1.0,
                x_left: scores[i],
                x_right: scores[i],
            });
            while pools.len() >= 2 {
                let last = pools.len() - 1;
                let prev = last - 1;
                if pools[last].sum / pools[last].weight
                    < pools[prev].sum / pools[prev].weight
                {
                    let merged = pools.pop().unwrap();
                    let prev = pools.last_mut().unwrap();
                    prev.sum += merged.sum;
                    prev.weight += merged.weight;
                    prev.x_right = merged.x_right;
                } else {
                    break;
                }
            }
        }

        let blocks = pools
            .into_iter()
            .map(|p| Block {
                x_left: p.x_left,
                x_right: p.x_right,
                value: (p.sum / p.weight).clamp(0.0, 1.0),
            })
            .collect();

        Ok(IsotonicRegression { blocks })
    }

    /// Map one raw score to a calibrated probability.
    pub fn transform(&self, score: f64) -> f64 {
        let blocks = &self.blocks;
        if score <= blocks[0].x_left {
            return blocks[0].value;
        }
        if score >= blocks[blocks.len() - 1].x_right {
            return blocks[blocks.len() - 1].value;
        }
        for (i, block) in blocks.iter().enumerate() {
            if score <= block.x_right {
                if score >= block.x_left {
                    return block.value;
                }
                // Between the previous block and this one: interpolate.
                let prev = &blocks[i - 1];
                let span = block.x_left - prev.x_right;
                if span <= 0.0 {
                    return block.value;
                }
                let t = (score - prev.x_right) / span;
                return prev.value + t * (block.value - prev.value);
            }
        }
        blocks[blocks.len() - 1].value
    }

    pub fn transform_all(&self, scores: &Array1<f64>) -> Array1<f64> {
        scores.mapv(|s| self.transform(s))
    }
}
