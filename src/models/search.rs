//! Randomized hyper-parameter search scored by cross-validated ROC-AUC.
//!
//! Candidates are drawn up front from a seeded RNG and evaluated in
//! parallel; every fold fit receives a seed derived from the candidate and
//! fold index, so the search is reproducible regardless of thread schedule.

use ndarray::{Array2, Axis};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::models::classifier_trait::ClassifierModel;
use crate::models::factory::fit_model;
use crate::models::params::{ModelKind, ModelParams};
use crate::stats::{roc_auc, stratified_kfold};

/// Fold count is capped during search to bound turnaround time.
pub const MAX_SEARCH_FOLDS: usize = 3;

#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub params: ModelParams,
    pub cv_score: f64,
}

/// Pick the best candidate for `kind` by mean ROC-AUC over stratified folds.
///
/// Kinds without a search space evaluate their single default candidate.
/// Ties break on the earliest candidate, keeping the outcome stable.
pub fn randomized_search(
    kind: ModelKind,
    x: &Array2<f64>,
    y: &[bool],
    n_trials: usize,
    cv_folds: usize,
    seed: u64,
) -> anyhow::Result<SearchOutcome> {
    let candidates: Vec<ModelParams> = if kind.has_search_space() && n_trials > 0 {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n_trials)
            .map(|_| ModelParams::sample(kind, &mut rng))
            .collect()
    } else {
        vec![ModelParams::default_for(kind)]
    };

    let folds = stratified_kfold(y, cv_folds.min(MAX_SEARCH_FOLDS), seed);

    let scores: Vec<f64> = candidates
        .par_iter()
        .enumerate()
        .map(|(ci, params)| -> anyhow::Result<f64> {
            let mut total = 0.0;
            for (fi, (train_idx, test_idx)) in folds.iter().enumerate() {
                let x_train = x.select(Axis(0), train_idx);
                let y_train: Vec<bool> = train_idx.iter().map(|&i| y[i]).collect();
                let x_test = x.select(Axis(0), test_idx);
                let y_test: Vec<bool> = test_idx.iter().map(|&i| y[i]).collect();

                let fold_seed = seed
                    .wrapping_add(1 + ci as u64)
                    .wrapping_mul(31)
                    .wrapping_add(fi as u64);
                let model = fit_model(params, &x_train, &y_train, fold_seed)?;
                let proba = model.predict_proba(&x_test)?;
                total += roc_auc(&y_test, &proba);
            }
            Ok(total / folds.len() as f64)
        })
        .collect::<anyhow::Result<Vec<f64>>>()?;

    let (best_idx, best_score) = scores
        .iter()
        .enumerate()
        .fold((0usize, f64::NEG_INFINITY), |(bi, bs), (i, &s)| {
            if s > bs {
                (i, s)
            } else {
                (bi, bs)
            }
        });

    log::info!(
        "search[{}]: best of {} candidates {:?} (cv roc-auc {:.4})",
        kind.name(),
        candidates.len(),
        candidates[best_idx],
        best_score
    );

    Ok(SearchOutcome {
        params: candidates[best_idx].clone(),
        cv_score: best_score,
    })
}
