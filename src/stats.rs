//! Evaluation metrics and stratified resampling helpers.
//!
//! All metrics are zero-division-safe: an undefined precision, recall or F1
//! evaluates to 0.0, and ROC-AUC falls back to 0.5 when only one class is
//! present in the truth vector.

use std::cmp::Ordering;

use ndarray::Array1;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Held-out evaluation results for one model variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub roc_auc: f64,
}

/// Compute all metrics from positive-class probabilities, thresholding at 0.5.
pub fn evaluate_probabilities(y_true: &[bool], proba: &Array1<f64>) -> ClassificationMetrics {
    let y_pred: Vec<bool> = proba.iter().map(|&p| p > 0.5).collect();
    ClassificationMetrics {
        accuracy: accuracy(y_true, &y_pred),
        precision: precision(y_true, &y_pred),
        recall: recall(y_true, &y_pred),
        f1: f1_score(y_true, &y_pred),
        roc_auc: roc_auc(y_true, proba),
    }
}

pub fn accuracy(y_true: &[bool], y_pred: &[bool]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    correct as f64 / y_true.len() as f64
}

pub fn precision(y_true: &[bool], y_pred: &[bool]) -> f64 {
    let tp = y_true.iter().zip(y_pred).filter(|(t, p)| **t && **p).count();
    let fp = y_true.iter().zip(y_pred).filter(|(t, p)| !**t && **p).count();
    if tp + fp == 0 {
        0.0
    } else {
        tp as f64 / (tp + fp) as f64
    }
}

pub fn recall(y_true: &[bool], y_pred: &[bool]) -> f64 {
    let tp = y_true.iter().zip(y_pred).filter(|(t, p)| **t && **p).count();
    let fneg = y_true.iter().zip(y_pred).filter(|(t, p)| **t && !**p).count();
    if tp + fneg == 0 {
        0.0
    } else {
        tp as f64 / (tp + fneg) as f64
    }
}

pub fn f1_score(y_true: &[bool], y_pred: &[bool]) -> f64 {
    let p = precision(y_true, y_pred);
    let r = recall(y_true, y_pred);
    if p + r == 0.0 {
        0.0
    } else {
        2.0 * p * r / (p + r)
    }
}

/// Area under the ROC curve via the Mann-Whitney rank statistic.
///
/// Tied scores receive their average rank, so the result matches the
/// trapezoidal curve integral. Returns 0.5 when a class is absent.
pub fn roc_auc(y_true: &[bool], scores: &Array1<f64>) -> f64 {
    let n = y_true.len();
    debug_assert_eq!(n, scores.len());
    let n_pos = y_true.iter().filter(|&&t| t).count();
    let n_neg = n - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return 0.5;
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| scores[a].partial_cmp(&scores[b]).unwrap_or(Ordering::Equal));

    // Average ranks over tied score groups.
    let mut ranks = vec![0.0f64; n];
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j + 1 < n && scores[order[j + 1]] == scores[order[i]] {
            j += 1;
        }
        let avg_rank = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = avg_rank;
        }
        i = j + 1;
    }

    let rank_sum_pos: f64 = y_true
        .iter()
        .zip(&ranks)
        .filter(|(t, _)| **t)
        .map(|(_, r)| *r)
        .sum();
    let u = rank_sum_pos - (n_pos * (n_pos + 1)) as f64 / 2.0;
    u / (n_pos as f64 * n_neg as f64)
}

/// Class-stratified train/test split with a seeded shuffle.
///
/// Each class contributes `test_fraction` of its rows (rounded, at least one
/// when the class is non-empty) to the test set.
pub fn stratified_split(
    y: &[bool],
    test_fraction: f64,
    seed: u64,
) -> (Vec<usize>, Vec<usize>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::new();
    let mut test = Vec::new();

    for class in [true, false] {
        let mut indices: Vec<usize> = (0..y.len()).filter(|&i| y[i] == class).collect();
        if indices.is_empty() {
            continue;
        }
        indices.shuffle(&mut rng);
        let n_test = ((indices.len() as f64 * test_fraction).round() as usize)
            .clamp(1, indices.len().saturating_sub(1).max(1));
        test.extend_from_slice(&indices[..n_test]);
        train.extend_from_slice(&indices[n_test..]);
    }

    train.sort_unstable();
    test.sort_unstable();
    (train, test)
}

/// Class-stratified k-fold assignment with a seeded shuffle.
///
/// Returns `(train_indices, test_indices)` per fold. Every row lands in
/// exactly one test fold; classes are spread round-robin so each fold keeps
/// the overall label proportions as closely as the counts allow.
pub fn stratified_kfold(y: &[bool], k: usize, seed: u64) -> Vec<(Vec<usize>, Vec<usize>)> {
    let k = k.max(2);
    let mut rng = StdRng::seed_from_u64(seed);
    let mut fold_of = vec![0usize; y.len()];

    for class in [true, false] {
        let mut indices: Vec<usize> = (0..y.len()).filter(|&i| y[i] == class).collect();
        indices.shuffle(&mut rng);
        for (pos, idx) in indices.into_iter().enumerate() {
            fold_of[idx] = pos % k;
        }
    }

    (0..k)
        .map(|fold| {
            let test: Vec<usize> = (0..y.len()).filter(|&i| fold_of[i] == fold).collect();
            let train: Vec<usize> = (0..y.len()).filter(|&i| fold_of[i] != fold).collect();
            (train, test)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roc_auc_perfect_ranking() {
        let y = vec![false, false, true, true];
        let scores = Array1::from_vec(vec![0.1, 0.2, 0.8, 0.9]);
        assert!((roc_auc(&y, &scores) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn roc_auc_reversed_ranking() {
        let y = vec![true, true, false, false];
        let scores = Array1::from_vec(vec![0.1, 0.2, 0.8, 0.9]);
        assert!(roc_auc(&y, &scores).abs() < 1e-12);
    }

    #[test]
    fn roc_auc_ties_average_out() {
        let y = vec![true, false];
        let scores = Array1::from_vec(vec![0.5, 0.5]);
        assert!((roc_auc(&y, &scores) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn roc_auc_single_class_is_half() {
        let y = vec![true, true];
        let scores = Array1::from_vec(vec![0.3, 0.9]);
        assert_eq!(roc_auc(&y, &scores), 0.5);
    }

    #[test]
    fn zero_division_yields_zero() {
        let y_true = vec![false, false];
        let y_pred = vec![false, false];
        assert_eq!(precision(&y_true, &y_pred), 0.0);
        assert_eq!(recall(&y_true, &y_pred), 0.0);
        assert_eq!(f1_score(&y_true, &y_pred), 0.0);
    }

    #[test]
    fn stratified_split_preserves_both_classes() {
        let y: Vec<bool> = (0..100).map(|i| i % 4 == 0).collect();
        let (train, test) = stratified_split(&y, 0.2, 42);
        assert_eq!(train.len() + test.len(), 100);
        assert!(test.iter().any(|&i| y[i]));
        assert!(test.iter().any(|&i| !y[i]));
        // 25 positives -> 5 in test, 75 negatives -> 15 in test
        assert_eq!(test.len(), 20);
    }

    #[test]
    fn stratified_split_is_seeded() {
        let y: Vec<bool> = (0..60).map(|i| i % 3 == 0).collect();
        assert_eq!(stratified_split(&y, 0.2, 7), stratified_split(&y, 0.2, 7));
        assert_ne!(stratified_split(&y, 0.2, 7), stratified_split(&y, 0.2, 8));
    }

    #[test]
    fn kfold_partitions_all_rows() {
        let y: Vec<bool> = (0..30).map(|i| i % 2 == 0).collect();
        let folds = stratified_kfold(&y, 3, 1);
        assert_eq!(folds.len(), 3);
        let mut seen = vec![false; 30];
        for (train, test) in &folds {
            assert_eq!(train.len() + test.len(), 30);
            for &i in test {
                assert!(!seen[i], "row {} appears in two test folds", i);
                seen[i] = true;
            }
        }
        assert!(seen.iter().all(|&s| s));
    }
}
