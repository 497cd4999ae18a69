use employability::models::factory::{fit_model, FittedModel};
use employability::models::params::{ModelKind, ModelParams};
use employability::models::ClassifierModel;
use ndarray::Array2;

/// Two informative features; class decided by the first.
fn toy_dataset() -> (Array2<f64>, Vec<bool>) {
    let n = 40;
    let mut data = Vec::with_capacity(n * 2);
    let mut labels = Vec::with_capacity(n);
    for i in 0..n {
        let positive = i % 2 == 0;
        data.push(if positive { 1.0 } else { 0.0 } + ((i * 3) % 5) as f64 * 0.02);
        data.push(((i * 7) % 9) as f64 * 0.1);
        labels.push(positive);
    }
    (Array2::from_shape_vec((n, 2), data).expect("toy matrix"), labels)
}

#[test]
fn every_kind_fits_and_predicts_probabilities() {
    let (x, y) = toy_dataset();
    for kind in [
        ModelKind::ExtremeBoost,
        ModelKind::LightBoost,
        ModelKind::GradientBoost,
        ModelKind::RandomForest,
        ModelKind::Logistic,
    ] {
        let params = ModelParams::default_for(kind);
        let model = fit_model(&params, &x, &y, 42)
            .unwrap_or_else(|e| panic!("{} failed to fit: {}", kind.name(), e));
        let proba = model.predict_proba(&x).expect("prediction");

        assert_eq!(proba.len(), x.nrows(), "{}: wrong output length", kind.name());
        assert!(
            proba.iter().all(|p| (0.0..=1.0).contains(p)),
            "{}: probability out of range",
            kind.name()
        );
        let auc = employability::stats::roc_auc(&y, &proba);
        assert!(auc > 0.9, "{}: training auc only {}", kind.name(), auc);
    }
}

#[test]
fn fitted_model_serde_round_trip_preserves_predictions() {
    let (x, y) = toy_dataset();
    for kind in [ModelKind::GradientBoost, ModelKind::RandomForest, ModelKind::Logistic] {
        let params = ModelParams::default_for(kind);
        let model = fit_model(&params, &x, &y, 7).expect("fit");
        let before = model.predict_proba(&x).expect("predict before");

        let json = serde_json::to_string(&model).expect("serialize");
        let restored: FittedModel = serde_json::from_str(&json).expect("deserialize");
        let after = restored.predict_proba(&x).expect("predict after");

        assert_eq!(before, after, "{}: predictions changed", kind.name());
        assert_eq!(restored.params(), &params);
    }
}

#[test]
fn mismatched_labels_are_rejected() {
    let (x, _) = toy_dataset();
    let short = vec![true, false, true];
    let params = ModelParams::default_for(ModelKind::GradientBoost);
    assert!(fit_model(&params, &x, &short, 0).is_err());
}
