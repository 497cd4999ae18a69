use ndarray::{Array1, Array2};

/// Capability interface shared by every fitted classifier. Implementations
/// live next to model code; construction happens through the factory so an
/// unfitted classifier is unrepresentable.
pub trait ClassifierModel {
    /// Positive-class (employed) probability per row, in [0, 1].
    fn predict_proba(&self, x: &Array2<f64>) -> anyhow::Result<Array1<f64>>;

    /// Hard labels, thresholded at 0.5.
    fn predict(&self, x: &Array2<f64>) -> anyhow::Result<Vec<bool>> {
        Ok(self.predict_proba(x)?.iter().map(|&p| p > 0.5).collect())
    }

    /// Human readable name for the model.
    fn name(&self) -> &str {
        "classifier"
    }
}
