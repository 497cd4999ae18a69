//! Train an employment predictor from a JSON table of graduate records.
//!
//! Usage: train <records.json> <model-out.json>
//!
//! The input file is a JSON array of graduate records with the `employed`
//! outcome set on every row. Logging is controlled via RUST_LOG.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use employability::{EmploymentPredictor, GraduateRecord, TrainingConfig};

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let (records_path, model_path) = match (args.next(), args.next()) {
        (Some(r), Some(m)) => (PathBuf::from(r), PathBuf::from(m)),
        _ => bail!("usage: train <records.json> <model-out.json>"),
    };

    let file = File::open(&records_path)
        .with_context(|| format!("failed to open {}", records_path.display()))?;
    let records: Vec<GraduateRecord> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse {}", records_path.display()))?;
    log::info!("loaded {} records from {}", records.len(), records_path.display());

    let mut predictor = EmploymentPredictor::new(TrainingConfig::default());
    if !predictor.train(&records)? {
        bail!("training declined: not enough usable data");
    }

    for (name, metrics) in predictor.model_performance() {
        println!(
            "{:<16} accuracy {:.3}  f1 {:.3}  roc-auc {:.3}",
            name, metrics.accuracy, metrics.f1, metrics.roc_auc
        );
    }
    if let Some(top) = predictor.feature_importance(10) {
        println!("top features:");
        for (feature, importance) in top {
            println!("  {:<28} {:.4}", feature, importance);
        }
    }

    predictor.save_model(&model_path)?;
    println!("model written to {}", model_path.display());
    Ok(())
}
