//! Persistence of trained artifacts as JSON blobs.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Serialize `value` to `path`, replacing any existing file.
pub fn save_artifact<T: Serialize>(value: &T, path: &Path) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create artifact file {}", path.display()))?;
    serde_json::to_writer(BufWriter::new(file), value)
        .with_context(|| format!("failed to serialize artifact to {}", path.display()))?;
    log::info!("saved artifact to {}", path.display());
    Ok(())
}

/// Deserialize an artifact previously written by [`save_artifact`].
pub fn load_artifact<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let file = File::open(path)
        .with_context(|| format!("failed to open artifact file {}", path.display()))?;
    let value = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to deserialize artifact from {}", path.display()))?;
    log::info!("loaded artifact from {}", path.display());
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn artifact_round_trips() {
        let mut value = BTreeMap::new();
        value.insert("accuracy".to_string(), 0.91_f64);
        let path = std::env::temp_dir().join("employability_artifact_roundtrip.json");

        save_artifact(&value, &path).unwrap();
        let back: BTreeMap<String, f64> = load_artifact(&path).unwrap();
        assert_eq!(back, value);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn missing_file_is_an_error() {
        let path = std::env::temp_dir().join("employability_does_not_exist.json");
        let result: anyhow::Result<BTreeMap<String, f64>> = load_artifact(&path);
        assert!(result.is_err());
    }
}
