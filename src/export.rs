//! Dataset packaging and persistence.
//!
//! Assembles the generation manifest from the split packages and the
//! partition statistic, and writes manifest plus train/test shard files
//! as JSON. Also hosts the precondition check that lets a rerun with
//! unchanged parameters skip regeneration entirely.
//!
//! # Files
//!
//! - **Manifest**: generation parameters, per-client sample counts,
//!   per-client-per-label statistic, total sample count
//! - **Train/test shards**: one [`DatasetPackage`] each
//!
//! # Example
//!
//! ```ignore
//! use fedshard::export::{check, save_dataset, DatasetManifest};
//!
//! if !check("out/config.json", "out/train/train.json", "out/test/test.json", &config)? {
//!     // ... partition and split ...
//!     let manifest = DatasetManifest::build(&config, &train, &test, statistic);
//!     save_dataset("out/config.json", "out/train/train.json", "out/test/test.json",
//!                  &manifest, &train, &test)?;
//! }
//! ```

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::GeneratorConfig;
use crate::error::{DatasetError, Result};
use crate::partition::LabelStatistic;
use crate::split::DatasetPackage;

/// Manifest describing one generated dataset.
///
/// Written next to the shard files; read back on the next run to decide
/// whether regeneration can be skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetManifest {
    /// Number of simulated clients.
    pub num_clients: usize,

    /// Number of label classes.
    pub num_labels: usize,

    /// Whether the distribution was non-IID.
    pub non_iid: bool,

    /// Whether real-world skew was enabled.
    pub real_world: bool,

    /// Per-client train sample counts.
    pub train_samples_of_each_label: Vec<usize>,

    /// Per-client test sample counts.
    pub test_samples_of_each_label: Vec<usize>,

    /// Combined train + test sample count.
    pub total_samples: usize,

    /// Per-client `(label, count)` statistic from partitioning.
    pub statistic: Vec<LabelStatistic>,

    /// Generation timestamp (RFC 3339). Ignored by the precondition check.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl DatasetManifest {
    /// Assemble the manifest from the split packages and statistic.
    ///
    /// Pure aggregation: no randomness, no IO.
    pub fn build<T>(
        config: &GeneratorConfig,
        train: &DatasetPackage<T>,
        test: &DatasetPackage<T>,
        statistic: Vec<LabelStatistic>,
    ) -> Self {
        Self {
            num_clients: config.partition.num_clients,
            num_labels: config.partition.num_labels,
            non_iid: config.partition.non_iid,
            real_world: config.partition.real_world,
            train_samples_of_each_label: train.num_samples.clone(),
            test_samples_of_each_label: test.num_samples.clone(),
            total_samples: train.total_samples() + test.total_samples(),
            statistic,
            created_at: Some(chrono::Utc::now().to_rfc3339()),
        }
    }

    /// True when this manifest records the same generation parameters.
    pub fn matches(&self, config: &GeneratorConfig) -> bool {
        self.num_clients == config.partition.num_clients
            && self.num_labels == config.partition.num_labels
            && self.non_iid == config.partition.non_iid
            && self.real_world == config.partition.real_world
    }
}

/// Check whether the dataset for `config` was already generated.
///
/// Returns `Ok(true)` when a manifest exists at `manifest_path` and its
/// recorded parameters match `config` exactly; the output directories are
/// left untouched. Otherwise the parent directories of both output paths
/// are created (if missing) and the result is `Ok(false)`.
///
/// # Errors
///
/// A manifest that exists but cannot be parsed is fatal
/// ([`DatasetError::Manifest`]); a missing manifest is not an error.
pub fn check<P: AsRef<Path>>(
    manifest_path: P,
    train_path: P,
    test_path: P,
    config: &GeneratorConfig,
) -> Result<bool> {
    let manifest_path = manifest_path.as_ref();
    if manifest_path.exists() {
        let contents = fs::read_to_string(manifest_path)?;
        let manifest: DatasetManifest = serde_json::from_str(&contents)
            .map_err(|e| DatasetError::manifest(format!("{}: {}", manifest_path.display(), e)))?;
        if manifest.matches(config) {
            log::info!(
                "dataset already generated for {} clients / {} labels",
                manifest.num_clients,
                manifest.num_labels
            );
            return Ok(true);
        }
    }

    for output in [train_path.as_ref(), test_path.as_ref()] {
        if let Some(dir) = output.parent() {
            if !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }
    }

    Ok(false)
}

/// Write the manifest and both shard packages as JSON.
pub fn save_dataset<T: Serialize, P: AsRef<Path>>(
    manifest_path: P,
    train_path: P,
    test_path: P,
    manifest: &DatasetManifest,
    train: &DatasetPackage<T>,
    test: &DatasetPackage<T>,
) -> Result<()> {
    write_json(train_path.as_ref(), train)?;
    println!(
        "  Train shards: {} [{} clients, {} samples]",
        train_path.as_ref().display(),
        train.clients.len(),
        train.total_samples()
    );

    write_json(test_path.as_ref(), test)?;
    println!(
        "  Test shards:  {} [{} clients, {} samples]",
        test_path.as_ref().display(),
        test.clients.len(),
        test.total_samples()
    );

    write_json(manifest_path.as_ref(), manifest)?;
    println!("  Manifest:     {}", manifest_path.as_ref().display());

    Ok(())
}

fn write_json<V: Serialize>(path: &Path, value: &V) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}
