//! Dataset generation pipeline.
//!
//! Connects the stages end to end:
//!
//! ```text
//! Label pools ──► check ──► partition ──► split ──► package ──► JSON files
//!                  │
//!                  └── matching manifest found: skip regeneration
//! ```
//!
//! Each stage consumes its input by move and hands new owned structures
//! to the next stage, so peak memory stays bounded by the largest single
//! intermediate. The pipeline runs to completion or fails fast on the
//! first invalid input; nothing is retried.
//!
//! # Example
//!
//! ```ignore
//! use fedshard::prelude::*;
//!
//! let config = GeneratorConfig::new(20, 10).with_seed(42);
//! let generator = DatasetGenerator::new(
//!     config,
//!     "out/config.json",
//!     "out/train/train.json",
//!     "out/test/test.json",
//! )?;
//!
//! let pools = load_label_pools()?; // caller-supplied loader
//! match generator.generate(pools)? {
//!     GenerationOutcome::Skipped => println!("nothing to do"),
//!     GenerationOutcome::Generated(manifest) => {
//!         println!("{} samples written", manifest.total_samples)
//!     }
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::GeneratorConfig;
use crate::error::{DatasetError, Result};
use crate::export::{self, DatasetManifest};
use crate::partition::{partition, Partitioned};
use crate::split::{split, SplitSummary};

/// Result of a [`DatasetGenerator::generate`] run.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    /// A matching manifest already existed; nothing was written.
    Skipped,

    /// The dataset was generated and persisted.
    Generated(DatasetManifest),
}

impl GenerationOutcome {
    /// True when the run was skipped by the precondition check.
    pub fn is_skipped(&self) -> bool {
        matches!(self, GenerationOutcome::Skipped)
    }
}

/// Orchestrates check, partition, split and persistence for one dataset.
#[derive(Debug, Clone)]
pub struct DatasetGenerator {
    config: GeneratorConfig,
    manifest_path: PathBuf,
    train_path: PathBuf,
    test_path: PathBuf,
}

impl DatasetGenerator {
    /// Create a generator for the given configuration and output paths.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Config`] when the configuration is invalid.
    pub fn new<P: AsRef<Path>>(
        config: GeneratorConfig,
        manifest_path: P,
        train_path: P,
        test_path: P,
    ) -> Result<Self> {
        config.validate().map_err(DatasetError::Config)?;
        Ok(Self {
            config,
            manifest_path: manifest_path.as_ref().to_path_buf(),
            train_path: train_path.as_ref().to_path_buf(),
            test_path: test_path.as_ref().to_path_buf(),
        })
    }

    /// Get the generator configuration.
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Run the pipeline over the given label pools.
    ///
    /// Consumes `pools`; the caller must not retain references to
    /// pre-stage data. Prints the partition and split reports and, on
    /// success, writes manifest plus train/test shard files.
    pub fn generate<T: Serialize>(&self, pools: Vec<Vec<T>>) -> Result<GenerationOutcome> {
        if export::check(
            &self.manifest_path,
            &self.train_path,
            &self.test_path,
            &self.config,
        )? {
            println!("Dataset already generated, skipping.");
            return Ok(GenerationOutcome::Skipped);
        }

        let mut rng = self.config.rng();

        let parts = partition(pools, &self.config, &mut rng)?;
        println!("{}", parts.summary());

        let Partitioned {
            x, y, statistic, ..
        } = parts;

        let (train, test) = split(x, y, &self.config, &mut rng)?;
        println!("{}", SplitSummary::new(&train, &test));

        let manifest = DatasetManifest::build(&self.config, &train, &test, statistic);
        export::save_dataset(
            &self.manifest_path,
            &self.train_path,
            &self.test_path,
            &manifest,
            &train,
            &test,
        )?;
        println!("Dataset generation complete.");

        Ok(GenerationOutcome::Generated(manifest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_new_rejects_invalid_config() {
        let err = DatasetGenerator::new(
            GeneratorConfig::new(0, 4),
            "config.json",
            "train.json",
            "test.json",
        )
        .unwrap_err();
        assert!(matches!(err, DatasetError::Config(_)));
    }

    #[test]
    fn test_generate_then_skip() {
        let temp_dir = TempDir::new().unwrap();
        let generator = DatasetGenerator::new(
            GeneratorConfig::new(2, 2).with_seed(42),
            temp_dir.path().join("config.json"),
            temp_dir.path().join("train/train.json"),
            temp_dir.path().join("test/test.json"),
        )
        .unwrap();

        let pools = || -> Vec<Vec<u32>> { vec![(0..400).collect(), (400..800).collect()] };

        let outcome = generator.generate(pools()).unwrap();
        let manifest = match outcome {
            GenerationOutcome::Generated(m) => m,
            GenerationOutcome::Skipped => panic!("first run must generate"),
        };
        assert_eq!(manifest.total_samples, 800);

        // Identical parameters skip on the second run.
        assert!(generator.generate(pools()).unwrap().is_skipped());
    }
}
