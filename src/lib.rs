//! Fedshard
//!
//! Client-partitioned dataset generation for federated-learning
//! experiments.
//!
//! # Overview
//!
//! This library partitions a labeled dataset across a fixed number of
//! simulated clients, splits each client's shard into train/test subsets
//! and persists the result with a manifest. It supports three
//! distribution regimes:
//!
//! - **IID**: every client receives a slice of every label
//! - **Non-IID (quota)**: each client holds at most `class_per_client`
//!   distinct labels
//! - **Non-IID (real-world)**: each label reaches a random subset of
//!   clients, modeling realistic data heterogeneity
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                    DatasetGenerator                        │
//! ├────────────────────────────────────────────────────────────┤
//! │  config/     - Generation parameters, validation, TOML/JSON│
//! │  export/     - Precondition check, manifest, persistence   │
//! │  partition/  - Label pools → per-client assignments        │
//! │  split/      - Stratified per-client train/test splits     │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! Sample payloads are opaque to the library: the pipeline is generic
//! over the payload type, which only needs `serde::Serialize` at
//! persistence time. Dataset loading is the caller's concern.
//!
//! # Example
//!
//! ```
//! use fedshard::prelude::*;
//!
//! let config = GeneratorConfig::new(2, 2).with_seed(42);
//! let pools: Vec<Vec<u32>> = vec![(0..400).collect(), (400..800).collect()];
//!
//! let mut rng = config.rng();
//! let parts = partition(pools, &config, &mut rng).unwrap();
//! let (train, test) = split(parts.x, parts.y, &config, &mut rng).unwrap();
//!
//! assert_eq!(train.total_samples() + test.total_samples(), 800);
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod partition;
pub mod pipeline;
pub mod prelude;
pub mod split;

// Re-exports - Configuration
pub use config::{GeneratorConfig, PartitionConfig, SplitConfig};

// Re-exports - Pipeline
pub use pipeline::{DatasetGenerator, GenerationOutcome};

// Re-exports - Stages
pub use export::{check, save_dataset, DatasetManifest};
pub use partition::{partition, LabelStatistic, PartitionSummary, Partitioned};
pub use split::{client_name, split, DatasetPackage, Shard, SplitSummary};

// Re-exports - Error handling
pub use error::{DatasetError, Result};
