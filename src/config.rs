//! Generator configuration management.
//!
//! This module provides unified configuration for the dataset generation
//! pipeline, with serialization support for experiment reproducibility.
//!
//! # Features
//!
//! - **Unified Configuration**: Single struct combining all pipeline stages
//! - **Serialization**: Save/load configurations to TOML or JSON
//! - **Validation**: Ensure configurations are valid before use
//! - **Reproducibility**: Injectable RNG seed for deterministic runs
//!
//! # Example
//!
//! ```
//! use fedshard::config::GeneratorConfig;
//!
//! let config = GeneratorConfig::new(20, 10).with_seed(42);
//! assert!(config.validate().is_ok());
//! ```

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Configuration for distributing label pools across clients.
///
/// Controls how many simulated clients receive data, how many label
/// classes exist, and which heterogeneity regime is simulated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionConfig {
    /// Number of simulated clients.
    pub num_clients: usize,

    /// Number of label classes in the dataset.
    pub num_labels: usize,

    /// Distribute labels non-uniformly across clients.
    #[serde(default)]
    pub non_iid: bool,

    /// Real-world skew: label-to-client assignment uses unrestricted
    /// random subset sizes instead of a fixed per-client label quota.
    /// Only meaningful together with `non_iid`.
    #[serde(default = "default_real_world")]
    pub real_world: bool,

    /// Maximum number of distinct labels per client in quota-based
    /// non-IID mode. Ignored (forced to `num_labels`) when the run is
    /// IID or real-world.
    #[serde(default = "default_class_per_client")]
    pub class_per_client: usize,
}

fn default_real_world() -> bool {
    true
}

fn default_class_per_client() -> usize {
    2
}

impl PartitionConfig {
    /// Create a partition configuration with default distribution flags.
    pub fn new(num_clients: usize, num_labels: usize) -> Self {
        Self {
            num_clients,
            num_labels,
            non_iid: false,
            real_world: true,
            class_per_client: 2,
        }
    }

    /// Effective labels-per-client quota for this configuration.
    ///
    /// IID and real-world runs make every client eligible for every label.
    pub fn effective_class_per_client(&self) -> usize {
        if !self.non_iid || self.real_world {
            self.num_labels
        } else {
            self.class_per_client
        }
    }

    /// Number of clients a label is offered to in quota-based non-IID
    /// mode, before the random recipient draw.
    pub fn eligible_cap(&self) -> usize {
        (self.num_clients as f64 / self.num_labels as f64 * self.class_per_client as f64) as usize
    }

    /// Validate the partition configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.num_clients == 0 {
            return Err("num_clients must be > 0".to_string());
        }
        if self.num_labels == 0 {
            return Err("num_labels must be > 0".to_string());
        }
        if self.non_iid && !self.real_world {
            if self.class_per_client == 0 {
                return Err("class_per_client must be > 0".to_string());
            }
            if self.class_per_client > self.num_labels {
                return Err(format!(
                    "class_per_client ({}) cannot exceed num_labels ({})",
                    self.class_per_client, self.num_labels
                ));
            }
            if self.eligible_cap() == 0 {
                return Err(format!(
                    "num_clients/num_labels*class_per_client rounds down to 0 \
                     ({} clients, {} labels, {} classes per client); no client \
                     would be eligible for any label",
                    self.num_clients, self.num_labels, self.class_per_client
                ));
            }
        }
        if self.non_iid && self.real_world && self.num_clients < 2 {
            return Err("real-world non-IID distribution requires at least 2 clients".to_string());
        }
        Ok(())
    }
}

/// Configuration for the per-client train/test split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitConfig {
    /// Fraction of each client's samples assigned to the train side.
    #[serde(default = "default_train_size")]
    pub train_size: f64,

    /// Training batch size; together with `train_size` it determines the
    /// minimum split size a client may receive for a label.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_train_size() -> f64 {
    0.75
}

fn default_batch_size() -> usize {
    16
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            train_size: 0.75,
            batch_size: 16,
        }
    }
}

impl SplitConfig {
    /// Minimum samples-per-client floor.
    ///
    /// Guarantees the test side of a minimal split still fills one batch:
    /// `batch_size / (1 - train_size)`.
    pub fn least_samples(&self) -> usize {
        (self.batch_size as f64 / (1.0 - self.train_size)) as usize
    }

    /// Validate the split configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.train_size > 0.0 && self.train_size < 1.0) {
            return Err(format!(
                "train_size must be in (0, 1), got {}",
                self.train_size
            ));
        }
        if self.batch_size == 0 {
            return Err("batch_size must be > 0".to_string());
        }
        Ok(())
    }
}

/// Complete dataset generator configuration.
///
/// Combines the partitioning and splitting parameters with an optional
/// RNG seed. Can be loaded from TOML or JSON files for experiment
/// reproducibility.
///
/// # Example TOML
///
/// ```toml
/// seed = 42
///
/// [partition]
/// num_clients = 20
/// num_labels = 10
/// non_iid = true
/// real_world = false
/// class_per_client = 2
///
/// [split]
/// train_size = 0.75
/// batch_size = 16
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// RNG seed for reproducible partitioning and splitting.
    ///
    /// When absent, the generator draws a fresh seed from OS entropy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Partitioning parameters.
    pub partition: PartitionConfig,

    /// Train/test split parameters.
    #[serde(default)]
    pub split: SplitConfig,
}

impl GeneratorConfig {
    /// Create a configuration for the given client and label counts,
    /// with default split parameters and no fixed seed.
    pub fn new(num_clients: usize, num_labels: usize) -> Self {
        Self {
            seed: None,
            partition: PartitionConfig::new(num_clients, num_labels),
            split: SplitConfig::default(),
        }
    }

    /// Set the partition configuration.
    pub fn with_partition(mut self, partition: PartitionConfig) -> Self {
        self.partition = partition;
        self
    }

    /// Set the split configuration.
    pub fn with_split(mut self, split: SplitConfig) -> Self {
        self.split = split;
        self
    }

    /// Fix the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Switch to quota-based non-IID distribution with the given
    /// labels-per-client quota.
    pub fn non_iid(mut self, class_per_client: usize) -> Self {
        self.partition.non_iid = true;
        self.partition.real_world = false;
        self.partition.class_per_client = class_per_client;
        self
    }

    /// Switch to real-world non-IID distribution.
    pub fn real_world(mut self) -> Self {
        self.partition.non_iid = true;
        self.partition.real_world = true;
        self
    }

    /// Build the random-number source for one generation run.
    pub fn rng(&self) -> ChaCha8Rng {
        self.seed
            .map_or_else(ChaCha8Rng::from_entropy, ChaCha8Rng::seed_from_u64)
    }

    /// Validate the complete configuration.
    pub fn validate(&self) -> Result<(), String> {
        self.partition
            .validate()
            .map_err(|e| format!("partition: {}", e))?;
        self.split.validate().map_err(|e| format!("split: {}", e))?;
        Ok(())
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let toml_string = toml::to_string_pretty(self)?;
        fs::write(path, toml_string)?;
        Ok(())
    }

    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        let config: GeneratorConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let json_string = serde_json::to_string_pretty(self)?;
        fs::write(path, json_string)?;
        Ok(())
    }

    /// Load configuration from a JSON file.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        let config: GeneratorConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }
}
