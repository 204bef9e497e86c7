//! Prelude module for convenient imports.
//!
//! # Usage
//!
//! ```
//! use fedshard::prelude::*;
//!
//! let config = GeneratorConfig::new(20, 10).with_seed(42);
//! assert!(config.validate().is_ok());
//! ```

// ============================================================================
// Configuration
// ============================================================================

pub use crate::config::{GeneratorConfig, PartitionConfig, SplitConfig};

// ============================================================================
// Pipeline
// ============================================================================

pub use crate::pipeline::{DatasetGenerator, GenerationOutcome};

// ============================================================================
// Partitioning
// ============================================================================

pub use crate::partition::{partition, ClientSummary, LabelStatistic, PartitionSummary, Partitioned};

// ============================================================================
// Splitting
// ============================================================================

pub use crate::split::{client_name, split, DatasetPackage, Shard, SplitSummary};

// ============================================================================
// Packaging & Persistence
// ============================================================================

pub use crate::export::{check, save_dataset, DatasetManifest};

// ============================================================================
// Error handling
// ============================================================================

pub use crate::error::{DatasetError, Result};
