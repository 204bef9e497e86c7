//! Per-client train/test splitting.
//!
//! Takes the partitioned client assignments and divides every client's
//! samples into a train and a test shard. Splits are stratified by label
//! whenever every label class the client holds has at least 2 samples;
//! otherwise the client falls back to a plain shuffled split, since
//! stratification cannot place a singleton class on both sides.
//!
//! # Example
//!
//! ```
//! use fedshard::config::GeneratorConfig;
//! use fedshard::partition::partition;
//! use fedshard::split::split;
//!
//! let config = GeneratorConfig::new(2, 2).with_seed(42);
//! let pools: Vec<Vec<u32>> = vec![(0..400).collect(), (400..800).collect()];
//!
//! let mut rng = config.rng();
//! let parts = partition(pools, &config, &mut rng).unwrap();
//! let (train, test) = split(parts.x, parts.y, &config, &mut rng).unwrap();
//!
//! assert_eq!(train.clients, vec!["f_00000", "f_00001"]);
//! assert_eq!(train.total_samples() + test.total_samples(), 800);
//! ```

use std::collections::BTreeMap;
use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::GeneratorConfig;
use crate::error::{DatasetError, Result};

/// One client's sample set for a single side of the split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shard<T> {
    /// Sample payloads.
    pub x: Vec<T>,

    /// Label values, parallel to `x`.
    pub y: Vec<u32>,
}

impl<T> Shard<T> {
    /// Number of samples in the shard.
    pub fn len(&self) -> usize {
        self.y.len()
    }

    /// Returns true if the shard holds no samples.
    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }
}

/// A complete train or test dataset across all clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetPackage<T> {
    /// Client names in generation order.
    pub clients: Vec<String>,

    /// Client name to shard mapping.
    pub client_data: BTreeMap<String, Shard<T>>,

    /// Per-client sample counts, parallel to `clients`.
    pub num_samples: Vec<usize>,
}

impl<T> DatasetPackage<T> {
    /// Create an empty package.
    pub fn new() -> Self {
        Self {
            clients: Vec::new(),
            client_data: BTreeMap::new(),
            num_samples: Vec::new(),
        }
    }

    /// Append a client's shard, keeping all three fields in sync.
    pub fn push_client(&mut self, name: String, shard: Shard<T>) {
        self.num_samples.push(shard.len());
        self.clients.push(name.clone());
        self.client_data.insert(name, shard);
    }

    /// Total samples across all clients.
    pub fn total_samples(&self) -> usize {
        self.num_samples.iter().sum()
    }
}

impl<T> Default for DatasetPackage<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Zero-padded client name for an index: `f_00000`, `f_00001`, …
pub fn client_name(index: usize) -> String {
    format!("f_{:05}", index)
}

/// Split every client's samples into train and test shards.
///
/// Consumes the per-client `x`/`y` assignments from partitioning and
/// returns `(train, test)` packages. The same RNG drives shuffling so a
/// seeded pipeline run is fully reproducible.
///
/// # Errors
///
/// Returns [`DatasetError::EmptyShard`] for a client with no samples and
/// [`DatasetError::TooFewSamples`] for a client whose shard cannot yield
/// non-empty train and test sides.
pub fn split<T, R: Rng>(
    x: Vec<Vec<T>>,
    y: Vec<Vec<u32>>,
    config: &GeneratorConfig,
    rng: &mut R,
) -> Result<(DatasetPackage<T>, DatasetPackage<T>)> {
    let num_clients = config.partition.num_clients;
    if x.len() != num_clients || y.len() != num_clients {
        return Err(DatasetError::partition(format!(
            "expected assignments for {} clients, got {} payload and {} label lists",
            num_clients,
            x.len(),
            y.len()
        )));
    }

    let train_size = config.split.train_size;
    let mut train = DatasetPackage::new();
    let mut test = DatasetPackage::new();

    for (index, (xi, yi)) in x.into_iter().zip(y).enumerate() {
        let name = client_name(index);
        let total = yi.len();
        if total == 0 {
            return Err(DatasetError::EmptyShard(name));
        }
        if total < 2 {
            return Err(DatasetError::TooFewSamples {
                client: name,
                samples: total,
            });
        }

        let (train_idx, test_idx) = split_indices(&yi, train_size, rng);

        let mut slots: Vec<Option<(T, u32)>> = xi.into_iter().zip(yi).map(Some).collect();
        let train_shard = gather(&mut slots, &train_idx);
        let test_shard = gather(&mut slots, &test_idx);

        train.push_client(name.clone(), train_shard);
        test.push_client(name, test_shard);
    }

    Ok((train, test))
}

/// Pick shuffled train/test index sets for one client.
///
/// Stratifies by label when every class present has at least 2 samples.
fn split_indices<R: Rng>(labels: &[u32], train_size: f64, rng: &mut R) -> (Vec<usize>, Vec<usize>) {
    let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
    for &label in labels {
        *counts.entry(label).or_insert(0) += 1;
    }

    let mut train_idx = Vec::new();
    let mut test_idx = Vec::new();

    if counts.values().all(|&count| count > 1) {
        for &label in counts.keys() {
            let mut class_idx: Vec<usize> = (0..labels.len())
                .filter(|&i| labels[i] == label)
                .collect();
            class_idx.shuffle(rng);
            let cut = split_point(class_idx.len(), train_size);
            train_idx.extend_from_slice(&class_idx[..cut]);
            test_idx.extend_from_slice(&class_idx[cut..]);
        }
        train_idx.shuffle(rng);
        test_idx.shuffle(rng);
    } else {
        // Singleton class: stratification is infeasible, fall back to a
        // plain shuffled split.
        let mut indices: Vec<usize> = (0..labels.len()).collect();
        indices.shuffle(rng);
        let cut = split_point(indices.len(), train_size);
        test_idx = indices.split_off(cut);
        train_idx = indices;
    }

    (train_idx, test_idx)
}

/// Rounded cut point, clamped so both sides stay non-empty.
fn split_point(total: usize, train_size: f64) -> usize {
    ((total as f64 * train_size).round() as usize).clamp(1, total - 1)
}

/// Move the selected samples out of their slots into a shard.
fn gather<T>(slots: &mut [Option<(T, u32)>], indices: &[usize]) -> Shard<T> {
    let mut x = Vec::with_capacity(indices.len());
    let mut y = Vec::with_capacity(indices.len());
    for &i in indices {
        if let Some((sample, label)) = slots[i].take() {
            x.push(sample);
            y.push(label);
        }
    }
    debug_assert_eq!(x.len(), indices.len());
    Shard { x, y }
}

/// Summary of a completed split, reported by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitSummary {
    /// Combined train + test sample count.
    pub total_samples: usize,

    /// Per-client train counts.
    pub train_samples: Vec<usize>,

    /// Per-client test counts.
    pub test_samples: Vec<usize>,
}

impl SplitSummary {
    /// Build the summary from the two packages.
    pub fn new<T>(train: &DatasetPackage<T>, test: &DatasetPackage<T>) -> Self {
        Self {
            total_samples: train.total_samples() + test.total_samples(),
            train_samples: train.num_samples.clone(),
            test_samples: test.num_samples.clone(),
        }
    }
}

impl fmt::Display for SplitSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total number of samples: {}", self.total_samples)?;
        writeln!(f, "Train samples per client: {:?}", self.train_samples)?;
        writeln!(f, "Test samples per client:  {:?}", self.test_samples)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;

    fn seeded_rng() -> rand_chacha::ChaCha8Rng {
        GeneratorConfig::new(1, 1).with_seed(42).rng()
    }

    #[test]
    fn test_client_name_padding() {
        assert_eq!(client_name(0), "f_00000");
        assert_eq!(client_name(7), "f_00007");
        assert_eq!(client_name(12345), "f_12345");
    }

    #[test]
    fn test_split_point_rounds_and_clamps() {
        assert_eq!(split_point(100, 0.75), 75);
        assert_eq!(split_point(10, 0.75), 8); // 7.5 rounds up
        assert_eq!(split_point(2, 0.99), 1); // clamp keeps test non-empty
        assert_eq!(split_point(2, 0.01), 1); // clamp keeps train non-empty
    }

    #[test]
    fn test_stratified_split_preserves_class_balance() {
        // 40 samples of label 0, 20 of label 1.
        let labels: Vec<u32> = std::iter::repeat(0)
            .take(40)
            .chain(std::iter::repeat(1).take(20))
            .collect();

        let mut rng = seeded_rng();
        let (train_idx, test_idx) = split_indices(&labels, 0.75, &mut rng);

        assert_eq!(train_idx.len() + test_idx.len(), 60);

        let train_zeros = train_idx.iter().filter(|&&i| labels[i] == 0).count();
        let train_ones = train_idx.iter().filter(|&&i| labels[i] == 1).count();
        assert_eq!(train_zeros, 30); // 40 * 0.75
        assert_eq!(train_ones, 15); // 20 * 0.75
    }

    #[test]
    fn test_singleton_class_falls_back_to_unstratified() {
        // One sample of label 3 among four of label 0.
        let labels = vec![0, 0, 0, 0, 3];

        let mut rng = seeded_rng();
        let (train_idx, test_idx) = split_indices(&labels, 0.75, &mut rng);

        // round(5 * 0.75) = 4 train, 1 test, regardless of class.
        assert_eq!(train_idx.len(), 4);
        assert_eq!(test_idx.len(), 1);
    }

    #[test]
    fn test_split_shapes_and_conservation() {
        let config = GeneratorConfig::new(2, 1).with_seed(8);
        let x = vec![(0..40u32).collect::<Vec<_>>(), (40..100u32).collect()];
        let y = vec![vec![0u32; 40], vec![0u32; 60]];

        let mut rng = config.rng();
        let (train, test) = split(x, y, &config, &mut rng).unwrap();

        for name in ["f_00000", "f_00001"] {
            let tr = &train.client_data[name];
            let te = &test.client_data[name];
            assert_eq!(tr.x.len(), tr.y.len());
            assert_eq!(te.x.len(), te.y.len());
        }
        assert_eq!(train.total_samples() + test.total_samples(), 100);
        assert_eq!(train.num_samples, vec![30, 45]);
        assert_eq!(test.num_samples, vec![10, 15]);
    }

    #[test]
    fn test_split_preserves_payload_label_pairing() {
        // Payload i carries label i % 2, with 10 samples per class.
        let config = GeneratorConfig::new(1, 2).with_seed(3);
        let x = vec![(0..20u32).collect::<Vec<_>>()];
        let y = vec![(0..20u32).map(|i| i % 2).collect::<Vec<_>>()];

        let mut rng = config.rng();
        let (train, test) = split(x, y, &config, &mut rng).unwrap();

        for shard in [&train.client_data["f_00000"], &test.client_data["f_00000"]] {
            for (sample, label) in shard.x.iter().zip(&shard.y) {
                assert_eq!(sample % 2, *label);
            }
        }
    }

    #[test]
    fn test_empty_client_is_an_error() {
        let config = GeneratorConfig::new(2, 1).with_seed(0);
        let x: Vec<Vec<u32>> = vec![(0..50).collect(), Vec::new()];
        let y = vec![vec![0u32; 50], Vec::new()];

        let mut rng = config.rng();
        let err = split(x, y, &config, &mut rng).unwrap_err();
        assert!(matches!(err, DatasetError::EmptyShard(ref c) if c == "f_00001"));
    }

    #[test]
    fn test_single_sample_client_is_an_error() {
        let config = GeneratorConfig::new(1, 1).with_seed(0);
        let x = vec![vec![9u32]];
        let y = vec![vec![0u32]];

        let mut rng = config.rng();
        let err = split(x, y, &config, &mut rng).unwrap_err();
        assert!(matches!(err, DatasetError::TooFewSamples { samples: 1, .. }));
    }

    #[test]
    fn test_summary_totals() {
        let config = GeneratorConfig::new(1, 1).with_seed(4);
        let x = vec![(0..80u32).collect::<Vec<_>>()];
        let y = vec![vec![0u32; 80]];

        let mut rng = config.rng();
        let (train, test) = split(x, y, &config, &mut rng).unwrap();
        let summary = SplitSummary::new(&train, &test);

        assert_eq!(summary.total_samples, 80);
        assert_eq!(summary.train_samples, vec![60]);
        assert_eq!(summary.test_samples, vec![20]);
        assert!(summary.to_string().contains("Total number of samples: 80"));
    }
}
