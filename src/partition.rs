//! Label-pool partitioning across simulated clients.
//!
//! This is the core of the generator: it distributes per-label sample
//! pools over a fixed set of clients according to the configured
//! heterogeneity regime.
//!
//! # Distribution regimes
//!
//! | Regime | Eligibility | Recipients per label | Slice sizes |
//! |--------|-------------|----------------------|-------------|
//! | IID | every client | all clients | random, floored |
//! | Non-IID (quota) | first `n/L*c` clients with quota left | all eligible, random order | random, floored |
//! | Non-IID (real-world) | every client with quota left | random count in `[1, eligible)` | random, floored |
//!
//! Every slice size is drawn from `[max(pool/recipients/10, least_samples),
//! pool/recipients)`; the final recipient takes the remainder so the label's
//! pool is conserved exactly.
//!
//! # Example
//!
//! ```
//! use fedshard::config::GeneratorConfig;
//! use fedshard::partition::partition;
//!
//! let config = GeneratorConfig::new(2, 2).with_seed(42);
//! let pools: Vec<Vec<u32>> = vec![(0..200).collect(), (200..400).collect()];
//!
//! let mut rng = config.rng();
//! let parts = partition(pools, &config, &mut rng).unwrap();
//!
//! // Every client holds as many labels as samples.
//! for (x, y) in parts.x.iter().zip(&parts.y) {
//!     assert_eq!(x.len(), y.len());
//! }
//! ```

use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::GeneratorConfig;
use crate::error::{DatasetError, Result};

/// Per-client label statistic: ordered `(label, count)` pairs recording
/// how many samples of each label a client received.
pub type LabelStatistic = Vec<(u32, usize)>;

/// Client assignments produced by [`partition`].
///
/// For every client `i`, `x[i]` and `y[i]` are parallel sequences of
/// sample payloads and label values; `statistic[i]` records the slice
/// sizes the client received per label.
#[derive(Debug, Clone, PartialEq)]
pub struct Partitioned<T> {
    /// Per-client sample payloads.
    pub x: Vec<Vec<T>>,

    /// Per-client label values, parallel to `x`.
    pub y: Vec<Vec<u32>>,

    /// Per-client `(label, count)` bookkeeping.
    pub statistic: Vec<LabelStatistic>,

    /// Original pool size per label, captured before distribution.
    pub pool_sizes: Vec<usize>,
}

impl<T> Partitioned<T> {
    /// Number of clients.
    pub fn num_clients(&self) -> usize {
        self.x.len()
    }

    /// Total number of samples across all clients.
    pub fn total_samples(&self) -> usize {
        self.y.iter().map(Vec::len).sum()
    }

    /// Build the diagnostic per-client report.
    pub fn summary(&self) -> PartitionSummary {
        let clients = self
            .statistic
            .iter()
            .enumerate()
            .map(|(index, stat)| ClientSummary {
                index,
                samples: stat.iter().map(|&(_, count)| count).sum(),
                labels: stat.iter().map(|&(label, _)| label).collect(),
                label_counts: stat.clone(),
            })
            .collect();

        PartitionSummary {
            pool_sizes: self.pool_sizes.clone(),
            clients,
        }
    }
}

/// Distribute label pools across clients.
///
/// Consumes `pools` (one ordered sample sequence per label index) and
/// returns the per-client assignment. The caller supplies the RNG so
/// runs are reproducible under a fixed seed.
///
/// # Errors
///
/// - the number of pools does not match `num_labels`
/// - no client is eligible for a label (quota exhausted)
/// - a real-world draw has fewer than 2 eligible clients
/// - a pool is too small to give every recipient the minimum slice
pub fn partition<T, R: Rng>(
    pools: Vec<Vec<T>>,
    config: &GeneratorConfig,
    rng: &mut R,
) -> Result<Partitioned<T>> {
    let p = &config.partition;
    if pools.len() != p.num_labels {
        return Err(DatasetError::partition(format!(
            "expected {} label pools, got {}",
            p.num_labels,
            pools.len()
        )));
    }

    let pool_sizes: Vec<usize> = pools.iter().map(Vec::len).collect();
    let least_samples = config.split.least_samples();
    let class_per_client = p.effective_class_per_client();

    let mut x: Vec<Vec<T>> = (0..p.num_clients).map(|_| Vec::new()).collect();
    let mut y: Vec<Vec<u32>> = vec![Vec::new(); p.num_clients];
    let mut statistic: Vec<LabelStatistic> = vec![Vec::new(); p.num_clients];
    let mut quota = vec![class_per_client; p.num_clients];

    for (label, pool) in pools.into_iter().enumerate() {
        let mut eligible: Vec<usize> = (0..p.num_clients).filter(|&c| quota[c] > 0).collect();

        if p.non_iid && !p.real_world {
            eligible.truncate(p.eligible_cap());
        }

        if eligible.is_empty() {
            return Err(DatasetError::partition(format!(
                "no eligible clients remain for label {}; every client's \
                 label quota ({} classes) is exhausted",
                label, class_per_client
            )));
        }

        let recipients = if p.non_iid && p.real_world {
            if eligible.len() <= 1 {
                return Err(DatasetError::partition(format!(
                    "real-world distribution for label {} needs at least 2 \
                     eligible clients, found {}",
                    label,
                    eligible.len()
                )));
            }
            rng.gen_range(1..eligible.len())
        } else {
            eligible.len()
        };

        let sizes = draw_slice_sizes(pool.len(), recipients, least_samples, label, rng)?;

        let chosen = if p.non_iid {
            // Clients receive the label in draw order, not client order.
            eligible.shuffle(rng);
            eligible.truncate(recipients);
            eligible
        } else {
            eligible
        };

        log::debug!(
            "label {}: {} samples over {} clients {:?}",
            label,
            sizes.iter().sum::<usize>(),
            recipients,
            sizes
        );

        let mut samples = pool.into_iter();
        for (&client, &size) in chosen.iter().zip(&sizes) {
            x[client].extend(samples.by_ref().take(size));
            y[client].extend(std::iter::repeat(label as u32).take(size));
            statistic[client].push((label as u32, size));
            quota[client] -= 1;
        }
    }

    Ok(Partitioned {
        x,
        y,
        statistic,
        pool_sizes,
    })
}

/// Draw the per-recipient slice sizes for one label.
///
/// The first `recipients - 1` sizes are uniform in
/// `[max(total/recipients/10, least_samples), total/recipients)`; the last
/// recipient takes the remainder so the sizes sum to `total` exactly.
/// A single recipient takes the whole pool.
fn draw_slice_sizes<R: Rng>(
    total: usize,
    recipients: usize,
    least_samples: usize,
    label: usize,
    rng: &mut R,
) -> Result<Vec<usize>> {
    let mut sizes = Vec::with_capacity(recipients);

    if recipients > 1 {
        let num_per = total as f64 / recipients as f64;
        let low = f64::max(num_per / 10.0, least_samples as f64) as u64;
        let high = num_per as u64;
        if low >= high {
            return Err(DatasetError::partition(format!(
                "label {}: pool of {} samples cannot give {} clients at \
                 least {} samples each",
                label, total, recipients, low
            )));
        }
        for _ in 0..recipients - 1 {
            sizes.push(rng.gen_range(low..high) as usize);
        }
    }

    let used: usize = sizes.iter().sum();
    sizes.push(total - used);
    Ok(sizes)
}

/// Per-client digest used by [`PartitionSummary`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSummary {
    /// Client index.
    pub index: usize,

    /// Total samples the client received.
    pub samples: usize,

    /// Labels held by the client, in assignment order.
    pub labels: Vec<u32>,

    /// `(label, count)` pairs, in assignment order.
    pub label_counts: LabelStatistic,
}

/// Diagnostic report of a partitioning run.
///
/// Rendering is deterministic for a fixed assignment, so seeded runs can
/// be snapshot-tested against the report text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionSummary {
    /// Original pool size per label.
    pub pool_sizes: Vec<usize>,

    /// One digest per client.
    pub clients: Vec<ClientSummary>,
}

impl fmt::Display for PartitionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Original number of samples per label: {:?}",
            self.pool_sizes
        )?;
        writeln!(f)?;
        for client in &self.clients {
            writeln!(
                f,
                "Client {:3}  size: {:6}  labels: {:?}",
                client.index, client.samples, client.labels
            )?;
            writeln!(
                f,
                "Client {:3}  samples per label: {:?}",
                client.index, client.label_counts
            )?;
            writeln!(f, "{}", "-".repeat(50))?;
        }
        Ok(())
    }
}
