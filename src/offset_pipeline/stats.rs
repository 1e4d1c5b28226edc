//! Frame and batch statistics
//!
//! Per-frame median/mean/standard-deviation triples and their cross-batch
//! aggregation. The standard deviation is the population form (divide by
//! N, not N-1), matching the calibration convention for full-frame pixel
//! statistics.

/// The three statistics of one pixel grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStatistics {
    pub median: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl FrameStatistics {
    /// Computes the statistics over the full grid.
    ///
    /// The median of an even-length grid is the average of the two middle
    /// values of the sorted data.
    pub fn compute(data: &[f32]) -> Self {
        if data.is_empty() {
            return Self {
                median: 0.0,
                mean: 0.0,
                std_dev: 0.0,
            };
        }

        let n = data.len() as f64;
        let mean = data.iter().map(|&v| v as f64).sum::<f64>() / n;
        let variance = data
            .iter()
            .map(|&v| {
                let d = v as f64 - mean;
                d * d
            })
            .sum::<f64>()
            / n;

        let mut sorted = data.to_vec();
        sorted.sort_by(f32::total_cmp);
        let mid = sorted.len() / 2;
        let median = if sorted.len() % 2 == 1 {
            sorted[mid] as f64
        } else {
            (sorted[mid - 1] as f64 + sorted[mid] as f64) / 2.0
        };

        Self {
            median,
            mean,
            std_dev: variance.sqrt(),
        }
    }
}

/// Aggregate of one statistic kind across the whole batch: the average,
/// minimum, and maximum of the before and after series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatAggregate {
    pub mean_before: f64,
    pub mean_after: f64,
    pub min_before: f64,
    pub min_after: f64,
    pub max_before: f64,
    pub max_after: f64,
}

impl StatAggregate {
    fn from_pairs(pairs: &[(f64, f64)]) -> Self {
        if pairs.is_empty() {
            return Self {
                mean_before: 0.0,
                mean_after: 0.0,
                min_before: 0.0,
                min_after: 0.0,
                max_before: 0.0,
                max_after: 0.0,
            };
        }
        let n = pairs.len() as f64;
        Self {
            mean_before: pairs.iter().map(|(b, _)| b).sum::<f64>() / n,
            mean_after: pairs.iter().map(|(_, a)| a).sum::<f64>() / n,
            min_before: pairs.iter().map(|(b, _)| *b).fold(f64::INFINITY, f64::min),
            min_after: pairs.iter().map(|(_, a)| *a).fold(f64::INFINITY, f64::min),
            max_before: pairs
                .iter()
                .map(|(b, _)| *b)
                .fold(f64::NEG_INFINITY, f64::max),
            max_after: pairs
                .iter()
                .map(|(_, a)| *a)
                .fold(f64::NEG_INFINITY, f64::max),
        }
    }
}

/// Cross-batch aggregates of all per-frame statistics. Built once after
/// the correction loop finishes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchSummary {
    pub median: StatAggregate,
    pub mean: StatAggregate,
    pub std_dev: StatAggregate,
}

impl BatchSummary {
    /// Reduces the ordered (before, after) statistic pairs of a batch.
    pub fn from_stats(stats: &[(FrameStatistics, FrameStatistics)]) -> Self {
        let pairs =
            |f: fn(&FrameStatistics) -> f64| -> Vec<(f64, f64)> {
                stats.iter().map(|(b, a)| (f(b), f(a))).collect()
            };
        Self {
            median: StatAggregate::from_pairs(&pairs(|s| s.median)),
            mean: StatAggregate::from_pairs(&pairs(|s| s.mean)),
            std_dev: StatAggregate::from_pairs(&pairs(|s| s.std_dev)),
        }
    }
}
