//! Aggregate report formatting
//!
//! Pure formatting of the cross-batch summary; no side effects.

use crate::offset_pipeline::stats::{BatchSummary, StatAggregate};

/// Formats the aggregate summary block, values rounded to one decimal.
pub fn format_summary(summary: &BatchSummary) -> Vec<String> {
    vec![
        "===== Aggregate statistics across all files =====".to_string(),
        format_line("Median", &summary.median),
        format_line("Mean  ", &summary.mean),
        format_line("StdDev", &summary.std_dev),
        "=================================================".to_string(),
    ]
}

fn format_line(label: &str, agg: &StatAggregate) -> String {
    format!(
        "   {label} : {:.1} → {:.1} (Min {:.1}/{:.1}, Max {:.1}/{:.1})",
        agg.mean_before, agg.mean_after, agg.min_before, agg.min_after, agg.max_before,
        agg.max_after
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::offset_pipeline::stats::{BatchSummary, FrameStatistics};

    #[test]
    fn formats_aggregate_block() {
        let frame = |m: f64| FrameStatistics {
            median: m,
            mean: m,
            std_dev: 0.0,
        };
        let stats = vec![
            (frame(100.0), frame(142.0)),
            (frame(300.0), frame(342.0)),
        ];
        let lines = format_summary(&BatchSummary::from_stats(&stats));

        assert_eq!(lines.len(), 5);
        assert!(lines[1].contains("Median : 200.0 → 242.0"));
        assert!(lines[1].contains("(Min 100.0/142.0, Max 300.0/342.0)"));
        assert!(lines[3].contains("StdDev : 0.0 → 0.0"));
    }
}
