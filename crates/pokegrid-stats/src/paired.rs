//! Paired observations, e.g. a strategy's suggested score against the score
//! the pick actually earned.

use serde::Serialize;

use crate::descriptive::DescriptiveStats;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairedStats {
    /// Statistics of `actual - predicted` over every pair.
    pub delta: DescriptiveStats,
    /// Pearson correlation between predicted and actual values.
    ///
    /// `None` when either side has zero variance.
    pub correlation: Option<f64>,
}

impl PairedStats {
    /// Returns `None` if there are no pairs. Pairs with a NaN side are skipped.
    ///
    /// ```
    /// # use pokegrid_stats::paired::PairedStats;
    /// let stats = PairedStats::new([(0.2, 0.3), (0.4, 0.5), (0.6, 0.7)]).unwrap();
    /// assert!((stats.delta.mean - 0.1).abs() < 1e-9);
    /// assert!((stats.correlation.unwrap() - 1.0).abs() < 1e-9);
    /// ```
    #[must_use]
    pub fn new<I>(pairs: I) -> Option<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let pairs: Vec<_> = pairs
            .into_iter()
            .filter(|(p, a)| !p.is_nan() && !a.is_nan())
            .collect();
        let delta = DescriptiveStats::new(pairs.iter().map(|(p, a)| a - p))?;
        Some(Self {
            delta,
            correlation: pearson(&pairs),
        })
    }
}

#[expect(clippy::cast_precision_loss)]
fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    let n = pairs.len() as f64;
    let mean_p = pairs.iter().map(|(p, _)| p).sum::<f64>() / n;
    let mean_a = pairs.iter().map(|(_, a)| a).sum::<f64>() / n;
    let (mut cov, mut var_p, mut var_a) = (0.0, 0.0, 0.0);
    for (p, a) in pairs {
        let (dp, da) = (p - mean_p, a - mean_a);
        cov += dp * da;
        var_p += dp * dp;
        var_a += da * da;
    }
    if var_p <= 0.0 || var_a <= 0.0 {
        return None;
    }
    Some(cov / (var_p.sqrt() * var_a.sqrt()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anticorrelated() {
        let stats = PairedStats::new([(1.0, 3.0), (2.0, 2.0), (3.0, 1.0)]).unwrap();
        assert!((stats.correlation.unwrap() + 1.0).abs() < 1e-9);
        assert!(stats.delta.mean.abs() < 1e-9);
    }

    #[test]
    fn test_constant_side_has_no_correlation() {
        let stats = PairedStats::new([(0.5, 1.0), (0.5, 2.0)]).unwrap();
        assert_eq!(stats.correlation, None);
        assert_eq!(stats.delta.count, 2);
    }

    #[test]
    fn test_no_pairs() {
        assert!(PairedStats::new([]).is_none());
        assert!(PairedStats::new([(f64::NAN, 1.0)]).is_none());
    }

    #[test]
    fn test_serializes_for_reports() {
        let stats = PairedStats::new([(0.0, 1.0)]).unwrap();
        let value = serde_json::to_value(&stats).unwrap();
        assert_eq!(value["delta"]["count"], 1);
        assert!(value["correlation"].is_null());
    }
}
