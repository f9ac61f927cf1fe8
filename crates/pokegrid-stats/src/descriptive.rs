use serde::Serialize;

/// Descriptive statistics summarizing a dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DescriptiveStats {
    /// Number of values in the dataset.
    pub count: usize,
    pub min: f64,
    pub max: f64,
    /// The arithmetic mean of the dataset.
    pub mean: f64,
    /// The median, averaging the two middle values for even counts.
    pub median: f64,
    /// The population variance of the dataset.
    pub variance: f64,
    pub std_dev: f64,
}

impl DescriptiveStats {
    /// Computes descriptive statistics from unsorted values.
    ///
    /// Returns `None` if the dataset is empty. NaN values are skipped.
    ///
    /// # Examples
    ///
    /// ```
    /// # use pokegrid_stats::descriptive::DescriptiveStats;
    /// let values = [5.0, 2.0, 4.0, 1.0, 3.0, f64::NAN];
    /// let stats = DescriptiveStats::new(values).unwrap();
    /// assert_eq!(stats.count, 5);
    /// assert_eq!(stats.min, 1.0);
    /// assert_eq!(stats.max, 5.0);
    /// assert_eq!(stats.median, 3.0);
    /// ```
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut values = values
            .into_iter()
            .filter(|v| !v.is_nan())
            .collect::<Vec<_>>();
        values.sort_by(f64::total_cmp);
        Self::from_sorted(&values)
    }

    /// Computes descriptive statistics from pre-sorted values.
    ///
    /// # Panics
    ///
    /// Panics if `sorted_values` is not sorted in ascending order.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_sorted(sorted_values: &[f64]) -> Option<Self> {
        assert!(
            sorted_values.is_sorted_by(|a, b| a <= b),
            "values must be sorted in ascending order"
        );

        let min = *sorted_values.first()?;
        let max = *sorted_values.last()?;
        let count = sorted_values.len();
        let n = count as f64;
        let mean = sorted_values.iter().sum::<f64>() / n;
        let mid = count / 2;
        let median = if count % 2 == 0 {
            f64::midpoint(sorted_values[mid - 1], sorted_values[mid])
        } else {
            sorted_values[mid]
        };
        let variance = sorted_values
            .iter()
            .map(|v| (v - mean).powi(2))
            .sum::<f64>()
            / n;

        Some(Self {
            count,
            min,
            max,
            mean,
            median,
            variance,
            std_dev: variance.sqrt(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-12;

    #[test]
    fn test_empty_dataset() {
        assert!(DescriptiveStats::new([]).is_none());
        assert!(DescriptiveStats::new([f64::NAN]).is_none());
    }

    #[test]
    fn test_even_count_median() {
        let stats = DescriptiveStats::new([4.0, 1.0, 3.0, 2.0]).unwrap();
        assert!((stats.median - 2.5).abs() < EPSILON);
        assert!((stats.mean - 2.5).abs() < EPSILON);
        assert!((stats.variance - 1.25).abs() < EPSILON);
    }

    #[test]
    fn test_single_value() {
        let stats = DescriptiveStats::new([7.0]).unwrap();
        assert_eq!(stats.count, 1);
        assert!((stats.median - 7.0).abs() < EPSILON);
        assert!(stats.std_dev.abs() < EPSILON);
    }
}
