/// A simple statistics module with utility functions over annual series.
use statrs::statistics::{Data, OrderStatistics};

/// Fractional quantile (tau in [0, 1]) with linear interpolation between
/// order statistics. Used for the 0.4% / 99.6% design conditions, which a
/// whole-percent percentile cannot express.
pub(crate) fn quantile(numbers: &[f64], tau: f64) -> f64 {
    let numbers = numbers.to_vec();
    let mut data = Data::new(numbers);

    data.quantile(tau)
}
