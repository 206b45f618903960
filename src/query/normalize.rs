//! Series normalization: scale a yearly frequency series so its smallest
//! non-zero sample is 1.
//!
//! Zeros mean "no data" rather than "rarest", so they are skipped when picking
//! the reference value but still scaled (and stay 0) in the output.

use crate::error::{QueryError, QueryResult};

/// Decimal digits kept after scaling.
const ROUND_DIGITS: i32 = 5;

/// Raw yearly samples as returned by the corpus.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSeries {
    /// Year of `samples[0]`.
    pub start_year: i32,
    pub samples: Vec<f64>,
}

impl RawSeries {
    pub fn new(start_year: i32, samples: Vec<f64>) -> Self {
        Self {
            start_year,
            samples,
        }
    }

    /// Normalize this series. See [`normalize`].
    pub fn normalize(&self) -> QueryResult<NormalizedSeries> {
        normalize(&self.samples, self.start_year)
    }
}

/// A series scaled to a non-zero minimum of 1.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedSeries {
    pub values: Vec<f64>,
    /// Year of the first value equal to 1.
    pub min_year: i32,
    /// Year of the first value equal to the maximum.
    pub max_year: i32,
}

fn round_digits(value: f64) -> f64 {
    let scale = 10f64.powi(ROUND_DIGITS);
    (value * scale).round() / scale
}

/// Whether `sample` can serve as the reference minimum.
fn is_reference_candidate(sample: f64) -> bool {
    sample.is_finite() && sample > 0.0
}

/// Divide every sample by the smallest positive sample and round to five
/// decimals. `start_year` is the year of `samples[0]`.
///
/// Fails with [`QueryError::EmptyOrAllZeroSeries`] when there is no positive
/// sample to divide by.
pub fn normalize(samples: &[f64], start_year: i32) -> QueryResult<NormalizedSeries> {
    let (reference_index, reference) = samples
        .iter()
        .copied()
        .enumerate()
        .filter(|&(_, v)| is_reference_candidate(v))
        .fold(None, |best: Option<(usize, f64)>, (i, v)| match best {
            Some((_, b)) if b <= v => best,
            _ => Some((i, v)),
        })
        .ok_or(QueryError::EmptyOrAllZeroSeries)?;

    let values: Vec<f64> = samples
        .iter()
        .map(|&v| round_digits(v / reference))
        .collect();

    let min_index = values
        .iter()
        .position(|&v| v == 1.0)
        .unwrap_or(reference_index);

    let peak = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let max_index = values
        .iter()
        .position(|&v| v == peak)
        .unwrap_or(reference_index);

    Ok(NormalizedSeries {
        values,
        min_year: start_year + min_index as i32,
        max_year: start_year + max_index as i32,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scales_to_smallest_nonzero() {
        let n = normalize(&[0.0, 2.0, 4.0, 8.0], 1800).unwrap();
        assert_eq!(n.values, vec![0.0, 1.0, 2.0, 4.0]);
        assert_eq!(n.min_year, 1801);
        assert_eq!(n.max_year, 1803);
    }

    #[test]
    fn all_zero_is_an_error() {
        assert!(matches!(
            normalize(&[0.0, 0.0, 0.0], 1800),
            Err(QueryError::EmptyOrAllZeroSeries)
        ));
    }

    #[test]
    fn empty_is_an_error() {
        assert!(matches!(
            normalize(&[], 1800),
            Err(QueryError::EmptyOrAllZeroSeries)
        ));
    }

    #[test]
    fn ties_resolve_to_earliest_year() {
        let n = normalize(&[3.0, 1.5, 3.0, 1.5], 1900).unwrap();
        assert_eq!(n.values, vec![2.0, 1.0, 2.0, 1.0]);
        assert_eq!(n.min_year, 1901);
        assert_eq!(n.max_year, 1900);
    }

    #[test]
    fn years_follow_series_start() {
        let n = normalize(&[5.0, 1.0, 10.0], 1950).unwrap();
        assert_eq!(n.min_year, 1951);
        assert_eq!(n.max_year, 1952);
    }

    #[test]
    fn rounds_to_five_decimals() {
        let n = normalize(&[3.0, 1.0, 2.0], 2000).unwrap();
        assert_eq!(n.values, vec![3.0, 1.0, 2.0]);
        let n = normalize(&[3.0, 7.0], 2000).unwrap();
        assert_eq!(n.values, vec![1.0, 2.33333]);
    }

    #[test]
    fn tiny_frequencies_normalize() {
        let n = normalize(&[1.2e-9, 0.0, 3.6e-9], 1800).unwrap();
        assert_eq!(n.values, vec![1.0, 0.0, 3.0]);
        assert_eq!(n.min_year, 1800);
        assert_eq!(n.max_year, 1802);
    }

    #[test]
    fn non_finite_samples_are_not_a_reference() {
        let n = normalize(&[f64::NAN, 2.0, 6.0], 1800).unwrap();
        assert_eq!(n.min_year, 1801);
        assert_eq!(n.max_year, 1802);
        assert!(n.values[0].is_nan());
    }

    #[test]
    fn single_sample() {
        let series = RawSeries::new(2019, vec![4.2e-7]);
        let n = series.normalize().unwrap();
        assert_eq!(n.values, vec![1.0]);
        assert_eq!((n.min_year, n.max_year), (2019, 2019));
    }
}
