//! Statistics over timing samples.

use statrs::statistics::{Data, Median, Statistics};

/// Summary statistics of a set of timings, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation; zero for fewer than two samples.
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl TimingStats {
    /// Compute statistics; an empty slice gives all zeros.
    pub fn from_samples(samples: &[f64]) -> Self {
        if samples.is_empty() {
            return Self {
                count: 0,
                mean: 0.0,
                median: 0.0,
                std_dev: 0.0,
                min: 0.0,
                max: 0.0,
            };
        }

        let std_dev = if samples.len() < 2 {
            0.0
        } else {
            samples.iter().std_dev()
        };

        Self {
            count: samples.len(),
            mean: samples.iter().mean(),
            median: Data::new(samples.to_vec()).median(),
            std_dev,
            min: samples.iter().copied().fold(f64::INFINITY, f64::min),
            max: samples.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }
}
