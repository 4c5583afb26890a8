//! Descriptive statistics over a window of weather points

use crate::types::{Timestamp, WeatherPoint};
use serde::{Deserialize, Serialize};

/// Summary of a single numeric metric
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricStats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    /// Sample standard deviation (0 when fewer than two values)
    pub stddev: f64,
}

/// Rainfall carries the window total in addition to the common summary
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RainfallStats {
    #[serde(flatten)]
    pub stats: MetricStats,
    pub total: f64,
}

/// Full statistics over one retrieved window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherStatistics {
    pub temperature: MetricStats,
    pub humidity: MetricStats,
    pub pressure: MetricStats,
    pub wind_speed: MetricStats,
    pub rainfall: RainfallStats,

    /// Number of points folded into the summary
    pub count: usize,

    /// Covered timestamp range of the input window
    pub start: Timestamp,
    pub end: Timestamp,
}

fn metric_stats(values: &[f64]) -> MetricStats {
    let n = values.len();
    let sum: f64 = values.iter().sum();
    let mean = sum / n as f64;
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let stddev = if n > 1 {
        let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
        (ss / (n - 1) as f64).sqrt()
    } else {
        0.0
    };

    MetricStats {
        mean,
        min,
        max,
        stddev,
    }
}

/// Compute descriptive statistics for every metric in the window.
///
/// Returns `None` for an empty window so callers never see NaN-valued
/// fields.
pub fn summarize(points: &[WeatherPoint]) -> Option<WeatherStatistics> {
    if points.is_empty() {
        return None;
    }

    let collect = |f: fn(&WeatherPoint) -> f64| -> Vec<f64> { points.iter().map(f).collect() };

    let rainfall_values = collect(|p| p.rainfall);
    let rainfall = RainfallStats {
        stats: metric_stats(&rainfall_values),
        total: rainfall_values.iter().sum(),
    };

    let start = points.iter().map(|p| p.timestamp).min()?;
    let end = points.iter().map(|p| p.timestamp).max()?;

    Some(WeatherStatistics {
        temperature: metric_stats(&collect(|p| p.temperature)),
        humidity: metric_stats(&collect(|p| p.humidity)),
        pressure: metric_stats(&collect(|p| p.pressure)),
        wind_speed: metric_stats(&collect(|p| p.wind_speed)),
        rainfall,
        count: points.len(),
        start,
        end,
    })
}
