//! Trend and correlation analysis over a window of weather points

use crate::types::WeatherPoint;
use chrono::{DateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Minimum number of points required for pattern analysis
pub const MIN_PATTERN_POINTS: usize = 10;

/// Correlation magnitude below which a trend is reported as stable
pub const TREND_THRESHOLD: f64 = 0.1;

const HIGH_PRESSURE_HPA: f64 = 1020.0;
const RAINY_MM: f64 = 1.0;
const EXTREME_COLD_C: f64 = 10.0;
const EXTREME_HOT_C: f64 = 35.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

/// Direction plus correlation magnitude against the time index
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Trend {
    pub direction: TrendDirection,
    pub strength: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricTrends {
    pub temperature: Trend,
    pub humidity: Trend,
    pub pressure: Trend,
    pub wind_speed: Trend,
    pub rainfall: Trend,
}

/// Pairwise correlations between selected metric pairs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Correlations {
    pub temperature_humidity: f64,
    pub pressure_rainfall: f64,
    pub wind_pressure: f64,
}

/// Share of points matching notable weather conditions, in percent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Occurrences {
    pub high_pressure_pct: f64,
    pub rainy_pct: f64,
    pub extreme_temperature_pct: f64,
}

/// Mean-temperature structure over the hour of day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiurnalProfile {
    pub peak_temperature_hour: u32,
    pub lowest_temperature_hour: u32,
    pub temperature_range: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternReport {
    pub trends: MetricTrends,
    pub correlations: Correlations,
    pub occurrences: Occurrences,
    pub diurnal: DiurnalProfile,
    pub points_analyzed: usize,
}

/// Pearson correlation coefficient of two equally long series.
///
/// Returns 0.0 when either series has zero variance or fewer than two
/// values, so constant inputs never produce a division fault.
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return 0.0;
    }

    let mean_x: f64 = xs[..n].iter().sum::<f64>() / n as f64;
    let mean_y: f64 = ys[..n].iter().sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for i in 0..n {
        let dx = xs[i] - mean_x;
        let dy = ys[i] - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 {
        0.0
    } else {
        cov / denom
    }
}

fn classify(correlation: f64) -> TrendDirection {
    if correlation > TREND_THRESHOLD {
        TrendDirection::Increasing
    } else if correlation < -TREND_THRESHOLD {
        TrendDirection::Decreasing
    } else {
        TrendDirection::Stable
    }
}

fn trend_against_index(values: &[f64]) -> Trend {
    let index: Vec<f64> = (0..values.len()).map(|i| i as f64).collect();
    let r = pearson(values, &index);
    Trend {
        direction: classify(r),
        strength: r.abs(),
    }
}

fn percentage(matching: usize, total: usize) -> f64 {
    (matching as f64 / total as f64) * 100.0
}

fn diurnal_profile(points: &[WeatherPoint]) -> DiurnalProfile {
    let mut sums = [0.0f64; 24];
    let mut counts = [0usize; 24];
    for point in points {
        let hour = DateTime::from_timestamp(point.timestamp, 0)
            .map(|dt| dt.hour())
            .unwrap_or(0) as usize
            % 24;
        sums[hour] += point.temperature;
        counts[hour] += 1;
    }

    let mut peak = (0u32, f64::NEG_INFINITY);
    let mut lowest = (0u32, f64::INFINITY);
    for hour in 0..24 {
        if counts[hour] == 0 {
            continue;
        }
        let mean = sums[hour] / counts[hour] as f64;
        if mean > peak.1 {
            peak = (hour as u32, mean);
        }
        if mean < lowest.1 {
            lowest = (hour as u32, mean);
        }
    }

    DiurnalProfile {
        peak_temperature_hour: peak.0,
        lowest_temperature_hour: lowest.0,
        temperature_range: peak.1 - lowest.1,
    }
}

/// Analyze trends, correlations and notable conditions in a window.
///
/// The window is time-ordered ascending before computing, so the result
/// does not depend on the retrieval order. Returns `None` when fewer than
/// [`MIN_PATTERN_POINTS`] points are available.
pub fn analyze_patterns(points: &[WeatherPoint]) -> Option<PatternReport> {
    if points.len() < MIN_PATTERN_POINTS {
        return None;
    }

    let mut ordered: Vec<&WeatherPoint> = points.iter().collect();
    ordered.sort_by_key(|p| p.timestamp);

    let series = |f: fn(&WeatherPoint) -> f64| -> Vec<f64> {
        ordered.iter().map(|p| f(p)).collect()
    };

    let temperature = series(|p| p.temperature);
    let humidity = series(|p| p.humidity);
    let pressure = series(|p| p.pressure);
    let wind_speed = series(|p| p.wind_speed);
    let rainfall = series(|p| p.rainfall);

    let trends = MetricTrends {
        temperature: trend_against_index(&temperature),
        humidity: trend_against_index(&humidity),
        pressure: trend_against_index(&pressure),
        wind_speed: trend_against_index(&wind_speed),
        rainfall: trend_against_index(&rainfall),
    };

    let correlations = Correlations {
        temperature_humidity: pearson(&temperature, &humidity),
        pressure_rainfall: pearson(&pressure, &rainfall),
        wind_pressure: pearson(&wind_speed, &pressure),
    };

    let total = ordered.len();
    let occurrences = Occurrences {
        high_pressure_pct: percentage(
            pressure.iter().filter(|&&p| p > HIGH_PRESSURE_HPA).count(),
            total,
        ),
        rainy_pct: percentage(rainfall.iter().filter(|&&r| r > RAINY_MM).count(), total),
        extreme_temperature_pct: percentage(
            temperature
                .iter()
                .filter(|&&t| t < EXTREME_COLD_C || t > EXTREME_HOT_C)
                .count(),
            total,
        ),
    };

    Some(PatternReport {
        trends,
        correlations,
        occurrences,
        diurnal: diurnal_profile(points),
        points_analyzed: total,
    })
}
