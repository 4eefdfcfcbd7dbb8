//! Least-squares mood prediction and the 7-day forecast.

use serde::{Deserialize, Serialize};

use super::{clamp_mood, mean, mood_percentage, round1, NEUTRAL_MOOD};

/// Number of days projected by [`weekly_forecast`].
pub const FORECAST_DAYS: usize = 7;

/// Damping applied to the regression slope per projected day.
const FORECAST_DAMPING: f64 = 0.1;

/// Below this many points the single-value predictor falls back to the mean.
const MIN_REGRESSION_POINTS: usize = 3;

/// Below this many points the prediction confidence is always low.
const MIN_CONFIDENCE_POINTS: usize = 5;

/// Confidence attached to a single-value prediction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PredictionConfidence {
    High,
    Medium,
    Low,
}

/// Confidence attached to the weekly forecast, driven by sample size only.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ForecastConfidence {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WeeklyOutlook {
    Positive,
    Stable,
    Challenging,
    /// No data to forecast from.
    Neutral,
}

impl WeeklyOutlook {
    pub fn message(self) -> &'static str {
        match self {
            WeeklyOutlook::Positive => "Your mood trend suggests a positive week ahead!",
            WeeklyOutlook::Stable => "Your mood is likely to remain stable this week.",
            WeeklyOutlook::Challenging => {
                "You might face some challenging days. Consider reaching out for support."
            }
            WeeklyOutlook::Neutral => "Need more mood data for accurate predictions",
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ForecastDay {
    pub mood: f64,
    pub mood_percentage: i32,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WeeklyForecast {
    pub prediction: WeeklyOutlook,
    pub confidence: ForecastConfidence,
    pub message: String,
    pub weekly_forecast: Vec<f64>,
    pub weekly_forecast_with_percentages: Vec<ForecastDay>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_predicted: Option<f64>,
}

/// Closed-form OLS of value against index `0..n`.
///
/// Returns `(slope, intercept)`. Callers guarantee `n >= 2`, which keeps the
/// denominator non-zero since the indices are distinct.
fn ols_fit(values: &[i32]) -> (f64, f64) {
    let n = values.len() as f64;
    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_xx) = (0.0, 0.0, 0.0, 0.0);
    for (i, &v) in values.iter().enumerate() {
        let x = i as f64;
        let y = v as f64;
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_xx += x * x;
    }

    let slope = (n * sum_xy - sum_x * sum_y) / (n * sum_xx - sum_x * sum_x);
    let intercept = (sum_y - slope * sum_x) / n;
    (slope, intercept)
}

/// Mean-centered regression slope, zero for fewer than two points.
pub fn regression_slope(values: &[i32]) -> f64 {
    let Some(mean_y) = mean(values) else {
        return 0.0;
    };
    if values.len() < 2 {
        return 0.0;
    }

    let mean_x = (values.len() - 1) as f64 / 2.0;
    let (num, den) = values
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(num, den), (i, &v)| {
            let dx = i as f64 - mean_x;
            (num + dx * (v as f64 - mean_y), den + dx * dx)
        });
    num / den
}

/// Predict the next mood value from chronologically ordered history.
pub fn predict_next_mood(values: &[i32]) -> f64 {
    if values.len() < MIN_REGRESSION_POINTS {
        return round1(mean(values).unwrap_or(NEUTRAL_MOOD));
    }

    let (slope, intercept) = ols_fit(values);
    let next_x = values.len() as f64;
    clamp_mood(round1(slope * next_x + intercept))
}

/// How predictable the series is, judged by its population standard deviation.
pub fn prediction_confidence(values: &[i32]) -> PredictionConfidence {
    if values.len() < MIN_CONFIDENCE_POINTS {
        return PredictionConfidence::Low;
    }
    let Some(avg) = mean(values) else {
        return PredictionConfidence::Low;
    };

    let variance = values
        .iter()
        .map(|&v| (v as f64 - avg).powi(2))
        .sum::<f64>()
        / values.len() as f64;
    let std_dev = variance.sqrt();

    if std_dev < 1.0 {
        PredictionConfidence::High
    } else if std_dev < 2.0 {
        PredictionConfidence::Medium
    } else {
        PredictionConfidence::Low
    }
}

/// Project the coming week from up to two weeks of chronological values.
pub fn weekly_forecast(values: &[i32]) -> WeeklyForecast {
    let Some(&last) = values.last() else {
        let flat = vec![NEUTRAL_MOOD; FORECAST_DAYS];
        return WeeklyForecast {
            prediction: WeeklyOutlook::Neutral,
            confidence: ForecastConfidence::Low,
            message: WeeklyOutlook::Neutral.message().to_string(),
            weekly_forecast_with_percentages: with_percentages(&flat),
            weekly_forecast: flat,
            avg_predicted: None,
        };
    };

    let slope = regression_slope(values);
    let base_mood = last as f64;

    let forecast: Vec<f64> = (1..=FORECAST_DAYS)
        .map(|day| round1(clamp_mood(base_mood + slope * day as f64 * FORECAST_DAMPING)))
        .collect();

    let avg_predicted = forecast.iter().sum::<f64>() / forecast.len() as f64;
    let prediction = if avg_predicted >= 7.0 {
        WeeklyOutlook::Positive
    } else if avg_predicted >= 4.0 {
        WeeklyOutlook::Stable
    } else {
        WeeklyOutlook::Challenging
    };

    let confidence = match values.len() {
        n if n >= 7 => ForecastConfidence::High,
        n if n >= 3 => ForecastConfidence::Medium,
        _ => ForecastConfidence::Low,
    };

    WeeklyForecast {
        prediction,
        confidence,
        message: prediction.message().to_string(),
        weekly_forecast_with_percentages: with_percentages(&forecast),
        weekly_forecast: forecast,
        avg_predicted: Some(round1(avg_predicted)),
    }
}

fn with_percentages(forecast: &[f64]) -> Vec<ForecastDay> {
    forecast
        .iter()
        .map(|&mood| ForecastDay {
            mood,
            mood_percentage: mood_percentage(mood),
        })
        .collect()
}
