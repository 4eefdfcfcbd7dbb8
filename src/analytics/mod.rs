//! Mood analytics: streaks, trend classification, forecasting,
//! recommendations and achievement rules.
//!
//! Everything in here is a pure function over values already fetched from the
//! store. Handlers own the queries; these modules own the arithmetic.

pub mod achievements;
pub mod forecast;
pub mod recommend;
pub mod streak;
pub mod trend;

/// Lowest valid mood score.
pub const MOOD_MIN: f64 = 1.0;
/// Highest valid mood score.
pub const MOOD_MAX: f64 = 10.0;
/// Midpoint used whenever there is no data to work from.
pub const NEUTRAL_MOOD: f64 = 5.0;

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[i32]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().map(|&v| v as f64).sum::<f64>() / values.len() as f64)
}

/// Clamp a predicted value into the valid mood range.
pub fn clamp_mood(value: f64) -> f64 {
    value.clamp(MOOD_MIN, MOOD_MAX)
}

/// Integer percentage of the 10-point scale, as shown on progress bars.
pub fn mood_percentage(mood: f64) -> i32 {
    (mood * 10.0) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round1() {
        assert_eq!(round1(5.44), 5.4);
        assert_eq!(round1(5.46), 5.5);
        assert_eq!(round1(7.0), 7.0);
    }

    #[test]
    fn test_mean_empty_is_none() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[4, 6]), Some(5.0));
    }

    #[test]
    fn test_mood_percentage() {
        assert_eq!(mood_percentage(6.3), 63);
        assert_eq!(mood_percentage(0.0), 0);
    }
}
