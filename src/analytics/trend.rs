use serde::{Deserialize, Serialize};

use super::{mean, round1};

/// Half-to-half mean difference above which a trend counts as moving.
pub const TREND_THRESHOLD: f64 = 0.5;

/// Fewer points than this are always treated as flat.
const MIN_TREND_POINTS: usize = 3;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improving,
    Declining,
    Stable,
    /// No data at all.
    Neutral,
}

impl Trend {
    pub fn message(self) -> &'static str {
        match self {
            Trend::Improving => "Your mood has been trending upward! Keep up the great work.",
            Trend::Declining => {
                "Your mood has been trending downward. Consider reaching out for support."
            }
            Trend::Stable => {
                "Your mood has been relatively stable. This is a good foundation to build upon."
            }
            Trend::Neutral => "Start logging your mood to get personalized insights!",
        }
    }

    fn recommendations(self) -> &'static [&'static str] {
        match self {
            Trend::Improving => &[
                "Continue your current wellness routine",
                "Consider sharing your progress with your doctor",
                "Try new activities that bring you joy",
            ],
            Trend::Declining => &[
                "Practice deep breathing exercises",
                "Reach out to your assigned doctor",
                "Try mindfulness activities",
                "Consider professional counseling if needed",
            ],
            Trend::Stable => &[
                "Maintain your current routine",
                "Try new wellness activities",
                "Continue journaling your thoughts",
                "Stay connected with your support network",
            ],
            Trend::Neutral => &[
                "Log your daily mood",
                "Write in your journal",
                "Try breathing exercises",
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MoodLevel {
    Excellent,
    Good,
    Moderate,
    NeedsAttention,
}

impl MoodLevel {
    pub fn from_average(avg_mood: f64) -> Self {
        if avg_mood >= 8.0 {
            MoodLevel::Excellent
        } else if avg_mood >= 6.0 {
            MoodLevel::Good
        } else if avg_mood >= 4.0 {
            MoodLevel::Moderate
        } else {
            MoodLevel::NeedsAttention
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            MoodLevel::Excellent => {
                "You're doing exceptionally well! Consider how you can maintain this positive state."
            }
            MoodLevel::Good => {
                "You're in a good place. Small improvements can make a big difference."
            }
            MoodLevel::Moderate => {
                "There's room for improvement. Focus on self-care and professional support."
            }
            MoodLevel::NeedsAttention => {
                "Consider reaching out to mental health professionals for additional support."
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TrendAnalysis {
    pub trend: Trend,
    pub avg_mood: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mood_level: Option<MoodLevel>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_message: Option<String>,
    pub recommendations: Vec<String>,
    pub data_points: usize,
}

/// Difference between the mean of the second half and the first half.
///
/// The first half is `values[..n / 2]`, so it is the shorter one for odd
/// lengths. Sequences shorter than three points have slope zero.
pub fn trend_slope(values: &[i32]) -> f64 {
    if values.len() < MIN_TREND_POINTS {
        return 0.0;
    }
    let (first, second) = values.split_at(values.len() / 2);
    match (mean(first), mean(second)) {
        (Some(a), Some(b)) => b - a,
        _ => 0.0,
    }
}

pub fn classify_slope(slope: f64) -> Trend {
    if slope > TREND_THRESHOLD {
        Trend::Improving
    } else if slope < -TREND_THRESHOLD {
        Trend::Declining
    } else {
        Trend::Stable
    }
}

/// Analyze chronologically ordered mood values.
pub fn analyze_trend(values: &[i32]) -> TrendAnalysis {
    let Some(avg_mood) = mean(values) else {
        return TrendAnalysis {
            trend: Trend::Neutral,
            avg_mood: 0.0,
            mood_level: None,
            message: Trend::Neutral.message().to_string(),
            additional_message: None,
            recommendations: to_owned_list(Trend::Neutral.recommendations()),
            data_points: 0,
        };
    };

    let trend = classify_slope(trend_slope(values));
    let level = MoodLevel::from_average(avg_mood);

    TrendAnalysis {
        trend,
        avg_mood: round1(avg_mood),
        mood_level: Some(level),
        message: trend.message().to_string(),
        additional_message: Some(level.message().to_string()),
        recommendations: to_owned_list(trend.recommendations()),
        data_points: values.len(),
    }
}

fn to_owned_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_sequences_have_zero_slope() {
        assert_eq!(trend_slope(&[]), 0.0);
        assert_eq!(trend_slope(&[1]), 0.0);
        assert_eq!(trend_slope(&[1, 10]), 0.0);
        assert_eq!(analyze_trend(&[1, 10]).trend, Trend::Stable);
    }

    #[test]
    fn test_odd_length_first_half_is_shorter() {
        // first = [2], second = [4, 6] -> 5 - 2
        assert_eq!(trend_slope(&[2, 4, 6]), 3.0);
    }

    #[test]
    fn test_improving_and_declining() {
        assert_eq!(analyze_trend(&[3, 3, 3, 7, 7, 7]).trend, Trend::Improving);
        assert_eq!(analyze_trend(&[8, 8, 8, 4, 4, 4]).trend, Trend::Declining);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        // mean(second) - mean(first) == 0.5 exactly
        let values = [5, 5, 5, 6];
        assert_eq!(trend_slope(&values), 0.5);
        assert_eq!(analyze_trend(&values).trend, Trend::Stable);
    }

    #[test]
    fn test_empty_history_is_neutral() {
        let analysis = analyze_trend(&[]);
        assert_eq!(analysis.trend, Trend::Neutral);
        assert_eq!(analysis.data_points, 0);
        assert_eq!(analysis.mood_level, None);
        assert_eq!(
            analysis.recommendations,
            vec!["Log your daily mood", "Write in your journal", "Try breathing exercises"]
        );
    }

    #[test]
    fn test_mood_levels() {
        assert_eq!(MoodLevel::from_average(8.0), MoodLevel::Excellent);
        assert_eq!(MoodLevel::from_average(7.9), MoodLevel::Good);
        assert_eq!(MoodLevel::from_average(4.0), MoodLevel::Moderate);
        assert_eq!(MoodLevel::from_average(3.99), MoodLevel::NeedsAttention);
    }

    #[test]
    fn test_average_is_rounded() {
        let analysis = analyze_trend(&[6, 7, 7]);
        assert_eq!(analysis.avg_mood, 6.7);
        assert_eq!(analysis.mood_level, Some(MoodLevel::Good));
        assert_eq!(analysis.data_points, 3);
    }

    #[test]
    fn test_serialized_labels() {
        let json = serde_json::to_value(analyze_trend(&[2, 2, 2])).unwrap();
        assert_eq!(json["trend"], "stable");
        assert_eq!(json["mood_level"], "needs_attention");
    }
}
