use super::trend::Trend;

/// Maximum number of recommendations returned to the client.
pub const MAX_RECOMMENDATIONS: usize = 5;

/// Journal counts below this get a nudge to write more.
const JOURNAL_NUDGE_THRESHOLD: i64 = 5;

const URGENT_SUPPORT: [&str; 2] = [
    "URGENT: Your mood trend suggests you may need additional support",
    "Consider contacting a healthcare provider soon",
];

const LOW_MOOD: [&str; 4] = [
    "Consider speaking with a mental health professional",
    "Try daily gratitude journaling to shift perspective",
    "Practice deep breathing exercises for 5 minutes daily",
    "Reach out to trusted friends or family for support",
];

const MODERATE_MOOD: [&str; 4] = [
    "Continue with your current wellness activities",
    "Try adding mindfulness meditation to your routine",
    "Consider light exercise like walking",
    "Track your sleep patterns for better rest",
];

const POSITIVE_MOOD: [&str; 4] = [
    "Great job maintaining positive mental health!",
    "Consider helping others by sharing your coping strategies",
    "Try advanced mindfulness techniques",
    "Continue your current healthy habits",
];

const JOURNAL_NUDGE: &str = "Try journaling more frequently to process your emotions";

/// Build the ranked recommendation list.
///
/// Urgent-support messages lead for a declining trend, then the bucket for
/// the average mood, then activity nudges. The list is cut to
/// [`MAX_RECOMMENDATIONS`] only after everything is appended, so earlier
/// entries win.
pub fn generate_recommendations(avg_mood: f64, trend: Trend, journal_count: i64) -> Vec<String> {
    let bucket: &[&str] = if avg_mood < 4.0 {
        &LOW_MOOD
    } else if avg_mood < 6.0 {
        &MODERATE_MOOD
    } else {
        &POSITIVE_MOOD
    };

    let urgent: &[&str] = if trend == Trend::Declining {
        &URGENT_SUPPORT
    } else {
        &[]
    };

    let nudge = (journal_count < JOURNAL_NUDGE_THRESHOLD).then_some(JOURNAL_NUDGE);

    urgent
        .iter()
        .chain(bucket.iter())
        .chain(nudge.iter())
        .take(MAX_RECOMMENDATIONS)
        .map(|s| s.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declining_puts_urgent_first() {
        let recs = generate_recommendations(5.0, Trend::Declining, 10);
        assert_eq!(recs.len(), 5);
        assert_eq!(recs[0], URGENT_SUPPORT[0]);
        assert_eq!(recs[1], URGENT_SUPPORT[1]);
        assert_eq!(recs[2], MODERATE_MOOD[0]);
    }

    #[test]
    fn test_truncation_drops_later_appends() {
        // 2 urgent + 4 bucket already fills the list; the journal nudge is cut
        let recs = generate_recommendations(2.0, Trend::Declining, 0);
        assert_eq!(recs.len(), MAX_RECOMMENDATIONS);
        assert!(!recs.iter().any(|r| r == JOURNAL_NUDGE));
        assert_eq!(recs[4], LOW_MOOD[2]);
    }

    #[test]
    fn test_journal_nudge_appended() {
        let recs = generate_recommendations(7.0, Trend::Improving, 4);
        assert_eq!(recs.len(), 5);
        assert_eq!(recs[0], POSITIVE_MOOD[0]);
        assert_eq!(recs[4], JOURNAL_NUDGE);

        let recs = generate_recommendations(7.0, Trend::Improving, 5);
        assert_eq!(recs.len(), 4);
    }

    #[test]
    fn test_bucket_boundaries() {
        assert_eq!(generate_recommendations(3.9, Trend::Stable, 9)[0], LOW_MOOD[0]);
        assert_eq!(generate_recommendations(4.0, Trend::Stable, 9)[0], MODERATE_MOOD[0]);
        assert_eq!(generate_recommendations(6.0, Trend::Stable, 9)[0], POSITIVE_MOOD[0]);
    }

    #[test]
    fn test_never_more_than_five() {
        for avg in [1.0, 4.5, 9.0] {
            for trend in [Trend::Improving, Trend::Declining, Trend::Stable, Trend::Neutral] {
                for journals in [0, 10] {
                    let recs = generate_recommendations(avg, trend, journals);
                    assert!(recs.len() <= MAX_RECOMMENDATIONS);
                    if trend == Trend::Declining {
                        assert_eq!(&recs[..2], &URGENT_SUPPORT);
                    }
                }
            }
        }
    }
}
