/// A count-threshold achievement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AchievementRule {
    pub title: &'static str,
    pub description: &'static str,
    pub points: i32,
    pub min_entries: i64,
}

pub const ACHIEVEMENT_RULES: [AchievementRule; 2] = [
    AchievementRule {
        title: "Week Warrior",
        description: "Logged mood for 7 days!",
        points: 10,
        min_entries: 7,
    },
    AchievementRule {
        title: "Monthly Master",
        description: "Logged mood for 30 days!",
        points: 50,
        min_entries: 30,
    },
];

/// Rules the user qualifies for but has not unlocked yet.
///
/// Keyed on the titles already held, so re-running with the same count never
/// yields a rule twice.
pub fn due_achievements<S>(entry_count: i64, unlocked_titles: &[S]) -> Vec<&'static AchievementRule>
where
    S: AsRef<str>,
{
    ACHIEVEMENT_RULES
        .iter()
        .filter(|rule| entry_count >= rule.min_entries)
        .filter(|rule| !unlocked_titles.iter().any(|t| t.as_ref() == rule.title))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nothing_below_seven() {
        assert!(due_achievements::<&str>(6, &[]).is_empty());
    }

    #[test]
    fn test_week_warrior_granted_once() {
        let first = due_achievements::<String>(7, &[]);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].title, "Week Warrior");
        assert_eq!(first[0].points, 10);

        // second check after the first award sees the title and yields nothing
        let unlocked: Vec<String> = first.iter().map(|r| r.title.to_string()).collect();
        assert!(due_achievements(7, &unlocked).is_empty());
        assert!(due_achievements(8, &unlocked).is_empty());
    }

    #[test]
    fn test_both_due_at_thirty() {
        let due = due_achievements::<&str>(30, &[]);
        let titles: Vec<_> = due.iter().map(|r| r.title).collect();
        assert_eq!(titles, vec!["Week Warrior", "Monthly Master"]);

        let due = due_achievements(30, &["Week Warrior"]);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].points, 50);
    }
}
