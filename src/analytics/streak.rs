use std::collections::HashSet;

use chrono::{Duration, NaiveDate};

/// Consecutive days with at least one mood entry, ending today.
///
/// `entry_dates` is every distinct calendar day the user logged a mood on,
/// fetched in one query. No entry today means a streak of zero.
pub fn current_streak<I>(entry_dates: I, today: NaiveDate) -> i32
where
    I: IntoIterator<Item = NaiveDate>,
{
    let days: HashSet<NaiveDate> = entry_dates.into_iter().collect();

    let mut streak = 0i32;
    let mut check_date = today;
    while days.contains(&check_date) {
        streak += 1;
        check_date -= Duration::days(1);
    }
    streak
}

/// Longest run of consecutive logged days anywhere in the history.
pub fn longest_streak<I>(entry_dates: I) -> i32
where
    I: IntoIterator<Item = NaiveDate>,
{
    let mut dates: Vec<NaiveDate> = entry_dates.into_iter().collect();
    dates.sort_unstable();
    dates.dedup();

    let mut longest = 0i32;
    let mut run = 0i32;
    let mut prev: Option<NaiveDate> = None;

    for date in dates {
        run = match prev {
            Some(p) if date == p + Duration::days(1) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        prev = Some(date);
    }
    longest
}
