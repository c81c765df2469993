//! Gap scoring.
//!
//! Idle windows between sessions of one (program, period, weekday) group
//! are penalized quadratically: a window of `g` empty bands costs `g²`.

use std::collections::BTreeMap;

use crate::models::Schedule;

/// Penalty of one group's hour indices (any order).
///
/// # Example
/// ```
/// use u_timetable::solver::gap_penalty;
///
/// assert_eq!(gap_penalty(&[1, 2]), 0);
/// assert_eq!(gap_penalty(&[4, 1]), 4);
/// ```
pub fn gap_penalty(hours: &[usize]) -> u64 {
    let mut sorted = hours.to_vec();
    sorted.sort_unstable();
    sorted
        .windows(2)
        .map(|w| {
            let gap = (w[1] - w[0]).saturating_sub(1) as u64;
            gap * gap
        })
        .sum()
}

/// Sum of [`gap_penalty`] over groups of `(key, hour)` entries.
pub fn gap_score<K, I>(entries: I) -> u64
where
    K: Ord,
    I: IntoIterator<Item = (K, usize)>,
{
    let mut groups: BTreeMap<K, Vec<usize>> = BTreeMap::new();
    for (key, hour) in entries {
        groups.entry(key).or_default().push(hour);
    }
    groups.values().map(|hours| gap_penalty(hours)).sum()
}

/// Gap score of a decoded schedule, grouped by (program, period, weekday).
pub fn schedule_gap_score(schedule: &Schedule) -> u64 {
    gap_score(
        schedule
            .assignments
            .iter()
            .map(|a| ((a.program.trim(), a.period, a.weekday), a.hour)),
    )
}
