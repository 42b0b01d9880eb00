//! Yearly anniversary markers.

use chrono::{DateTime, Datelike, Months, Utc};
use serde::{Deserialize, Serialize};

/// A synthetic timeline entry for the n-th anniversary of the start date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnniversaryMarker {
    /// Years since the start date; 0 is the start itself.
    pub year: u32,
    pub timestamp: DateTime<Utc>,
    pub label: String,
}

/// Generate one marker per year from `start` through the year of `now`.
///
/// A start on Feb 29 lands on Feb 28 in non-leap years. If `start` lies in
/// the future only the year-zero marker is produced.
pub fn anniversaries(start: DateTime<Utc>, now: DateTime<Utc>) -> Vec<AnniversaryMarker> {
    let years = (now.year() - start.year()).max(0) as u32;

    (0..=years)
        .filter_map(|year| {
            let timestamp = start.checked_add_months(Months::new(12 * year))?;
            Some(AnniversaryMarker {
                year,
                timestamp,
                label: label_for(year),
            })
        })
        .collect()
}

fn label_for(year: u32) -> String {
    if year == 0 {
        "The Beginning of Us".to_string()
    } else {
        format!("{} Anniversary", ordinal(year))
    }
}

/// English ordinal: 1st, 2nd, 3rd, 4th, 11th, 12th, 13th, 21st.
pub fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}
