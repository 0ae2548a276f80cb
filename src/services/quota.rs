use chrono::NaiveDate;

use crate::models::profile::Profile;

/// Daily analysis limit for free users.
pub const FREE_DAILY_LIMIT: i32 = 5;

/// Daily analysis limit for pro subscribers.
pub const PRO_DAILY_LIMIT: i32 = 50;

/// Outcome of the quota gate for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaDecision {
    /// Admitted; `daily_count` must be written back as `next_count` together
    /// with today's date before the diagnosis is produced.
    Admitted { next_count: i32 },
    /// Over the daily limit; no writes are performed.
    Denied,
}

/// Apply the daily-limit rule to a profile at `today` (UTC calendar date).
///
/// A `daily_count_date` from a prior day makes the effective count 0; a
/// missing date counts as today, so the stored count stands.
pub fn evaluate(profile: &Profile, today: NaiveDate) -> QuotaDecision {
    let effective_count = match profile.daily_count_date {
        Some(date) if date != today => 0,
        _ => profile.daily_count,
    };

    let limit = if profile.is_pro {
        PRO_DAILY_LIMIT
    } else {
        FREE_DAILY_LIMIT
    };

    if effective_count >= limit {
        QuotaDecision::Denied
    } else {
        QuotaDecision::Admitted {
            next_count: effective_count + 1,
        }
    }
}
