use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-user profile row backing the daily quota.
///
/// Rows are created lazily on the first analysis call; columns other than
/// `id` are nullable in the store, so deserialization falls back to the
/// defaults a fresh profile would have.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    #[serde(default)]
    pub is_pro: bool,
    #[serde(default)]
    pub daily_count: i32,
    #[serde(default)]
    pub daily_count_date: Option<NaiveDate>,
}

impl Profile {
    /// The default row shape upserted for a first-time caller.
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            is_pro: false,
            daily_count: 0,
            daily_count_date: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_sparse_row() {
        let profile: Profile =
            serde_json::from_str(r#"{"id":"9f0c2b4a-0b1e-4f5a-9c8d-1234567890ab"}"#).unwrap();
        assert!(!profile.is_pro);
        assert_eq!(profile.daily_count, 0);
        assert!(profile.daily_count_date.is_none());
    }

    #[test]
    fn deserializes_full_row() {
        let profile: Profile = serde_json::from_str(
            r#"{"id":"9f0c2b4a-0b1e-4f5a-9c8d-1234567890ab","is_pro":true,"daily_count":7,"daily_count_date":"2026-08-25"}"#,
        )
        .unwrap();
        assert!(profile.is_pro);
        assert_eq!(profile.daily_count, 7);
        assert_eq!(
            profile.daily_count_date,
            Some(NaiveDate::from_ymd_opt(2026, 8, 25).unwrap())
        );
    }
}
