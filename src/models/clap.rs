use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Clap {
    pub id: i64,
    pub article_id: i64,
    pub user_id: i64,
    pub count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Clap {
    /// Count after one more clap: starts at 1 and saturates at `cap`.
    pub fn next_count(current: Option<i32>, cap: i32) -> i32 {
        match current {
            None => 1.min(cap),
            Some(count) => count.saturating_add(1).min(cap),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClapResponse {
    pub count: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_first_clap_starts_at_one() {
        assert_eq!(Clap::next_count(None, 50), 1);
    }

    #[test]
    fn test_clap_saturates_at_cap() {
        assert_eq!(Clap::next_count(Some(49), 50), 50);
        assert_eq!(Clap::next_count(Some(50), 50), 50);
    }

    proptest! {
        #[test]
        fn clap_count_never_exceeds_cap(calls in 1usize..200) {
            let mut count = None;
            for _ in 0..calls {
                let next = Clap::next_count(count, 50);
                prop_assert!(next >= 1 && next <= 50);
                count = Some(next);
            }
            prop_assert_eq!(count, Some(calls.min(50) as i32));
        }
    }
}
