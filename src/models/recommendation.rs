use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

/// Per-user weight on a topic, fed by "more/less like this" signals.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TopicPreference {
    pub user_id: i64,
    pub topic_id: i64,
    pub weight: i32,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreferenceSignal {
    More,
    Less,
}

impl PreferenceSignal {
    /// New weight after this signal. A signal opposite to the current sign
    /// resets the weight to one step in the new direction, so the latest
    /// opinion on a topic always wins.
    pub fn apply(self, weight: i32) -> i32 {
        match self {
            Self::More if weight < 0 => 1,
            Self::More => weight.saturating_add(1),
            Self::Less if weight > 0 => -1,
            Self::Less => weight.saturating_sub(1),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecommendRequest {
    pub more_article_id: Option<i64>,
    pub less_article_id: Option<i64>,
}

impl RecommendRequest {
    /// Exactly one of the two ids must be present.
    pub fn signal(&self) -> Option<(i64, PreferenceSignal)> {
        match (self.more_article_id, self.less_article_id) {
            (Some(id), None) => Some((id, PreferenceSignal::More)),
            (None, Some(id)) => Some((id, PreferenceSignal::Less)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_more_then_less_is_negative() {
        let w = PreferenceSignal::More.apply(0);
        assert_eq!(w, 1);
        assert_eq!(PreferenceSignal::Less.apply(w), -1);
    }

    #[test]
    fn test_less_then_more_is_positive() {
        let w = PreferenceSignal::Less.apply(0);
        assert_eq!(w, -1);
        assert_eq!(PreferenceSignal::More.apply(w), 1);
    }

    #[test]
    fn test_repeated_signals_accumulate() {
        let w = (0..3).fold(0, |w, _| PreferenceSignal::More.apply(w));
        assert_eq!(w, 3);
        let w = (0..2).fold(0, |w, _| PreferenceSignal::Less.apply(w));
        assert_eq!(w, -2);
    }

    #[test]
    fn test_request_requires_exactly_one_id() {
        let both = RecommendRequest { more_article_id: Some(1), less_article_id: Some(2) };
        assert!(both.signal().is_none());
        assert!(RecommendRequest::default().signal().is_none());

        let more = RecommendRequest { more_article_id: Some(7), less_article_id: None };
        assert_eq!(more.signal(), Some((7, PreferenceSignal::More)));
    }
}
