//! Core domain types for the Mnemo spaced-repetition system.
//!
//! This module defines the fundamental types used throughout the system:
//! - Cards and their scheduling fields
//! - Recall-quality ratings
//! - Review state (reviewed vs. never reviewed)
//! - Review events for the journal

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Rating
// ============================================================================

/// Recall-quality rating, 0 (total blackout) through 5 (perfect recall).
///
/// Construction is fallible: anything outside 0-5 is rejected, never
/// clamped. The serde bridge goes through the same check, so a hand-edited
/// store file cannot smuggle an invalid rating in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 0;
    pub const MAX: u8 = 5;

    /// Create a rating, rejecting values above 5
    pub fn new(value: u8) -> Result<Self> {
        if value > Self::MAX {
            return Err(Error::InvalidRating(value));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// A rating of 3 or better counts as successful recall
    pub fn is_success(self) -> bool {
        self.0 >= 3
    }

    /// A rating of 4 or better releases a card from same-session re-review
    pub fn ends_rereview(self) -> bool {
        self.0 >= 4
    }

    /// Human-readable description for prompts and summaries
    pub fn label(self) -> &'static str {
        match self.0 {
            0 => "blackout",
            1 => "wrong, remembered on seeing answer",
            2 => "wrong, felt close",
            3 => "correct with difficulty",
            4 => "correct after hesitation",
            _ => "perfect recall",
        }
    }
}

impl TryFrom<u8> for Rating {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Review State
// ============================================================================

/// Whether a card has ever been reviewed.
///
/// Modelled as a tagged enum rather than a pair of `Option`s so that
/// prioritization and statistics code can never read "never reviewed" as
/// "rated 0": the last rating and last review time exist together or not
/// at all.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReviewState {
    #[default]
    Unreviewed,
    Reviewed {
        last_rating: Rating,
        last_review: DateTime<Utc>,
    },
}

impl ReviewState {
    /// The most recent rating, if the card has been reviewed
    pub fn last_rating(&self) -> Option<Rating> {
        match self {
            ReviewState::Unreviewed => None,
            ReviewState::Reviewed { last_rating, .. } => Some(*last_rating),
        }
    }

    /// The most recent review time, if the card has been reviewed
    pub fn last_review(&self) -> Option<DateTime<Utc>> {
        match self {
            ReviewState::Unreviewed => None,
            ReviewState::Reviewed { last_review, .. } => Some(*last_review),
        }
    }
}

// ============================================================================
// Card
// ============================================================================

/// An atomic question/answer unit with its scheduling state
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Card {
    pub id: Uuid,
    pub question: String,
    pub answer: String,

    /// Interval growth multiplier, never below 1.3
    pub ease_factor: f64,
    /// Days until the next review
    pub interval_days: i64,
    /// Consecutive successful-recall count, reset on failure
    pub repetition: u32,
    /// The card is eligible for review once `due_date <= now`
    pub due_date: DateTime<Utc>,

    #[serde(default)]
    pub review_state: ReviewState,

    /// Append-only record of every past rating, statistics only
    #[serde(default)]
    pub performance_history: Vec<Rating>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub notes: Option<String>,
}

impl Card {
    /// Create a new card with scheduling defaults: immediately due,
    /// ease factor 2.5, no interval, no repetitions.
    pub fn new(
        question: impl Into<String>,
        answer: impl Into<String>,
        tags: Vec<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            question: question.into(),
            answer: answer.into(),
            ease_factor: crate::scheduler::INITIAL_EASE_FACTOR,
            interval_days: 0,
            repetition: 0,
            due_date: now,
            review_state: ReviewState::Unreviewed,
            performance_history: Vec::new(),
            tags,
            notes: None,
        }
    }

    pub fn last_rating(&self) -> Option<Rating> {
        self.review_state.last_rating()
    }

    pub fn last_review(&self) -> Option<DateTime<Utc>> {
        self.review_state.last_review()
    }
}

// ============================================================================
// Review Event
// ============================================================================

/// One completed review, as appended to the journal.
///
/// Captures the post-review scheduling state so the journal doubles as an
/// audit trail of how a card's ease and interval evolved.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReviewEvent {
    pub card_id: Uuid,
    pub rating: Rating,
    pub reviewed_at: DateTime<Utc>,
    pub ease_factor: f64,
    pub interval_days: i64,
    pub repetition: u32,
}

impl ReviewEvent {
    /// Capture an event from a just-reviewed card.
    ///
    /// Returns None for a card that has never been reviewed.
    pub fn from_card(card: &Card) -> Option<Self> {
        match card.review_state {
            ReviewState::Unreviewed => None,
            ReviewState::Reviewed {
                last_rating,
                last_review,
            } => Some(Self {
                card_id: card.id,
                rating: last_rating,
                reviewed_at: last_review,
                ease_factor: card.ease_factor,
                interval_days: card.interval_days,
                repetition: card.repetition,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_rejects_out_of_range() {
        assert!(Rating::new(5).is_ok());
        assert!(matches!(Rating::new(6), Err(Error::InvalidRating(6))));
        assert!(matches!(Rating::new(250), Err(Error::InvalidRating(250))));
    }

    #[test]
    fn test_rating_serde_rejects_out_of_range() {
        let ok: Rating = serde_json::from_str("4").unwrap();
        assert_eq!(ok.value(), 4);

        let bad: std::result::Result<Rating, _> = serde_json::from_str("9");
        assert!(bad.is_err());
    }

    #[test]
    fn test_rating_thresholds() {
        assert!(!Rating::new(2).unwrap().is_success());
        assert!(Rating::new(3).unwrap().is_success());
        assert!(!Rating::new(3).unwrap().ends_rereview());
        assert!(Rating::new(4).unwrap().ends_rereview());
    }

    #[test]
    fn test_new_card_defaults() {
        let now = Utc::now();
        let card = Card::new("q", "a", vec!["rust".into()], now);

        assert_eq!(card.ease_factor, 2.5);
        assert_eq!(card.interval_days, 0);
        assert_eq!(card.repetition, 0);
        assert_eq!(card.due_date, now);
        assert_eq!(card.review_state, ReviewState::Unreviewed);
        assert!(card.performance_history.is_empty());
        assert_eq!(card.last_rating(), None);
    }

    #[test]
    fn test_card_serde_roundtrip() {
        let now = Utc::now();
        let mut card = Card::new("question", "answer", vec![], now);
        card.review_state = ReviewState::Reviewed {
            last_rating: Rating::new(4).unwrap(),
            last_review: now,
        };
        card.performance_history = vec![Rating::new(4).unwrap()];

        let json = serde_json::to_string(&card).unwrap();
        let parsed: Card = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.id, card.id);
        assert_eq!(parsed.last_rating(), Some(Rating::new(4).unwrap()));
        assert_eq!(parsed.performance_history.len(), 1);
    }

    #[test]
    fn test_review_event_from_unreviewed_card() {
        let card = Card::new("q", "a", vec![], Utc::now());
        assert!(ReviewEvent::from_card(&card).is_none());
    }
}
