//! SM-2 review scheduling.
//!
//! This module implements the per-card update applied after every review:
//! - Ease factor adjustment with a 1.3 floor
//! - Rank-based interval progression (1 day, 6 days, then multiplicative)
//! - Repetition counting with reset on failed recall

use crate::{Card, Rating, ReviewState};
use chrono::{DateTime, Duration, Utc};

/// Ease factor assigned to freshly created cards
pub const INITIAL_EASE_FACTOR: f64 = 2.5;

/// Ease factor floor; no sequence of ratings can push a card below this
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// Result of applying one review to a card
#[derive(Clone, Debug)]
pub struct ReviewOutcome {
    /// The card with its scheduling state fully recomputed
    pub card: Card,
    /// True when the rating was below 4: the session must re-present this
    /// card before moving on. Derived, never persisted.
    pub needs_rereview: bool,
}

/// Apply a review to a card and compute its next schedule.
///
/// Pure function of (card, rating, now). The input card is untouched;
/// the returned card carries the updated ease factor, interval,
/// repetition count, due date, review state, and history.
///
/// Update rules:
/// 1. The ease factor moves by `0.1 - (5 - q) * (0.08 + (5 - q) * 0.02)`
///    on every review, floored at 1.3.
/// 2. Rating >= 3: repetition increments; the interval is 1 day on the
///    first success, 6 days on the second, then `round(interval * EF)`
///    with the post-update ease factor.
/// 3. Rating < 3: repetition resets to 0 and the interval drops to 1 day.
///    A failed card is rescheduled a day out, never immediately.
pub fn apply_review(card: &Card, rating: Rating, now: DateTime<Utc>) -> ReviewOutcome {
    let mut updated = card.clone();

    updated.performance_history.push(rating);
    updated.review_state = ReviewState::Reviewed {
        last_rating: rating,
        last_review: now,
    };

    updated.ease_factor = next_ease_factor(card.ease_factor, rating);

    if rating.is_success() {
        updated.repetition = card.repetition + 1;
        updated.interval_days = match updated.repetition {
            1 => 1,
            2 => 6,
            _ => (card.interval_days as f64 * updated.ease_factor).round() as i64,
        };
    } else {
        updated.repetition = 0;
        updated.interval_days = 1;
    }

    updated.due_date = now + Duration::days(updated.interval_days);

    tracing::debug!(
        "Reviewed card {} with rating {}: EF {:.2}, interval {}d, repetition {}",
        updated.id,
        rating,
        updated.ease_factor,
        updated.interval_days,
        updated.repetition
    );

    ReviewOutcome {
        needs_rereview: !rating.ends_rereview(),
        card: updated,
    }
}

/// Standard SM-2 ease adjustment, floored at 1.3.
///
/// High ratings nudge the ease factor up; the quadratic term makes very
/// low ratings pull it down sharply.
fn next_ease_factor(ease_factor: f64, rating: Rating) -> f64 {
    let q = rating.value() as f64;
    let delta = 0.1 - (5.0 - q) * (0.08 + (5.0 - q) * 0.02);
    (ease_factor + delta).max(MIN_EASE_FACTOR)
}
