//! Statistics aggregation over the card collection.
//!
//! All aggregations are read-only; no card state is touched.

use crate::{selection::is_due, Card};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// How many days ahead `upcoming_reviews` looks, both ends inclusive
const UPCOMING_WINDOW_DAYS: i64 = 30;

/// Aggregated collection statistics
#[derive(Clone, Debug, Default, Serialize)]
pub struct Stats {
    pub total_cards: usize,
    pub due_cards: usize,
    /// Mean ease factor; 0.0 for an empty collection
    pub avg_ease_factor: f64,
    /// Histogram over every rating in every card's history, indexed 0-5
    pub performance_distribution: [u64; 6],
    /// Cards whose latest review fell on each day (one entry per card)
    pub reviews_by_day: BTreeMap<NaiveDate, u64>,
    /// Cards coming due per day over the next 30 days
    pub upcoming_reviews: BTreeMap<NaiveDate, u64>,
}

/// Compute statistics for the full collection.
///
/// Well-defined on an empty set: all counts zero, all maps empty.
pub fn compute_stats(cards: &[Card], now: DateTime<Utc>) -> Stats {
    let mut stats = Stats {
        total_cards: cards.len(),
        ..Stats::default()
    };

    if cards.is_empty() {
        return stats;
    }

    let window_end = now + Duration::days(UPCOMING_WINDOW_DAYS);
    let mut ease_sum = 0.0;

    for card in cards {
        ease_sum += card.ease_factor;

        if is_due(card, now) {
            stats.due_cards += 1;
        }

        for rating in &card.performance_history {
            stats.performance_distribution[rating.value() as usize] += 1;
        }

        if let Some(last_review) = card.last_review() {
            *stats
                .reviews_by_day
                .entry(last_review.date_naive())
                .or_insert(0) += 1;
        }

        if card.due_date >= now && card.due_date <= window_end {
            *stats
                .upcoming_reviews
                .entry(card.due_date.date_naive())
                .or_insert(0) += 1;
        }
    }

    stats.avg_ease_factor = ease_sum / cards.len() as f64;

    tracing::debug!(
        "Computed stats: {} cards, {} due, mean EF {:.2}",
        stats.total_cards,
        stats.due_cards,
        stats.avg_ease_factor
    );

    stats
}
