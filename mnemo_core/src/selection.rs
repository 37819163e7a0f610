//! Due-queue selection and prioritization.
//!
//! This module builds the ordered review queue from the full card set:
//! - Due predicate (inclusive of the exact due instant)
//! - Failed-first tiered ordering
//! - Tag filtering with OR semantics

use crate::Card;
use chrono::{DateTime, Utc};

/// A card is due once its scheduled time has arrived
pub fn is_due(card: &Card, now: DateTime<Utc>) -> bool {
    card.due_date <= now
}

/// Select the due cards, optionally prioritized failed-first.
///
/// With `failed_first` the due set is split into three tiers, concatenated
/// in fixed order, each preserving the relative order of the input:
/// 1. Last rating 2 or below (failed in a prior session, still due)
/// 2. Last rating exactly 3 (marginal recall)
/// 3. Everything else, including never-reviewed cards
///
/// Without it, due cards come back in store order. Either way the result
/// is deterministic for identical input.
pub fn select_due(cards: &[Card], now: DateTime<Utc>, failed_first: bool) -> Vec<Card> {
    let due = cards.iter().filter(|c| is_due(c, now));

    if !failed_first {
        return due.cloned().collect();
    }

    let mut failed = Vec::new();
    let mut marginal = Vec::new();
    let mut rest = Vec::new();

    for card in due {
        match card.last_rating().map(|r| r.value()) {
            Some(r) if r <= 2 => failed.push(card.clone()),
            Some(3) => marginal.push(card.clone()),
            _ => rest.push(card.clone()),
        }
    }

    tracing::debug!(
        "Due queue: {} failed, {} marginal, {} other",
        failed.len(),
        marginal.len(),
        rest.len()
    );

    failed.extend(marginal);
    failed.extend(rest);
    failed
}

/// Filter cards by tag with OR semantics.
///
/// An empty filter returns every card unchanged in order and content.
/// A card with no tags never matches a non-empty filter.
pub fn select_by_tags(cards: &[Card], tags: &[String]) -> Vec<Card> {
    if tags.is_empty() {
        return cards.to_vec();
    }

    cards
        .iter()
        .filter(|c| c.tags.iter().any(|t| tags.contains(t)))
        .cloned()
        .collect()
}

/// Build a tag-scoped due queue.
///
/// Canonical composition order: filter by due first, then by tag, then
/// prioritize. Both tag-filtered and unfiltered sessions go through this
/// single path so their ordering can never diverge.
pub fn select_due_tagged(
    cards: &[Card],
    tags: &[String],
    now: DateTime<Utc>,
    failed_first: bool,
) -> Vec<Card> {
    let due: Vec<Card> = cards.iter().filter(|c| is_due(c, now)).cloned().collect();
    let tagged = select_by_tags(&due, tags);
    select_due(&tagged, now, failed_first)
}
