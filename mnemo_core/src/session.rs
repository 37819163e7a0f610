//! Per-card re-review session state machine.
//!
//! A session walks an ordered due queue. Every rating triggers a full
//! scheduling update; a rating below 4 keeps the same card in front of
//! the user until an acceptable rating lands. The machine is iterative
//! and driven entirely by the caller, so a scripted rating sequence can
//! exercise it headlessly.

use crate::{apply_review, Card, Error, Rating, Result};
use chrono::{DateTime, Utc};
use std::collections::VecDeque;

/// Where the session currently stands
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// A card is in front of the user for the first time this visit
    Presenting,
    /// The current card was just rated below 4 and is shown again
    Requeued,
    /// The queue is exhausted
    Done,
}

/// Transition produced by a single rating
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStep {
    /// Rating below 4: the same card stays current, with updated state
    Requeued,
    /// The card is finished and the next one is up
    NextCard,
    /// The card is finished and the queue is empty
    Finished,
}

/// A review session over an ordered queue of due cards
#[derive(Debug)]
pub struct ReviewSession {
    queue: VecDeque<Card>,
    current: Option<Card>,
    reviewed: Vec<Card>,
    state: SessionState,
}

impl ReviewSession {
    /// Start a session over a queue, typically from `select_due_tagged`
    pub fn new(queue: Vec<Card>) -> Self {
        let mut queue: VecDeque<Card> = queue.into();
        let current = queue.pop_front();
        let state = if current.is_some() {
            SessionState::Presenting
        } else {
            SessionState::Done
        };

        Self {
            queue,
            current,
            reviewed: Vec::new(),
            state,
        }
    }

    /// The card currently in front of the user.
    ///
    /// While requeued this is the just-updated card, so repeated ratings
    /// keep compounding its scheduling state.
    pub fn current(&self) -> Option<&Card> {
        self.current.as_ref()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        self.state == SessionState::Done
    }

    /// Cards still waiting, including the one being presented
    pub fn remaining(&self) -> usize {
        self.queue.len() + usize::from(self.current.is_some())
    }

    /// Final states of the cards completed so far
    pub fn reviewed(&self) -> &[Card] {
        &self.reviewed
    }

    /// Rate the current card.
    ///
    /// Runs the full scheduling update and returns the updated card
    /// snapshot for immediate persistence, along with the transition.
    /// The rest of the queue is untouched by a card stuck in re-review.
    pub fn rate(&mut self, rating: Rating, now: DateTime<Utc>) -> Result<(Card, SessionStep)> {
        let card = self.current.take().ok_or(Error::SessionDone)?;

        let outcome = apply_review(&card, rating, now);

        if outcome.needs_rereview {
            self.current = Some(outcome.card.clone());
            self.state = SessionState::Requeued;
            return Ok((outcome.card, SessionStep::Requeued));
        }

        self.reviewed.push(outcome.card.clone());
        self.current = self.queue.pop_front();
        self.state = if self.current.is_some() {
            SessionState::Presenting
        } else {
            SessionState::Done
        };

        let step = if self.is_done() {
            SessionStep::Finished
        } else {
            SessionStep::NextCard
        };
        Ok((outcome.card, step))
    }

    /// Consume the session, yielding the completed cards in review order
    pub fn into_reviewed(self) -> Vec<Card> {
        self.reviewed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rating(value: u8) -> Rating {
        Rating::new(value).unwrap()
    }

    fn cards(n: usize, now: DateTime<Utc>) -> Vec<Card> {
        (0..n)
            .map(|i| Card::new(format!("q{}", i), format!("a{}", i), vec![], now))
            .collect()
    }

    #[test]
    fn test_empty_queue_starts_done() {
        let session = ReviewSession::new(vec![]);
        assert!(session.is_done());
        assert!(session.current().is_none());
        assert_eq!(session.remaining(), 0);
    }

    #[test]
    fn test_rating_after_done_is_an_error() {
        let mut session = ReviewSession::new(vec![]);
        let result = session.rate(rating(5), Utc::now());
        assert!(matches!(result, Err(Error::SessionDone)));
    }

    #[test]
    fn test_good_ratings_walk_the_queue() {
        let now = Utc::now();
        let mut session = ReviewSession::new(cards(2, now));

        let (_, step) = session.rate(rating(5), now).unwrap();
        assert_eq!(step, SessionStep::NextCard);
        assert_eq!(session.state(), SessionState::Presenting);

        let (_, step) = session.rate(rating(4), now).unwrap();
        assert_eq!(step, SessionStep::Finished);
        assert!(session.is_done());
        assert_eq!(session.reviewed().len(), 2);
    }

    #[test]
    fn test_low_rating_requeues_same_card() {
        let now = Utc::now();
        let mut session = ReviewSession::new(cards(2, now));
        let first_id = session.current().unwrap().id;

        let (updated, step) = session.rate(rating(2), now).unwrap();
        assert_eq!(step, SessionStep::Requeued);
        assert_eq!(session.state(), SessionState::Requeued);
        assert_eq!(session.current().unwrap().id, first_id);
        assert_eq!(updated.id, first_id);

        // Queue behind the stuck card is untouched
        assert_eq!(session.remaining(), 2);
    }

    #[test]
    fn test_rereview_repeats_until_rating_four() {
        let now = Utc::now();
        let mut session = ReviewSession::new(cards(1, now));

        // Scripted struggle: 1, 3, 3, then 4 releases the card
        for value in [1, 3, 3] {
            let (_, step) = session.rate(rating(value), now).unwrap();
            assert_eq!(step, SessionStep::Requeued);
        }

        let (card, step) = session.rate(rating(4), now).unwrap();
        assert_eq!(step, SessionStep::Finished);
        assert!(session.is_done());

        // Every iteration was a full review
        let history: Vec<u8> = card.performance_history.iter().map(|r| r.value()).collect();
        assert_eq!(history, vec![1, 3, 3, 4]);
    }

    #[test]
    fn test_each_rereview_recomputes_schedule() {
        let now = Utc::now();
        let mut session = ReviewSession::new(cards(1, now));

        let (after_fail, _) = session.rate(rating(1), now).unwrap();
        assert_eq!(after_fail.repetition, 0);
        assert_eq!(after_fail.interval_days, 1);
        let ef_after_fail = after_fail.ease_factor;

        // Rating 3 succeeds: repetition restarts from the failed state
        let (after_marginal, _) = session.rate(rating(3), now).unwrap();
        assert_eq!(after_marginal.repetition, 1);
        assert_eq!(after_marginal.interval_days, 1);
        assert!(after_marginal.ease_factor < ef_after_fail);
    }

    #[test]
    fn test_into_reviewed_preserves_completion_order() {
        let now = Utc::now();
        let queue = cards(3, now);
        let ids: Vec<_> = queue.iter().map(|c| c.id).collect();
        let mut session = ReviewSession::new(queue);

        session.rate(rating(5), now).unwrap();
        session.rate(rating(2), now).unwrap(); // second card requeued once
        session.rate(rating(5), now).unwrap();
        session.rate(rating(4), now).unwrap();

        let reviewed = session.into_reviewed();
        let reviewed_ids: Vec<_> = reviewed.iter().map(|c| c.id).collect();
        assert_eq!(reviewed_ids, ids);
    }
}
