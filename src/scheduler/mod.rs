//! Study session scheduling.
//!
//! A session works on a private copy of a deck. Cards are shuffled once at the start and
//! then served from the front of the `remaining` queue. After every grade:
//! - a correct card is retired with probability 0.8, otherwise requeued,
//! - an incorrect card is always requeued,
//! - requeued cards go to a uniformly random slot of the rest of the queue (front included).
//!
//! The session ends when the queue is empty. Statistics are written back to the
//! [`DeckStore`] after each grade, in the deck's creation order.

pub mod shuffle;

use crate::database::{DeckStore, StoreError};
use crate::models::{Card, Deck, Progress};
use log::{debug, info, warn};
use rand::Rng;
use std::collections::VecDeque;
use thiserror::Error;
use uuid::Uuid;

use shuffle::{requeue_index, should_retire};

#[derive(Error, Debug)]
pub enum StudyError {
    #[error("Deck not found: {0}")]
    DeckNotFound(Uuid),

    #[error("Deck {0} has no cards")]
    EmptyDeck(Uuid),

    /// The grade is applied to the session, only the durable copy is stale.
    #[error("Could not save statistics for deck {deck_id}: {source}")]
    PersistenceWriteFailed {
        deck_id: Uuid,
        #[source]
        source: StoreError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What the caller should show after a grade.
#[derive(Debug, Clone, PartialEq)]
pub enum GradeOutcome {
    Next(Card),
    Finished,
    /// No session was running; nothing changed.
    NoSession,
}

impl GradeOutcome {
    pub fn card(&self) -> Option<&Card> {
        match self {
            GradeOutcome::Next(card) => Some(card),
            _ => None,
        }
    }
}

/// Cards are referenced by their index in `deck.cards`.
struct Session {
    deck: Deck,
    remaining: VecDeque<usize>,
    completed: Vec<usize>,
    active: bool,
}

pub struct SessionScheduler<S, R> {
    store: S,
    rng: R,
    session: Option<Session>,
}

impl<S: DeckStore, R: Rng> SessionScheduler<S, R> {
    pub fn new(store: S, rng: R) -> Self {
        Self {
            store,
            rng,
            session: None,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Starts studying a copy of `deck`, replacing any running session.
    pub fn start(&mut self, deck: &Deck) -> Result<&Card, StudyError> {
        if deck.is_empty() {
            warn!("Deck '{}' has no cards, session not started", deck.title);
            self.session = None;
            return Err(StudyError::EmptyDeck(deck.id));
        }

        let mut order: Vec<usize> = (0..deck.len()).collect();
        shuffle::shuffle(&mut order, &mut self.rng);

        info!("Study session started for '{}' ({} cards)", deck.title, deck.len());
        self.session = Some(Session {
            deck: deck.clone(),
            remaining: order.into(),
            completed: Vec::new(),
            active: true,
        });

        self.current_card().ok_or(StudyError::EmptyDeck(deck.id))
    }

    /// Resolves the deck through the store and starts it.
    ///
    /// A missing deck leaves the scheduler as it was.
    pub fn start_by_id(&mut self, id: Uuid) -> Result<&Card, StudyError> {
        let deck = self
            .store
            .load_deck(id)?
            .ok_or(StudyError::DeckNotFound(id))?;
        self.start(&deck)
    }

    pub fn current_card(&self) -> Option<&Card> {
        let session = self.session.as_ref().filter(|s| s.active)?;
        let &head = session.remaining.front()?;
        session.deck.cards.get(head)
    }

    /// Grades the card at the front of the queue and writes the statistics back.
    ///
    /// On `PersistenceWriteFailed` the session has still advanced; use
    /// [`current_card`](Self::current_card) to continue.
    pub fn grade(&mut self, is_correct: bool) -> Result<GradeOutcome, StudyError> {
        let Some(session) = self.session.as_mut().filter(|s| s.active) else {
            return Ok(GradeOutcome::NoSession);
        };
        let Some(head) = session.remaining.pop_front() else {
            session.active = false;
            return Ok(GradeOutcome::NoSession);
        };

        let card = &mut session.deck.cards[head];
        card.record_grade(is_correct);
        debug!(
            "Graded '{}' as {} ({}/{} correct)",
            card.question,
            if is_correct { "correct" } else { "incorrect" },
            card.correct_attempts,
            card.attempts
        );

        if is_correct && should_retire(&mut self.rng) {
            session.completed.push(head);
        } else {
            let k = requeue_index(session.remaining.len(), &mut self.rng);
            session.remaining.insert(k, head);
        }

        let outcome = match session.remaining.front() {
            Some(&next) => GradeOutcome::Next(session.deck.cards[next].clone()),
            None => {
                session.active = false;
                info!("Study session for '{}' finished", session.deck.title);
                GradeOutcome::Finished
            }
        };

        let deck_id = session.deck.id;
        if let Err(source) = self.store.save_cards(deck_id, &session.deck.cards) {
            warn!("Failed to save statistics for deck {}: {}", deck_id, source);
            return Err(StudyError::PersistenceWriteFailed { deck_id, source });
        }

        Ok(outcome)
    }

    /// `None` unless a session is running.
    pub fn progress(&self) -> Option<Progress> {
        let session = self.session.as_ref().filter(|s| s.active)?;
        Some(Progress {
            total: session.completed.len() + session.remaining.len(),
            completed: session.completed.len(),
            remaining: session.remaining.len(),
        })
    }

    pub fn is_active(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.active)
    }

    /// Id of the deck studied by the current or last session.
    pub fn deck_id(&self) -> Option<Uuid> {
        self.session.as_ref().map(|s| s.deck.id)
    }

    /// The session's working copy, with the statistics gathered so far.
    pub fn working_deck(&self) -> Option<&Deck> {
        self.session.as_ref().map(|s| &s.deck)
    }
}
