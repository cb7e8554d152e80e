use crate::model::card::Card;
use crate::model::deck::{Deck, DrawError};
use crate::shuffle::{ShuffleAlgorithm, ShuffleError};
use core::fmt;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// The player's prediction for the hidden card relative to the face-up card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guess {
    Higher,
    Lower,
}

/// How a single round resolved. A tie ends the session just like a wrong
/// guess does; only a correct prediction keeps it alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOutcome {
    Correct,
    Wrong,
    Tie,
}

/// Why a finished session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOver {
    Tie,
    WrongGuess,
    DeckExhausted,
}

impl GameOver {
    pub const fn label(self) -> &'static str {
        match self {
            GameOver::Tie => "tie",
            GameOver::WrongGuess => "wrong_guess",
            GameOver::DeckExhausted => "deck_exhausted",
        }
    }
}

impl fmt::Display for GameOver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    AwaitingDeal,
    AwaitingGuess,
    Finished,
}

/// Everything a caller needs to narrate one resolved round: both cards, the
/// prediction, the outcome, and the face-value and suit-hierarchy orderings
/// of the hidden card relative to the face-up card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundReport {
    pub upcard: Card,
    pub drawn: Card,
    pub guess: Guess,
    pub outcome: RoundOutcome,
    pub face: Ordering,
    pub suit: Ordering,
}

/// A high-or-low session over a deck prepared by one of the shuffle
/// algorithms. Rounds draw two cards: `reveal` turns up the first, `resolve`
/// draws the hidden second card and compares face values (ace low, ties end
/// the session). Both cards retire to the discard pile.
#[derive(Debug, Clone)]
pub struct HighLowGame {
    deck: Deck,
    discard: Vec<Card>,
    upcard: Option<Card>,
    rounds_won: u32,
    outcome: Option<GameOver>,
    algorithm: ShuffleAlgorithm,
    rng: StdRng,
    seed: u64,
}

impl HighLowGame {
    pub fn new(algorithm: ShuffleAlgorithm) -> Result<Self, ShuffleError> {
        Self::with_seed(algorithm, rand::random())
    }

    pub fn with_seed(algorithm: ShuffleAlgorithm, seed: u64) -> Result<Self, ShuffleError> {
        let mut rng = StdRng::seed_from_u64(seed);
        let deck = algorithm.shuffle(&Deck::standard(), &mut rng)?;
        Ok(Self {
            deck,
            discard: Vec::new(),
            upcard: None,
            rounds_won: 0,
            outcome: None,
            algorithm,
            rng,
            seed,
        })
    }

    /// Builds a session over an exact staged deck, bypassing the shuffle.
    /// Meant for tests and replays that need a known card sequence.
    pub fn from_deck(deck: Deck) -> Self {
        Self {
            deck,
            discard: Vec::new(),
            upcard: None,
            rounds_won: 0,
            outcome: None,
            algorithm: ShuffleAlgorithm::Uniform,
            rng: StdRng::seed_from_u64(0),
            seed: 0,
        }
    }

    /// Turns up the next card. The session must be awaiting a deal; drawing
    /// from an exhausted deck finishes the session instead of failing the
    /// deck itself.
    pub fn reveal(&mut self) -> Result<Card, GameError> {
        if self.outcome.is_some() {
            return Err(GameError::Finished);
        }
        if self.upcard.is_some() {
            return Err(GameError::AlreadyRevealed);
        }
        let card = match self.deck.draw_top() {
            Ok(card) => card,
            Err(DrawError::EmptyDeck) => {
                self.outcome = Some(GameOver::DeckExhausted);
                return Err(GameError::Finished);
            }
        };
        self.upcard = Some(card);
        Ok(card)
    }

    /// Draws the hidden card and resolves the round against `guess`. Equal
    /// face values are a tie and end the session; a wrong prediction ends it
    /// too. The suit ordering in the report is informational only.
    pub fn resolve(&mut self, guess: Guess) -> Result<RoundReport, GameError> {
        if self.outcome.is_some() {
            return Err(GameError::Finished);
        }
        let upcard = match self.upcard {
            Some(card) => card,
            None => return Err(GameError::NothingRevealed),
        };
        let drawn = match self.deck.draw_top() {
            Ok(card) => card,
            Err(DrawError::EmptyDeck) => {
                self.discard.push(upcard);
                self.upcard = None;
                self.outcome = Some(GameOver::DeckExhausted);
                return Err(GameError::Finished);
            }
        };

        let face = drawn.rank.cmp(&upcard.rank);
        let suit = drawn.suit.cmp(&upcard.suit);
        let outcome = match (face, guess) {
            (Ordering::Equal, _) => RoundOutcome::Tie,
            (Ordering::Greater, Guess::Higher) | (Ordering::Less, Guess::Lower) => {
                RoundOutcome::Correct
            }
            _ => RoundOutcome::Wrong,
        };

        match outcome {
            RoundOutcome::Correct => self.rounds_won += 1,
            RoundOutcome::Wrong => self.outcome = Some(GameOver::WrongGuess),
            RoundOutcome::Tie => self.outcome = Some(GameOver::Tie),
        }

        self.discard.push(upcard);
        self.discard.push(drawn);
        self.upcard = None;

        Ok(RoundReport {
            upcard,
            drawn,
            guess,
            outcome,
            face,
            suit,
        })
    }

    /// Reshuffles a fresh deck with the session's algorithm and clears all
    /// per-session state. The rng stream continues, so a single seed still
    /// determines the whole multi-deck trajectory.
    pub fn reset(&mut self) -> Result<(), ShuffleError> {
        self.deck = self.algorithm.shuffle(&Deck::standard(), &mut self.rng)?;
        self.discard.clear();
        self.upcard = None;
        self.rounds_won = 0;
        self.outcome = None;
        Ok(())
    }

    pub fn phase(&self) -> GamePhase {
        if self.outcome.is_some() {
            GamePhase::Finished
        } else if self.upcard.is_some() {
            GamePhase::AwaitingGuess
        } else {
            GamePhase::AwaitingDeal
        }
    }

    pub fn remaining(&self) -> usize {
        self.deck.len()
    }

    pub fn discard_pile(&self) -> &[Card] {
        &self.discard
    }

    pub fn upcard(&self) -> Option<Card> {
        self.upcard
    }

    pub fn rounds_won(&self) -> u32 {
        self.rounds_won
    }

    pub fn outcome(&self) -> Option<GameOver> {
        self.outcome
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn algorithm(&self) -> ShuffleAlgorithm {
        self.algorithm
    }

    /// Cards no longer in the deck: the discard pile plus a pending upcard.
    pub fn cards_drawn(&self) -> usize {
        self.discard.len() + usize::from(self.upcard.is_some())
    }

    /// Advances the deck by `count` draws without playing rounds. A trailing
    /// odd draw becomes the pending upcard; everything else retires to the
    /// discard pile.
    pub(crate) fn replay_draws(&mut self, count: usize) {
        for index in 0..count {
            let card = match self.deck.draw_top() {
                Ok(card) => card,
                Err(DrawError::EmptyDeck) => break,
            };
            if index + 1 == count && count % 2 == 1 {
                self.upcard = Some(card);
            } else {
                self.discard.push(card);
            }
        }
    }

    pub(crate) fn restore_progress(&mut self, rounds_won: u32, outcome: Option<GameOver>) {
        self.rounds_won = rounds_won;
        self.outcome = outcome;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameError {
    Finished,
    AlreadyRevealed,
    NothingRevealed,
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::Finished => write!(f, "the session is finished"),
            GameError::AlreadyRevealed => write!(f, "a card is already face up"),
            GameError::NothingRevealed => write!(f, "no card is face up to guess against"),
        }
    }
}

impl std::error::Error for GameError {}
