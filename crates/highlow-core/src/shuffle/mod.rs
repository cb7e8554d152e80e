pub mod naive;
pub mod partition;
pub mod reservoir;
pub mod smart;
pub mod weights;

pub use naive::{naive_biased_shuffle, naive_biased_shuffle_with_seed};
pub use partition::DeckPartition;
pub use reservoir::WeightedReservoir;
pub use smart::{smart_biased_shuffle, smart_biased_shuffle_with_seed};
pub use weights::{DrawWeights, SMART_HEART_BOOST, WeightClass};

use crate::model::card::Card;
use crate::model::deck::Deck;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Errors raised by the biased shuffles. The first three are precondition
/// violations in the caller's deck; the last two indicate engine bugs and are
/// surfaced instead of being papered over with a partial result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShuffleError {
    WrongDeckSize { found: usize },
    DuplicateCard(Card),
    MissingAceOfSpades,
    StacksExhausted { drawn: usize },
    SelectorExhausted { drawn: usize },
}

impl fmt::Display for ShuffleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShuffleError::WrongDeckSize { found } => {
                write!(f, "expected a 52 card deck, found {found} cards")
            }
            ShuffleError::DuplicateCard(card) => write!(f, "deck contains {card} more than once"),
            ShuffleError::MissingAceOfSpades => {
                write!(f, "deck does not contain the ace of spades")
            }
            ShuffleError::StacksExhausted { drawn } => {
                write!(f, "all class stacks ran out after {drawn} draws")
            }
            ShuffleError::SelectorExhausted { drawn } => {
                write!(f, "weighted selector ran out after {drawn} draws")
            }
        }
    }
}

impl std::error::Error for ShuffleError {}

/// Selects which shuffle feeds a game session or a trial run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShuffleAlgorithm {
    Uniform,
    Naive,
    Smart,
}

impl ShuffleAlgorithm {
    pub const ALL: [ShuffleAlgorithm; 3] = [
        ShuffleAlgorithm::Uniform,
        ShuffleAlgorithm::Naive,
        ShuffleAlgorithm::Smart,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            ShuffleAlgorithm::Uniform => "uniform",
            ShuffleAlgorithm::Naive => "naive",
            ShuffleAlgorithm::Smart => "smart",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "uniform" => Some(ShuffleAlgorithm::Uniform),
            "naive" => Some(ShuffleAlgorithm::Naive),
            "smart" => Some(ShuffleAlgorithm::Smart),
            _ => None,
        }
    }

    /// Runs the selected shuffle against `deck`. The uniform arm is the
    /// trusted baseline and skips the biased-path deck validation.
    pub fn shuffle<R: rand::Rng + ?Sized>(
        self,
        deck: &Deck,
        rng: &mut R,
    ) -> Result<Deck, ShuffleError> {
        match self {
            ShuffleAlgorithm::Uniform => {
                let mut copy = deck.clone();
                copy.shuffle_in_place(rng);
                Ok(copy)
            }
            ShuffleAlgorithm::Naive => naive_biased_shuffle(deck, rng),
            ShuffleAlgorithm::Smart => smart_biased_shuffle(deck, rng),
        }
    }
}

impl fmt::Display for ShuffleAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
