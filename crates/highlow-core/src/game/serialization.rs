use super::session::{GameOver, HighLowGame};
use crate::shuffle::{ShuffleAlgorithm, ShuffleError};
use serde::{Deserialize, Serialize};

/// Resumable view of a session. The deck itself is never stored; it is
/// re-derived from the seed and algorithm on restore, then advanced by the
/// captured draw count.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameSnapshot {
    pub seed: u64,
    pub algorithm: ShuffleAlgorithm,
    pub cards_drawn: u32,
    pub rounds_won: u32,
    pub outcome: Option<GameOver>,
}

impl GameSnapshot {
    pub fn capture(game: &HighLowGame) -> Self {
        GameSnapshot {
            seed: game.seed(),
            algorithm: game.algorithm(),
            cards_drawn: game.cards_drawn() as u32,
            rounds_won: game.rounds_won(),
            outcome: game.outcome(),
        }
    }

    pub fn restore(self) -> Result<HighLowGame, ShuffleError> {
        let mut game = HighLowGame::with_seed(self.algorithm, self.seed)?;
        game.replay_draws(self.cards_drawn as usize);
        game.restore_progress(self.rounds_won, self.outcome);
        Ok(game)
    }

    pub fn to_json(game: &HighLowGame) -> serde_json::Result<String> {
        let snapshot = Self::capture(game);
        serde_json::to_string_pretty(&snapshot)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
