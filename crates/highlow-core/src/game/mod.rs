pub mod serialization;
pub mod session;

pub use serialization::GameSnapshot;
pub use session::{GameError, GameOver, GamePhase, Guess, HighLowGame, RoundOutcome, RoundReport};
