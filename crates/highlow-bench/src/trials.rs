use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use rand::{Rng, RngCore, SeedableRng, rngs::StdRng};
use serde::Serialize;
use thiserror::Error;
use tracing::{Level, event};

use highlow_core::game::{GameError, GameOver, Guess, HighLowGame, RoundOutcome};
use highlow_core::model::Deck;
use highlow_core::shuffle::{ShuffleAlgorithm, ShuffleError, WeightClass};

use crate::config::{BiasBenchConfig, ResolvedOutputs};
use crate::report::{
    ClassCounts, ReportError, RunReport, SessionReport, SessionStats, frequency_rows,
};

/// Primary entry point for orchestrating frequency and session trials.
pub struct TrialRunner {
    config: BiasBenchConfig,
    outputs: ResolvedOutputs,
    logging_enabled: bool,
}

/// Summary details returned after a run.
pub struct RunSummary {
    pub shuffles_per_algorithm: usize,
    pub games_per_algorithm: usize,
    pub session_rows_written: usize,
    pub frequency_csv_path: PathBuf,
    pub sessions_jsonl_path: PathBuf,
    pub summary_path: PathBuf,
    pub plot_path: Option<PathBuf>,
}

/// One line of the sessions JSONL artifact.
#[derive(Debug, Clone, Serialize)]
pub struct SessionRow {
    pub run_id: String,
    pub algorithm: ShuffleAlgorithm,
    pub game_index: usize,
    pub game_seed: u64,
    pub rounds_won: u32,
    pub cards_drawn: usize,
    pub outcome: GameOver,
}

impl TrialRunner {
    /// Build a runner from a validated configuration.
    pub fn new(config: BiasBenchConfig, outputs: ResolvedOutputs) -> Self {
        Self {
            logging_enabled: config.logging.enable_structured,
            config,
            outputs,
        }
    }

    /// Execute every configured trial, streaming session rows to disk.
    pub fn run(&self) -> Result<RunSummary, TrialError> {
        ensure_parent(self.outputs.frequency_csv.parent())?;
        ensure_parent(self.outputs.sessions_jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;
        if !self.outputs.plots_dir.as_os_str().is_empty() {
            fs::create_dir_all(&self.outputs.plots_dir)?;
        }

        let mut rng = StdRng::seed_from_u64(self.config.trials.seed.unwrap_or(0));

        let mut frequencies = Vec::new();
        for &algorithm in &self.config.algorithms {
            let counts = self.run_frequency_trials(algorithm, &mut rng)?;
            frequencies.extend(frequency_rows(
                algorithm,
                &counts,
                self.config.trials.shuffles,
            ));
        }

        let mut writer = BufWriter::new(File::create(&self.outputs.sessions_jsonl)?);
        let mut rows_written = 0usize;
        let mut sessions = Vec::new();
        if self.config.trials.games > 0 {
            for &algorithm in &self.config.algorithms {
                let stats =
                    self.play_sessions(algorithm, &mut rng, &mut writer, &mut rows_written)?;
                sessions.push(SessionReport::from_stats(algorithm, &stats));
            }
        }
        writer.flush()?;

        let report = RunReport {
            frequencies,
            sessions,
        };
        report.write_frequency_csv(&self.outputs.frequency_csv)?;
        report.write_markdown(&self.outputs.summary_md)?;
        let plot_path = match report.render_plot(&self.outputs.plots_dir) {
            Ok(path) => Some(path),
            Err(err) => {
                eprintln!("WARN: {}", err);
                None
            }
        };

        Ok(RunSummary {
            shuffles_per_algorithm: self.config.trials.shuffles,
            games_per_algorithm: self.config.trials.games,
            session_rows_written: rows_written,
            frequency_csv_path: self.outputs.frequency_csv.clone(),
            sessions_jsonl_path: self.outputs.sessions_jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
            plot_path,
        })
    }

    /// Shuffle a fresh deck repeatedly and tally which class lands on top.
    fn run_frequency_trials(
        &self,
        algorithm: ShuffleAlgorithm,
        rng: &mut StdRng,
    ) -> Result<ClassCounts, TrialError> {
        let deck = Deck::standard();
        let mut counts = ClassCounts::default();

        for trial_index in 0..self.config.trials.shuffles {
            let shuffled =
                algorithm
                    .shuffle(&deck, rng)
                    .map_err(|source| TrialError::Shuffle {
                        algorithm,
                        trial_index,
                        source,
                    })?;
            if let Some(&top) = shuffled.cards().first() {
                counts.record(WeightClass::of(top));
            }
        }

        if self.logging_enabled && tracing::enabled!(Level::INFO) {
            event!(
                target: "highlow_bench::frequency",
                Level::INFO,
                run_id = %self.config.run_id,
                algorithm = %algorithm,
                shuffles = self.config.trials.shuffles as u64,
                hearts = counts.count(WeightClass::Heart) as u64,
                aces = counts.count(WeightClass::AceOfSpades) as u64,
                standard = counts.count(WeightClass::Standard) as u64,
            );
        }

        Ok(counts)
    }

    fn play_sessions(
        &self,
        algorithm: ShuffleAlgorithm,
        rng: &mut StdRng,
        writer: &mut BufWriter<File>,
        rows_written: &mut usize,
    ) -> Result<SessionStats, TrialError> {
        let mut stats = SessionStats::default();

        for game_index in 0..self.config.trials.games {
            let game_seed = rng.next_u64();
            let row = self.play_one_session(algorithm, game_index, game_seed, rng)?;
            stats.record(row.rounds_won, row.outcome);
            serde_json::to_writer(&mut *writer, &row)?;
            writer.write_all(b"\n")?;
            *rows_written += 1;
        }

        if self.logging_enabled && tracing::enabled!(Level::INFO) {
            event!(
                target: "highlow_bench::sessions",
                Level::INFO,
                run_id = %self.config.run_id,
                algorithm = %algorithm,
                games = stats.games() as u64,
                mean_rounds = stats.mean_rounds(),
            );
        }

        Ok(stats)
    }

    /// Plays a session to completion with coin-flip guesses drawn from the
    /// harness rng, so the whole run stays reproducible from one seed.
    fn play_one_session(
        &self,
        algorithm: ShuffleAlgorithm,
        game_index: usize,
        game_seed: u64,
        guess_rng: &mut StdRng,
    ) -> Result<SessionRow, TrialError> {
        let mut game = HighLowGame::with_seed(algorithm, game_seed).map_err(|source| {
            TrialError::Shuffle {
                algorithm,
                trial_index: game_index,
                source,
            }
        })?;

        loop {
            match game.reveal() {
                Ok(_) => {}
                Err(GameError::Finished) => break,
                Err(other) => {
                    return Err(TrialError::Game {
                        message: other.to_string(),
                    });
                }
            }

            let guess = if guess_rng.gen_bool(0.5) {
                Guess::Higher
            } else {
                Guess::Lower
            };
            match game.resolve(guess) {
                Ok(report) if report.outcome == RoundOutcome::Correct => {}
                Ok(_) => break,
                Err(GameError::Finished) => break,
                Err(other) => {
                    return Err(TrialError::Game {
                        message: other.to_string(),
                    });
                }
            }
        }

        let outcome = game.outcome().ok_or_else(|| TrialError::Game {
            message: format!("session {game_index} ended without an outcome"),
        })?;

        Ok(SessionRow {
            run_id: self.config.run_id.clone(),
            algorithm,
            game_index,
            game_seed,
            rounds_won: game.rounds_won(),
            cards_drawn: game.cards_drawn(),
            outcome,
        })
    }
}

fn ensure_parent(path: Option<&Path>) -> Result<(), TrialError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

#[derive(Debug, Error)]
pub enum TrialError {
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize session row: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
    #[error("{algorithm} shuffle failed on trial {trial_index}: {source}")]
    Shuffle {
        algorithm: ShuffleAlgorithm,
        trial_index: usize,
        source: ShuffleError,
    },
    #[error("session execution failed: {message}")]
    Game { message: String },
    #[error("report error: {0}")]
    Report(#[from] ReportError),
}
