use std::fs;
use std::path::{Path, PathBuf};

use plotters::prelude::*;
use statrs::distribution::{ContinuousCDF, Normal};
use thiserror::Error;

use highlow_core::game::GameOver;
use highlow_core::shuffle::weights::DECK_SIZE;
use highlow_core::shuffle::{DrawWeights, ShuffleAlgorithm, WeightClass};

const CONFIDENCE_Z: f64 = 1.96; // 95% CI

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to render plot: {0}")]
    Plot(String),
}

/// First-draw tallies bucketed by weight class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassCounts {
    counts: [usize; 3],
}

impl ClassCounts {
    pub fn record(&mut self, class: WeightClass) {
        self.counts[slot(class)] += 1;
    }

    pub fn count(&self, class: WeightClass) -> usize {
        self.counts[slot(class)]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

fn slot(class: WeightClass) -> usize {
    match class {
        WeightClass::Heart => 0,
        WeightClass::AceOfSpades => 1,
        WeightClass::Standard => 2,
    }
}

/// Expected share of first draws landing in `class` under each algorithm.
pub fn expected_first_draw(algorithm: ShuffleAlgorithm, class: WeightClass) -> f64 {
    match algorithm {
        ShuffleAlgorithm::Uniform => class.size() as f64 / DECK_SIZE as f64,
        ShuffleAlgorithm::Naive => DrawWeights::normalized().share(class),
        ShuffleAlgorithm::Smart => smart_first_draw_share(class),
    }
}

/// The smart shuffle weighs every card individually on its first pick, so a
/// class share is the boosted per-card mass times the class size, renormalized
/// over the full deck.
fn smart_first_draw_share(class: WeightClass) -> f64 {
    let weights = DrawWeights::normalized();
    let mass = |class: WeightClass| class.size() as f64 * weights.smart_weight(class);
    let total: f64 = WeightClass::ALL.iter().copied().map(mass).sum();
    mass(class) / total
}

/// One (algorithm, class) cell of the first-draw frequency table.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyRow {
    pub algorithm: ShuffleAlgorithm,
    pub class: WeightClass,
    pub shuffles: usize,
    pub first_draws: usize,
    pub observed: f64,
    pub expected: f64,
    pub z_score: f64,
    pub p_value: f64,
}

/// Expand a class tally for one algorithm into scored table rows.
pub fn frequency_rows(
    algorithm: ShuffleAlgorithm,
    counts: &ClassCounts,
    shuffles: usize,
) -> Vec<FrequencyRow> {
    WeightClass::ALL
        .iter()
        .map(|&class| {
            let first_draws = counts.count(class);
            let expected = expected_first_draw(algorithm, class);
            let observed = if shuffles == 0 {
                0.0
            } else {
                first_draws as f64 / shuffles as f64
            };
            let z_score = binomial_z(first_draws, shuffles, expected);
            FrequencyRow {
                algorithm,
                class,
                shuffles,
                first_draws,
                observed,
                expected,
                z_score,
                p_value: two_sided_p(z_score),
            }
        })
        .collect()
}

fn binomial_z(observed: usize, trials: usize, expected_p: f64) -> f64 {
    let n = trials as f64;
    let variance = n * expected_p * (1.0 - expected_p);
    if variance <= 0.0 {
        return 0.0;
    }
    (observed as f64 - n * expected_p) / variance.sqrt()
}

fn two_sided_p(z: f64) -> f64 {
    let normal = Normal::new(0.0, 1.0).unwrap();
    let p = 2.0 * (1.0 - normal.cdf(z.abs()));
    p.min(1.0).max(0.0)
}

/// Rolling aggregate over the guessing sessions played with one algorithm.
#[derive(Debug, Clone, Default)]
pub struct SessionStats {
    rounds: Vec<f64>,
    ties: usize,
    wrong_guesses: usize,
    exhausted: usize,
}

impl SessionStats {
    pub fn record(&mut self, rounds_won: u32, outcome: GameOver) {
        self.rounds.push(f64::from(rounds_won));
        match outcome {
            GameOver::Tie => self.ties += 1,
            GameOver::WrongGuess => self.wrong_guesses += 1,
            GameOver::DeckExhausted => self.exhausted += 1,
        }
    }

    pub fn games(&self) -> usize {
        self.rounds.len()
    }

    pub fn mean_rounds(&self) -> f64 {
        if self.rounds.is_empty() {
            return 0.0;
        }
        self.rounds.iter().sum::<f64>() / self.rounds.len() as f64
    }

    pub fn ci95(&self) -> (f64, f64) {
        confidence_interval(&self.rounds)
    }
}

/// Per-algorithm session aggregate carried into the summary.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionReport {
    pub algorithm: ShuffleAlgorithm,
    pub games: usize,
    pub mean_rounds: f64,
    pub ci95: (f64, f64),
    pub ties: usize,
    pub wrong_guesses: usize,
    pub exhausted: usize,
}

impl SessionReport {
    pub fn from_stats(algorithm: ShuffleAlgorithm, stats: &SessionStats) -> Self {
        Self {
            algorithm,
            games: stats.games(),
            mean_rounds: stats.mean_rounds(),
            ci95: stats.ci95(),
            ties: stats.ties,
            wrong_guesses: stats.wrong_guesses,
            exhausted: stats.exhausted,
        }
    }
}

/// Everything one harness run reports on, ready to serialize into artifacts.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub frequencies: Vec<FrequencyRow>,
    pub sessions: Vec<SessionReport>,
}

impl RunReport {
    pub fn write_frequency_csv(&self, path: impl AsRef<Path>) -> Result<(), ReportError> {
        let mut rows =
            String::from("algorithm,class,shuffles,first_draws,observed,expected,z_score,p_value\n");
        for row in &self.frequencies {
            rows.push_str(&format!(
                "{},{},{},{},{:.6},{:.6},{:.3},{:.4}\n",
                row.algorithm,
                row.class.label(),
                row.shuffles,
                row.first_draws,
                row.observed,
                row.expected,
                row.z_score,
                row.p_value,
            ));
        }
        fs::write(path.as_ref(), rows).map_err(|e| ReportError::Io {
            context: "writing frequency csv",
            source: e,
        })?;
        Ok(())
    }

    pub fn write_markdown(&self, path: impl AsRef<Path>) -> Result<(), ReportError> {
        let mut rows = String::new();
        rows.push_str("# Shuffle Bias Summary\n\n");
        rows.push_str("## First-draw class frequencies\n\n");
        rows.push_str("| Algorithm | Class | First draws | Observed | Expected | z | p-value |\n");
        rows.push_str("|-----------|-------|-------------|----------|----------|---|---------|\n");

        for row in &self.frequencies {
            rows.push_str(&format!(
                "| {algorithm} | {class} | {draws}/{shuffles} | {observed:.4} | {expected:.4} | {z:+.2} | {pval:.3} |\n",
                algorithm = row.algorithm,
                class = row.class,
                draws = row.first_draws,
                shuffles = row.shuffles,
                observed = row.observed,
                expected = row.expected,
                z = row.z_score,
                pval = row.p_value,
            ));
        }

        if !self.sessions.is_empty() {
            rows.push_str("\n## High-low sessions\n\n");
            rows.push_str("| Algorithm | Games | Avg rounds won | 95% CI | Ties | Wrong | Deck out |\n");
            rows.push_str("|-----------|-------|----------------|--------|------|-------|----------|\n");

            for session in &self.sessions {
                rows.push_str(&format!(
                    "| {algorithm} | {games} | {avg:.3} | [{ci_low:.3}, {ci_high:.3}] | {ties} | {wrong} | {out} |\n",
                    algorithm = session.algorithm,
                    games = session.games,
                    avg = session.mean_rounds,
                    ci_low = session.ci95.0,
                    ci_high = session.ci95.1,
                    ties = session.ties,
                    wrong = session.wrong_guesses,
                    out = session.exhausted,
                ));
            }
        }

        fs::write(path.as_ref(), rows).map_err(|e| ReportError::Io {
            context: "writing summary markdown",
            source: e,
        })?;
        Ok(())
    }

    pub fn render_plot(&self, dir: impl AsRef<Path>) -> Result<PathBuf, ReportError> {
        let dir = dir.as_ref();
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir).map_err(|e| ReportError::Io {
                context: "creating plots directory",
                source: e,
            })?;
        }

        let output_path = dir.join("first_draw_frequency.png");
        let rows_snapshot = self.frequencies.clone();

        let prev_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(|_| {}));

        let plot_attempt = std::panic::catch_unwind(move || {
            let root = BitMapBackend::new(&output_path, (800, 480)).into_drawing_area();
            root.fill(&WHITE)
                .map_err(|e| ReportError::Plot(e.to_string()))?;

            let rows = rows_snapshot;
            let y_max = rows
                .iter()
                .map(|row| row.observed.max(row.expected))
                .fold(0.0f64, |acc, v| acc.max(v));
            let headroom = (y_max * 0.1).max(0.05);

            let mut chart = ChartBuilder::on(&root)
                .margin(20)
                .caption(
                    "First-draw frequency (bar observed, tick expected)",
                    ("sans-serif", 22),
                )
                .set_label_area_size(LabelAreaPosition::Left, 50)
                .set_label_area_size(LabelAreaPosition::Bottom, 60)
                .build_cartesian_2d(0..rows.len(), 0.0..(y_max + headroom))
                .map_err(|e| ReportError::Plot(e.to_string()))?;

            chart
                .configure_mesh()
                .disable_mesh()
                .y_desc("First-draw frequency")
                .x_desc("Algorithm / class")
                .x_label_formatter(&|idx| {
                    rows.get(*idx)
                        .map(|row| format!("{}/{}", row.algorithm, row.class))
                        .unwrap_or_default()
                })
                .draw()
                .map_err(|e| ReportError::Plot(e.to_string()))?;

            chart
                .draw_series(rows.iter().enumerate().map(|(idx, row)| {
                    let color = match row.class {
                        WeightClass::Heart => &RED,
                        WeightClass::AceOfSpades => &BLUE,
                        WeightClass::Standard => &GREEN,
                    };
                    Rectangle::new([(idx, 0.0), (idx + 1, row.observed)], color.filled())
                }))
                .map_err(|e| ReportError::Plot(e.to_string()))?;

            chart
                .draw_series(rows.iter().enumerate().map(|(idx, row)| {
                    PathElement::new(
                        vec![(idx, row.expected), (idx + 1, row.expected)],
                        BLACK.stroke_width(2),
                    )
                }))
                .map_err(|e| ReportError::Plot(e.to_string()))?;

            drop(chart);

            root.present()
                .map_err(|e| ReportError::Plot(e.to_string()))?;

            drop(root);

            Ok(output_path)
        });

        std::panic::set_hook(prev_hook);

        match plot_attempt {
            Ok(result) => result,
            Err(_) => Err(ReportError::Plot(
                "plotters panicked while rendering (missing font support?)".into(),
            )),
        }
    }
}

fn confidence_interval(points: &[f64]) -> (f64, f64) {
    if points.is_empty() {
        return (0.0, 0.0);
    }
    let mean = points.iter().sum::<f64>() / points.len() as f64;
    if points.len() == 1 {
        return (mean, mean);
    }
    let variance = points
        .iter()
        .map(|value| (value - mean).powi(2))
        .sum::<f64>()
        / (points.len() as f64 - 1.0);
    let std_error = (variance / points.len() as f64).sqrt();
    let margin = CONFIDENCE_Z * std_error;
    (mean - margin, mean + margin)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expected_shares_sum_to_one_for_every_algorithm() {
        for algorithm in ShuffleAlgorithm::ALL {
            let total: f64 = WeightClass::ALL
                .iter()
                .map(|&class| expected_first_draw(algorithm, class))
                .sum();
            assert!((total - 1.0).abs() < 1e-9, "{algorithm}: {total}");
        }
    }

    #[test]
    fn naive_expectations_follow_the_weight_model() {
        let weights = DrawWeights::normalized();
        for class in WeightClass::ALL {
            assert_eq!(
                expected_first_draw(ShuffleAlgorithm::Naive, class),
                weights.share(class)
            );
        }
    }

    #[test]
    fn smart_expectations_shift_mass_from_the_ace_to_hearts() {
        let heart = expected_first_draw(ShuffleAlgorithm::Smart, WeightClass::Heart);
        let ace = expected_first_draw(ShuffleAlgorithm::Smart, WeightClass::AceOfSpades);
        assert!(heart > expected_first_draw(ShuffleAlgorithm::Naive, WeightClass::Heart));
        assert!(ace < expected_first_draw(ShuffleAlgorithm::Uniform, WeightClass::AceOfSpades));
    }

    #[test]
    fn matching_counts_produce_zero_z_scores() {
        let mut counts = ClassCounts::default();
        for _ in 0..13 {
            counts.record(WeightClass::Heart);
        }
        counts.record(WeightClass::AceOfSpades);
        for _ in 0..38 {
            counts.record(WeightClass::Standard);
        }
        assert_eq!(counts.total(), 52);

        let rows = frequency_rows(ShuffleAlgorithm::Uniform, &counts, 52);
        for row in &rows {
            assert!(row.z_score.abs() < 1e-9, "{}: {}", row.class, row.z_score);
            assert!((row.p_value - 1.0).abs() < 1e-9, "{}", row.class);
        }
    }

    #[test]
    fn skewed_counts_produce_signed_z_scores() {
        let mut counts = ClassCounts::default();
        for _ in 0..40 {
            counts.record(WeightClass::Heart);
        }
        for _ in 0..60 {
            counts.record(WeightClass::Standard);
        }

        let rows = frequency_rows(ShuffleAlgorithm::Uniform, &counts, 100);
        let heart = rows.iter().find(|r| r.class == WeightClass::Heart).unwrap();
        let ace = rows
            .iter()
            .find(|r| r.class == WeightClass::AceOfSpades)
            .unwrap();
        assert!(heart.z_score > 2.0, "hearts over-represented: {}", heart.z_score);
        assert!(ace.z_score < 0.0, "ace absent: {}", ace.z_score);
        assert!(heart.p_value < 0.05);
    }

    #[test]
    fn confidence_interval_handles_degenerate_samples() {
        assert_eq!(confidence_interval(&[]), (0.0, 0.0));
        assert_eq!(confidence_interval(&[4.0]), (4.0, 4.0));

        let (low, high) = confidence_interval(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert!(low < 3.0 && 3.0 < high);
        assert!((low + high - 6.0).abs() < 1e-9);
    }

    #[test]
    fn session_stats_track_outcomes_and_mean() {
        let mut stats = SessionStats::default();
        stats.record(3, GameOver::WrongGuess);
        stats.record(1, GameOver::Tie);
        stats.record(8, GameOver::DeckExhausted);

        let report = SessionReport::from_stats(ShuffleAlgorithm::Naive, &stats);
        assert_eq!(report.games, 3);
        assert!((report.mean_rounds - 4.0).abs() < 1e-9);
        assert_eq!(report.ties, 1);
        assert_eq!(report.wrong_guesses, 1);
        assert_eq!(report.exhausted, 1);
    }

    #[test]
    fn markdown_summary_lists_every_section() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("summary.md");

        let mut counts = ClassCounts::default();
        counts.record(WeightClass::Heart);
        let mut stats = SessionStats::default();
        stats.record(2, GameOver::Tie);

        let report = RunReport {
            frequencies: frequency_rows(ShuffleAlgorithm::Naive, &counts, 1),
            sessions: vec![SessionReport::from_stats(ShuffleAlgorithm::Naive, &stats)],
        };
        report.write_markdown(&path).expect("write markdown");

        let text = fs::read_to_string(&path).expect("read markdown");
        assert!(text.contains("# Shuffle Bias Summary"));
        assert!(text.contains("| naive | heart |"));
        assert!(text.contains("## High-low sessions"));
    }

    #[test]
    fn frequency_csv_has_one_row_per_class() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("frequency.csv");

        let counts = ClassCounts::default();
        let report = RunReport {
            frequencies: frequency_rows(ShuffleAlgorithm::Uniform, &counts, 0),
            sessions: Vec::new(),
        };
        report.write_frequency_csv(&path).expect("write csv");

        let text = fs::read_to_string(&path).expect("read csv");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 1 + WeightClass::ALL.len());
        assert!(lines[0].starts_with("algorithm,class"));
        assert!(lines[1].starts_with("uniform,heart"));
    }
}
