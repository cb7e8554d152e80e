use std::fs;

use highlow_bench::config::BiasBenchConfig;
use highlow_bench::trials::TrialRunner;
use tempfile::tempdir;

fn load_config(output_dir: &std::path::Path) -> BiasBenchConfig {
    let yaml = format!(
        r#"
run_id: "test_smoke"
trials:
  seed: 4242
  shuffles: 64
  games: 4
algorithms:
  - "uniform"
  - "naive"
  - "smart"
outputs:
  frequency_csv: "{frequency}"
  sessions_jsonl: "{sessions}"
  summary_md: "{summary}"
  plots_dir: "{plots}"
logging:
  enable_structured: false
"#,
        frequency = output_dir.join("frequency.csv").display(),
        sessions = output_dir.join("sessions.jsonl").display(),
        summary = output_dir.join("summary.md").display(),
        plots = output_dir.join("plots").display()
    );

    let mut cfg: BiasBenchConfig = serde_yaml::from_str(&yaml).expect("valid yaml");
    cfg.validate().expect("config validates");
    cfg
}

#[test]
fn bias_run_smoke_test_produces_all_artifacts() {
    let dir = tempdir().expect("temp dir");
    let config = load_config(dir.path());
    let outputs = config.resolved_outputs();

    let runner = TrialRunner::new(config, outputs);
    let summary = runner.run().expect("trials complete");

    assert_eq!(summary.shuffles_per_algorithm, 64);
    assert_eq!(summary.games_per_algorithm, 4);
    assert_eq!(summary.session_rows_written, 12);

    let csv = fs::read_to_string(&summary.frequency_csv_path).expect("csv readable");
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 1 + 3 * 3, "one row per algorithm and class");
    assert!(lines[0].starts_with("algorithm,class,shuffles,first_draws"));

    // With 64 shuffles every observed frequency is an exact multiple of 1/64,
    // so the per-algorithm sums come out at exactly 1.
    for algorithm in ["uniform", "naive", "smart"] {
        let total: f64 = lines[1..]
            .iter()
            .map(|line| line.split(',').collect::<Vec<_>>())
            .filter(|fields| fields[0] == algorithm)
            .map(|fields| fields[4].parse::<f64>().expect("observed parses"))
            .sum();
        assert!((total - 1.0).abs() < 1e-6, "{algorithm}: {total}");
    }

    let jsonl = fs::read_to_string(&summary.sessions_jsonl_path).expect("jsonl readable");
    assert_eq!(jsonl.lines().count(), 12);
    for line in jsonl.lines() {
        let row: serde_json::Value = serde_json::from_str(line).expect("row decodes to JSON");
        assert_eq!(row["run_id"], "test_smoke");
        assert!(row["game_seed"].as_u64().is_some());
    }

    let markdown = fs::read_to_string(&summary.summary_path).expect("summary readable");
    assert!(markdown.contains("# Shuffle Bias Summary"));
    assert!(markdown.contains("## High-low sessions"));

    // Plot rendering is optional; ensure any failure surfaces explicitly
    if let Some(plot_path) = summary.plot_path {
        assert!(plot_path.exists(), "plot path reported but missing on disk");
    }
}

#[test]
fn runs_with_the_same_seed_produce_identical_artifacts() {
    let first_dir = tempdir().expect("temp dir");
    let second_dir = tempdir().expect("temp dir");

    let first = {
        let config = load_config(first_dir.path());
        let outputs = config.resolved_outputs();
        TrialRunner::new(config, outputs).run().expect("first run")
    };
    let second = {
        let config = load_config(second_dir.path());
        let outputs = config.resolved_outputs();
        TrialRunner::new(config, outputs).run().expect("second run")
    };

    let first_csv = fs::read_to_string(&first.frequency_csv_path).expect("first csv");
    let second_csv = fs::read_to_string(&second.frequency_csv_path).expect("second csv");
    assert_eq!(first_csv, second_csv);

    let first_rows = fs::read_to_string(&first.sessions_jsonl_path).expect("first jsonl");
    let second_rows = fs::read_to_string(&second.sessions_jsonl_path).expect("second jsonl");
    assert_eq!(first_rows, second_rows);
}
