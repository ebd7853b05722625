//! Career simulation driver
//!
//! Plays a session against a content pack with a seeded choice policy and
//! writes one JSON line per turn. Useful for balancing content and for
//! checking that a pack never strands the player.

use clap::Parser;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::error::Error;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use career_engine::{default_config_toml, Engine, EngineConfig, Notification, ScenarioSource};
use career_state::{fixtures, ContentPack, GameState, STARTING_ROLE};

/// Command line arguments for the simulation
#[derive(Parser, Debug)]
#[command(name = "career_sim")]
#[command(about = "Plays a deterministic career simulation session")]
struct Args {
    /// Content pack JSON (defaults to the built-in sample pack)
    #[arg(long)]
    content: Option<PathBuf>,

    /// Engine configuration TOML
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the default configuration and exit
    #[arg(long)]
    print_default_config: bool,

    /// Number of turns to play
    #[arg(long, default_value_t = 50)]
    turns: u32,

    /// Seed for the choice policy
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Character name (feeds scenario selection)
    #[arg(long, default_value = "Ada")]
    name: String,

    /// Starting role
    #[arg(long, default_value = STARTING_ROLE)]
    role: String,

    /// Turn log output (JSON lines)
    #[arg(long, default_value = "output/turns.jsonl")]
    output: PathBuf,

    /// Write the final state here
    #[arg(long)]
    save_state: Option<PathBuf>,

    /// Resume from a saved state instead of starting fresh
    #[arg(long)]
    resume: Option<PathBuf>,
}

/// One line of the turn log.
#[derive(Debug, Serialize)]
struct TurnRecord {
    turn: u32,
    source: ScenarioSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    scenario_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    choice_id: Option<String>,
    stage: u32,
    progress: u32,
    months: f64,
    savings: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    notifications: Vec<Notification>,
}

/// What a finished run produced.
#[derive(Debug)]
struct RunSummary {
    turns_presented: u32,
    turns_idle: u32,
    state: GameState,
}

fn load_state(path: &Path) -> Result<GameState, Box<dyn Error>> {
    let json = fs::read_to_string(path)?;
    Ok(GameState::from_json(&json)?)
}

fn run(args: &Args) -> Result<RunSummary, Box<dyn Error>> {
    let config = match &args.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };
    let content = match &args.content {
        Some(path) => ContentPack::from_file(path)?,
        None => fixtures::sample_content(),
    };
    let engine = Engine::new(config, content);

    let mut state = match &args.resume {
        Some(path) => {
            let state = load_state(path)?;
            tracing::info!(turn = state.turn, path = %path.display(), "Resumed session");
            state
        }
        None => engine.new_game(&args.name, &args.role),
    };

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut out = BufWriter::new(File::create(&args.output)?);
    let mut policy = SmallRng::seed_from_u64(args.seed);
    let mut presented = 0;
    let mut idle = 0;

    for _ in 0..args.turns {
        let next = engine.next_scenario(&state);
        let pick = next.scenario.as_ref().and_then(|view| {
            if view.choices.is_empty() {
                return None;
            }
            let choice = &view.choices[policy.gen_range(0..view.choices.len())];
            Some((view.id.to_string(), view.title.to_string(), choice.id.clone()))
        });
        let source = next.source;
        let mut notifications = next.notifications;
        state = next.state;

        let record = match pick {
            Some((scenario_id, title, choice_id)) => {
                let outcome = engine.submit_turn(&state, &scenario_id, &choice_id)?;
                state = outcome.state;
                notifications.extend(outcome.notifications);
                presented += 1;
                TurnRecord {
                    turn: state.turn,
                    source,
                    scenario_id: Some(scenario_id),
                    title: Some(title),
                    choice_id: Some(choice_id),
                    stage: state.stage,
                    progress: state.progress,
                    months: state.months_elapsed,
                    savings: state.stats.savings,
                    notifications,
                }
            }
            None => {
                idle += 1;
                TurnRecord {
                    turn: state.turn,
                    source,
                    scenario_id: None,
                    title: None,
                    choice_id: None,
                    stage: state.stage,
                    progress: state.progress,
                    months: state.months_elapsed,
                    savings: state.stats.savings,
                    notifications,
                }
            }
        };

        serde_json::to_writer(&mut out, &record)?;
        writeln!(out)?;
    }
    out.flush()?;

    if let Some(path) = &args.save_state {
        fs::write(path, state.to_json()?)?;
        tracing::info!(path = %path.display(), "Saved state");
    }

    Ok(RunSummary {
        turns_presented: presented,
        turns_idle: idle,
        state,
    })
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    if args.print_default_config {
        print!("{}", default_config_toml());
        return;
    }

    match run(&args) {
        Ok(summary) => {
            let s = &summary.state;
            tracing::info!(
                presented = summary.turns_presented,
                idle = summary.turns_idle,
                stage = s.stage,
                progress = s.progress,
                role = %s.role,
                savings = s.stats.savings,
                achievements = s.achievements.len(),
                "Session complete"
            );
            println!("Turn log written to {}", args.output.display());
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["career_sim"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn test_run_writes_one_line_per_turn() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("log/turns.jsonl");
        let a = args(&["--turns", "12", "--output", output.to_str().unwrap()]);

        let summary = run(&a).unwrap();

        let log = fs::read_to_string(&output).unwrap();
        assert_eq!(log.lines().count(), 12);
        assert_eq!(summary.turns_presented + summary.turns_idle, 12);
        for line in log.lines() {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            assert!(value.get("source").is_some());
        }
    }

    #[test]
    fn test_run_is_deterministic() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("a.jsonl");
        let second = dir.path().join("b.jsonl");

        run(&args(&["--turns", "25", "--output", first.to_str().unwrap()])).unwrap();
        run(&args(&["--turns", "25", "--output", second.to_str().unwrap()])).unwrap();

        assert_eq!(
            fs::read_to_string(first).unwrap(),
            fs::read_to_string(second).unwrap()
        );
    }

    #[test]
    fn test_save_and_resume() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("turns.jsonl");
        let saved = dir.path().join("state.json");

        let first = run(&args(&[
            "--turns",
            "8",
            "--output",
            output.to_str().unwrap(),
            "--save-state",
            saved.to_str().unwrap(),
        ]))
        .unwrap();

        assert_eq!(load_state(&saved).unwrap(), first.state);

        let resumed = run(&args(&[
            "--turns",
            "8",
            "--output",
            output.to_str().unwrap(),
            "--resume",
            saved.to_str().unwrap(),
        ]))
        .unwrap();

        assert_eq!(
            resumed.state.history.len(),
            first.state.history.len() + resumed.turns_presented as usize
        );
    }

    #[test]
    fn test_missing_content_is_error() {
        let dir = tempdir().unwrap();
        let a = args(&[
            "--content",
            dir.path().join("missing.json").to_str().unwrap(),
            "--output",
            dir.path().join("t.jsonl").to_str().unwrap(),
        ]);

        assert!(run(&a).is_err());
    }
}
