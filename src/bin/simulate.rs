use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::Parser;
use deep_dive_rust_server::constants::{SIDE_MARGIN, TICK_MS};
use deep_dive_rust_server::dataset::{parse_dataset, DatasetFormat};
use deep_dive_rust_server::engine::{GameEngine, GameEngineOptions};
use deep_dive_rust_server::types::{Action, GameState, MoveDir, Question, Snapshot};
use serde::Serialize;

const SAMPLE_DATASET: &str = "\
Which gas do divers need most from an air pocket?,Carbon dioxide;Oxygen;Helium,1
What does high turbidity tell you about water?,It is very clear;It is cloudy with particles;It is always safe,1
Which bacteria count closes a beach for swimming?,E. coli;Spirulina;Baker's yeast,0
Roughly how much of Earth's surface is ocean?,About one quarter;About half;About seventy percent,2
What should you check before swimming near a river mouth?,Recent rainfall;Moon phase;Boat names,0
Which of these warms a shallow bay fastest?,Sunlight;Tides;Plankton,0
";

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Base seed for the scenario sweep.
    #[arg(long)]
    seed: Option<u32>,
    /// Seeds per policy.
    #[arg(long)]
    runs: Option<u32>,
    /// Restrict the sweep to one policy (clear, fumble, drown).
    #[arg(long)]
    policy: Option<String>,
    #[arg(long)]
    max_ticks: Option<u64>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum DivePolicy {
    /// Steers pocket to pocket, answers correctly, expects the treasure.
    Clear,
    /// Answers the first question wrong, expects an immediate loss.
    Fumble,
    /// Never enters a pocket, expects the air to run out.
    Drown,
}

impl DivePolicy {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "clear" => Some(Self::Clear),
            "fumble" => Some(Self::Fumble),
            "drown" => Some(Self::Drown),
            _ => None,
        }
    }

    fn expected_final(self) -> GameState {
        match self {
            Self::Clear => GameState::Win,
            Self::Fumble | Self::Drown => GameState::GameOver,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
struct ScenarioResultLine {
    scenario: String,
    seed: u32,
    policy: DivePolicy,
    #[serde(rename = "finalState")]
    final_state: GameState,
    #[serde(rename = "maxDepth")]
    max_depth: f32,
    #[serde(rename = "pocketsCleared")]
    pockets_cleared: usize,
    #[serde(rename = "durationMs")]
    duration_ms: u64,
    ticks: u64,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "startedAtMs")]
    started_at_ms: u64,
    #[serde(rename = "finishedAtMs")]
    finished_at_ms: u64,
    #[serde(rename = "scenarioCount")]
    scenario_count: usize,
    #[serde(rename = "anomalyCount")]
    anomaly_count: usize,
    #[serde(rename = "finalStateCounts")]
    final_state_counts: BTreeMap<String, usize>,
    scenarios: Vec<ScenarioResultLine>,
}

struct PolicyDriver {
    policy: DivePolicy,
    questions: Vec<Question>,
    moving: Option<MoveDir>,
    treasure_center: f32,
}

impl PolicyDriver {
    fn act(&mut self, snapshot: &Snapshot, engine: &mut GameEngine) {
        match snapshot.state {
            GameState::Question => self.answer(snapshot, engine),
            GameState::Intro | GameState::Playing => {
                if self.policy != DivePolicy::Drown && snapshot.enterable_pocket_id.is_some() {
                    engine.apply(Action::EnterPocket);
                    return;
                }
                let target_x = self.target_x(snapshot);
                self.steer(engine, snapshot.player.x, target_x);
            }
            _ => {}
        }
    }

    fn answer(&mut self, snapshot: &Snapshot, engine: &mut GameEngine) {
        let Some(question) = &snapshot.question else {
            return;
        };
        let correct = self
            .questions
            .iter()
            .find(|known| known.text == question.text)
            .map(|known| known.correct)
            .unwrap_or(0);
        let choice = match self.policy {
            DivePolicy::Clear => correct,
            DivePolicy::Fumble => (correct + 1) % question.options.len(),
            DivePolicy::Drown => return,
        };
        engine.apply(Action::SelectOption(choice));
        engine.apply(Action::SubmitAnswer);
    }

    fn target_x(&self, snapshot: &Snapshot) -> f32 {
        if self.policy == DivePolicy::Drown {
            // hug the wall, away from pockets and treasure alike
            return SIDE_MARGIN;
        }
        snapshot
            .pockets
            .iter()
            .filter(|pocket| !pocket.cleared && pocket.y >= snapshot.player.y - 40.0)
            .map(|pocket| pocket.x)
            .next()
            .unwrap_or(self.treasure_center)
    }

    fn steer(&mut self, engine: &mut GameEngine, x: f32, target_x: f32) {
        let desired = if (target_x - x).abs() <= 6.0 {
            None
        } else if target_x > x {
            Some(MoveDir::Right)
        } else {
            Some(MoveDir::Left)
        };
        if desired == self.moving {
            return;
        }
        if let Some(dir) = self.moving {
            engine.apply(Action::MoveStop(dir));
        }
        if let Some(dir) = desired {
            engine.apply(Action::MoveStart(dir));
        }
        self.moving = desired;
    }
}

fn sample_questions() -> Vec<Question> {
    parse_dataset(SAMPLE_DATASET, DatasetFormat::Delimited)
        .expect("embedded dataset parses")
        .questions
}

fn run_scenario(policy: DivePolicy, seed: u32, max_ticks: u64) -> ScenarioResultLine {
    let questions = sample_questions();
    let mut engine = GameEngine::new(questions.clone(), seed, GameEngineOptions::default());
    engine.apply(Action::Start);

    let world = engine.build_world_init();
    let mut driver = PolicyDriver {
        policy,
        questions,
        moving: None,
        treasure_center: world.treasure.x + world.treasure.width * 0.5,
    };

    let mut anomalies = Vec::new();
    let mut last_score = 0.0f32;
    let mut last_cleared = 0usize;
    let mut ticks = 0u64;

    for _ in 0..max_ticks {
        let snapshot = engine.build_snapshot(false);
        driver.act(&snapshot, &mut engine);
        engine.step(TICK_MS);
        ticks += 1;

        let after = engine.build_snapshot(false);
        if !(0.0..=100.0).contains(&after.oxygen) {
            anomalies.push(format!("oxygen out of bounds at tick {ticks}"));
        }
        if after.score + 1e-3 < last_score {
            anomalies.push(format!("score decreased at tick {ticks}"));
        }
        last_score = after.score;

        let cleared = after.pockets.iter().filter(|pocket| pocket.cleared).count();
        if cleared < last_cleared {
            anomalies.push(format!("cleared pocket count shrank at tick {ticks}"));
        }
        last_cleared = cleared;

        if engine.is_terminal() {
            break;
        }
    }

    if !engine.is_terminal() {
        anomalies.push(format!("scenario still running after {ticks} ticks"));
    } else if engine.state() != policy.expected_final() {
        anomalies.push(format!(
            "expected {:?}, finished in {:?}",
            policy.expected_final(),
            engine.state()
        ));
    }

    let summary = engine.build_summary();
    ScenarioResultLine {
        scenario: format!("{policy:?}-{seed}").to_lowercase(),
        seed,
        policy,
        final_state: engine.state(),
        max_depth: summary.max_depth,
        pockets_cleared: summary.pockets_cleared,
        duration_ms: summary.duration_ms,
        ticks,
        anomalies,
    }
}

fn main() {
    let cli = Cli::parse();

    let policies = match cli.policy.as_deref() {
        Some(raw) => match DivePolicy::parse(raw) {
            Some(policy) => vec![policy],
            None => {
                eprintln!("[simulate] unknown policy: {raw} (use clear, fumble or drown)");
                std::process::exit(2);
            }
        },
        None => vec![DivePolicy::Clear, DivePolicy::Fumble, DivePolicy::Drown],
    };
    let runs = cli.runs.unwrap_or(3).max(1);
    let base_seed = cli.seed.unwrap_or(424_242);
    let max_ticks = cli.max_ticks.unwrap_or(5_000);

    let started_at_ms = now_ms();
    let mut scenarios = Vec::new();
    for run in 0..runs {
        let seed = base_seed.wrapping_add(run.wrapping_mul(7_919));
        for &policy in &policies {
            let result = run_scenario(policy, seed, max_ticks);
            println!(
                "{}",
                serde_json::to_string(&result).expect("scenario line serializes")
            );
            scenarios.push(result);
        }
    }

    let mut final_state_counts = BTreeMap::new();
    for scenario in &scenarios {
        let key = format!("{:?}", scenario.final_state).to_lowercase();
        *final_state_counts.entry(key).or_insert(0) += 1;
    }
    let summary = RunSummary {
        started_at_ms,
        finished_at_ms: now_ms(),
        scenario_count: scenarios.len(),
        anomaly_count: scenarios
            .iter()
            .map(|scenario| scenario.anomalies.len())
            .sum(),
        final_state_counts,
        scenarios,
    };

    if let Some(path) = &cli.summary_out {
        match serde_json::to_string_pretty(&summary) {
            Ok(text) => {
                if let Err(error) = std::fs::write(path, text) {
                    eprintln!("[simulate] failed to write {}: {error}", path.display());
                }
            }
            Err(error) => eprintln!("[simulate] failed to serialize summary: {error}"),
        }
    }

    println!(
        "[simulate] {} scenarios, {} anomalies",
        summary.scenario_count, summary.anomaly_count
    );
    if summary.anomaly_count > 0 {
        std::process::exit(1);
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
