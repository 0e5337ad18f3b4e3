use std::collections::BTreeSet;

use crate::constants::{
    CAMERA_LEAD_FRACTION, MAX_TICK_MS, NOMINAL_FRAME_MS, OXYGEN_BONUS, OXYGEN_DRAIN_PER_FRAME,
    OXYGEN_MAX, START_DEPTH, START_LIFT, SURFACE_DEPTH, TREASURE_HIT_MARGIN, VIEWPORT_HEIGHT,
    VIEWPORT_WIDTH, WORLD_DEPTH,
};
use crate::types::{
    Action, GameOverReason, GameState, MoveDir, PlayerView, Question, QuestionView, Region,
    RuntimeEvent, SessionSummary, Snapshot, TimelineEvent, WorldInit,
};
use crate::world::{generate_world, GeneratedWorld};

mod physics;
mod proximity;
mod utils;

use self::proximity::{nearest_uncleared, NearestPocket};

const TIMELINE_TAIL: usize = 16;
const SESSION_SEED_STRIDE: u32 = 0x9e37_79b9;

#[derive(Clone, Copy, Debug)]
pub(crate) struct PlayerInternal {
    pub(crate) x: f32,
    pub(crate) y: f32,
    pub(crate) vx: f32,
    pub(crate) vy: f32,
}

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct InputState {
    pub(crate) left: bool,
    pub(crate) right: bool,
}

#[derive(Clone, Debug, Default)]
pub struct GameEngineOptions {
    pub oxygen_drain_override: Option<f32>,
}

/// One player's session: world, state machine, and everything the tick
/// mutates. All methods are synchronous; the host serializes access.
#[derive(Clone, Debug)]
pub struct GameEngine {
    pub world: GeneratedWorld,
    options: GameEngineOptions,
    base_seed: u32,
    session_index: u32,
    state: GameState,
    reason: Option<GameOverReason>,
    player: PlayerInternal,
    input: InputState,
    oxygen: f32,
    score: f32,
    cleared: BTreeSet<usize>,
    active_pocket: Option<usize>,
    question: Option<Question>,
    selected: Option<usize>,
    nearest: Option<NearestPocket>,
    questions: Vec<Question>,
    events: Vec<RuntimeEvent>,
    timeline: Vec<TimelineEvent>,
    elapsed_ms: u64,
    tick_counter: u64,
}

impl GameEngine {
    pub fn new(questions: Vec<Question>, seed: u32, options: GameEngineOptions) -> Self {
        Self {
            world: generate_world(seed),
            options,
            base_seed: seed,
            session_index: 0,
            state: GameState::Menu,
            reason: None,
            player: spawn_player(),
            input: InputState::default(),
            oxygen: OXYGEN_MAX,
            score: 0.0,
            cleared: BTreeSet::new(),
            active_pocket: None,
            question: None,
            selected: None,
            nearest: None,
            questions,
            events: Vec::new(),
            timeline: Vec::new(),
            elapsed_ms: 0,
            tick_counter: 0,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.state, GameState::GameOver | GameState::Win)
    }

    /// Completion callback for dataset loading: swaps the question list in
    /// one assignment. A question already on screen was copied at entry and
    /// keeps its options and answer.
    pub fn install_questions(&mut self, questions: Vec<Question>) {
        self.questions = questions;
    }

    pub fn apply(&mut self, action: Action) {
        match action {
            Action::Start => {
                if self.state == GameState::Menu {
                    self.reset_session();
                }
            }
            Action::Restart => {
                if self.state != GameState::Menu {
                    self.reset_session();
                }
            }
            Action::MoveStart(dir) => self.set_move(dir, true),
            Action::MoveStop(dir) => self.set_move(dir, false),
            Action::TogglePause => match self.state {
                GameState::Playing => self.state = GameState::Paused,
                GameState::Paused => self.state = GameState::Playing,
                _ => {}
            },
            Action::EnterPocket => self.try_enter_pocket(),
            Action::SelectOption(index) => {
                if self.state == GameState::Question {
                    if let Some(question) = &self.question {
                        if index < question.options.len() {
                            self.selected = Some(index);
                        }
                    }
                }
            }
            Action::SubmitAnswer => self.submit_answer(),
            Action::CancelQuestion => {
                if self.state == GameState::Question {
                    self.close_question();
                    self.state = GameState::Playing;
                }
            }
        }
    }

    pub fn step(&mut self, dt_ms: u64) {
        if !matches!(self.state, GameState::Intro | GameState::Playing) {
            return;
        }

        let dt_ms = dt_ms.min(MAX_TICK_MS);
        let dt_norm = dt_ms as f32 / NOMINAL_FRAME_MS;
        self.tick_counter += 1;
        self.elapsed_ms += dt_ms;

        if self.state == GameState::Intro {
            physics::integrate_aerial(&mut self.player, &self.input, dt_norm);
            self.score = self.score.max(self.player.y);
            if self.player.y >= SURFACE_DEPTH {
                self.player.y = SURFACE_DEPTH;
                self.player.vy = 0.0;
                self.state = GameState::Playing;
                self.events.push(RuntimeEvent::Splash);
                self.push_timeline("hit the water");
            }
            self.nearest =
                nearest_uncleared(&self.world.pockets, self.player.x, self.player.y);
            return;
        }

        // Fixed order: physics, oxygen, proximity, then terminal predicates,
        // with oxygen exhaustion winning over the treasure on the same tick.
        physics::integrate_underwater(&mut self.player, &self.input, dt_norm);
        let drain = self
            .options
            .oxygen_drain_override
            .unwrap_or(OXYGEN_DRAIN_PER_FRAME);
        self.oxygen = (self.oxygen - drain * dt_norm).max(0.0);
        self.score = self.score.max(self.player.y);
        self.nearest = nearest_uncleared(&self.world.pockets, self.player.x, self.player.y);

        if self.oxygen <= 0.0 {
            self.reason = Some(GameOverReason::OxygenDepleted);
            self.state = GameState::GameOver;
            self.push_timeline("ran out of air");
        } else if self.treasure_reached() {
            self.state = GameState::Win;
            self.events.push(RuntimeEvent::TreasureFound);
            self.push_timeline("treasure recovered");
        }
    }

    pub fn build_snapshot(&mut self, include_events: bool) -> Snapshot {
        let region = if self.player.y < SURFACE_DEPTH {
            Region::Aerial
        } else {
            Region::Underwater
        };
        let camera_y = (self.player.y - CAMERA_LEAD_FRACTION * VIEWPORT_HEIGHT)
            .clamp(0.0, WORLD_DEPTH - VIEWPORT_HEIGHT);

        let snapshot = Snapshot {
            tick: self.tick_counter,
            elapsed_ms: self.elapsed_ms,
            state: self.state,
            player: PlayerView {
                x: self.player.x,
                y: self.player.y,
                vx: self.player.vx,
                vy: self.player.vy,
                region,
            },
            oxygen: self.oxygen,
            score: self.score,
            camera_y,
            pockets: self.world.pockets.clone(),
            active_pocket_id: self.active_pocket,
            enterable_pocket_id: self
                .nearest
                .filter(|nearest| nearest.enterable)
                .map(|nearest| nearest.id),
            question: self.question.as_ref().and_then(|question| {
                self.active_pocket.map(|pocket_id| QuestionView {
                    pocket_id,
                    text: question.text.clone(),
                    options: question.options.clone(),
                })
            }),
            selected_option: self.selected,
            events: if include_events {
                self.events.clone()
            } else {
                Vec::new()
            },
            timeline: self
                .timeline
                .iter()
                .rev()
                .take(TIMELINE_TAIL)
                .cloned()
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect(),
        };
        if include_events {
            self.events.clear();
        }
        snapshot
    }

    pub fn build_world_init(&self) -> WorldInit {
        WorldInit {
            config: crate::constants::session_config(),
            pockets: self.world.pockets.clone(),
            treasure: self.world.treasure,
        }
    }

    pub fn build_summary(&self) -> SessionSummary {
        SessionSummary {
            won: self.state == GameState::Win,
            reason: self.reason,
            max_depth: self.score,
            pockets_cleared: self.cleared.len(),
            duration_ms: self.elapsed_ms,
            tick: self.tick_counter,
        }
    }

    fn reset_session(&mut self) {
        let seed = self
            .base_seed
            .wrapping_add(self.session_index.wrapping_mul(SESSION_SEED_STRIDE));
        self.session_index = self.session_index.wrapping_add(1);

        self.world = generate_world(seed);
        self.state = GameState::Intro;
        self.reason = None;
        self.player = spawn_player();
        self.input = InputState::default();
        self.oxygen = OXYGEN_MAX;
        self.score = 0.0;
        self.cleared.clear();
        self.active_pocket = None;
        self.question = None;
        self.selected = None;
        self.nearest = None;
        self.events.clear();
        self.timeline.clear();
        self.elapsed_ms = 0;
        self.tick_counter = 0;
        self.push_timeline("dive started");
    }

    fn set_move(&mut self, dir: MoveDir, pressed: bool) {
        match dir {
            MoveDir::Left => self.input.left = pressed,
            MoveDir::Right => self.input.right = pressed,
        }
    }

    fn try_enter_pocket(&mut self) {
        if !matches!(self.state, GameState::Playing | GameState::Intro) {
            return;
        }
        if self.questions.is_empty() {
            return;
        }
        let Some(nearest) =
            nearest_uncleared(&self.world.pockets, self.player.x, self.player.y)
        else {
            return;
        };
        if !nearest.enterable {
            return;
        }

        let pocket = &self.world.pockets[nearest.id];
        self.active_pocket = Some(pocket.id);
        self.question = Some(self.questions[pocket.quiz_index % self.questions.len()].clone());
        self.selected = None;
        self.state = GameState::Question;
    }

    fn submit_answer(&mut self) {
        if self.state != GameState::Question {
            return;
        }
        let (Some(selected), Some(question), Some(pocket_id)) =
            (self.selected, self.question.as_ref(), self.active_pocket)
        else {
            return;
        };

        if selected == question.correct {
            self.world.pockets[pocket_id].cleared = true;
            self.cleared.insert(pocket_id);
            self.oxygen = (self.oxygen + OXYGEN_BONUS).min(OXYGEN_MAX);
            self.events.push(RuntimeEvent::PocketCleared { pocket_id });
            self.push_timeline(&format!("air pocket {} cleared", pocket_id + 1));
            self.close_question();
            self.state = GameState::Playing;
        } else {
            self.reason = Some(GameOverReason::WrongAnswer);
            self.push_timeline("wrong answer");
            self.close_question();
            self.state = GameState::GameOver;
        }
    }

    fn close_question(&mut self) {
        self.active_pocket = None;
        self.question = None;
        self.selected = None;
    }

    fn treasure_reached(&self) -> bool {
        let treasure = &self.world.treasure;
        let margin = TREASURE_HIT_MARGIN;
        self.player.x >= treasure.x - margin
            && self.player.x <= treasure.x + treasure.width + margin
            && self.player.y >= treasure.y - margin
            && self.player.y <= treasure.y + treasure.height + margin
    }

    fn push_timeline(&mut self, label: &str) {
        self.timeline.push(TimelineEvent {
            at_ms: self.elapsed_ms,
            label: label.to_string(),
        });
    }
}

fn spawn_player() -> PlayerInternal {
    PlayerInternal {
        x: VIEWPORT_WIDTH * 0.5,
        y: START_DEPTH,
        vx: 0.0,
        vy: -START_LIFT,
    }
}
