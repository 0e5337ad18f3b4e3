use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameState {
    Menu,
    Intro,
    Playing,
    Paused,
    Question,
    GameOver,
    Win,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOverReason {
    OxygenDepleted,
    WrongAnswer,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    Aerial,
    Underwater,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveDir {
    Left,
    Right,
}

impl MoveDir {
    pub fn parse_move(value: &str) -> Option<Self> {
        match value {
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }
}

/// Discrete inputs accepted by the session. Actions issued in a state that
/// does not accept them are silently ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Start,
    Restart,
    MoveStart(MoveDir),
    MoveStop(MoveDir),
    TogglePause,
    EnterPocket,
    SelectOption(usize),
    SubmitAnswer,
    CancelQuestion,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Question {
    pub text: String,
    pub options: Vec<String>,
    pub correct: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct AirPocketState {
    pub id: usize,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    #[serde(rename = "quizIndex")]
    pub quiz_index: usize,
    pub cleared: bool,
}

#[derive(Clone, Copy, Debug, Serialize)]
pub struct TreasureState {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Clone, Copy, Debug, Serialize)]
pub struct PlayerView {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub region: Region,
}

/// Question as shown to the client. The correct index stays server-side.
#[derive(Clone, Debug, Serialize)]
pub struct QuestionView {
    #[serde(rename = "pocketId")]
    pub pocket_id: usize,
    pub text: String,
    pub options: Vec<String>,
}

#[derive(Clone, Copy, Debug, Serialize)]
pub struct SessionConfig {
    #[serde(rename = "viewportWidth")]
    pub viewport_width: f32,
    #[serde(rename = "viewportHeight")]
    pub viewport_height: f32,
    #[serde(rename = "worldDepth")]
    pub world_depth: f32,
    #[serde(rename = "surfaceDepth")]
    pub surface_depth: f32,
    #[serde(rename = "sideMargin")]
    pub side_margin: f32,
    #[serde(rename = "playerRadius")]
    pub player_radius: f32,
    #[serde(rename = "pocketRadius")]
    pub pocket_radius: f32,
    #[serde(rename = "entrySlack")]
    pub entry_slack: f32,
    #[serde(rename = "cameraLeadFraction")]
    pub camera_lead_fraction: f32,
    #[serde(rename = "tickRate")]
    pub tick_rate: u32,
}

#[derive(Clone, Debug, Serialize)]
pub struct WorldInit {
    pub config: SessionConfig,
    pub pockets: Vec<AirPocketState>,
    pub treasure: TreasureState,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuntimeEvent {
    Splash,
    PocketCleared {
        #[serde(rename = "pocketId")]
        pocket_id: usize,
    },
    TreasureFound,
}

#[derive(Clone, Debug, Serialize)]
pub struct TimelineEvent {
    #[serde(rename = "atMs")]
    pub at_ms: u64,
    pub label: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    #[serde(rename = "elapsedMs")]
    pub elapsed_ms: u64,
    pub state: GameState,
    pub player: PlayerView,
    pub oxygen: f32,
    pub score: f32,
    #[serde(rename = "cameraY")]
    pub camera_y: f32,
    pub pockets: Vec<AirPocketState>,
    #[serde(rename = "activePocketId")]
    pub active_pocket_id: Option<usize>,
    #[serde(rename = "enterablePocketId")]
    pub enterable_pocket_id: Option<usize>,
    pub question: Option<QuestionView>,
    #[serde(rename = "selectedOption")]
    pub selected_option: Option<usize>,
    pub events: Vec<RuntimeEvent>,
    pub timeline: Vec<TimelineEvent>,
}

#[derive(Clone, Debug, Serialize)]
pub struct SessionSummary {
    pub won: bool,
    pub reason: Option<GameOverReason>,
    #[serde(rename = "maxDepth")]
    pub max_depth: f32,
    #[serde(rename = "pocketsCleared")]
    pub pockets_cleared: usize,
    #[serde(rename = "durationMs")]
    pub duration_ms: u64,
    pub tick: u64,
}
