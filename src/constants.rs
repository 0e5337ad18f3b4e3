use crate::types::SessionConfig;

pub const TICK_RATE: u32 = 30;
pub const TICK_MS: u64 = 1000 / TICK_RATE as u64;

// A resumed tab can hand us a multi-second delta; anything above this is
// truncated so one tick can never tunnel past a pocket or the sea floor.
pub const MAX_TICK_MS: u64 = 100;
pub const NOMINAL_FRAME_MS: f32 = 1000.0 / 60.0;

pub const VIEWPORT_WIDTH: f32 = 480.0;
pub const VIEWPORT_HEIGHT: f32 = 640.0;
pub const WORLD_DEPTH: f32 = 3000.0;
pub const SURFACE_DEPTH: f32 = 140.0;
pub const SIDE_MARGIN: f32 = 24.0;

pub const START_DEPTH: f32 = 40.0;
pub const START_LIFT: f32 = 2.0;

pub const GRAVITY: f32 = 0.32;
pub const HORIZONTAL_ACCEL: f32 = 0.55;
pub const HORIZONTAL_MAX_SPEED: f32 = 4.2;
pub const HORIZONTAL_DECAY: f32 = 0.88;
pub const DESCENT_RATE: f32 = 1.6;

pub const POCKET_COUNT: usize = 8;
pub const POCKET_RADIUS: f32 = 26.0;
pub const PLAYER_RADIUS: f32 = 14.0;
pub const POCKET_ENTRY_SLACK: f32 = 6.0;
pub const FIRST_POCKET_DEPTH: f32 = 420.0;
pub const POCKET_STEP_MIN: f32 = 240.0;
pub const POCKET_STEP_MAX: f32 = 320.0;

pub const TREASURE_WIDTH: f32 = 64.0;
pub const TREASURE_HEIGHT: f32 = 48.0;
pub const TREASURE_BOTTOM_OFFSET: f32 = 110.0;
pub const TREASURE_EDGE_OFFSET: f32 = 60.0;
pub const TREASURE_HIT_MARGIN: f32 = 12.0;

pub const OXYGEN_MAX: f32 = 100.0;
pub const OXYGEN_DRAIN_PER_FRAME: f32 = 0.06;
pub const OXYGEN_BONUS: f32 = 35.0;

pub const CAMERA_LEAD_FRACTION: f32 = 0.35;

// Single source for the geometry the renderer shares with proximity logic.
pub fn session_config() -> SessionConfig {
    SessionConfig {
        viewport_width: VIEWPORT_WIDTH,
        viewport_height: VIEWPORT_HEIGHT,
        world_depth: WORLD_DEPTH,
        surface_depth: SURFACE_DEPTH,
        side_margin: SIDE_MARGIN,
        player_radius: PLAYER_RADIUS,
        pocket_radius: POCKET_RADIUS,
        entry_slack: POCKET_ENTRY_SLACK,
        camera_lead_fraction: CAMERA_LEAD_FRACTION,
        tick_rate: TICK_RATE,
    }
}
