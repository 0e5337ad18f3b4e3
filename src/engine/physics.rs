use crate::constants::{
    DESCENT_RATE, GRAVITY, HORIZONTAL_ACCEL, HORIZONTAL_DECAY, HORIZONTAL_MAX_SPEED, SIDE_MARGIN,
    SURFACE_DEPTH, VIEWPORT_WIDTH, WORLD_DEPTH,
};

use super::{InputState, PlayerInternal};

/// Free fall above the water: gravity accumulates into vertical velocity.
pub(super) fn integrate_aerial(player: &mut PlayerInternal, input: &InputState, dt_norm: f32) {
    apply_horizontal(player, input, dt_norm);
    player.vy += GRAVITY * dt_norm;
    player.y += player.vy * dt_norm;
}

/// Below the surface the diver sinks at a constant rate. This is a
/// neutral-buoyancy drift, not an integrated velocity.
pub(super) fn integrate_underwater(player: &mut PlayerInternal, input: &InputState, dt_norm: f32) {
    apply_horizontal(player, input, dt_norm);
    player.y = (player.y + DESCENT_RATE * dt_norm).clamp(SURFACE_DEPTH, WORLD_DEPTH);
}

fn apply_horizontal(player: &mut PlayerInternal, input: &InputState, dt_norm: f32) {
    let steer = i32::from(input.right) - i32::from(input.left);
    if steer == 0 {
        player.vx *= HORIZONTAL_DECAY.powf(dt_norm);
    } else {
        player.vx = (player.vx + steer as f32 * HORIZONTAL_ACCEL * dt_norm)
            .clamp(-HORIZONTAL_MAX_SPEED, HORIZONTAL_MAX_SPEED);
    }
    player.x =
        (player.x + player.vx * dt_norm).clamp(SIDE_MARGIN, VIEWPORT_WIDTH - SIDE_MARGIN);
}
