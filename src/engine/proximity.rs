use crate::constants::{PLAYER_RADIUS, POCKET_ENTRY_SLACK};
use crate::types::AirPocketState;

use super::utils::distance;

#[derive(Clone, Copy, Debug)]
pub struct NearestPocket {
    pub id: usize,
    pub distance: f32,
    pub enterable: bool,
}

/// Finds the closest uncleared pocket to the player. Cleared pockets cannot
/// be re-entered and are never considered.
pub(super) fn nearest_uncleared(pockets: &[AirPocketState], x: f32, y: f32) -> Option<NearestPocket> {
    let mut best: Option<NearestPocket> = None;
    for pocket in pockets.iter().filter(|pocket| !pocket.cleared) {
        let dist = distance(x, y, pocket.x, pocket.y);
        if best.map(|found| dist < found.distance).unwrap_or(true) {
            best = Some(NearestPocket {
                id: pocket.id,
                distance: dist,
                enterable: dist <= pocket.radius + PLAYER_RADIUS + POCKET_ENTRY_SLACK,
            });
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::nearest_uncleared;
    use crate::constants::{PLAYER_RADIUS, POCKET_ENTRY_SLACK, POCKET_RADIUS};
    use crate::types::AirPocketState;

    fn pocket(id: usize, x: f32, y: f32, cleared: bool) -> AirPocketState {
        AirPocketState {
            id,
            x,
            y,
            radius: POCKET_RADIUS,
            quiz_index: id,
            cleared,
        }
    }

    #[test]
    fn picks_the_minimum_distance_pocket() {
        let pockets = vec![
            pocket(0, 100.0, 500.0, false),
            pocket(1, 100.0, 700.0, false),
        ];
        let nearest = nearest_uncleared(&pockets, 100.0, 660.0).expect("pockets exist");
        assert_eq!(nearest.id, 1);
    }

    #[test]
    fn cleared_pockets_are_excluded_entirely() {
        let pockets = vec![
            pocket(0, 100.0, 500.0, true),
            pocket(1, 100.0, 900.0, false),
        ];
        let nearest = nearest_uncleared(&pockets, 100.0, 500.0).expect("one pocket left");
        assert_eq!(nearest.id, 1);
        assert!(!nearest.enterable);
    }

    #[test]
    fn no_uncleared_pocket_means_none() {
        let pockets = vec![pocket(0, 100.0, 500.0, true)];
        assert!(nearest_uncleared(&pockets, 100.0, 500.0).is_none());
    }

    #[test]
    fn enterable_exactly_at_the_combined_radius() {
        let reach = POCKET_RADIUS + PLAYER_RADIUS + POCKET_ENTRY_SLACK;
        let pockets = vec![pocket(0, 100.0, 500.0, false)];

        let at_edge = nearest_uncleared(&pockets, 100.0 + reach, 500.0).expect("pocket exists");
        assert!(at_edge.enterable);

        let outside =
            nearest_uncleared(&pockets, 100.0 + reach + 0.5, 500.0).expect("pocket exists");
        assert!(!outside.enterable);
    }
}
