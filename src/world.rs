use crate::constants::{
    FIRST_POCKET_DEPTH, POCKET_COUNT, POCKET_RADIUS, POCKET_STEP_MAX, POCKET_STEP_MIN, SIDE_MARGIN,
    TREASURE_BOTTOM_OFFSET, TREASURE_EDGE_OFFSET, TREASURE_HEIGHT, TREASURE_WIDTH, VIEWPORT_WIDTH,
    WORLD_DEPTH,
};
use crate::rng::Rng;
use crate::types::{AirPocketState, TreasureState};

#[derive(Clone, Debug)]
pub struct GeneratedWorld {
    pub pockets: Vec<AirPocketState>,
    pub treasure: TreasureState,
}

/// Lays out one session: a column of air pockets at strictly increasing
/// depths and a treasure chest near the sea floor. Same seed, same world.
pub fn generate_world(seed: u32) -> GeneratedWorld {
    let mut rng = Rng::new(seed);
    let min_x = SIDE_MARGIN + POCKET_RADIUS;
    let max_x = VIEWPORT_WIDTH - SIDE_MARGIN - POCKET_RADIUS;

    let mut pockets = Vec::with_capacity(POCKET_COUNT);
    let mut depth = FIRST_POCKET_DEPTH;
    for id in 0..POCKET_COUNT {
        pockets.push(AirPocketState {
            id,
            x: rng.range(min_x, max_x),
            y: depth,
            radius: POCKET_RADIUS,
            quiz_index: id,
            cleared: false,
        });
        depth += rng.range(POCKET_STEP_MIN, POCKET_STEP_MAX);
    }

    let treasure = TreasureState {
        x: rng.range(
            TREASURE_EDGE_OFFSET,
            VIEWPORT_WIDTH - TREASURE_EDGE_OFFSET - TREASURE_WIDTH,
        ),
        y: WORLD_DEPTH - TREASURE_BOTTOM_OFFSET - TREASURE_HEIGHT,
        width: TREASURE_WIDTH,
        height: TREASURE_HEIGHT,
    };

    GeneratedWorld { pockets, treasure }
}

#[cfg(test)]
mod tests {
    use super::generate_world;
    use crate::constants::{
        FIRST_POCKET_DEPTH, POCKET_COUNT, POCKET_RADIUS, POCKET_STEP_MAX, POCKET_STEP_MIN,
        SIDE_MARGIN, TREASURE_EDGE_OFFSET, VIEWPORT_WIDTH, WORLD_DEPTH,
    };

    #[test]
    fn pocket_depths_increase_strictly_and_never_overlap() {
        for seed in 0..200u32 {
            let world = generate_world(seed);
            assert_eq!(world.pockets.len(), POCKET_COUNT);
            assert_eq!(world.pockets[0].y, FIRST_POCKET_DEPTH);
            for pair in world.pockets.windows(2) {
                let gap = pair[1].y - pair[0].y;
                assert!(gap >= POCKET_STEP_MIN, "seed={seed}: gap {gap} too small");
                assert!(gap <= POCKET_STEP_MAX, "seed={seed}: gap {gap} too large");
                assert!(gap > 2.0 * POCKET_RADIUS);
            }
        }
    }

    #[test]
    fn pockets_stay_inside_viewport_margins() {
        for seed in 0..200u32 {
            let world = generate_world(seed);
            for pocket in &world.pockets {
                assert!(pocket.x - pocket.radius >= SIDE_MARGIN);
                assert!(pocket.x + pocket.radius <= VIEWPORT_WIDTH - SIDE_MARGIN);
                assert!(pocket.y < WORLD_DEPTH);
                assert!(!pocket.cleared);
                assert_eq!(pocket.quiz_index, pocket.id);
            }
        }
    }

    #[test]
    fn treasure_sits_near_the_sea_floor_away_from_edges() {
        for seed in 0..200u32 {
            let world = generate_world(seed);
            let treasure = world.treasure;
            assert!(treasure.x >= TREASURE_EDGE_OFFSET);
            assert!(treasure.x + treasure.width <= VIEWPORT_WIDTH - TREASURE_EDGE_OFFSET);
            assert!(treasure.y + treasure.height < WORLD_DEPTH);
            assert!(treasure.y > world.pockets.last().expect("pockets exist").y);
        }
    }

    #[test]
    fn same_seed_reproduces_the_same_layout() {
        let a = generate_world(31_337);
        let b = generate_world(31_337);
        for (pa, pb) in a.pockets.iter().zip(b.pockets.iter()) {
            assert_eq!(pa.x.to_bits(), pb.x.to_bits());
            assert_eq!(pa.y.to_bits(), pb.y.to_bits());
        }
        assert_eq!(a.treasure.x.to_bits(), b.treasure.x.to_bits());
    }
}
