//! Food placement

use std::collections::HashSet;

use glam::IVec2;
use rand::Rng;

use super::grid::{GridWorld, Position};
use crate::consts::FOOD_SPAWN_ATTEMPTS;

/// Pick a free cell for food.
///
/// Draws uniformly at random first. If every draw hits `occupied`, falls back
/// to the board center and its neighbours, then to the first free cell in
/// row-major order. A full board yields the origin.
pub fn spawn<R: Rng + ?Sized>(
    rng: &mut R,
    board: &GridWorld,
    occupied: &HashSet<Position>,
) -> Position {
    if board.width > 0 && board.height > 0 {
        for _ in 0..FOOD_SPAWN_ATTEMPTS {
            let candidate = IVec2::new(
                rng.random_range(0..board.width),
                rng.random_range(0..board.height),
            );
            if !occupied.contains(&candidate) {
                return candidate;
            }
        }
    }

    log::debug!(
        "Food sampling exhausted after {} attempts ({} cells occupied)",
        FOOD_SPAWN_ATTEMPTS,
        occupied.len()
    );
    fallback(board, occupied)
}

fn fallback(board: &GridWorld, occupied: &HashSet<Position>) -> Position {
    let center = board.center();
    let near_center = [
        center,
        center + IVec2::new(1, 0),
        center + IVec2::new(-1, 0),
        center + IVec2::new(0, 1),
        center + IVec2::new(0, -1),
    ];

    near_center
        .into_iter()
        .chain(board.cells())
        .find(|p| board.in_bounds(*p) && !occupied.contains(p))
        .unwrap_or_else(|| {
            log::warn!("Board fully occupied, placing food at origin");
            IVec2::ZERO
        })
}
