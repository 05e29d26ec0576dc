//! Level obstacle layouts
//!
//! Levels 2-4 use fixed shapes scaled to the board; level 5 and up scatter
//! random blocks. Every layout leaves the spawn area clear.

use glam::IVec2;
use rand::Rng;

use super::grid::{GridWorld, Position, neighbours};
use crate::consts::{
    MAX_RANDOM_OBSTACLES, MIN_OPEN_NEIGHBOURS, OBSTACLE_ATTEMPTS_PER_SLOT, OBSTACLES_PER_LEVEL,
    SAFE_ZONE_HALF_EXTENT,
};

/// Square around the spawn point that no obstacle may occupy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafeZone {
    pub min: Position,
    pub max: Position,
}

impl SafeZone {
    pub fn around(center: Position) -> Self {
        let half = IVec2::splat(SAFE_ZONE_HALF_EXTENT);
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Safe zone for the standard spawn at the board center
    pub fn for_board(board: &GridWorld) -> Self {
        Self::around(board.center())
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= self.min.x && pos.x <= self.max.x && pos.y >= self.min.y && pos.y <= self.max.y
    }
}

/// Obstacle cells for `level`
pub fn generate<R: Rng + ?Sized>(rng: &mut R, level: u32, board: &GridWorld) -> Vec<Position> {
    let zone = SafeZone::for_board(board);
    let obstacles = match level {
        0 | 1 => Vec::new(),
        2 => punch(twin_walls(board), board, &zone),
        3 => punch(cross(board), board, &zone),
        4 => punch(ring(board), board, &zone),
        _ => scatter(rng, level, board, &zone),
    };
    log::debug!("Level {}: {} obstacles", level, obstacles.len());
    obstacles
}

/// Drop cells that are off the board, inside the safe zone or repeated
fn punch(cells: Vec<Position>, board: &GridWorld, zone: &SafeZone) -> Vec<Position> {
    let mut out: Vec<Position> = Vec::with_capacity(cells.len());
    for cell in cells {
        if board.in_bounds(cell) && !zone.contains(cell) && !out.contains(&cell) {
            out.push(cell);
        }
    }
    out
}

/// Two vertical walls either side of the center
fn twin_walls(board: &GridWorld) -> Vec<Position> {
    let (w, h) = (board.width, board.height);
    let left = w * 3 / 8;
    let right = w * 3 / 5;
    (h / 6..h * 5 / 6)
        .flat_map(|y| [IVec2::new(left, y), IVec2::new(right, y)])
        .collect()
}

/// A horizontal and a vertical bar crossing at the center
fn cross(board: &GridWorld) -> Vec<Position> {
    let (w, h) = (board.width, board.height);
    let horizontal = (w / 4..w * 3 / 4).map(|x| IVec2::new(x, h / 2));
    let vertical = (h * 4 / 15..h * 11 / 15).map(|y| IVec2::new(w / 2, y));
    horizontal.chain(vertical).collect()
}

/// A rectangular ring inset from the board edges
fn ring(board: &GridWorld) -> Vec<Position> {
    let (w, h) = (board.width, board.height);
    let (left, right) = (w / 8, w * 7 / 8);
    let (top, bottom) = (h / 6, h * 4 / 5);
    let horizontal = (left..right).flat_map(|x| [IVec2::new(x, top), IVec2::new(x, bottom)]);
    let vertical = (top..h * 5 / 6).flat_map(|y| [IVec2::new(left, y), IVec2::new(right - 1, y)]);
    horizontal.chain(vertical).collect()
}

/// Whether `cell` keeps enough in-bounds, obstacle-free neighbours
fn leaves_room(cell: Position, board: &GridWorld, taken: &[Position]) -> bool {
    let open = neighbours(cell)
        .into_iter()
        .filter(|n| board.in_bounds(*n) && !taken.contains(n))
        .count();
    open >= MIN_OPEN_NEIGHBOURS
}

/// Random blocks, each leaving enough open neighbours to avoid sealing cells.
///
/// The open-neighbour rule is a local check only; it does not prove the whole
/// board stays reachable.
fn scatter<R: Rng + ?Sized>(
    rng: &mut R,
    level: u32,
    board: &GridWorld,
    zone: &SafeZone,
) -> Vec<Position> {
    let target = (level.saturating_mul(OBSTACLES_PER_LEVEL)).min(MAX_RANDOM_OBSTACLES) as usize;
    let attempts = target as u32 * OBSTACLE_ATTEMPTS_PER_SLOT;
    let mut obstacles: Vec<Position> = Vec::with_capacity(target);

    if board.width <= 0 || board.height <= 0 {
        return obstacles;
    }

    for _ in 0..attempts {
        if obstacles.len() >= target {
            break;
        }
        let candidate = IVec2::new(
            rng.random_range(0..board.width),
            rng.random_range(0..board.height),
        );
        if zone.contains(candidate) || obstacles.contains(&candidate) {
            continue;
        }
        if leaves_room(candidate, board, &obstacles) {
            obstacles.push(candidate);
        }
    }

    if obstacles.len() < target {
        log::debug!(
            "Placed {} of {} random obstacles in {} attempts",
            obstacles.len(),
            target,
            attempts
        );
    }
    obstacles
}
