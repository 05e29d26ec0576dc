//! Greedy autopilot for demo and soak runs
//!
//! Heads for the special food when one is up, otherwise the regular food,
//! and never picks a move that dies on the next tick.

use super::grid::{Direction, GridWorld, Position, neighbours};
use super::state::GameState;

fn is_free(state: &GameState, board: &GridWorld, pos: Position) -> bool {
    board.in_bounds(pos) && !state.snake.contains(pos) && !state.is_obstacle(pos)
}

/// Pick the next direction, or `None` when every move is fatal
pub fn suggest(state: &GameState, board: &GridWorld) -> Option<Direction> {
    let target = state.special_food.unwrap_or(state.food);
    let head = state.snake.head();

    Direction::ALL
        .into_iter()
        .filter(|d| !d.is_opposite(state.direction))
        .filter(|d| is_free(state, board, head + d.delta()))
        .min_by_key(|d| {
            let next = head + d.delta();
            let distance = (target - next).abs().element_sum();
            // Prefer cells with room to keep moving
            let open = neighbours(next)
                .into_iter()
                .filter(|n| *n != head && is_free(state, board, *n))
                .count() as i32;
            let dead_end = if open == 0 { 1 } else { 0 };
            let keep_heading = if *d == state.direction { 0 } else { 1 };
            (dead_end, distance, -open, keep_heading)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::config::GameConfig;
    use crate::sim::snake::Snake;
    use crate::sim::tick::GameEngine;
    use glam::IVec2;

    fn state_with(snake: &[(i32, i32)], food: (i32, i32), direction: Direction) -> GameState {
        let mut engine = GameEngine::new(GameConfig::default(), 1).unwrap();
        engine.start();
        let state = engine.state_mut();
        state.snake = Snake::from_cells(snake.iter().map(|&(x, y)| IVec2::new(x, y))).unwrap();
        state.food = IVec2::new(food.0, food.1);
        state.direction = direction;
        state.clone()
    }

    #[test]
    fn test_heads_toward_food() {
        let board = GridWorld::new(40, 30);
        let state = state_with(&[(20, 15), (19, 15), (18, 15)], (20, 5), Direction::Right);
        assert_eq!(suggest(&state, &board), Some(Direction::Up));
    }

    #[test]
    fn test_prefers_special_food() {
        let board = GridWorld::new(40, 30);
        let mut state = state_with(&[(20, 15), (19, 15), (18, 15)], (20, 5), Direction::Right);
        state.special_food = Some(IVec2::new(20, 25));
        assert_eq!(suggest(&state, &board), Some(Direction::Down));
    }

    #[test]
    fn test_avoids_wall() {
        let board = GridWorld::new(40, 30);
        let state = state_with(&[(39, 0), (38, 0), (37, 0)], (39, 29), Direction::Right);
        assert_eq!(suggest(&state, &board), Some(Direction::Down));
    }

    #[test]
    fn test_boxed_in_returns_none() {
        let board = GridWorld::new(40, 30);
        let mut state = state_with(&[(0, 0), (1, 0)], (10, 10), Direction::Left);
        state.obstacles = vec![IVec2::new(0, 1)];
        assert_eq!(suggest(&state, &board), None);
    }
}
