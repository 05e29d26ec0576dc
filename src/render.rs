//! Text presentation of game snapshots

use crate::sim::{GameState, GameStatus, GridWorld, Position};

/// Format whole seconds as `m:ss`
pub fn format_time(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

fn cell_char(state: &GameState, pos: Position) -> char {
    if state.snake.head() == pos {
        '@'
    } else if state.snake.contains(pos) {
        'o'
    } else if state.special_food == Some(pos) {
        '$'
    } else if state.food == pos {
        '*'
    } else if state.is_obstacle(pos) {
        '#'
    } else {
        '.'
    }
}

/// Draw the board one row per line, top row first
pub fn ascii_board(state: &GameState, board: &GridWorld) -> String {
    let mut out = String::with_capacity(((board.width + 1) * board.height) as usize);
    for y in 0..board.height {
        for x in 0..board.width {
            out.push(cell_char(state, Position::new(x, y)));
        }
        out.push('\n');
    }
    out
}

/// One-line HUD
pub fn status_line(state: &GameState) -> String {
    let status = match state.status {
        GameStatus::Menu => "menu",
        GameStatus::Playing => "playing",
        GameStatus::Paused => "paused",
        GameStatus::GameOver => "game over",
    };
    let mut line = format!(
        "{} | score {} (best {}) | level {} | length {} | {}",
        status,
        state.score,
        state.high_score,
        state.level,
        state.snake.len(),
        format_time(state.play_seconds()),
    );
    if state.special_food.is_some() {
        line.push_str(&format!(
            " | bonus {:.1}s",
            state.special_food_remaining.as_secs_f32()
        ));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{GameConfig, GameEngine, Snake};
    use glam::IVec2;
    use std::time::Duration;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0), "0:00");
        assert_eq!(format_time(65), "1:05");
        assert_eq!(format_time(600), "10:00");
    }

    #[test]
    fn test_ascii_board() {
        let config = GameConfig::new(5, 5);
        let board = config.board();
        let mut engine = GameEngine::new(config, 3).unwrap();
        let state = engine.state_mut();
        state.snake = Snake::from_cells([IVec2::new(2, 1), IVec2::new(1, 1)]).unwrap();
        state.food = IVec2::new(4, 0);
        state.special_food = Some(IVec2::new(0, 2));
        state.obstacles = vec![IVec2::new(3, 2)];

        assert_eq!(ascii_board(state, &board), "....*\n.o@..\n$..#.\n.....\n.....\n");
    }

    #[test]
    fn test_status_line() {
        let mut engine = GameEngine::new(GameConfig::default(), 3).unwrap();
        engine.start();
        let state = engine.state_mut();
        state.score = 7;
        state.elapsed = Duration::from_secs(75);
        assert_eq!(
            status_line(state),
            "playing | score 7 (best 0) | level 1 | length 3 | 1:15"
        );

        state.special_food = Some(IVec2::new(1, 1));
        state.special_food_remaining = Duration::from_millis(4500);
        assert!(status_line(state).ends_with("| bonus 4.5s"));
    }
}
