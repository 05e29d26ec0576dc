//! The snake body

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::grid::{Direction, Position};

/// Ordered body cells, head at the front
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snake {
    body: VecDeque<Position>,
}

impl Snake {
    /// Lay out `length` cells starting at `head`, trailing opposite to `heading`
    pub fn new(head: Position, heading: Direction, length: usize) -> Self {
        let back = heading.opposite().delta();
        let length = length.clamp(1, i32::MAX as usize) as i32;
        let body = (0..length).map(|i| head + back * i).collect();
        Self { body }
    }

    /// Build from explicit cells (head first). Empty input yields `None`.
    pub fn from_cells<I: IntoIterator<Item = Position>>(cells: I) -> Option<Self> {
        let body: VecDeque<Position> = cells.into_iter().collect();
        if body.is_empty() { None } else { Some(Self { body }) }
    }

    pub fn head(&self) -> Position {
        // Length is never below 1
        self.body[0]
    }

    pub fn tail(&self) -> Position {
        self.body[self.body.len() - 1]
    }

    /// Where the head would land moving one cell in `direction`
    pub fn next_head(&self, direction: Direction) -> Position {
        self.head() + direction.delta()
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.body.contains(&pos)
    }

    pub fn push_head(&mut self, head: Position) {
        self.body.push_front(head);
    }

    /// Remove the tail cell, keeping at least the head
    pub fn pop_tail(&mut self) -> Option<Position> {
        if self.body.len() > 1 {
            self.body.pop_back()
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn cells(&self) -> impl Iterator<Item = &Position> {
        self.body.iter()
    }
}
