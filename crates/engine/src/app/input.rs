use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use winit::keyboard::KeyCode;

use super::Vec2;

/// Toggles the debug overlay; never usable as a movement binding.
pub const OVERLAY_TOGGLE_KEY: KeyCode = KeyCode::F3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

const DIRECTION_COUNT: usize = 4;

impl Direction {
    pub const ALL: [Direction; DIRECTION_COUNT] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    const fn index(self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Down => 1,
            Direction::Left => 2,
            Direction::Right => 3,
        }
    }

    /// Unit axis vector in world space (`+y` is down).
    pub const fn unit(self) -> Vec2 {
        match self {
            Direction::Up => Vec2::new(0.0, -1.0),
            Direction::Down => Vec2::new(0.0, 1.0),
            Direction::Left => Vec2::new(-1.0, 0.0),
            Direction::Right => Vec2::new(1.0, 0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectionStates {
    down: [bool; DIRECTION_COUNT],
}

impl DirectionStates {
    pub fn set(&mut self, direction: Direction, is_down: bool) {
        self.down[direction.index()] = is_down;
    }

    pub fn with(mut self, direction: Direction) -> Self {
        self.set(direction, true);
        self
    }

    pub fn is_down(&self, direction: Direction) -> bool {
        self.down[direction.index()]
    }
}

/// Read-only view of which keys are held for the current frame.
pub trait KeyQuery {
    fn is_pressed(&self, key: KeyCode) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBindings {
    pub up: KeyCode,
    pub down: KeyCode,
    pub left: KeyCode,
    pub right: KeyCode,
}

impl KeyBindings {
    pub const fn wasd() -> Self {
        Self {
            up: KeyCode::KeyW,
            down: KeyCode::KeyS,
            left: KeyCode::KeyA,
            right: KeyCode::KeyD,
        }
    }

    pub const fn ijkl() -> Self {
        Self {
            up: KeyCode::KeyI,
            down: KeyCode::KeyK,
            left: KeyCode::KeyJ,
            right: KeyCode::KeyL,
        }
    }

    pub const fn key_for(&self, direction: Direction) -> KeyCode {
        match direction {
            Direction::Up => self.up,
            Direction::Down => self.down,
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }

    pub fn keys(&self) -> [KeyCode; DIRECTION_COUNT] {
        Direction::ALL.map(|direction| self.key_for(direction))
    }

    pub fn resolve(&self, input: &impl KeyQuery) -> DirectionStates {
        let mut states = DirectionStates::default();
        for direction in Direction::ALL {
            states.set(direction, input.is_pressed(self.key_for(direction)));
        }
        states
    }
}

/// Keys held at the moment the frame started. Never re-sampled mid-frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    pressed: HashSet<KeyCode>,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn from_pressed(pressed: HashSet<KeyCode>) -> Self {
        Self { pressed }
    }

    pub fn with_key_down(mut self, key: KeyCode) -> Self {
        self.pressed.insert(key);
        self
    }
}

impl KeyQuery for InputSnapshot {
    fn is_pressed(&self, key: KeyCode) -> bool {
        self.pressed.contains(&key)
    }
}
