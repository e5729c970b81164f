//! Frame selection tables.
//!
//! Static lookup data mapping an animation state and facing direction to
//! cells of the 4×4 sprite grid. Rows are direction bands (Up = 0,
//! Left = 1, Right = 2, Down = 3), columns are animation frames.

use serde::{Deserialize, Serialize};

/// Facing direction of a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Down,
    Left,
    Right,
    Up,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Down,
        Direction::Left,
        Direction::Right,
        Direction::Up,
    ];

    /// Grid row holding this direction's frames.
    pub fn row(&self) -> u32 {
        match self {
            Direction::Up => 0,
            Direction::Left => 1,
            Direction::Right => 2,
            Direction::Down => 3,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Up => "up",
        }
    }
}

/// Animation state of a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AnimState {
    #[default]
    Idle,
    Moving,
}

impl AnimState {
    pub const ALL: [AnimState; 2] = [AnimState::Idle, AnimState::Moving];

    pub fn name(&self) -> &'static str {
        match self {
            AnimState::Idle => "idle",
            AnimState::Moving => "moving",
        }
    }
}

/// A cell of the sprite grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameCell {
    pub column: u32,
    pub row: u32,
}

impl FrameCell {
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }
}

/// Number of animation frames in each direction row.
pub const FRAMES_PER_DIRECTION: u32 = 4;

/// One frame per direction: the first column of its row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatueSelection;

impl StatueSelection {
    pub fn frame(&self, direction: Direction) -> FrameCell {
        FrameCell::new(0, direction.row())
    }
}

/// Idle uses the statue table; moving loops over the whole row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharacterSelection {
    pub frames_per_second: f32,
}

impl Default for CharacterSelection {
    fn default() -> Self {
        Self {
            frames_per_second: 8.0,
        }
    }
}

impl CharacterSelection {
    pub fn new(frames_per_second: f32) -> Self {
        Self { frames_per_second }
    }

    /// Frames of `state` facing `direction`, in playback order.
    pub fn frames(&self, state: AnimState, direction: Direction) -> Vec<FrameCell> {
        match state {
            AnimState::Idle => vec![StatueSelection.frame(direction)],
            AnimState::Moving => (0..FRAMES_PER_DIRECTION)
                .map(|column| FrameCell::new(column, direction.row()))
                .collect(),
        }
    }

    /// Frame shown `elapsed` seconds into a looping animation.
    ///
    /// Non-positive or non-finite fps and negative elapsed time show the
    /// first frame.
    pub fn frame_at(&self, state: AnimState, direction: Direction, elapsed: f32) -> FrameCell {
        match state {
            AnimState::Idle => StatueSelection.frame(direction),
            AnimState::Moving => {
                let fps = self.frames_per_second;
                let playing = fps.is_finite() && fps > 0.0 && elapsed.is_finite() && elapsed > 0.0;
                if !playing {
                    return FrameCell::new(0, direction.row());
                }
                let step = (elapsed * fps).floor() as u64;
                let column = (step % FRAMES_PER_DIRECTION as u64) as u32;
                FrameCell::new(column, direction.row())
            }
        }
    }
}
