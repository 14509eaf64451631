//! Turtle state and symbol decoding.

use glam::{Mat4, Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// Heading every walk starts with: straight up the Z axis, as a direction (w = 0).
pub const INITIAL_HEADING: Vec4 = Vec4::new(0.0, 0.0, 1.0, 0.0);

/// The state of the walking turtle.
///
/// The heading is kept as a homogeneous direction and is rotated by a fresh
/// axis rotation matrix for every turn command.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TurtleState {
    /// Current world-space position of the "cursor".
    pub position: Vec3,

    /// Current heading; `F` advances the position by its xyz part.
    pub heading: Vec4,
}

impl Default for TurtleState {
    fn default() -> Self {
        Self::at(Vec3::ZERO)
    }
}

impl TurtleState {
    /// A turtle standing at `origin` with the initial heading.
    pub fn at(origin: Vec3) -> Self {
        Self {
            position: origin,
            heading: INITIAL_HEADING,
        }
    }

    /// The heading as a plain direction vector.
    pub fn forward(&self) -> Vec3 {
        self.heading.truncate()
    }

    /// Advances the position by `step` times the heading.
    pub fn advance(&mut self, step: f32) {
        self.position += self.forward() * step;
    }

    /// Rotates the heading about the world X axis by `angle` radians.
    pub fn rotate_x(&mut self, angle: f32) {
        self.heading = Mat4::from_rotation_x(angle) * self.heading;
    }

    /// Rotates the heading about the world Y axis by `angle` radians.
    pub fn rotate_y(&mut self, angle: f32) {
        self.heading = Mat4::from_rotation_y(angle) * self.heading;
    }

    /// Rotates the heading about the world Z axis by `angle` radians.
    pub fn rotate_z(&mut self, angle: f32) {
        self.heading = Mat4::from_rotation_z(angle) * self.heading;
    }
}

/// Operations that can be performed by the turtle.
///
/// Rotation variants carry the sign applied to the walk's angle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TurtleOp {
    /// Step forward and record the new position (`F`).
    Forward,
    /// Rotate about Z (`+`/`-`).
    Yaw(f32),
    /// Rotate about Y (`&`/`^`).
    Pitch(f32),
    /// Rotate about X (`<`/`>`).
    Roll(f32),
    /// Reserved, does nothing (`|`).
    Reserved,
    /// Save the current position (`[`).
    Push,
    /// Restore the most recently saved position (`]`).
    Pop,
    /// No-op — symbol has no turtle meaning.
    Ignore,
}

impl TurtleOp {
    /// Decodes one axiom symbol.
    pub fn from_symbol(symbol: char) -> Self {
        match symbol {
            'F' => Self::Forward,
            '+' => Self::Yaw(1.0),
            '-' => Self::Yaw(-1.0),
            '&' => Self::Pitch(-1.0),
            '^' => Self::Pitch(1.0),
            '<' => Self::Roll(-1.0),
            '>' => Self::Roll(1.0),
            '|' => Self::Reserved,
            '[' => Self::Push,
            ']' => Self::Pop,
            _ => Self::Ignore,
        }
    }

    /// Whether the symbol is one the turtle acts on, rather than a rule placeholder.
    pub fn is_terminal(symbol: char) -> bool {
        Self::from_symbol(symbol) != Self::Ignore
    }
}
