//! Interpreter that walks an axiom string and records the visited positions.
//!
//! The entry point is [`TurtleInterpreter`]. Configure it with a
//! [`TurtleConfig`] and call [`TurtleInterpreter::walk`] with a generated
//! axiom. Every `F` appends the new position to the returned
//! [`PointSequence`]; the origin is always its first element.

use crate::error::TurtleError;
use crate::turtle::{TurtleOp, TurtleState};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Ordered positions produced by one walk.
pub type PointSequence = Vec<Vec3>;

/// Configuration for turtle interpretation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurtleConfig {
    /// Where the walk starts.
    pub origin: Vec3,
    /// Angle in degrees used by every rotation symbol.
    pub angle_degrees: f32,
    /// Distance covered by one `F`, as a multiple of the unit heading.
    pub step: f32,
    /// Whether `]` also restores the heading saved by `[`.
    /// Off by default: only the position is restored.
    pub restore_heading: bool,
}

impl Default for TurtleConfig {
    fn default() -> Self {
        Self {
            origin: Vec3::ZERO,
            angle_degrees: 45.0,
            step: 1.0,
            restore_heading: false,
        }
    }
}

impl TurtleConfig {
    /// Default configuration with the given origin and angle.
    pub fn new(origin: Vec3, angle_degrees: f32) -> Self {
        Self {
            origin,
            angle_degrees,
            ..Default::default()
        }
    }
}

/// Interprets axiom strings as turtle commands.
#[derive(Clone, Debug, Default)]
pub struct TurtleInterpreter {
    config: TurtleConfig,
}

impl TurtleInterpreter {
    pub fn new(config: TurtleConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TurtleConfig {
        &self.config
    }

    /// Walks `axiom` left to right and returns the visited positions.
    ///
    /// # Push / Pop
    ///
    /// `[` saves the current position onto a stack private to this call and
    /// `]` restores it. The heading carries on unchanged across `]` unless
    /// [`TurtleConfig::restore_heading`] is set. A `]` with nothing saved
    /// aborts the walk with [`TurtleError::StackUnderflow`].
    pub fn walk(&self, axiom: &str) -> Result<PointSequence, TurtleError> {
        let mut points = vec![self.config.origin];
        self.run(axiom, |event| {
            if let WalkEvent::Moved(p) = event {
                points.push(p);
            }
        })?;
        Ok(points)
    }

    /// Walks `axiom` like [`walk`](Self::walk) but cuts the path at every `]`.
    ///
    /// Each returned tube starts where the previous one was cut: the first
    /// at the origin, every later one at the position a `]` restored.
    /// Concatenating the tubes, minus the first point of every tube after
    /// the first, gives exactly the points of [`walk`](Self::walk).
    pub fn walk_tubes(&self, axiom: &str) -> Result<Vec<PointSequence>, TurtleError> {
        let mut tubes = vec![vec![self.config.origin]];
        self.run(axiom, |event| match event {
            WalkEvent::Moved(p) => {
                if let Some(tube) = tubes.last_mut() {
                    tube.push(p);
                }
            }
            WalkEvent::Restored(p) => tubes.push(vec![p]),
        })?;
        Ok(tubes)
    }

    fn run(&self, axiom: &str, mut emit: impl FnMut(WalkEvent)) -> Result<(), TurtleError> {
        let angle = self.config.angle_degrees.to_radians();
        let mut turtle = TurtleState::at(self.config.origin);
        let mut stack: Vec<TurtleState> = Vec::new();
        let mut max_depth = 0;
        let mut moves = 0usize;

        for (index, symbol) in axiom.char_indices() {
            match TurtleOp::from_symbol(symbol) {
                TurtleOp::Forward => {
                    turtle.advance(self.config.step);
                    moves += 1;
                    emit(WalkEvent::Moved(turtle.position));
                }
                TurtleOp::Yaw(s) => turtle.rotate_z(angle * s),
                TurtleOp::Pitch(s) => turtle.rotate_y(angle * s),
                TurtleOp::Roll(s) => turtle.rotate_x(angle * s),
                TurtleOp::Push => {
                    stack.push(turtle);
                    max_depth = max_depth.max(stack.len());
                }
                TurtleOp::Pop => {
                    let saved = stack.pop().ok_or(TurtleError::StackUnderflow { index })?;
                    turtle.position = saved.position;
                    if self.config.restore_heading {
                        turtle.heading = saved.heading;
                    }
                    emit(WalkEvent::Restored(turtle.position));
                }
                TurtleOp::Reserved | TurtleOp::Ignore => {}
            }
        }

        debug!(moves, max_depth, unclosed = stack.len(), "walk complete");
        Ok(())
    }
}

enum WalkEvent {
    Moved(Vec3),
    Restored(Vec3),
}
