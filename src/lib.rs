//! # sysl-turtle
//!
//! Procedural branching geometry from string-rewriting L-Systems.
//!
//! A [`RuleStore`] rewrites a seed axiom for a number of generations, a
//! [`TurtleInterpreter`] walks the result through 3D space, and a
//! [`RingMesher`] wraps the walked points in ring cross-sections stitched
//! into a tube mesh. [`LSystem`] ties the three together, and the [`ffi`]
//! module exposes sessions to C hosts through generational handles.

pub mod error;
pub mod ffi;
pub mod generator;
pub mod handle;
pub mod interpreter;
pub mod mesh;
pub mod rules;
pub mod system;
pub mod turtle;

pub use error::*;
pub use generator::*;
pub use interpreter::*;
pub use mesh::*;
pub use rules::*;
pub use system::*;
pub use turtle::*;
