//! Error types for rule parsing, turtle walks and mesh stitching.

use std::fmt;

/// Errors arising from rule-store mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RuleError {
    /// The expression has no `=` separating the rule name from its body.
    InvalidRuleFormat {
        /// The rejected expression.
        expression: String,
    },
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRuleFormat { expression } => {
                write!(f, "invalid rule {expression:?}: expected <name>=<body>")
            }
        }
    }
}

impl std::error::Error for RuleError {}

/// Errors arising while walking an axiom.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TurtleError {
    /// A `]` was reached with no saved position on the branch stack.
    StackUnderflow {
        /// Byte offset of the offending `]` in the axiom.
        index: usize,
    },
}

impl fmt::Display for TurtleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StackUnderflow { index } => {
                write!(f, "branch stack underflow at symbol {index}")
            }
        }
    }
}

impl std::error::Error for TurtleError {}

/// Errors arising while appending rings to a mesh.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MeshError {
    /// A ring needs at least one segment.
    ZeroSegments,
    /// The new ring cannot be stitched to the previous one.
    SegmentCountMismatch {
        /// Segment count of the previous ring.
        previous: u32,
        /// Segment count of the rejected ring.
        current: u32,
    },
    /// The vertex count would no longer fit in a `u32` index.
    IndexOverflow {
        /// Vertex count the ring would have produced.
        vertices: u64,
    },
}

impl fmt::Display for MeshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroSegments => write!(f, "ring must have at least one segment"),
            Self::SegmentCountMismatch { previous, current } => write!(
                f,
                "cannot stitch a ring of {current} segments to a ring of {previous} segments"
            ),
            Self::IndexOverflow { vertices } => {
                write!(f, "{vertices} vertices exceed the u32 index range")
            }
        }
    }
}

impl std::error::Error for MeshError {}

/// Any error produced by the generation pipeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    Rule(RuleError),
    Turtle(TurtleError),
    Mesh(MeshError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rule(e) => write!(f, "rule error: {e}"),
            Self::Turtle(e) => write!(f, "turtle error: {e}"),
            Self::Mesh(e) => write!(f, "mesh error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Rule(e) => Some(e),
            Self::Turtle(e) => Some(e),
            Self::Mesh(e) => Some(e),
        }
    }
}

impl From<RuleError> for Error {
    fn from(e: RuleError) -> Self {
        Self::Rule(e)
    }
}

impl From<TurtleError> for Error {
    fn from(e: TurtleError) -> Self {
        Self::Turtle(e)
    }
}

impl From<MeshError> for Error {
    fn from(e: MeshError) -> Self {
        Self::Mesh(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_offending_input() {
        let e = RuleError::InvalidRuleFormat {
            expression: "noequalsign".into(),
        };
        assert!(e.to_string().contains("noequalsign"));

        let e = Error::from(TurtleError::StackUnderflow { index: 3 });
        assert_eq!(e.to_string(), "turtle error: branch stack underflow at symbol 3");
    }

    #[test]
    fn source_exposes_inner_error() {
        use std::error::Error as _;
        let e = Error::from(MeshError::ZeroSegments);
        assert!(e.source().is_some());
    }
}
