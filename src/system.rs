//! A complete L-System session: rules in, geometry out.

use crate::error::{Error, RuleError};
use crate::generator::generate_axiom;
use crate::interpreter::{PointSequence, TurtleConfig, TurtleInterpreter};
use crate::mesh::{MeshBuffers, MeshConfig, RingMesher};
use crate::rules::RuleStore;
use serde::{Deserialize, Serialize};

/// Options for a full generate-walk-mesh run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessOptions {
    /// Number of rewrite generations.
    pub iterations: u32,
    pub turtle: TurtleConfig,
    /// Mesh the walked path when set.
    pub mesh: Option<MeshConfig>,
}

/// Output of [`LSystem::process`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    /// The generated axiom that was walked.
    pub axiom: String,
    pub points: PointSequence,
    pub mesh: Option<MeshBuffers>,
}

impl Geometry {
    /// Serializes the geometry as JSON. Points are `[x, y, z]` arrays.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// One L-System session owning its rule set.
///
/// Every generation or walk works on fresh transient state; a failed call
/// leaves the rules untouched.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LSystem {
    rules: RuleStore,
}

impl LSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rules(&self) -> &RuleStore {
        &self.rules
    }

    pub fn add_rule(&mut self, expression: &str) -> Result<(), RuleError> {
        self.rules.add_rule(expression)
    }

    pub fn remove_rule(&mut self, name: &str) {
        self.rules.remove_rule(name);
    }

    pub fn clear_rules(&mut self) {
        self.rules.clear_rules();
    }

    pub fn generate_axiom(&self, seed: &str, iterations: u32) -> String {
        generate_axiom(&self.rules, seed, iterations)
    }

    /// Generates an axiom from `seed`, walks it, and optionally meshes the path.
    pub fn process(&self, seed: &str, options: &ProcessOptions) -> Result<Geometry, Error> {
        let axiom = self.generate_axiom(seed, options.iterations);
        let interpreter = TurtleInterpreter::new(options.turtle.clone());
        let (points, mesh) = match &options.mesh {
            Some(config) if config.split_branches => {
                let tubes = interpreter.walk_tubes(&axiom)?;
                let mesh = RingMesher::mesh_tubes(&tubes, config)?;
                (join_tubes(&tubes), Some(mesh))
            }
            Some(config) => {
                let points = interpreter.walk(&axiom)?;
                let mesh = RingMesher::mesh_path(&points, config)?;
                (points, Some(mesh))
            }
            None => (interpreter.walk(&axiom)?, None),
        };
        Ok(Geometry {
            axiom,
            points,
            mesh,
        })
    }
}

/// Rebuilds the walked path from tubes cut at branch restores.
fn join_tubes(tubes: &[PointSequence]) -> PointSequence {
    let mut tubes = tubes.iter();
    let mut points = tubes.next().cloned().unwrap_or_default();
    for tube in tubes {
        points.extend(tube.iter().skip(1));
    }
    points
}
