//! Ring-stitched tube meshes built around walked points.

use crate::error::MeshError;
use crate::interpreter::PointSequence;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use tracing::trace;

/// Configuration for meshing a walked path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    /// Radius of every ring.
    pub radius: f32,
    /// Vertices per ring.
    pub segments: u32,
    /// Start a new tube at every branch restore instead of stitching the
    /// branch tip to the restored position.
    pub split_branches: bool,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            radius: 0.1,
            segments: 8,
            split_branches: false,
        }
    }
}

/// Location of one ring inside the vertex buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RingSpan {
    /// Index of the ring's first vertex.
    pub start: u32,
    /// Number of vertices in the ring.
    pub segments: u32,
}

/// Flat vertex and index buffers of a tube mesh.
///
/// `vertices` holds three floats per vertex. `indices` holds four entries
/// per side-wall quad: `(prev[i], prev[i+1], cur[i], cur[i+1])`, with `i+1`
/// wrapping around the ring. Both buffers only ever grow.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshBuffers {
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

impl MeshBuffers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Iterates the vertices as points.
    pub fn positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.vertices
            .chunks_exact(3)
            .map(|v| Vec3::new(v[0], v[1], v[2]))
    }

    /// Expands every quad into two triangles, for triangle-list renderers.
    pub fn triangle_indices(&self) -> Vec<u32> {
        self.indices
            .chunks_exact(4)
            .flat_map(|q| [q[0], q[2], q[1], q[1], q[2], q[3]])
            .collect()
    }
}

/// Builds [`MeshBuffers`] one cross-section ring at a time.
#[derive(Clone, Debug, Default)]
pub struct RingMesher {
    buffers: MeshBuffers,
    rings: u32,
    last_ring: Option<RingSpan>,
}

impl RingMesher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Meshes a whole path with one ring per point.
    ///
    /// Every consecutive pair of points is stitched, including the jump a
    /// branch restore makes from a branch tip back to the trunk. Use
    /// [`mesh_tubes`](Self::mesh_tubes) to keep branches apart.
    pub fn mesh_path(points: &[Vec3], config: &MeshConfig) -> Result<MeshBuffers, MeshError> {
        let mut mesher = Self::new();
        for &point in points {
            mesher.add_ring(point, config.radius, config.segments)?;
        }
        Ok(mesher.into_buffers())
    }

    /// Meshes each tube separately; rings of different tubes are never stitched.
    pub fn mesh_tubes(tubes: &[PointSequence], config: &MeshConfig) -> Result<MeshBuffers, MeshError> {
        let mut mesher = Self::new();
        for tube in tubes {
            mesher.start_tube();
            for &point in tube {
                mesher.add_ring(point, config.radius, config.segments)?;
            }
        }
        Ok(mesher.into_buffers())
    }

    /// The next ring starts a new tube and is not stitched to the previous one.
    pub fn start_tube(&mut self) {
        self.last_ring = None;
    }

    pub fn buffers(&self) -> &MeshBuffers {
        &self.buffers
    }

    pub fn ring_count(&self) -> u32 {
        self.rings
    }

    /// The most recently appended ring of the current tube.
    pub fn last_ring(&self) -> Option<RingSpan> {
        self.last_ring
    }

    pub fn into_buffers(self) -> MeshBuffers {
        self.buffers
    }

    /// Appends a ring of `segments` vertices around `center` in the XY plane
    /// and, if a previous ring exists, stitches the two with
    /// `4 * segments` indices.
    ///
    /// All checks run before anything is written, so on error the buffers
    /// are left as they were.
    pub fn add_ring(&mut self, center: Vec3, radius: f32, segments: u32) -> Result<(), MeshError> {
        if segments == 0 {
            return Err(MeshError::ZeroSegments);
        }
        if let Some(prev) = self.last_ring
            && prev.segments != segments
        {
            return Err(MeshError::SegmentCountMismatch {
                previous: prev.segments,
                current: segments,
            });
        }
        let start = self.buffers.vertex_count() as u64;
        let end = start + u64::from(segments);
        if end > u64::from(u32::MAX) {
            return Err(MeshError::IndexOverflow { vertices: end });
        }
        let start = start as u32;

        let step = TAU / f64::from(segments);
        self.buffers.vertices.reserve(segments as usize * 3);
        for i in 0..segments {
            let angle = step * f64::from(i);
            let dx = f64::from(radius) * angle.cos();
            let dy = f64::from(radius) * angle.sin();
            self.buffers.vertices.extend_from_slice(&[
                center.x + dx as f32,
                center.y + dy as f32,
                center.z,
            ]);
        }

        if let Some(prev) = self.last_ring {
            self.buffers.indices.reserve(segments as usize * 4);
            for i in 0..segments {
                let next = (i + 1) % segments;
                self.buffers.indices.extend_from_slice(&[
                    prev.start + i,
                    prev.start + next,
                    start + i,
                    start + next,
                ]);
            }
        }

        self.last_ring = Some(RingSpan { start, segments });
        self.rings += 1;
        trace!(ring = self.rings, start, segments, "ring added");
        Ok(())
    }
}
