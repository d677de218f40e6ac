use glam::Vec3;
use rand::Rng;
use std::f32::consts::TAU;

use crate::types::{StarInstance, Vertex};

/// Indexed triangle mesh ready for upload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Flat annulus in the XY plane, facing +Z.
///
/// Descriptors are values: a ring with a different segment count is a new
/// `RingShape`, never an edit of a live one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingShape {
    inner_radius: f32,
    outer_radius: f32,
    theta_segments: u32,
}

impl RingShape {
    pub fn new(inner_radius: f32, outer_radius: f32, theta_segments: u32) -> Self {
        Self {
            inner_radius,
            outer_radius,
            theta_segments: theta_segments.max(3),
        }
    }

    pub fn inner_radius(&self) -> f32 {
        self.inner_radius
    }

    pub fn outer_radius(&self) -> f32 {
        self.outer_radius
    }

    pub fn theta_segments(&self) -> u32 {
        self.theta_segments
    }

    /// One radial band, `theta_segments` quads around
    pub fn tessellate(&self) -> MeshData {
        let segments = self.theta_segments;
        let normal = [0.0, 0.0, 1.0];

        let vertices = [self.inner_radius, self.outer_radius]
            .iter()
            .flat_map(|&radius| {
                (0..=segments).map(move |i| {
                    let angle = i as f32 / segments as f32 * TAU;
                    Vertex {
                        position: [radius * angle.cos(), radius * angle.sin(), 0.0],
                        normal,
                    }
                })
            })
            .collect();

        let stride = segments + 1;
        let indices = (0..segments)
            .flat_map(|i| {
                let a = i;
                let b = i + stride;
                let c = i + stride + 1;
                let d = i + 1;
                [a, b, d, b, c, d]
            })
            .collect();

        MeshData { vertices, indices }
    }
}

/// Single-quad plane in the XY plane, facing +Z
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneShape {
    pub width: f32,
    pub height: f32,
}

impl PlaneShape {
    pub fn tessellate(&self) -> MeshData {
        let hw = self.width * 0.5;
        let hh = self.height * 0.5;
        let normal = [0.0, 0.0, 1.0];
        let corner = |x: f32, y: f32| Vertex {
            position: [x, y, 0.0],
            normal,
        };

        MeshData {
            vertices: vec![
                corner(-hw, hh),
                corner(hw, hh),
                corner(-hw, -hh),
                corner(hw, -hh),
            ],
            indices: vec![0, 2, 1, 2, 3, 1],
        }
    }
}

/// Static particle positions
#[derive(Debug, Clone, PartialEq)]
pub struct PointCloud {
    pub points: Vec<StarInstance>,
}

impl PointCloud {
    /// Scatter `count` points on discs around the travel axis.
    ///
    /// Each point gets a uniform angle and a uniform radius up to
    /// `max_radius`; depth is uniform over `[z_offset - depth, z_offset)`.
    pub fn starfield<R: Rng + ?Sized>(
        rng: &mut R,
        count: usize,
        max_radius: f32,
        depth: f32,
        z_offset: f32,
    ) -> Self {
        let points = (0..count)
            .map(|_| {
                let angle = rng.gen::<f32>() * TAU;
                let amplitude = rng.gen::<f32>() * max_radius;
                let z = rng.gen::<f32>() * -depth + z_offset;
                let position = Vec3::new(amplitude * angle.sin(), amplitude * angle.cos(), z);
                StarInstance {
                    position: position.to_array(),
                }
            })
            .collect();

        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Shape resource held by a scene node
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Plane(PlaneShape),
    Ring(RingShape),
    Points(PointCloud),
}

impl Shape {
    /// Triangle mesh for mesh shapes, `None` for point clouds
    pub fn tessellate(&self) -> Option<MeshData> {
        match self {
            Shape::Plane(plane) => Some(plane.tessellate()),
            Shape::Ring(ring) => Some(ring.tessellate()),
            Shape::Points(_) => None,
        }
    }

    pub fn as_ring(&self) -> Option<&RingShape> {
        match self {
            Shape::Ring(ring) => Some(ring),
            _ => None,
        }
    }

    pub fn as_points(&self) -> Option<&PointCloud> {
        match self {
            Shape::Points(cloud) => Some(cloud),
            _ => None,
        }
    }
}
