use glam::{EulerRot, Mat4, Quat, Vec3};
use rand::Rng;
use std::sync::Arc;

use crate::camera::Camera;
use crate::config::SceneParams;
use crate::shape::{PlaneShape, PointCloud, RingShape, Shape};

/// Identity of a scene node; never reused within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

/// Position plus XYZ Euler rotation
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
}

impl Transform {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            rotation: Vec3::ZERO,
        }
    }

    pub fn matrix(&self) -> Mat4 {
        let rotation = Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        );
        Mat4::from_rotation_translation(rotation, self.position)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Material {
    /// Lit by the ambient and point lights
    Standard { color: [f32; 3] },
    /// Flat colour, ignores lights
    Basic { color: [f32; 3] },
    /// Camera-facing sprites alpha-mapped by the star texture
    Points { color: [f32; 3], size: f32 },
}

/// Renderable object: transform + immutable shape + material
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub id: NodeId,
    pub transform: Transform,
    pub shape: Arc<Shape>,
    pub material: Material,
}

impl SceneNode {
    pub fn new(id: NodeId, transform: Transform, shape: Shape, material: Material) -> Self {
        Self {
            id,
            transform,
            shape: Arc::new(shape),
            material,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: [f32; 3],
    pub intensity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub color: [f32; 3],
    pub intensity: f32,
    pub range: f32,
    pub decay: f32,
    pub position: Vec3,
}

/// Static part of the scene graph. The ring is not here: it belongs to the
/// frame driver once animation starts.
#[derive(Debug, Clone)]
pub struct Scene {
    pub clear_color: [f32; 3],
    pub camera: Camera,
    pub ambient: AmbientLight,
    pub point_light: PointLight,
    pub road: SceneNode,
    pub stars: SceneNode,
}

/// Everything the composer builds: the static scene and the first ring
#[derive(Debug, Clone)]
pub struct Composition {
    pub scene: Scene,
    pub ring: SceneNode,
    /// First id not taken by the composed nodes
    pub next_id: NodeId,
}

/// Build the initial object graph.
///
/// Only starfield placement draws from `rng`.
pub fn compose_scene<R: Rng + ?Sized>(params: &SceneParams, aspect: f32, rng: &mut R) -> Composition {
    let camera = Camera::new(&params.camera, aspect);

    let lights = &params.lights;
    let ambient = AmbientLight {
        color: lights.ambient_color,
        intensity: lights.ambient_intensity,
    };
    let point_light = PointLight {
        color: lights.point_color,
        intensity: lights.point_intensity,
        range: lights.point_range,
        decay: lights.point_decay,
        position: Vec3::from_array(lights.point_position),
    };

    let road = SceneNode::new(
        NodeId(0),
        Transform {
            position: Vec3::new(0.0, 0.0, camera.position.z - params.road.length / 2.0),
            rotation: Vec3::new(params.road.rotation_x, 0.0, 0.0),
        },
        Shape::Plane(PlaneShape {
            width: params.road.width,
            height: params.road.length,
        }),
        Material::Standard {
            color: params.road.color,
        },
    );

    let stars = SceneNode::new(
        NodeId(1),
        Transform::default(),
        Shape::Points(PointCloud::starfield(
            rng,
            params.stars.count,
            camera.far * params.stars.radius_fraction,
            params.road.length,
            camera.position.z,
        )),
        Material::Points {
            color: [1.0, 1.0, 1.0],
            size: params.stars.size,
        },
    );

    let ring = ring_node(
        params,
        NodeId(2),
        params.ring.initial_segments,
        params.ring.initial_z,
    );

    Composition {
        scene: Scene {
            clear_color: params.clear_color,
            camera,
            ambient,
            point_light,
            road,
            stars,
        },
        ring,
        next_id: NodeId(3),
    }
}

/// A fresh ring node with its own shape at `z` on the travel axis
pub fn ring_node(params: &SceneParams, id: NodeId, theta_segments: u32, z: f32) -> SceneNode {
    let inner = params.ring_inner_radius();
    SceneNode::new(
        id,
        Transform::at(Vec3::new(0.0, 0.0, z)),
        Shape::Ring(RingShape::new(inner, inner + params.ring.thickness, theta_segments)),
        Material::Basic {
            color: params.ring.color,
        },
    )
}
