use glam::{Mat4, Vec3};
use rand::Rng;
use std::sync::Arc;

use crate::config::SceneParams;
use crate::error::ConfigError;
use crate::scene::{ring_node, Composition, Material, NodeId, Scene, SceneNode, Transform};
use crate::shape::Shape;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingPhase {
    /// Stationary, waiting for the gate
    Idle,
    /// Moving toward the far end of the road every frame
    Advancing,
}

/// The one live ring and where it is in its lifecycle
#[derive(Debug, Clone, PartialEq)]
pub struct RingLifecycle {
    pub phase: RingPhase,
    pub node: SceneNode,
    /// Whole second in which the gate last opened
    gate_second: Option<u64>,
}

impl RingLifecycle {
    pub fn position_z(&self) -> f32 {
        self.node.transform.position.z
    }

    pub fn theta_segments(&self) -> Option<u32> {
        self.node.shape.as_ring().map(|ring| ring.theta_segments())
    }
}

/// Everything the frame driver carries from one frame to the next
#[derive(Debug, Clone, PartialEq)]
pub struct FrameState {
    pub ring: RingLifecycle,
    pub stars_rotation: f32,
    last_elapsed: Option<f64>,
    next_id: NodeId,
}

impl FrameState {
    /// Take ownership of the composed ring, idle
    pub fn new(ring: SceneNode, next_id: NodeId) -> Self {
        Self {
            ring: RingLifecycle {
                phase: RingPhase::Idle,
                node: ring,
                gate_second: None,
            },
            stars_rotation: 0.0,
            last_elapsed: None,
            next_id,
        }
    }

    pub fn from_composition(composition: &Composition) -> Self {
        Self::new(composition.ring.clone(), composition.next_id)
    }
}

/// A ring swap performed during a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recycled {
    pub retired: NodeId,
    pub spawned: NodeId,
    pub theta_segments: u32,
}

/// One draw call's worth of data
#[derive(Debug, Clone)]
pub struct DrawCommand {
    pub node: NodeId,
    pub shape: Arc<Shape>,
    pub material: Material,
    pub model: Mat4,
}

impl DrawCommand {
    fn of(node: &SceneNode, transform: &Transform) -> Self {
        Self {
            node: node.id,
            shape: Arc::clone(&node.shape),
            material: node.material,
            model: transform.matrix(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FrameOutput {
    /// Road, stars, ring, in that order
    pub commands: Vec<DrawCommand>,
    pub recycled: Option<Recycled>,
    /// The gate moved the ring from Idle to Advancing this frame
    pub started: bool,
}

/// Per-frame simulation: rotation, gate, recycling and translation
#[derive(Debug, Clone)]
pub struct FrameDriver {
    params: SceneParams,
}

impl FrameDriver {
    pub fn new(params: &SceneParams) -> Result<Self, ConfigError> {
        params.validate()?;
        Ok(Self {
            params: params.clone(),
        })
    }

    pub fn params(&self) -> &SceneParams {
        &self.params
    }

    /// Advance the scene to `elapsed` seconds.
    ///
    /// Order: rotations, gate, recycle, translation, draw commands. Translation
    /// only happens when `elapsed` is later than the previous step's, so
    /// repeating a step changes nothing but the (time-derived) rotations.
    pub fn step<R: Rng + ?Sized>(
        &self,
        scene: &Scene,
        mut state: FrameState,
        elapsed: f64,
        rng: &mut R,
    ) -> (FrameState, FrameOutput) {
        let time_advanced = state.last_elapsed.map_or(true, |last| elapsed > last);

        state.stars_rotation = angle_at(elapsed, self.params.stars.spin_rate);
        state.ring.node.transform.rotation.z = self.ring_rotation(elapsed);

        let started = self.open_gate(&mut state.ring, elapsed);

        let recycled = (state.ring.position_z() < self.params.recycle_threshold())
            .then(|| self.recycle(&mut state, elapsed, rng));

        if state.ring.phase == RingPhase::Advancing && time_advanced {
            state.ring.node.transform.position.z -= self.params.animation.step;
        }

        if time_advanced {
            state.last_elapsed = Some(elapsed);
        }

        let stars_transform = Transform {
            position: scene.stars.transform.position,
            rotation: Vec3::new(0.0, 0.0, state.stars_rotation),
        };
        let commands = vec![
            DrawCommand::of(&scene.road, &scene.road.transform),
            DrawCommand::of(&scene.stars, &stars_transform),
            DrawCommand::of(&state.ring.node, &state.ring.node.transform),
        ];

        (
            state,
            FrameOutput {
                commands,
                recycled,
                started,
            },
        )
    }

    fn ring_rotation(&self, elapsed: f64) -> f32 {
        angle_at(elapsed, self.params.ring.spin_rate)
    }

    /// Returns true when the ring went from Idle to Advancing.
    ///
    /// The gate opens once per qualifying second; later frames in the same
    /// second leave the phase alone, even after a recycle.
    fn open_gate(&self, ring: &mut RingLifecycle, elapsed: f64) -> bool {
        let second = elapsed.max(0.0).floor() as u64;
        if second % self.params.animation.period != 0 || ring.gate_second == Some(second) {
            return false;
        }
        ring.gate_second = Some(second);

        let was_idle = ring.phase == RingPhase::Idle;
        ring.phase = RingPhase::Advancing;
        was_idle
    }

    fn recycle<R: Rng + ?Sized>(&self, state: &mut FrameState, elapsed: f64, rng: &mut R) -> Recycled {
        let candidates = &self.params.ring.segment_candidates;
        let theta_segments = candidates[rng.gen_range(0..candidates.len())];

        let id = state.next_id;
        state.next_id = NodeId(id.0 + 1);

        let mut node = ring_node(&self.params, id, theta_segments, self.params.ring.reset_z);
        node.transform.rotation.z = self.ring_rotation(elapsed);

        // The old node and, once nothing else holds it, its shape are dropped here
        let retired = std::mem::replace(&mut state.ring.node, node);
        state.ring.phase = RingPhase::Idle;

        Recycled {
            retired: retired.id,
            spawned: id,
            theta_segments,
        }
    }
}

/// Angle after `elapsed` seconds at `rate` rad/s, wrapped to one turn.
/// Computed in f64 so long sessions keep sub-frame precision.
fn angle_at(elapsed: f64, rate: f32) -> f32 {
    ((elapsed * f64::from(rate)) % std::f64::consts::TAU) as f32
}
