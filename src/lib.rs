pub mod camera;
pub mod cli;
pub mod config;
pub mod core;
pub mod driver;
pub mod error;
pub mod gui;
pub mod loaders;
pub mod renderer;
pub mod scene;
pub mod shape;
pub mod types;

pub use config::SceneParams;
pub use driver::{DrawCommand, FrameDriver, FrameOutput, FrameState, RingPhase};
pub use scene::{compose_scene, Composition, Scene};
