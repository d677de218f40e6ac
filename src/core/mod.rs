pub mod clock;
pub mod controller;
pub mod gpu_context;
pub mod input_adapter;

pub use clock::{Clock, FpsCounter, FrameTime};
pub use controller::{Button, InputAction};
pub use gpu_context::{GpuContext, DEPTH_FORMAT};
pub use input_adapter::WinitController;
