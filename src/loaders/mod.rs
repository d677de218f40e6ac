pub mod texture;

pub use texture::{load_alpha_map, AlphaMap};
