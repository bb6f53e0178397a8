pub mod core;

pub use core::{RegionRegistry, RegionRenderer, RendererSettings};
