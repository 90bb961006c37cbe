//! Seascape desktop viewer: window, GPU renderer and control panel wiring.

pub mod gpu;
pub mod renderer;
pub mod window;

pub use gpu::{GpuContext, GpuError, init_gpu_blocking};
pub use renderer::{WgpuRenderer, clear_color};
pub use window::{SeascapeApp, run};
