//! Renderer hand-off types
//!
//! The core does not own a GPU device. It produces uniform data in the
//! layout the shaders expect and leaves buffer management to the host.

pub mod uniform;

pub use uniform::CameraUniform;
