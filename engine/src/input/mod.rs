//! Control input handling

pub mod state;

pub use state::ControlInput;
