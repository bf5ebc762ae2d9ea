//! Core simulation types: geodesy, aircraft state, camera and timing

pub mod aircraft;
pub mod camera;
pub mod clock;
pub mod coordinates;
