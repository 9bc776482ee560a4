//! Backdrop layers and the browser plumbing they share.

pub mod circuit_lines;
pub mod frame_loop;
pub mod particle_field;
pub mod surface;
