//! Procedural circuit-trace background.
//!
//! Generates a batch of right-angle polylines snapped to a grid, animates
//! each one drawing on, holding and fading out, and reveals node markers
//! only once the line has reached them. The whole batch is regenerated on
//! a fixed cycle.

mod component;
pub mod generator;
pub mod motion;
mod render;
pub mod state;

pub use component::CircuitLines;
pub use render::ViewFit;
pub use state::{Circuit, CircuitField, FadingBatch};
