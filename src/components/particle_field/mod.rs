//! Ambient particle field.
//!
//! A canvas of glowing stars with:
//! - Independent birth/death schedules and a half-sine fade envelope
//! - Proximity lines between visible stars, reach growing with star size
//! - Pointer repulsion and soft bouncing off the viewport edges
//! - Smooth palette transitions driven by an external theme index
//!
//! # Example
//!
//! ```ignore
//! use portfolio_fx::ParticleField;
//!
//! let (theme, set_theme) = signal(0usize);
//! view! { <ParticleField theme_index=theme /> }
//! ```

mod component;
pub mod particles;
mod render;
pub mod state;
pub mod theme;

pub use component::ParticleField;
pub use state::{FRAME_DT, FieldState};
pub use theme::{PALETTES, Palette, Rgb};
