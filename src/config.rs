//! Tunable configuration for the backdrop effects.
//!
//! Every struct deserializes with `#[serde(default)]`, so the host page may
//! override any subset of keys through a JSON `<script id="fx-config">` block.

use serde::Deserialize;

/// Particle field tuning. Per-frame quantities are expressed for a 60 Hz frame.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct FieldConfig {
	/// Population floor; deficits are backfilled in the same frame.
	pub min_particles: usize,
	/// Population ceiling; random spawns stop at this count.
	pub max_particles: usize,
	/// Absolute cap on a star's rendered radius.
	pub global_max_scale: f64,
	/// Per-frame spawn probability while between min and max.
	pub spawn_chance: f64,
	/// Per-frame exponential blend factor towards the target colour.
	pub color_blend: f64,
	/// Amplitude of the per-frame random velocity kick.
	pub jitter: f64,
	/// Pointer repulsion radius in CSS pixels.
	pub pointer_radius: f64,
	/// Pointer repulsion strength at zero distance.
	pub pointer_force: f64,
	/// Per-frame multiplicative velocity decay.
	pub damping: f64,
	/// Speed clamp in pixels per frame.
	pub max_speed: f64,
	/// Radius above which the shadow glow is drawn.
	pub glow_threshold: f64,
	/// Stars dimmer than this never take part in connections.
	pub visibility_floor: f64,
	/// Peak alpha of a connective line.
	pub line_alpha: f64,
	/// Lines fainter than this are not drawn.
	pub min_line_alpha: f64,
}

impl Default for FieldConfig {
	fn default() -> Self {
		Self {
			min_particles: 120,
			max_particles: 200,
			global_max_scale: 2.5,
			spawn_chance: 0.05,
			color_blend: 0.02,
			jitter: 0.02,
			pointer_radius: 150.0,
			pointer_force: 0.2,
			damping: 0.99,
			max_speed: 3.0,
			glow_threshold: 1.5,
			visibility_floor: 0.1,
			line_alpha: 0.2,
			min_line_alpha: 0.01,
		}
	}
}

impl FieldConfig {
	/// Population bounds with `max >= min` guaranteed.
	pub fn population_bounds(&self) -> (usize, usize) {
		(self.min_particles, self.max_particles.max(self.min_particles))
	}
}

/// Circuit trace generation and reveal timing.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct CircuitConfig {
	/// Side of the square view the traces are generated in.
	pub view: f64,
	/// Traces per batch.
	pub line_count: usize,
	/// Waypoint grid pitch.
	pub grid: f64,
	/// Keep-out border inside the view.
	pub margin: f64,
	/// Fewest turns in a trace.
	pub min_turns: usize,
	/// Most turns in a trace.
	pub max_turns: usize,
	/// Shortest move between turns, in view units.
	pub min_step: f64,
	/// Longest move between turns, in view units.
	pub max_step: f64,
	/// Batch lifetime; the whole batch is regenerated on this period.
	pub cycle_ms: u32,
	/// Fraction of the cycle spent drawing a trace on.
	pub draw_portion: f64,
	/// Fraction of the cycle at which the fade-out starts.
	pub hold_until: f64,
	/// Upper bound of the random per-trace start delay, in seconds.
	pub max_delay: f64,
	/// Fade-in of a freshly generated batch, in seconds.
	pub enter_fade: f64,
	/// CSS hex colour of traces and nodes.
	pub color: String,
	/// Opacity of the whole circuit layer.
	pub layer_opacity: f64,
	/// Trace stroke width in view units.
	pub stroke_width: f64,
	/// Radius of a node's pulsing core.
	pub node_radius: f64,
	/// Radius of a node's expanding ring at scale 1.
	pub ring_radius: f64,
}

impl Default for CircuitConfig {
	fn default() -> Self {
		Self {
			view: 1000.0,
			line_count: 10,
			grid: 20.0,
			margin: 60.0,
			min_turns: 2,
			max_turns: 5,
			min_step: 120.0,
			max_step: 260.0,
			cycle_ms: 6500,
			draw_portion: 0.32,
			hold_until: 0.82,
			max_delay: 0.8,
			enter_fade: 0.35,
			color: "#64FFDA".to_string(),
			layer_opacity: 0.2,
			stroke_width: 1.0,
			node_radius: 2.0,
			ring_radius: 4.0,
		}
	}
}

impl CircuitConfig {
	/// Cycle length in seconds.
	pub fn cycle_secs(&self) -> f64 {
		self.cycle_ms as f64 / 1000.0
	}

	/// Regeneration timer period, `None` when the cycle is zero.
	pub fn regen_interval_ms(&self) -> Option<i32> {
		interval_ms(self.cycle_ms)
	}
}

/// Periodic theme switching for the particle field.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct RotationConfig {
	/// Whether the palette rotates at all.
	pub enabled: bool,
	/// Time between palette changes.
	pub period_ms: u32,
}

impl RotationConfig {
	/// Rotation timer period, `None` when rotation is off.
	pub fn interval_ms(&self) -> Option<i32> {
		if !self.enabled {
			return None;
		}
		interval_ms(self.period_ms)
	}
}

impl Default for RotationConfig {
	fn default() -> Self {
		Self {
			enabled: true,
			period_ms: 20_000,
		}
	}
}

/// A `setInterval` period; zero would fire continuously.
fn interval_ms(ms: u32) -> Option<i32> {
	(ms > 0).then(|| ms.min(i32::MAX as u32) as i32)
}

/// Complete backdrop configuration.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct FxConfig {
	/// Particle field tuning.
	pub field: FieldConfig,
	/// Circuit trace tuning.
	pub circuits: CircuitConfig,
	/// Palette rotation.
	pub rotation: RotationConfig,
}

impl FxConfig {
	/// Parse a (possibly partial) JSON configuration.
	pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(text)
	}
}
