//! Circuit batch state and reveal timing.
//!
//! A batch of traces is generated up front and replaced wholesale every
//! cycle; individual traces are never patched in place. Everything here is a
//! pure function of the batch and the seconds elapsed since it was created,
//! so a dropped frame simply resamples on the next one.

use fastrand::Rng;
use log::{debug, warn};

use super::generator::{CircuitNode, TracePath, generate};
use super::motion::{Easing, Keyframes};
use crate::components::particle_field::theme::{FALLBACK_COLOR, Rgb};
use crate::config::CircuitConfig;

const STROKE_VALUES: [f64; 4] = [0.0, 1.0, 1.0, 0.0];
const CORE_OPACITY: Keyframes<'static> = Keyframes::new(&[0.0, 0.9, 0.6, 0.9], Easing::EaseInOut);
const CORE_SCALE: Keyframes<'static> = Keyframes::new(&[0.8, 1.2, 1.0, 1.2], Easing::EaseInOut);
const CORE_PERIOD: f64 = 1.8;
const RING_OPACITY: Keyframes<'static> = Keyframes::new(&[0.0, 0.8, 0.0], Easing::EaseOut);
const RING_SCALE: Keyframes<'static> = Keyframes::new(&[0.6, 1.5], Easing::EaseOut);
const RING_PERIOD: f64 = 2.0;

/// How much of a trace is drawn, and how opaque it is, at one instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrokeFrame {
	/// Drawn fraction of the path length, `0.0..=1.0`.
	pub drawn: f64,
	/// Stroke opacity before the layer multiplier.
	pub opacity: f64,
}

/// Appearance of a revealed node marker.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeFrame {
	/// Opacity of the filled core.
	pub core_opacity: f64,
	/// Radius multiplier of the core.
	pub core_scale: f64,
	/// Opacity of the expanding ring.
	pub ring_opacity: f64,
	/// Radius multiplier of the ring.
	pub ring_scale: f64,
}

/// One animated trace.
#[derive(Clone, Debug)]
pub struct Circuit {
	/// `c-{batch}-{index}`, unique across batches.
	pub id: String,
	/// Geometry and node markers.
	pub path: TracePath,
	/// Length of one draw/hold/fade loop, in seconds.
	pub duration: f64,
	/// Seconds after batch creation before the draw-on starts.
	pub delay: f64,
}

impl Circuit {
	/// Seconds after batch creation at which the line reaches `node`.
	pub fn node_reveal_time(&self, node: &CircuitNode, draw_portion: f64) -> f64 {
		self.delay + self.duration * draw_portion.clamp(0.0, 1.0) * node.frac
	}

	/// Draw-on progress and opacity at `elapsed` seconds into the batch.
	pub fn stroke_at(&self, elapsed: f64, config: &CircuitConfig) -> StrokeFrame {
		let local = elapsed - self.delay;
		if local < 0.0 || self.duration <= 0.0 {
			return StrokeFrame {
				drawn: 0.0,
				opacity: 0.0,
			};
		}

		let draw = config.draw_portion.clamp(0.0, 1.0);
		let hold = config.hold_until.clamp(draw, 1.0);
		let times = [0.0, draw, hold, 1.0];
		let track = Keyframes::new(&STROKE_VALUES, Easing::Linear).at(&times);
		let value = track.sample_looped(local, self.duration);
		StrokeFrame {
			drawn: value,
			opacity: value,
		}
	}

	/// Node appearance, or `None` while the line has not reached it yet.
	pub fn node_at(&self, node: &CircuitNode, elapsed: f64, config: &CircuitConfig) -> Option<NodeFrame> {
		let since = elapsed - self.node_reveal_time(node, config.draw_portion);
		if since < 0.0 {
			return None;
		}
		Some(NodeFrame {
			core_opacity: CORE_OPACITY.sample_looped(since, CORE_PERIOD),
			core_scale: CORE_SCALE.sample_looped(since, CORE_PERIOD),
			ring_opacity: RING_OPACITY.sample_looped(since, RING_PERIOD),
			ring_scale: RING_SCALE.sample_looped(since, RING_PERIOD),
		})
	}
}

/// A replaced batch that is still fading out.
pub struct FadingBatch<'a> {
	/// The previous batch's traces.
	pub circuits: &'a [Circuit],
	/// Seconds into the previous batch's own cycle.
	pub elapsed: f64,
	/// Exit multiplier, falling from 1 to 0 over `enter_fade`.
	pub opacity: f64,
}

/// The current batch of traces plus the clock it animates against.
pub struct CircuitField {
	/// Generation and timing tuning.
	pub config: CircuitConfig,
	/// Current batch.
	pub circuits: Vec<Circuit>,
	/// Parsed trace colour.
	pub color: Rgb,
	generation: u64,
	/// Frame timestamp (ms) of the first frame drawn for this batch.
	born_at: Option<f64>,
	/// Most recent frame timestamp (ms) seen by the clock.
	last_frame: Option<f64>,
	/// Previous batch and its age (s) at the moment it was replaced.
	outgoing: Option<(Vec<Circuit>, f64)>,
	rng: Rng,
}

impl CircuitField {
	/// First batch, seeded from the platform RNG.
	pub fn new(config: CircuitConfig) -> Self {
		Self::with_rng(config, Rng::new())
	}

	/// First batch drawn from `rng`; an unparsable colour falls back to teal.
	pub fn with_rng(config: CircuitConfig, rng: Rng) -> Self {
		let color = Rgb::parse(&config.color).unwrap_or_else(|| {
			warn!("circuit-lines: bad colour {:?}, using fallback", config.color);
			FALLBACK_COLOR
		});
		let mut field = Self {
			config,
			circuits: Vec::new(),
			color,
			generation: 0,
			born_at: None,
			last_frame: None,
			outgoing: None,
			rng,
		};
		field.regenerate();
		field
	}

	/// Number of batches generated so far.
	pub fn generation(&self) -> u64 {
		self.generation
	}

	/// Replace the whole batch. The clock restarts on the next frame.
	///
	/// The replaced batch keeps animating while it fades out over
	/// `enter_fade`, crossfading with the new one.
	pub fn regenerate(&mut self) {
		let age = match (self.born_at, self.last_frame) {
			(Some(born), Some(last)) => ((last - born) / 1000.0).max(0.0),
			_ => 0.0,
		};
		let previous = std::mem::take(&mut self.circuits);
		self.outgoing = (!previous.is_empty() && self.config.enter_fade > 0.0).then_some((previous, age));

		self.generation += 1;
		let duration = self.config.cycle_secs();
		let max_delay = self.config.max_delay.max(0.0);

		let mut circuits = Vec::with_capacity(self.config.line_count);
		for i in 0..self.config.line_count {
			let Some(path) = generate(&mut self.rng, &self.config) else {
				warn!("circuit-lines: margins leave no room for traces");
				break;
			};
			circuits.push(Circuit {
				id: format!("c-{}-{}", self.generation, i),
				path,
				duration,
				delay: self.rng.f64() * max_delay,
			});
		}
		self.circuits = circuits;
		self.born_at = None;
		debug!(
			"circuit-lines: batch {} with {} traces",
			self.generation,
			self.circuits.len()
		);
	}

	/// Seconds since this batch's first frame; starts the clock if needed.
	///
	/// Drops the outgoing batch once its exit fade has finished.
	pub fn elapsed_secs(&mut self, now_ms: f64) -> f64 {
		let born = *self.born_at.get_or_insert(now_ms);
		self.last_frame = Some(now_ms);
		let elapsed = ((now_ms - born) / 1000.0).max(0.0);
		if elapsed >= self.config.enter_fade {
			self.outgoing = None;
		}
		elapsed
	}

	/// The previous batch at `elapsed` seconds into the current one, while
	/// it is still visible.
	pub fn outgoing(&self, elapsed: f64) -> Option<FadingBatch<'_>> {
		let (circuits, age) = self.outgoing.as_ref()?;
		let opacity = 1.0 - self.enter_opacity(elapsed);
		(opacity > 0.0).then_some(FadingBatch {
			circuits,
			elapsed: age + elapsed,
			opacity,
		})
	}

	/// Opacity multiplier for a freshly swapped-in batch.
	pub fn enter_opacity(&self, elapsed: f64) -> f64 {
		if self.config.enter_fade <= 0.0 {
			return 1.0;
		}
		(elapsed / self.config.enter_fade).clamp(0.0, 1.0)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const FRAME: f64 = 1.0 / 60.0;

	fn field(seed: u64) -> CircuitField {
		CircuitField::with_rng(CircuitConfig::default(), Rng::with_seed(seed))
	}

	#[test]
	fn test_batch_shape() {
		let field = field(1);
		assert_eq!(field.generation(), 1);
		assert_eq!(field.circuits.len(), 10);
		for c in &field.circuits {
			assert!((c.duration - 6.5).abs() < 1e-12);
			assert!((0.0..0.8).contains(&c.delay));
			assert!(c.id.starts_with("c-1-"));
		}
		assert_eq!(field.color, Rgb::hex(0x64FFDA));
	}

	#[test]
	fn test_regenerate_replaces_everything() {
		let mut field = field(2);
		let old: Vec<String> = field.circuits.iter().map(|c| c.path.d.clone()).collect();
		let _ = field.elapsed_secs(1000.0);

		field.regenerate();
		assert_eq!(field.generation(), 2);
		assert!(field.circuits.iter().all(|c| c.id.starts_with("c-2-")));
		let new: Vec<String> = field.circuits.iter().map(|c| c.path.d.clone()).collect();
		assert_ne!(old, new);
		// Clock restarts with the new batch
		assert_eq!(field.elapsed_secs(5000.0), 0.0);
	}

	#[test]
	fn test_elapsed_clock() {
		let mut field = field(3);
		assert_eq!(field.elapsed_secs(200.0), 0.0);
		assert!((field.elapsed_secs(1700.0) - 1.5).abs() < 1e-12);
	}

	#[test]
	fn test_stroke_phases() {
		let config = CircuitConfig::default();
		let field = field(4);
		let c = &field.circuits[0];
		let at = |t: f64| c.stroke_at(c.delay + t, &config);

		assert_eq!(c.stroke_at(c.delay - 0.1, &config).drawn, 0.0);
		assert!((at(6.5 * 0.16).drawn - 0.5).abs() < 1e-9);
		assert!((at(6.5 * 0.32).drawn - 1.0).abs() < 1e-9);
		assert!((at(6.5 * 0.6).opacity - 1.0).abs() < 1e-9);
		assert!(at(6.5 * 0.95).opacity < 0.5);
	}

	#[test]
	fn test_node_reveal_follows_the_line() {
		let config = CircuitConfig::default();
		for seed in 0..20 {
			let field = field(seed);
			for c in &field.circuits {
				for node in &c.path.nodes {
					let reveal = c.delay + 6.5 * 0.32 * node.frac;
					assert!((c.node_reveal_time(node, config.draw_portion) - reveal).abs() < 1e-12);

					assert!(c.node_at(node, reveal - FRAME, &config).is_none());
					assert!(c.node_at(node, reveal + FRAME, &config).is_some());

					// The line has reached the node by its reveal time
					let stroke = c.stroke_at(reveal, &config);
					assert!(stroke.drawn >= node.frac - 1e-9);
				}
			}
		}
	}

	#[test]
	fn test_node_fades_in_after_reveal() {
		let config = CircuitConfig::default();
		let field = field(5);
		let c = &field.circuits[0];
		let end = c.path.nodes.last().unwrap();
		let reveal = c.node_reveal_time(end, config.draw_portion);

		let first = c.node_at(end, reveal, &config).unwrap();
		assert_eq!(first.core_opacity, 0.0);
		let later = c.node_at(end, reveal + 0.3, &config).unwrap();
		assert!(later.core_opacity > 0.0);
		assert!(later.ring_opacity > 0.0);
	}

	#[test]
	fn test_replaced_batch_fades_out() {
		let config = CircuitConfig::default();
		let mut field = field(8);
		assert_eq!(field.elapsed_secs(0.0), 0.0);
		assert!(field.outgoing(0.0).is_none());
		let _ = field.elapsed_secs(6483.3);

		// A trace late in its cycle is still clearly visible before the swap
		let late = Circuit {
			delay: 0.7,
			..field.circuits[0].clone()
		};
		let before = late.stroke_at(6.4833, &config).opacity;
		assert!((before - 0.61).abs() < 0.01);
		field.circuits[0] = late;

		field.regenerate();
		let elapsed = field.elapsed_secs(6500.0);
		let fading = field.outgoing(elapsed).unwrap();
		assert_eq!(fading.opacity, 1.0);
		assert!(fading.circuits[0].id.starts_with("c-1-"));
		assert!((fading.elapsed - 6.4833).abs() < 1e-9);
		let swapped = fading.circuits[0].stroke_at(fading.elapsed, &config).opacity * fading.opacity;
		assert!((swapped - before).abs() < 1e-9);

		// One frame later it has dimmed only slightly
		let elapsed = field.elapsed_secs(6500.0 + 1000.0 / 60.0);
		let next = field.outgoing(elapsed).unwrap().opacity;
		assert!(next > 0.9 && next < 1.0);

		let elapsed = field.elapsed_secs(6675.0);
		assert!((field.outgoing(elapsed).unwrap().opacity - 0.5).abs() < 1e-9);

		let elapsed = field.elapsed_secs(6850.0);
		assert!(field.outgoing(elapsed).is_none());
		// Gone for good, not just transparent
		assert!(field.outgoing(0.0).is_none());
	}

	#[test]
	fn test_no_crossfade_without_enter_fade() {
		let config = CircuitConfig {
			enter_fade: 0.0,
			..CircuitConfig::default()
		};
		let mut field = CircuitField::with_rng(config, Rng::with_seed(9));
		let _ = field.elapsed_secs(1000.0);
		field.regenerate();
		assert!(field.outgoing(0.0).is_none());
	}

	#[test]
	fn test_reveal_clamps_draw_portion() {
		let field = field(10);
		let c = &field.circuits[0];
		let end = c.path.nodes.last().unwrap();
		assert_eq!(c.node_reveal_time(end, 1.5), c.node_reveal_time(end, 1.0));
		assert_eq!(c.node_reveal_time(end, -0.2), c.delay);

		let config = CircuitConfig {
			draw_portion: 1.5,
			..CircuitConfig::default()
		};
		for node in &c.path.nodes {
			if node.frac >= 1.0 {
				continue;
			}
			let reveal = c.node_reveal_time(node, config.draw_portion);
			assert!(c.stroke_at(reveal, &config).drawn >= node.frac - 1e-9);
		}
	}

	#[test]
	fn test_enter_fade() {
		let field = field(6);
		assert_eq!(field.enter_opacity(0.0), 0.0);
		assert!((field.enter_opacity(0.175) - 0.5).abs() < 1e-9);
		assert_eq!(field.enter_opacity(3.0), 1.0);
	}

	#[test]
	fn test_bad_colour_falls_back() {
		let config = CircuitConfig {
			color: "teal".into(),
			..CircuitConfig::default()
		};
		let field = CircuitField::with_rng(config, Rng::with_seed(7));
		assert_eq!(field.color, Rgb::hex(0x64FFDA));
	}
}
