//! Ambient stars: spawn distributions, life envelope and pairwise links.

use std::f64::consts::PI;

use fastrand::Rng;

use super::theme::Rgb;
use crate::config::FieldConfig;

/// A single glowing star.
///
/// `opacity` and `current_size` are derived from `(age, max_age, base_size)`
/// by [`Particle::refresh_life`] and never carry state of their own.
#[derive(Clone, Debug)]
pub struct Particle {
	/// Serial number, unique within a field.
	pub id: u64,
	/// Position in CSS pixels.
	pub x: f64,
	/// Vertical position.
	pub y: f64,
	/// Velocity in pixels per frame.
	pub vx: f64,
	/// Vertical velocity.
	pub vy: f64,
	/// Radius at the peak of the life envelope, before the scale cap.
	pub base_size: f64,
	/// Rendered radius this frame.
	pub current_size: f64,
	/// Displayed colour, drifting towards `target_color`.
	pub color: Rgb,
	/// Colour sampled from the active palette.
	pub target_color: Rgb,
	/// Shadow blur radius at full opacity.
	pub glow: f64,
	/// Age in frames, `0.0..=max_age`.
	pub age: f64,
	/// Lifespan in whole frames.
	pub max_age: f64,
	/// Half-sine life envelope, `0.0..=1.0`.
	pub opacity: f64,
	/// Reach for connective lines; grows with the square of `base_size`.
	pub connect_dist: f64,
}

/// Lifespan in frames: 400 plus a cubic-skewed extra of up to 1000.
pub fn sample_max_age(rng: &mut Rng) -> f64 {
	400.0 + (rng.f64().powi(3) * 1000.0).floor()
}

/// Intrinsic radius, biased towards small but not tiny.
pub fn sample_base_size(rng: &mut Rng) -> f64 {
	0.8 + rng.f64().powi(2) * 2.2
}

/// Glow radius; mostly subtle, occasionally bright.
pub fn sample_glow(rng: &mut Rng) -> f64 {
	2.0 + rng.f64().powi(3) * 8.0
}

/// Link reach for a given base size (~76px for the smallest stars, ~285px for the largest).
pub fn connect_distance(base_size: f64) -> f64 {
	60.0 + base_size * base_size * 25.0
}

/// Half-sine life envelope: 0 at birth, 1 at midlife, 0 at death.
pub fn life_factor(age: f64, max_age: f64) -> f64 {
	if max_age <= 0.0 {
		return 0.0;
	}
	let progress = (age / max_age).clamp(0.0, 1.0);
	(progress * PI).sin().max(0.0)
}

impl Particle {
	/// Create a star somewhere inside `width` x `height`.
	///
	/// Initial stars get a random age so the first generation does not die
	/// in lockstep.
	pub fn spawn(
		rng: &mut Rng,
		id: u64,
		width: f64,
		height: f64,
		color: Rgb,
		initial: bool,
		config: &FieldConfig,
	) -> Self {
		let max_age = sample_max_age(rng);
		let age = if initial { rng.f64() * max_age } else { 0.0 };
		let base_size = sample_base_size(rng);

		let mut particle = Self {
			id,
			x: rng.f64() * width,
			y: rng.f64() * height,
			vx: (rng.f64() - 0.5) * 0.3,
			vy: (rng.f64() - 0.5) * 0.3,
			base_size,
			current_size: 0.0,
			color,
			target_color: color,
			glow: sample_glow(rng),
			age,
			max_age,
			opacity: 0.0,
			connect_dist: connect_distance(base_size),
		};
		particle.refresh_life(config.global_max_scale);
		particle
	}

	/// Recompute opacity and rendered size from age.
	pub fn refresh_life(&mut self, max_scale: f64) {
		let life = life_factor(self.age, self.max_age);
		self.opacity = life;
		self.current_size = (self.base_size * life * 2.0).min(max_scale);
	}

	/// Reached its lifespan this tick.
	pub fn is_dead(&self) -> bool {
		self.age >= self.max_age
	}

	/// Whether the shadow glow should be drawn at the current size.
	pub fn is_large(&self, config: &FieldConfig) -> bool {
		self.current_size > config.glow_threshold
	}

	/// Velocity magnitude in pixels per frame.
	pub fn speed(&self) -> f64 {
		(self.vx * self.vx + self.vy * self.vy).sqrt()
	}
}

/// A connective line between two stars, ready to stroke.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Connection {
	/// Start point in CSS pixels.
	pub from: (f64, f64),
	/// End point in CSS pixels.
	pub to: (f64, f64),
	/// Average of both stars' current colours.
	pub color: Rgb,
	/// Stroke alpha after distance falloff.
	pub alpha: f64,
	/// Stroke width, scaled by the pair's mean rendered size.
	pub width: f64,
}

/// Decide whether two stars are linked, and how the link looks.
///
/// Links need both stars at or above the visibility floor and a distance
/// within the mean of their reaches. Alpha fades linearly to zero at that
/// limit and is scaled by the dimmer star.
pub fn connection(a: &Particle, b: &Particle, config: &FieldConfig) -> Option<Connection> {
	if a.opacity < config.visibility_floor || b.opacity < config.visibility_floor {
		return None;
	}

	let (dx, dy) = (b.x - a.x, b.y - a.y);
	// Bounding box reject before the square root
	let reach = a.connect_dist.max(b.connect_dist);
	if dx.abs() > reach || dy.abs() > reach {
		return None;
	}

	let limit = (a.connect_dist + b.connect_dist) / 2.0;
	let d2 = dx * dx + dy * dy;
	if limit <= 0.0 || d2 > limit * limit {
		return None;
	}

	let d = d2.sqrt();
	let falloff = (limit - d) / limit;
	let alpha = a.opacity.min(b.opacity) * falloff * config.line_alpha;
	if alpha < config.min_line_alpha {
		return None;
	}

	let avg_size = (a.current_size + b.current_size) / 2.0;
	Some(Connection {
		from: (a.x, a.y),
		to: (b.x, b.y),
		color: a.color.average(b.color),
		alpha,
		width: 0.5 * (avg_size / 1.5),
	})
}

#[cfg(test)]
pub(crate) mod tests {
	use super::*;

	/// A mid-life star at a fixed position.
	pub(crate) fn star(id: u64, x: f64, y: f64, base_size: f64) -> Particle {
		let mut p = Particle {
			id,
			x,
			y,
			vx: 0.0,
			vy: 0.0,
			base_size,
			current_size: 0.0,
			color: Rgb::new(100.0, 200.0, 50.0),
			target_color: Rgb::new(100.0, 200.0, 50.0),
			glow: 4.0,
			age: 500.0,
			max_age: 1000.0,
			opacity: 0.0,
			connect_dist: connect_distance(base_size),
		};
		p.refresh_life(2.5);
		p
	}

	#[test]
	fn test_life_factor_envelope() {
		assert_eq!(life_factor(0.0, 800.0), 0.0);
		assert!((life_factor(400.0, 800.0) - 1.0).abs() < 1e-12);
		assert!(life_factor(800.0, 800.0).abs() < 1e-12);

		// Rises to midlife, falls after it
		let samples: Vec<f64> = (0..=8).map(|i| life_factor(i as f64 * 100.0, 800.0)).collect();
		assert!(samples[..5].windows(2).all(|w| w[0] < w[1]));
		assert!(samples[4..].windows(2).all(|w| w[0] > w[1]));
		assert!((samples[2] - samples[6]).abs() < 1e-12);
	}

	#[test]
	fn test_life_factor_degenerate_lifespan() {
		assert_eq!(life_factor(10.0, 0.0), 0.0);
	}

	#[test]
	fn test_spawn_distributions() {
		let mut rng = Rng::with_seed(5);
		let config = FieldConfig::default();
		for id in 0..2000 {
			let p = Particle::spawn(&mut rng, id, 800.0, 600.0, Rgb::hex(0xFFFFFF), false, &config);
			assert!((400.0..=1400.0).contains(&p.max_age));
			assert_eq!(p.max_age.fract(), 0.0);
			assert!((0.8..=3.0).contains(&p.base_size));
			assert!((2.0..=10.0).contains(&p.glow));
			assert!((0.0..=800.0).contains(&p.x) && (0.0..=600.0).contains(&p.y));
			assert!(p.vx.abs() <= 0.15 && p.vy.abs() <= 0.15);
			assert_eq!(p.age, 0.0);
			assert_eq!(p.opacity, 0.0);
			assert_eq!(p.current_size, 0.0);
			assert_eq!(p.connect_dist, connect_distance(p.base_size));
		}
	}

	#[test]
	fn test_lifespan_skews_short() {
		let mut rng = Rng::with_seed(9);
		let n = 10_000;
		let short = (0..n).filter(|_| sample_max_age(&mut rng) < 600.0).count();
		// P(u^3 < 0.2) = 0.2^(1/3) ~ 0.585
		assert!(short as f64 / n as f64 > 0.5);
	}

	#[test]
	fn test_initial_spawn_has_random_age() {
		let mut rng = Rng::with_seed(13);
		let config = FieldConfig::default();
		let ages: Vec<f64> = (0..50)
			.map(|id| Particle::spawn(&mut rng, id, 100.0, 100.0, Rgb::hex(0), true, &config).age)
			.collect();
		assert!(ages.iter().any(|a| *a > 0.0));
	}

	#[test]
	fn test_current_size_capped() {
		let mut p = star(0, 0.0, 0.0, 3.0);
		p.refresh_life(2.5);
		assert_eq!(p.current_size, 2.5);
		assert!(p.is_large(&FieldConfig::default()));
	}

	#[test]
	fn test_connect_distance_grows_with_size() {
		assert!((connect_distance(0.8) - 76.0).abs() < 1e-9);
		assert!((connect_distance(3.0) - 285.0).abs() < 1e-9);
	}

	#[test]
	fn test_connection_within_limit() {
		let config = FieldConfig::default();
		let a = star(0, 0.0, 0.0, 1.0);
		let b = star(1, 30.0, 40.0, 1.0);
		let link = connection(&a, &b, &config).unwrap();
		// limit 85, distance 50
		let expected = (85.0 - 50.0) / 85.0 * config.line_alpha;
		assert!((link.alpha - expected).abs() < 1e-9);
		assert_eq!(link.from, (0.0, 0.0));
		assert_eq!(link.to, (30.0, 40.0));
		assert!((link.width - 0.5 * (a.current_size / 1.5)).abs() < 1e-12);
	}

	#[test]
	fn test_connection_uses_mean_reach() {
		let config = FieldConfig::default();
		// reaches 76 and 285, mean 180.5
		let a = star(0, 0.0, 0.0, 0.8);
		let inside = star(1, 170.0, 0.0, 3.0);
		let outside = star(2, 190.0, 0.0, 3.0);
		assert!(connection(&a, &inside, &config).is_some());
		assert!(connection(&a, &outside, &config).is_none());
	}

	#[test]
	fn test_connection_requires_visible_pair() {
		let config = FieldConfig::default();
		let a = star(0, 0.0, 0.0, 2.0);
		let mut b = star(1, 10.0, 0.0, 2.0);
		b.age = 10.0;
		b.refresh_life(config.global_max_scale);
		assert!(b.opacity < config.visibility_floor);
		assert!(connection(&a, &b, &config).is_none());
		assert!(connection(&b, &a, &config).is_none());
	}

	#[test]
	fn test_connection_alpha_falls_with_distance() {
		let config = FieldConfig::default();
		let a = star(0, 0.0, 0.0, 2.0);
		let limit = connect_distance(2.0);
		let alphas: Vec<f64> = [0.1, 0.3, 0.5, 0.7, 0.9]
			.iter()
			.map(|f| connection(&a, &star(1, limit * f, 0.0, 2.0), &config).unwrap().alpha)
			.collect();
		assert!(alphas.windows(2).all(|w| w[0] > w[1]));

		// Near the limit the line vanishes
		assert!(connection(&a, &star(1, limit * 0.99, 0.0, 2.0), &config).is_none());
		assert!(connection(&a, &star(1, limit, 0.0, 2.0), &config).is_none());
	}

	#[test]
	fn test_connection_color_is_average() {
		let config = FieldConfig::default();
		let mut a = star(0, 0.0, 0.0, 1.0);
		let mut b = star(1, 10.0, 0.0, 1.0);
		a.color = Rgb::new(0.0, 100.0, 200.0);
		b.color = Rgb::new(100.0, 100.0, 0.0);
		let link = connection(&a, &b, &config).unwrap();
		assert_eq!(link.color, Rgb::new(50.0, 100.0, 100.0));
	}
}
