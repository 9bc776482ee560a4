//! Particle field simulation state.
//!
//! Owns the live star population, pointer position and surface size. The
//! component creates one `FieldState` on mount and calls [`FieldState::tick`]
//! once per animation frame; nothing here touches the DOM, so the whole
//! simulation runs headless in tests.

use fastrand::Rng;
use log::debug;

use super::particles::Particle;
use super::theme::palette;
use crate::components::surface::Surface;
use crate::config::FieldConfig;

/// Nominal frame length the per-frame constants are tuned for.
pub const FRAME_DT: f64 = 1.0 / 60.0;

/// Upper bound on frames simulated in one tick (e.g. after a background tab).
const MAX_STEPS_PER_TICK: f64 = 3.0;

/// Live star population plus everything a frame needs to advance it.
pub struct FieldState {
	/// Live stars in spawn order.
	pub particles: Vec<Particle>,
	/// Pointer position in CSS pixels, `None` until the pointer moves.
	pub pointer: Option<(f64, f64)>,
	/// Current viewport the stars bounce inside.
	pub surface: Surface,
	/// Tuning, fixed for the field's lifetime.
	pub config: FieldConfig,
	theme_index: usize,
	next_id: u64,
	frame: u64,
	rng: Rng,
}

impl FieldState {
	/// Build a field seeded from the platform RNG.
	pub fn new(config: FieldConfig, surface: Surface, theme_index: usize) -> Self {
		Self::with_rng(config, surface, theme_index, Rng::new())
	}

	/// Build a field pre-filled with a random population in `[min, max)`.
	pub fn with_rng(config: FieldConfig, surface: Surface, theme_index: usize, mut rng: Rng) -> Self {
		let (min, max) = config.population_bounds();
		let count = if max > min { min + rng.usize(0..max - min) } else { min };

		let mut state = Self {
			particles: Vec::with_capacity(max),
			pointer: None,
			surface,
			config,
			theme_index,
			next_id: 0,
			frame: 0,
			rng,
		};
		for _ in 0..count {
			state.spawn(true);
		}
		state
	}

	/// Index of the palette new stars are drawn from.
	pub fn theme_index(&self) -> usize {
		self.theme_index
	}

	/// Frames advanced since creation.
	pub fn frame(&self) -> u64 {
		self.frame
	}

	fn spawn(&mut self, initial: bool) {
		let color = palette(self.theme_index).sample(&mut self.rng);
		let particle = Particle::spawn(
			&mut self.rng,
			self.next_id,
			self.surface.width,
			self.surface.height,
			color,
			initial,
			&self.config,
		);
		self.next_id += 1;
		self.particles.push(particle);
	}

	/// Switch palette: every live star gets a new target colour.
	///
	/// Positions, ages and membership are untouched; the field drifts to the
	/// new colours through the per-frame blend.
	pub fn set_theme(&mut self, theme_index: usize) {
		self.theme_index = theme_index;
		let palette = palette(theme_index);
		for p in &mut self.particles {
			p.target_color = palette.sample(&mut self.rng);
		}
		debug!(
			"particle-field: theme -> {} ({} stars retargeted)",
			palette.name,
			self.particles.len()
		);
	}

	/// Pointer position in CSS pixels; stars near it are pushed away.
	pub fn set_pointer(&mut self, x: f64, y: f64) {
		self.pointer = Some((x, y));
	}

	/// Stop repelling, e.g. when the pointer leaves the window.
	pub fn clear_pointer(&mut self) {
		self.pointer = None;
	}

	/// Adopt a new surface, scaling positions so the layout keeps its shape.
	pub fn resize(&mut self, surface: Surface) {
		let (sx, sy) = (
			surface.width / self.surface.width,
			surface.height / self.surface.height,
		);
		for p in &mut self.particles {
			p.x *= sx;
			p.y *= sy;
		}
		self.surface = surface;
		debug!(
			"particle-field: resized to {}x{} @{}x at frame {}",
			surface.width,
			surface.height,
			surface.dpr,
			self.frame()
		);
	}

	/// Advance the simulation by `dt` seconds.
	///
	/// Per-frame constants are scaled by `dt / FRAME_DT`, so a tick of exactly
	/// [`FRAME_DT`] is one frame of the reference behaviour. Stars whose age
	/// reaches their lifespan are removed in this same tick, then the
	/// population is topped up.
	pub fn tick(&mut self, dt: f64) {
		let steps = (dt / FRAME_DT).clamp(0.0, MAX_STEPS_PER_TICK);
		if steps <= 0.0 {
			return;
		}
		self.frame += 1;

		let blend = 1.0 - (1.0 - self.config.color_blend).powf(steps);
		let damping = self.config.damping.powf(steps);
		let (w, h) = (self.surface.width, self.surface.height);

		for p in &mut self.particles {
			p.age = (p.age + steps).min(p.max_age);
			p.refresh_life(self.config.global_max_scale);
			p.color = p.color.lerp(p.target_color, blend);

			p.x += p.vx * steps;
			p.y += p.vy * steps;
			p.vx += (self.rng.f64() - 0.5) * self.config.jitter * steps;
			p.vy += (self.rng.f64() - 0.5) * self.config.jitter * steps;

			if let Some(pointer) = self.pointer {
				repel(p, pointer, &self.config, steps);
			}
			bounce(p, w, h);

			p.vx *= damping;
			p.vy *= damping;
			let speed = p.speed();
			if speed > self.config.max_speed {
				p.vx = p.vx / speed * self.config.max_speed;
				p.vy = p.vy / speed * self.config.max_speed;
			}
		}

		self.particles.retain(|p| !p.is_dead());
		self.control_population();
	}

	/// Backfill below the floor; otherwise spawn occasionally below the ceiling.
	fn control_population(&mut self) {
		let (min, max) = self.config.population_bounds();
		if self.particles.len() < min {
			while self.particles.len() < min {
				self.spawn(false);
			}
		} else if self.particles.len() < max && self.rng.f64() < self.config.spawn_chance {
			self.spawn(false);
		}
	}

	/// Frames for the gap to a new target colour to halve.
	#[cfg(test)]
	fn color_half_life_frames(&self) -> f64 {
		(0.5f64).ln() / (1.0 - self.config.color_blend).ln()
	}
}

/// Push a star away from the pointer, linearly stronger as it gets closer.
fn repel(p: &mut Particle, (px, py): (f64, f64), config: &FieldConfig, steps: f64) {
	let radius = config.pointer_radius;
	let (dx, dy) = (px - p.x, py - p.y);
	let dist2 = dx * dx + dy * dy;
	if dist2 >= radius * radius {
		return;
	}
	let dist = dist2.sqrt().max(0.0001);
	let force = (radius - dist) / radius;
	p.vx -= dx / dist * force * config.pointer_force * steps;
	p.vy -= dy / dist * force * config.pointer_force * steps;
}

/// Reflect off the surface edges.
fn bounce(p: &mut Particle, width: f64, height: f64) {
	if p.x < 0.0 {
		p.x = 0.0;
		p.vx = -p.vx;
	} else if p.x > width {
		p.x = width;
		p.vx = -p.vx;
	}
	if p.y < 0.0 {
		p.y = 0.0;
		p.vy = -p.vy;
	} else if p.y > height {
		p.y = height;
		p.vy = -p.vy;
	}
}
