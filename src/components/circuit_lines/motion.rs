//! Keyframe interpolation for the circuit reveal.

/// Easing applied within each keyframe segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Easing {
	/// Constant speed.
	Linear,
	/// Smoothstep.
	EaseInOut,
	/// Quadratic deceleration.
	EaseOut,
}

impl Easing {
	/// Map linear progress `t` in `0..=1` onto the curve.
	pub fn apply(self, t: f64) -> f64 {
		let t = t.clamp(0.0, 1.0);
		match self {
			Easing::Linear => t,
			Easing::EaseInOut => t * t * (3.0 - 2.0 * t),
			Easing::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
		}
	}
}

/// A keyframe track: values at normalised times in `0.0..=1.0`.
///
/// Without explicit `times` the values are spread evenly.
#[derive(Clone, Copy, Debug)]
pub struct Keyframes<'a> {
	/// Values at each keyframe.
	pub values: &'a [f64],
	/// Keyframe offsets in `0..=1`; evenly spaced when `None`.
	pub times: Option<&'a [f64]>,
	/// Curve applied within each segment.
	pub easing: Easing,
}

impl<'a> Keyframes<'a> {
	/// Evenly spaced keyframes.
	pub const fn new(values: &'a [f64], easing: Easing) -> Self {
		Self {
			values,
			times: None,
			easing,
		}
	}

	/// Place the keyframes at explicit offsets.
	pub const fn at(self, times: &'a [f64]) -> Self {
		Self {
			times: Some(times),
			..self
		}
	}

	fn time(&self, i: usize) -> f64 {
		match self.times {
			Some(times) if times.len() == self.values.len() => times[i],
			_ => i as f64 / (self.values.len() - 1) as f64,
		}
	}

	/// Value at progress `t` (clamped to the track).
	pub fn sample(&self, t: f64) -> f64 {
		match self.values {
			[] => 0.0,
			[only] => *only,
			values => {
				let t = t.clamp(0.0, 1.0);
				let last = values.len() - 1;
				let seg = (0..last)
					.find(|&i| t <= self.time(i + 1))
					.unwrap_or(last - 1);
				let (t0, t1) = (self.time(seg), self.time(seg + 1));
				let local = if t1 > t0 { (t - t0) / (t1 - t0) } else { 1.0 };
				let eased = self.easing.apply(local);
				values[seg] + (values[seg + 1] - values[seg]) * eased
			}
		}
	}

	/// Value for a track looping every `duration` seconds, `elapsed` seconds in.
	pub fn sample_looped(&self, elapsed: f64, duration: f64) -> f64 {
		self.sample(loop_progress(elapsed, duration))
	}
}

/// Progress through the current iteration of a repeating animation.
pub fn loop_progress(elapsed: f64, duration: f64) -> f64 {
	if duration <= 0.0 || elapsed <= 0.0 {
		return 0.0;
	}
	(elapsed / duration).fract()
}
