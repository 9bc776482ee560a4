//! Colour handling and the weighted star palettes.
//!
//! Colours are kept as `f64` channels so a star can drift smoothly between
//! palette entries; they are rounded only when formatted for the canvas.

use fastrand::Rng;

use crate::weighted::weighted_choice;

/// Colour used when a hex string cannot be parsed.
pub const FALLBACK_COLOR: Rgb = Rgb::hex(0x64FFDA);

/// RGB colour with floating-point channels in `0.0..=255.0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgb {
	/// Red channel.
	pub r: f64,
	/// Green channel.
	pub g: f64,
	/// Blue channel.
	pub b: f64,
}

impl Rgb {
	/// Build from raw channel values.
	pub const fn new(r: f64, g: f64, b: f64) -> Self {
		Self { r, g, b }
	}

	/// Build from a packed `0xRRGGBB` literal.
	pub const fn hex(packed: u32) -> Self {
		Self {
			r: ((packed >> 16) & 0xFF) as f64,
			g: ((packed >> 8) & 0xFF) as f64,
			b: (packed & 0xFF) as f64,
		}
	}

	/// Parse `#RRGGBB` (leading `#` optional, case-insensitive).
	pub fn parse(text: &str) -> Option<Self> {
		let digits = text.strip_prefix('#').unwrap_or(text);
		if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
			return None;
		}
		let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
		Some(Self::new(
			channel(0..2)? as f64,
			channel(2..4)? as f64,
			channel(4..6)? as f64,
		))
	}

	/// Linear interpolation between two colours (`t` unclamped).
	pub fn lerp(self, other: Rgb, t: f64) -> Self {
		Self {
			r: self.r + (other.r - self.r) * t,
			g: self.g + (other.g - self.g) * t,
			b: self.b + (other.b - self.b) * t,
		}
	}

	/// Channel-wise mean of two colours.
	pub fn average(self, other: Rgb) -> Self {
		self.lerp(other, 0.5)
	}

	/// CSS `rgba()` string with rounded channels.
	pub fn to_css_rgba(self, alpha: f64) -> String {
		format!(
			"rgba({}, {}, {}, {})",
			self.r.round() as u8,
			self.g.round() as u8,
			self.b.round() as u8,
			alpha
		)
	}
}

/// A weighted set of star colours.
#[derive(Clone, Copy, Debug)]
pub struct Palette {
	/// Short name used in logs.
	pub name: &'static str,
	/// Colours with their relative weights.
	pub colors: &'static [(Rgb, f64)],
}

impl Palette {
	/// Draw a colour with probability proportional to its weight.
	pub fn sample(&self, rng: &mut Rng) -> Rgb {
		weighted_choice(rng, self.colors)
			.copied()
			.unwrap_or(FALLBACK_COLOR)
	}

	/// Whether `color` is one of this palette's entries.
	pub fn contains(&self, color: Rgb) -> bool {
		self.colors.iter().any(|(c, _)| *c == color)
	}
}

/// The five star palettes, indexed by the externally supplied theme index.
pub const PALETTES: [Palette; 5] = [
	Palette {
		name: "classic-cool",
		colors: &[
			(Rgb::hex(0x5EF0CF), 60.0),
			(Rgb::hex(0x47B7A7), 25.0),
			(Rgb::hex(0x489AF7), 10.0),
			(Rgb::hex(0xE2A74D), 3.0),
			(Rgb::hex(0xF77270), 2.0),
		],
	},
	Palette {
		name: "tech-blue",
		colors: &[
			(Rgb::hex(0x4A9EFF), 50.0),
			(Rgb::hex(0x64FFDA), 30.0),
			(Rgb::hex(0xE6F1FF), 15.0),
			(Rgb::hex(0xE2A74D), 3.0),
			(Rgb::hex(0xF77270), 2.0),
		],
	},
	Palette {
		name: "teal-aurora",
		colors: &[
			(Rgb::hex(0x64FFDA), 55.0),
			(Rgb::hex(0x2C7071), 25.0),
			(Rgb::hex(0x276467), 15.0),
			(Rgb::hex(0xE2A74D), 3.0),
			(Rgb::hex(0xF77270), 2.0),
		],
	},
	Palette {
		name: "violet-nebula",
		colors: &[
			(Rgb::hex(0x7C83FF), 45.0),
			(Rgb::hex(0x489AF7), 30.0),
			(Rgb::hex(0xE6F1FF), 20.0),
			(Rgb::hex(0xE2A74D), 3.0),
			(Rgb::hex(0xF77270), 2.0),
		],
	},
	Palette {
		name: "warm-contrast",
		colors: &[
			(Rgb::hex(0xE6F1FF), 45.0),
			(Rgb::hex(0x64FFDA), 35.0),
			(Rgb::hex(0x489AF7), 10.0),
			(Rgb::hex(0xFFB35C), 7.0),
			(Rgb::hex(0xF77270), 3.0),
		],
	},
];

/// Palette for a theme index; out-of-range indices wrap.
pub fn palette(theme_index: usize) -> &'static Palette {
	&PALETTES[theme_index % PALETTES.len()]
}
