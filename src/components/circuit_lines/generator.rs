//! Orthogonal "circuit trace" path synthesis.
//!
//! A trace starts at a random grid point and alternates horizontal and
//! vertical moves of random signed length, every waypoint snapped to the
//! grid and kept inside the view margins. Each waypoint carries its
//! fractional arc-length position so node markers can appear exactly when
//! the draw-on animation reaches them.

use fastrand::Rng;

use crate::config::CircuitConfig;

/// A waypoint in view units; always a multiple of the grid pitch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridPoint {
	/// Horizontal coordinate in view units.
	pub x: i32,
	/// Vertical coordinate in view units.
	pub y: i32,
}

/// A marker on a trace at arc-length fraction `frac` (0 at start, 1 at end).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CircuitNode {
	/// Horizontal coordinate in view units.
	pub x: i32,
	/// Vertical coordinate in view units.
	pub y: i32,
	/// Arc-length fraction along the trace.
	pub frac: f64,
}

/// A generated trace.
#[derive(Clone, Debug)]
pub struct TracePath {
	/// De-duplicated waypoints.
	pub points: Vec<GridPoint>,
	/// Arc-length fraction of each waypoint, parallel to `points`.
	pub fracs: Vec<f64>,
	/// Total Euclidean length in view units.
	pub length: f64,
	/// First and last waypoint plus a random subset of the interior.
	pub nodes: Vec<CircuitNode>,
	/// SVG-style `M x y L x y ...` descriptor.
	pub d: String,
}

impl TracePath {
	/// Axis-aligned bounding box as `(min, max)`.
	pub fn bounds(&self) -> Option<(GridPoint, GridPoint)> {
		let first = *self.points.first()?;
		Some(self.points.iter().fold((first, first), |(lo, hi), p| {
			(
				GridPoint {
					x: lo.x.min(p.x),
					y: lo.y.min(p.y),
				},
				GridPoint {
					x: hi.x.max(p.x),
					y: hi.y.max(p.y),
				},
			)
		}))
	}
}

/// Grid-aligned placement range derived from view, margin and pitch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridBounds {
	/// Pitch in whole view units.
	pub grid: i32,
	/// Smallest coordinate inside the margin.
	pub lo: i32,
	/// Largest coordinate inside the margin.
	pub hi: i32,
}

impl GridBounds {
	/// `None` when no grid line fits inside the margins.
	///
	/// The pitch is rounded to whole view units.
	pub fn new(config: &CircuitConfig) -> Option<Self> {
		let grid = config.grid.round().max(1.0);
		let lo = (config.margin / grid).ceil() * grid;
		let hi = ((config.view - config.margin) / grid).floor() * grid;
		(lo <= hi).then_some(Self {
			grid: grid as i32,
			lo: lo as i32,
			hi: hi as i32,
		})
	}

	/// Nearest grid coordinate, clamped into the margins.
	pub fn snap(&self, v: f64) -> i32 {
		let snapped = (v / self.grid as f64).round() as i32 * self.grid;
		snapped.clamp(self.lo, self.hi)
	}

	/// A grid-rounded length, not clamped.
	fn snap_len(&self, len: f64) -> i32 {
		(len / self.grid as f64).round() as i32 * self.grid
	}
}

fn rand_range(rng: &mut Rng, min: f64, max: f64) -> f64 {
	rng.f64() * (max - min) + min
}

/// Random signed move length, snapped to the grid.
fn random_step(rng: &mut Rng, bounds: &GridBounds, config: &CircuitConfig) -> i32 {
	let (min, max) = ordered(config.min_step, config.max_step);
	let len = bounds.snap_len(rand_range(rng, min, max));
	if rng.bool() { len } else { -len }
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
	if a <= b { (a, b) } else { (b, a) }
}

/// Generate one trace, or `None` when the margins leave no room.
pub fn generate(rng: &mut Rng, config: &CircuitConfig) -> Option<TracePath> {
	let bounds = GridBounds::new(config)?;
	let (lo, hi) = (config.margin, config.view - config.margin);

	let mut x = bounds.snap(rand_range(rng, lo, hi));
	let mut y = bounds.snap(rand_range(rng, lo, hi));
	let mut points = vec![GridPoint { x, y }];

	let (min_turns, max_turns) = (
		config.min_turns.min(config.max_turns),
		config.min_turns.max(config.max_turns),
	);
	let turns = rng.usize(min_turns..=max_turns);
	let mut horizontal = rng.bool();

	// Every turn plus the trailing "vanishing" segment
	for _ in 0..=turns {
		let step = random_step(rng, &bounds, config);
		if horizontal {
			x = bounds.snap((x + step) as f64);
		} else {
			y = bounds.snap((y + step) as f64);
		}
		let next = GridPoint { x, y };
		if points.last() != Some(&next) {
			points.push(next);
		}
		horizontal = !horizontal;
	}

	let (fracs, length) = arc_fractions(&points);
	let last = points.len() - 1;
	let nodes = points
		.iter()
		.zip(&fracs)
		.enumerate()
		.filter(|(i, _)| *i == 0 || *i == last || rng.bool())
		.map(|(_, (p, &frac))| CircuitNode { x: p.x, y: p.y, frac })
		.collect();

	Some(TracePath {
		d: path_descriptor(&points),
		points,
		fracs,
		length,
		nodes,
	})
}

/// Cumulative arc length of each waypoint normalised by the total.
///
/// A single-point path has total length zero and every fraction zero.
pub fn arc_fractions(points: &[GridPoint]) -> (Vec<f64>, f64) {
	let mut cumulative = Vec::with_capacity(points.len());
	let mut total = 0.0;
	for (i, p) in points.iter().enumerate() {
		if i > 0 {
			let prev = points[i - 1];
			total += ((p.x - prev.x) as f64).hypot((p.y - prev.y) as f64);
		}
		cumulative.push(total);
	}

	if total <= 0.0 {
		return (vec![0.0; points.len()], 0.0);
	}
	let mut fracs: Vec<f64> = cumulative.iter().map(|c| c / total).collect();
	if let Some(end) = fracs.last_mut() {
		*end = 1.0;
	}
	(fracs, total)
}

/// `M x y L x y ...` for a polyline.
pub fn path_descriptor(points: &[GridPoint]) -> String {
	points
		.iter()
		.enumerate()
		.map(|(i, p)| {
			let cmd = if i == 0 { 'M' } else { 'L' };
			format!("{cmd} {} {}", p.x, p.y)
		})
		.collect::<Vec<_>>()
		.join(" ")
}

#[cfg(test)]
mod tests {
	use super::*;

	fn paths(seed: u64, n: usize, config: &CircuitConfig) -> Vec<TracePath> {
		let mut rng = Rng::with_seed(seed);
		(0..n).filter_map(|_| generate(&mut rng, config)).collect()
	}

	#[test]
	fn test_waypoints_on_grid_and_inside_margins() {
		let config = CircuitConfig::default();
		for path in paths(1, 500, &config) {
			for p in &path.points {
				assert!((60..=940).contains(&p.x), "{p:?}");
				assert!((60..=940).contains(&p.y), "{p:?}");
				assert_eq!(p.x % 20, 0);
				assert_eq!(p.y % 20, 0);
			}
		}
	}

	#[test]
	fn test_segments_are_orthogonal_and_nonzero() {
		let config = CircuitConfig::default();
		for path in paths(2, 500, &config) {
			for w in path.points.windows(2) {
				assert!(w[0] != w[1]);
				assert!(w[0].x == w[1].x || w[0].y == w[1].y, "{:?}", w);
			}
		}
	}

	#[test]
	fn test_waypoint_count_bounded_by_turns() {
		let config = CircuitConfig::default();
		for path in paths(3, 500, &config) {
			// start + at most max_turns turns + vanishing end
			assert!(path.points.len() <= 1 + config.max_turns + 1);
			assert!(!path.points.is_empty());
		}
	}

	#[test]
	fn test_fractions_span_unit_interval() {
		let config = CircuitConfig::default();
		for path in paths(4, 500, &config) {
			assert_eq!(path.fracs.len(), path.points.len());
			assert_eq!(path.fracs[0], 0.0);
			if path.points.len() > 1 {
				assert_eq!(*path.fracs.last().unwrap(), 1.0);
				assert!(path.length > 0.0);
			}
			assert!(path.fracs.windows(2).all(|w| w[0] <= w[1]));
		}
	}

	#[test]
	fn test_nodes_keep_endpoints() {
		let config = CircuitConfig::default();
		for path in paths(5, 500, &config) {
			let first = path.nodes.first().unwrap();
			let last = path.nodes.last().unwrap();
			assert_eq!((first.x, first.y, first.frac), (path.points[0].x, path.points[0].y, 0.0));
			let end = path.points.last().unwrap();
			assert_eq!((last.x, last.y), (end.x, end.y));
			assert!(path.nodes.windows(2).all(|w| w[0].frac <= w[1].frac));
			assert!(path.nodes.len() <= path.points.len());
		}
	}

	#[test]
	fn test_interior_nodes_are_a_coin_flip() {
		let config = CircuitConfig::default();
		let (mut interior, mut kept) = (0usize, 0usize);
		for path in paths(6, 2000, &config) {
			let n = path.points.len();
			if n > 2 {
				interior += n - 2;
				kept += path.nodes.len() - 2;
			}
		}
		let share = kept as f64 / interior as f64;
		assert!((share - 0.5).abs() < 0.05, "{share}");
	}

	#[test]
	fn test_arc_fractions_known_path() {
		let pts = [
			GridPoint { x: 0, y: 0 },
			GridPoint { x: 100, y: 0 },
			GridPoint { x: 100, y: 300 },
		];
		let (fracs, length) = arc_fractions(&pts);
		assert_eq!(length, 400.0);
		assert_eq!(fracs, vec![0.0, 0.25, 1.0]);
	}

	#[test]
	fn test_single_point_path() {
		let (fracs, length) = arc_fractions(&[GridPoint { x: 60, y: 60 }]);
		assert_eq!((fracs, length), (vec![0.0], 0.0));
	}

	#[test]
	fn test_path_descriptor() {
		let pts = [GridPoint { x: 60, y: 80 }, GridPoint { x: 200, y: 80 }];
		assert_eq!(path_descriptor(&pts), "M 60 80 L 200 80");
	}

	#[test]
	fn test_unaligned_margin_still_on_grid() {
		let config = CircuitConfig {
			margin: 55.0,
			grid: 25.0,
			..CircuitConfig::default()
		};
		let bounds = GridBounds::new(&config).unwrap();
		assert_eq!((bounds.lo, bounds.hi), (75, 925));
		for path in paths(7, 200, &config) {
			for p in &path.points {
				assert!((55..=945).contains(&p.x) && (55..=945).contains(&p.y));
				assert_eq!((p.x % 25, p.y % 25), (0, 0));
			}
		}
	}

	#[test]
	fn test_no_room_generates_nothing() {
		let config = CircuitConfig {
			margin: 500.0,
			grid: 30.0,
			..CircuitConfig::default()
		};
		assert!(GridBounds::new(&config).is_none());
		assert!(paths(8, 5, &config).is_empty());
	}

	#[test]
	fn test_bounds() {
		let mut rng = Rng::with_seed(9);
		let path = generate(&mut rng, &CircuitConfig::default()).unwrap();
		let (lo, hi) = path.bounds().unwrap();
		assert!(path.points.iter().all(|p| p.x >= lo.x && p.x <= hi.x && p.y >= lo.y && p.y <= hi.y));
	}
}
