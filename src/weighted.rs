//! Cumulative-distribution sampling over `(value, weight)` pairs.

use fastrand::Rng;

/// Pick one value with probability proportional to its weight.
///
/// Non-positive weights are never picked unless every weight is
/// non-positive, in which case the first value is returned. Returns `None`
/// only for an empty slice.
pub fn weighted_choice<'a, T>(rng: &mut Rng, items: &'a [(T, f64)]) -> Option<&'a T> {
	let first = &items.first()?.0;
	let total: f64 = items.iter().map(|(_, w)| w.max(0.0)).sum();
	if total <= 0.0 {
		return Some(first);
	}

	let mut remaining = rng.f64() * total;
	for (value, weight) in items {
		let weight = weight.max(0.0);
		if remaining < weight {
			return Some(value);
		}
		remaining -= weight;
	}

	// Float drift on the last subtraction
	items
		.iter()
		.rev()
		.find(|(_, w)| *w > 0.0)
		.map(|(v, _)| v)
		.or(Some(first))
}
