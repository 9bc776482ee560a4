//! Canvas rendering for the circuit traces.
//!
//! Traces live in a square view (1000 units by default) that is fitted to
//! the viewport with "slice" semantics: uniform scale, centred, cropping
//! whichever axis overflows. Draw-on is a single dash whose visible length
//! grows with the stroke progress.

use std::f64::consts::PI;

use js_sys::Array;
use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, Path2d};

use super::state::{Circuit, CircuitField};
use crate::components::particle_field::Rgb;
use crate::components::surface::Surface;
use crate::config::CircuitConfig;

/// Uniform view-to-viewport mapping.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewFit {
	/// View units to CSS pixels.
	pub scale: f64,
	/// Left edge of the fitted view in CSS pixels; negative when cropped.
	pub offset_x: f64,
	/// Top edge of the fitted view in CSS pixels; negative when cropped.
	pub offset_y: f64,
}

impl ViewFit {
	/// Cover `width` x `height` with a `view` x `view` square, centred.
	pub fn slice(view: f64, width: f64, height: f64) -> Self {
		let scale = if view > 0.0 { (width / view).max(height / view) } else { 1.0 };
		Self {
			scale,
			offset_x: (width - view * scale) / 2.0,
			offset_y: (height - view * scale) / 2.0,
		}
	}
}

/// Renders the current batch at `elapsed` seconds into its cycle.
pub fn render(field: &CircuitField, elapsed: f64, ctx: &CanvasRenderingContext2d, surface: &Surface) {
	let config = &field.config;
	let dpr = surface.dpr;

	let _ = ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0);
	ctx.clear_rect(0.0, 0.0, surface.width, surface.height);

	let fit = ViewFit::slice(config.view, surface.width, surface.height);
	let _ = ctx.set_transform(
		dpr * fit.scale,
		0.0,
		0.0,
		dpr * fit.scale,
		dpr * fit.offset_x,
		dpr * fit.offset_y,
	);

	// Previous batch underneath, fading out while the new one fades in
	if let Some(fading) = field.outgoing(elapsed) {
		let layer = config.layer_opacity * fading.opacity;
		draw_batch(ctx, fading.circuits, fading.elapsed, config, field.color, layer);
	}
	let layer = config.layer_opacity * field.enter_opacity(elapsed);
	draw_batch(ctx, &field.circuits, elapsed, config, field.color, layer);

	ctx.set_global_alpha(1.0);
	let _ = ctx.set_line_dash(&Array::new());
	let _ = ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0);
}

fn draw_batch(
	ctx: &CanvasRenderingContext2d,
	circuits: &[Circuit],
	elapsed: f64,
	config: &CircuitConfig,
	color: Rgb,
	layer: f64,
) {
	if layer <= 0.0 {
		return;
	}
	for circuit in circuits {
		draw_trace(ctx, circuit, elapsed, config, color, layer);
		draw_nodes(ctx, circuit, elapsed, config, color, layer);
	}
}

fn draw_trace(
	ctx: &CanvasRenderingContext2d,
	circuit: &Circuit,
	elapsed: f64,
	config: &CircuitConfig,
	color: Rgb,
	layer: f64,
) {
	let stroke = circuit.stroke_at(elapsed, config);
	let length = circuit.path.length;
	if stroke.opacity <= 0.0 || stroke.drawn <= 0.0 || length <= 0.0 {
		return;
	}
	let Ok(path) = Path2d::new_with_path_string(&circuit.path.d) else {
		return;
	};
	let Some((lo, hi)) = circuit.path.bounds() else {
		return;
	};

	// Diagonal fade across the trace's bounding box: clear, solid, clear
	let gradient = ctx.create_linear_gradient(lo.x as f64, lo.y as f64, hi.x as f64, hi.y as f64);
	let _ = gradient.add_color_stop(0.0, &color.to_css_rgba(0.0));
	let _ = gradient.add_color_stop(0.5, &color.to_css_rgba(1.0));
	let _ = gradient.add_color_stop(1.0, &color.to_css_rgba(0.0));

	ctx.set_global_alpha(layer * stroke.opacity);
	#[allow(deprecated)]
	ctx.set_stroke_style(&gradient);
	ctx.set_line_width(config.stroke_width);
	let _ = ctx.set_line_dash(&Array::of2(
		&JsValue::from_f64(length * stroke.drawn),
		&JsValue::from_f64(length),
	));
	ctx.set_line_dash_offset(0.0);
	ctx.stroke_with_path(&path);
}

fn draw_nodes(
	ctx: &CanvasRenderingContext2d,
	circuit: &Circuit,
	elapsed: f64,
	config: &CircuitConfig,
	color: Rgb,
	layer: f64,
) {
	let _ = ctx.set_line_dash(&Array::new());
	for node in &circuit.path.nodes {
		let Some(frame) = circuit.node_at(node, elapsed, config) else {
			continue;
		};
		let (x, y) = (node.x as f64, node.y as f64);

		if frame.core_opacity > 0.0 {
			ctx.set_global_alpha(layer * frame.core_opacity);
			ctx.set_fill_style_str(&color.to_css_rgba(1.0));
			ctx.begin_path();
			let _ = ctx.arc(x, y, config.node_radius * frame.core_scale, 0.0, 2.0 * PI);
			ctx.fill();
		}

		if frame.ring_opacity > 0.0 {
			ctx.set_global_alpha(layer * frame.ring_opacity);
			ctx.set_stroke_style_str(&color.to_css_rgba(1.0));
			ctx.set_line_width(1.0);
			ctx.begin_path();
			let _ = ctx.arc(x, y, config.ring_radius * frame.ring_scale, 0.0, 2.0 * PI);
			ctx.stroke();
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_slice_fills_wide_viewport() {
		let fit = ViewFit::slice(1000.0, 1920.0, 1080.0);
		assert!((fit.scale - 1.92).abs() < 1e-12);
		assert!(fit.offset_x.abs() < 1e-9);
		// 1920 tall square centred on 1080: crops 420 top and bottom
		assert!((fit.offset_y + 420.0).abs() < 1e-9);
	}

	#[test]
	fn test_slice_fills_tall_viewport() {
		let fit = ViewFit::slice(1000.0, 500.0, 2000.0);
		assert_eq!(fit.scale, 2.0);
		assert_eq!(fit.offset_x, -750.0);
		assert_eq!(fit.offset_y, 0.0);
	}

	#[test]
	fn test_slice_degenerate_view() {
		assert_eq!(ViewFit::slice(0.0, 800.0, 600.0).scale, 1.0);
	}
}
