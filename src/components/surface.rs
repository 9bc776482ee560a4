//! Full-viewport canvas sizing shared by the backdrop layers.

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, Window};

/// Drawing surface size in CSS pixels plus the device pixel ratio.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Surface {
	/// CSS width.
	pub width: f64,
	/// CSS height.
	pub height: f64,
	/// Device pixel ratio, at least 1.
	pub dpr: f64,
}

impl Surface {
	/// Clamp to a non-degenerate size; sizes are floored to whole pixels.
	pub fn new(width: f64, height: f64, dpr: f64) -> Self {
		Self {
			width: width.floor().max(1.0),
			height: height.floor().max(1.0),
			dpr: dpr.max(1.0),
		}
	}

	/// Backing store size in device pixels.
	pub fn backing_size(&self) -> (u32, u32) {
		(
			(self.width * self.dpr).floor() as u32,
			(self.height * self.dpr).floor() as u32,
		)
	}

	/// Measure the window's layout viewport.
	pub fn of_window(window: &Window) -> Self {
		let dim = |v: Result<wasm_bindgen::JsValue, wasm_bindgen::JsValue>, fallback: f64| {
			v.ok().and_then(|v| v.as_f64()).unwrap_or(fallback)
		};
		Self::new(
			dim(window.inner_width(), 800.0),
			dim(window.inner_height(), 600.0),
			window.device_pixel_ratio(),
		)
	}

	/// Size the backing store and reset the draw transform to CSS pixels.
	///
	/// Setting the canvas size clears its state, so the transform is applied
	/// afterwards.
	pub fn apply(&self, canvas: &HtmlCanvasElement, ctx: &CanvasRenderingContext2d) {
		let (w, h) = self.backing_size();
		canvas.set_width(w);
		canvas.set_height(h);
		let _ = ctx.set_transform(self.dpr, 0.0, 0.0, self.dpr, 0.0, 0.0);
	}
}

/// The canvas' 2D context, or `None` when the browser refuses one.
pub fn context_2d(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
	canvas
		.get_context("2d")
		.ok()
		.flatten()
		.and_then(|ctx| ctx.dyn_into().ok())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_surface_never_degenerate() {
		let s = Surface::new(0.0, -5.0, 0.0);
		assert_eq!((s.width, s.height, s.dpr), (1.0, 1.0, 1.0));
	}

	#[test]
	fn test_backing_size_scales_by_dpr() {
		let s = Surface::new(1280.7, 720.2, 1.5);
		assert_eq!((s.width, s.height), (1280.0, 720.0));
		assert_eq!(s.backing_size(), (1920, 1080));
	}
}
