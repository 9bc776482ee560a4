//! Leptos component wrapping the circuit trace canvas.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{info, warn};
use web_sys::{Event, HtmlCanvasElement};

use super::render;
use super::state::CircuitField;
use crate::components::frame_loop::FrameLoop;
use crate::components::surface::{Surface, context_2d};
use crate::config::CircuitConfig;

/// Decorative circuit traces that draw on, hold and fade, regenerating
/// every cycle.
#[component]
pub fn CircuitLines(#[prop(default = CircuitConfig::default())] config: CircuitConfig) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let frame_loop = StoredValue::new_local(None::<FrameLoop>);

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};
		let Some(ctx) = context_2d(&canvas) else {
			warn!("circuit-lines: no 2d context, rendering disabled");
			return;
		};

		let surface = Rc::new(RefCell::new(Surface::of_window(&window)));
		surface.borrow().apply(&canvas, &ctx);
		let field = Rc::new(RefCell::new(CircuitField::new(config.clone())));
		info!(
			"circuit-lines: {} traces, {}ms cycle",
			field.borrow().circuits.len(),
			config.cycle_ms
		);

		let (field_frame, surface_frame, ctx_frame) = (field.clone(), surface.clone(), ctx.clone());
		let mut looper = FrameLoop::start("circuit-lines", window, move |now| {
			let mut field = field_frame.borrow_mut();
			let elapsed = field.elapsed_secs(now);
			render::render(&field, elapsed, &ctx_frame, &surface_frame.borrow());
		});

		if let Some(period) = config.regen_interval_ms() {
			let field_cycle = field.clone();
			looper.every(period, move || {
				field_cycle.borrow_mut().regenerate();
			});
		} else {
			warn!("circuit-lines: cycle_ms is 0, keeping the first batch");
		}

		looper.listen("resize", move |_: Event| {
			let Some(win) = web_sys::window() else {
				return;
			};
			let next = Surface::of_window(&win);
			next.apply(&canvas, &ctx);
			*surface.borrow_mut() = next;
		});

		frame_loop.set_value(Some(looper));
	});

	on_cleanup(move || {
		if let Some(Some(mut looper)) = frame_loop.try_update_value(|looper| looper.take()) {
			looper.stop();
		}
	});

	view! {
		<canvas
			node_ref=canvas_ref
			class="circuit-lines"
			style="position: fixed; inset: 0; width: 100%; height: 100%; z-index: 0; pointer-events: none; display: block;"
		/>
	}
}
