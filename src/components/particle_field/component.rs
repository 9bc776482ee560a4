//! Leptos component wrapping the particle field canvas.
//!
//! The component creates a fixed, full-viewport canvas and, once mounted,
//! starts a [`FrameLoop`] that ticks the simulation and redraws every frame.
//! Window `resize` and `mousemove` listeners live on the same loop, so they
//! are detached together when the component is dropped.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{info, warn};
use wasm_bindgen::JsCast;
use web_sys::{Event, HtmlCanvasElement, MouseEvent};

use super::render;
use super::state::{FRAME_DT, FieldState};
use crate::components::frame_loop::FrameLoop;
use crate::components::surface::{Surface, context_2d};
use crate::config::FieldConfig;

/// Animated star field drawn behind the page content.
///
/// `theme_index` selects one of the five palettes; changing it recolours
/// the live stars gradually without respawning them.
#[component]
pub fn ParticleField(
	#[prop(into)] theme_index: Signal<usize>,
	#[prop(default = FieldConfig::default())] config: FieldConfig,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let field: Rc<RefCell<Option<FieldState>>> = Rc::new(RefCell::new(None));
	let frame_loop = StoredValue::new_local(None::<FrameLoop>);
	let field_init = field.clone();

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};
		let Some(ctx) = context_2d(&canvas) else {
			warn!("particle-field: no 2d context, rendering disabled");
			return;
		};

		let surface = Surface::of_window(&window);
		surface.apply(&canvas, &ctx);
		let state = FieldState::new(config.clone(), surface, theme_index.get_untracked());
		info!(
			"particle-field: {} stars on {}x{} @{}x",
			state.particles.len(),
			surface.width,
			surface.height,
			surface.dpr
		);
		*field_init.borrow_mut() = Some(state);

		let (field_frame, ctx_frame) = (field_init.clone(), ctx.clone());
		let mut last_ts: Option<f64> = None;
		let mut looper = FrameLoop::start("particle-field", window, move |now| {
			let dt = last_ts.map_or(FRAME_DT, |prev| ((now - prev) / 1000.0).max(0.0));
			last_ts = Some(now);
			if let Some(ref mut state) = *field_frame.borrow_mut() {
				state.tick(dt);
				render::render(state, &ctx_frame);
			}
		});

		let field_resize = field_init.clone();
		looper.listen("resize", move |_: Event| {
			let Some(win) = web_sys::window() else {
				return;
			};
			let surface = Surface::of_window(&win);
			surface.apply(&canvas, &ctx);
			if let Some(ref mut state) = *field_resize.borrow_mut() {
				state.resize(surface);
			}
		});

		let field_pointer = field_init.clone();
		looper.listen("mousemove", move |ev: Event| {
			let Some(ev) = ev.dyn_ref::<MouseEvent>() else {
				return;
			};
			if let Some(ref mut state) = *field_pointer.borrow_mut() {
				state.set_pointer(ev.client_x() as f64, ev.client_y() as f64);
			}
		});

		let field_leave = field_init.clone();
		looper.listen("mouseout", move |ev: Event| {
			// Only when the pointer leaves the window itself
			let left_window = ev
				.dyn_ref::<MouseEvent>()
				.is_some_and(|ev| ev.related_target().is_none());
			if left_window {
				if let Some(ref mut state) = *field_leave.borrow_mut() {
					state.clear_pointer();
				}
			}
		});

		frame_loop.set_value(Some(looper));
	});

	// Retarget colours outside the frame callback; membership never changes here
	let field_theme = field.clone();
	Effect::new(move |_| {
		let index = theme_index.get();
		if let Some(ref mut state) = *field_theme.borrow_mut() {
			if state.theme_index() != index {
				state.set_theme(index);
			}
		}
	});

	on_cleanup(move || {
		if let Some(Some(mut looper)) = frame_loop.try_update_value(|looper| looper.take()) {
			looper.stop();
		}
	});

	view! {
		<canvas
			node_ref=canvas_ref
			class="particle-field"
			style="position: fixed; inset: 0; width: 100%; height: 100%; z-index: 0; pointer-events: none; display: block;"
		/>
	}
}
