//! Owned animation loop with window listeners and timers.
//!
//! A [`FrameLoop`] keeps a `requestAnimationFrame` callback re-arming itself
//! and holds every closure registered against the window. Dropping it (or
//! calling [`FrameLoop::stop`]) cancels the pending frame, clears intervals
//! and detaches listeners, so a remounted component never leaves callbacks
//! firing against a removed canvas.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::{Event, Window};

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Handle owning a frame callback plus its window listeners and timers.
pub struct FrameLoop {
	name: &'static str,
	window: Window,
	frame: FrameCallback,
	frame_id: Rc<Cell<Option<i32>>>,
	listeners: Vec<(&'static str, Closure<dyn FnMut(Event)>)>,
	intervals: Vec<(i32, Closure<dyn FnMut()>)>,
}

impl FrameLoop {
	/// A loop with no frame callback, for listeners and intervals only.
	pub fn idle(name: &'static str, window: Window) -> Self {
		Self {
			name,
			window,
			frame: Rc::new(RefCell::new(None)),
			frame_id: Rc::new(Cell::new(None)),
			listeners: Vec::new(),
			intervals: Vec::new(),
		}
	}

	/// Start calling `on_frame` with the frame timestamp (ms) every display refresh.
	pub fn start(name: &'static str, window: Window, mut on_frame: impl FnMut(f64) + 'static) -> Self {
		let looper = Self::idle(name, window);
		let (frame, frame_id) = (looper.frame.clone(), looper.frame_id.clone());
		let (frame_inner, id_inner) = (frame.clone(), frame_id.clone());

		*frame.borrow_mut() = Some(Closure::new(move |timestamp: f64| {
			on_frame(timestamp);
			if let Some(ref cb) = *frame_inner.borrow() {
				id_inner.set(
					web_sys::window()
						.and_then(|w| w.request_animation_frame(cb.as_ref().unchecked_ref()).ok()),
				);
			}
		}));
		if let Some(ref cb) = *frame.borrow() {
			match looper.window.request_animation_frame(cb.as_ref().unchecked_ref()) {
				Ok(id) => frame_id.set(Some(id)),
				Err(e) => warn!("{name}: requestAnimationFrame failed: {:?}", e),
			}
		}
		looper
	}

	/// Attach a window event listener for the lifetime of the loop.
	pub fn listen(&mut self, event: &'static str, handler: impl FnMut(Event) + 'static) {
		let cb = Closure::<dyn FnMut(Event)>::new(handler);
		if self
			.window
			.add_event_listener_with_callback(event, cb.as_ref().unchecked_ref())
			.is_ok()
		{
			self.listeners.push((event, cb));
		} else {
			warn!("{}: could not listen for {event}", self.name);
		}
	}

	/// Run `handler` every `period_ms` for the lifetime of the loop.
	pub fn every(&mut self, period_ms: i32, handler: impl FnMut() + 'static) {
		let cb = Closure::<dyn FnMut()>::new(handler);
		match self
			.window
			.set_interval_with_callback_and_timeout_and_arguments_0(cb.as_ref().unchecked_ref(), period_ms)
		{
			Ok(id) => self.intervals.push((id, cb)),
			Err(e) => warn!("{}: setInterval failed: {:?}", self.name, e),
		}
	}

	/// Cancel the frame callback, intervals and listeners. Idempotent.
	pub fn stop(&mut self) {
		if let Some(id) = self.frame_id.take() {
			let _ = self.window.cancel_animation_frame(id);
		}
		// Breaks the self-reference held by the frame closure
		self.frame.borrow_mut().take();

		for (id, _) in self.intervals.drain(..) {
			self.window.clear_interval_with_handle(id);
		}
		for (event, cb) in self.listeners.drain(..) {
			let _ = self
				.window
				.remove_event_listener_with_callback(event, cb.as_ref().unchecked_ref());
		}
		debug!("{}: frame loop stopped", self.name);
	}
}

impl Drop for FrameLoop {
	fn drop(&mut self) {
		self.stop();
	}
}
