//! portfolio-fx: animated canvas backdrop for a portfolio page.
//!
//! Two layers are drawn behind the page content: an ambient particle field
//! whose palette rotates over time, and a batch of procedural circuit traces
//! that draw on, hold and fade before being regenerated.

use fastrand::Rng;
use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;
pub mod config;
pub mod weighted;

pub use components::circuit_lines::{CircuitField, CircuitLines};
pub use components::frame_loop::FrameLoop;
pub use components::particle_field::{FRAME_DT, FieldState, PALETTES, ParticleField, Rgb};
pub use components::surface::Surface;
pub use config::{CircuitConfig, FieldConfig, FxConfig, RotationConfig};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("portfolio-fx: logging initialized");
}

/// Load configuration from a script element with id="fx-config".
/// Any missing key keeps its default.
fn load_config() -> FxConfig {
	let Some(text) = config_text() else {
		return FxConfig::default();
	};
	match FxConfig::from_json(&text) {
		Ok(config) => {
			info!(
				"portfolio-fx: loaded config ({}..{} stars, {} traces)",
				config.field.min_particles, config.field.max_particles, config.circuits.line_count
			);
			config
		}
		Err(e) => {
			warn!("portfolio-fx: failed to parse fx-config: {}", e);
			FxConfig::default()
		}
	}
}

fn config_text() -> Option<String> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id("fx-config")?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	script.text().ok()
}

/// Pick a theme index other than `current`, uniformly among the rest.
pub fn next_theme(rng: &mut Rng, current: usize, count: usize) -> usize {
	if count < 2 {
		return 0;
	}
	let current = current % count;
	let pick = rng.usize(..count - 1);
	if pick >= current { pick + 1 } else { pick }
}

/// Main application component.
/// Mounts both backdrop layers and rotates the particle palette.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let config = load_config();
	let mut rng = Rng::new();
	let theme = RwSignal::new(rng.usize(..PALETTES.len()));
	info!("portfolio-fx: starting with theme {}", PALETTES[theme.get_untracked()].name);

	let rotation = StoredValue::new_local(None::<FrameLoop>);
	if let Some(period) = config.rotation.interval_ms() {
		if let Some(window) = web_sys::window() {
			let mut looper = FrameLoop::idle("theme-rotation", window);
			looper.every(period, move || {
				let next = next_theme(&mut rng, theme.get_untracked(), PALETTES.len());
				info!("portfolio-fx: theme -> {}", PALETTES[next].name);
				theme.set(next);
			});
			rotation.set_value(Some(looper));
		}
	}
	on_cleanup(move || {
		if let Some(Some(mut looper)) = rotation.try_update_value(|looper| looper.take()) {
			looper.stop();
		}
	});

	let FxConfig { field, circuits, .. } = config;

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Portfolio" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="fx-backdrop">
			<ParticleField theme_index=theme config=field />
			<CircuitLines config=circuits />
		</div>
	}
}
