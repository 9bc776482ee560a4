//! Canvas rendering for the particle field.
//!
//! Draws in CSS pixel space; the component sets the device-pixel-ratio
//! transform once per resize. Each star is drawn, then its links to every
//! later star, so lines sit on top of the stars they leave from.

use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::particles::{Connection, Particle, connection};
use super::state::FieldState;
use crate::config::FieldConfig;

/// Renders one frame of the field.
pub fn render(state: &FieldState, ctx: &CanvasRenderingContext2d) {
	let config = &state.config;
	ctx.clear_rect(0.0, 0.0, state.surface.width, state.surface.height);

	let particles = &state.particles;
	for (i, p) in particles.iter().enumerate() {
		draw_star(ctx, p, config);

		if p.opacity < config.visibility_floor {
			continue;
		}
		ctx.set_shadow_blur(0.0);
		for other in &particles[i + 1..] {
			if let Some(link) = connection(p, other, config) {
				draw_connection(ctx, &link);
			}
		}
	}

	ctx.set_shadow_blur(0.0);
}

fn draw_star(ctx: &CanvasRenderingContext2d, p: &Particle, config: &FieldConfig) {
	let fill = p.color.to_css_rgba(p.opacity);

	// Shadow blur is expensive; only the larger stars glow
	if p.is_large(config) {
		ctx.set_shadow_blur(p.glow * p.opacity);
		ctx.set_shadow_color(&fill);
	} else {
		ctx.set_shadow_blur(0.0);
	}

	ctx.set_fill_style_str(&fill);
	ctx.begin_path();
	let _ = ctx.arc(p.x, p.y, p.current_size.max(0.0), 0.0, PI * 2.0);
	ctx.fill();
}

fn draw_connection(ctx: &CanvasRenderingContext2d, link: &Connection) {
	ctx.set_line_width(link.width);
	ctx.set_stroke_style_str(&link.color.to_css_rgba(link.alpha));
	ctx.begin_path();
	ctx.move_to(link.from.0, link.from.1);
	ctx.line_to(link.to.0, link.to.1);
	ctx.stroke();
}
