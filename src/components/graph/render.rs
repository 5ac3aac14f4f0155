use std::collections::HashMap;
use std::f64::consts::PI;

use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

use super::disclosure::Highlight;
use super::path::{Point, node_tilt_deg, path_for};
use super::state::GraphCanvasState;
use super::types::GraphNode;

const BACKGROUND: &str = "#f8f7f4";
const LINK_COLOR: &str = "#1f2933";
const LABEL_COLOR: &str = "#111827";
const LABEL_GAP: f64 = 18.0;
const LABEL_FONT_PX: f64 = 12.0;
const LABEL_LINE_HEIGHT: f64 = 1.15;
const DIM_NODE_ALPHA: f64 = 0.22;
const DIM_LINK_ALPHA: f64 = 0.18;

/// Icon images keyed by url, created on first use and drawn once decoded.
#[derive(Default)]
pub struct IconCache {
	images: HashMap<String, HtmlImageElement>,
}

impl IconCache {
	fn get(&mut self, url: &str) -> Option<&HtmlImageElement> {
		if !self.images.contains_key(url) {
			let img = HtmlImageElement::new().ok()?;
			img.set_src(url);
			self.images.insert(url.to_string(), img);
		}
		self.images.get(url).filter(|img| img.complete())
	}
}

pub fn render(state: &GraphCanvasState, icons: &mut IconCache, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);

	let t = state.viewport.screen_transform();
	ctx.save();
	let _ = ctx.translate(t.x, t.y);
	let _ = ctx.scale(t.k, t.k);
	draw_links(state, ctx, t.k);
	draw_nodes(state, icons, ctx);
	ctx.restore();
}

fn draw_links(state: &GraphCanvasState, ctx: &CanvasRenderingContext2d, k: f64) {
	let model = state.engine.model();
	let highlight = state.engine.highlight();
	let extra = state.config.link_end_inset_extra;

	ctx.set_stroke_style_str(LINK_COLOR);
	ctx.set_line_join("round");
	ctx.set_line_cap("round");
	ctx.set_line_width(1.6 / k.max(0.5));

	for link in state.engine.visible_links() {
		let (Some(s), Some(t)) = (model.node(&link.source), model.node(&link.target)) else {
			continue;
		};
		let points = path_for(
			&link.key(),
			Point::new(s.x, s.y),
			Point::new(t.x, t.y),
			s.visual_radius() + extra,
			t.visual_radius() + extra,
		);
		ctx.set_global_alpha(if highlight.contains_link(link) { 1.0 } else { DIM_LINK_ALPHA });
		ctx.begin_path();
		for (i, p) in points.iter().enumerate() {
			if i == 0 {
				ctx.move_to(p.x, p.y);
			} else {
				ctx.line_to(p.x, p.y);
			}
		}
		ctx.stroke();
	}
	ctx.set_global_alpha(1.0);
}

fn draw_nodes(state: &GraphCanvasState, icons: &mut IconCache, ctx: &CanvasRenderingContext2d) {
	let highlight = state.engine.highlight();
	let wrap = state.config.label_wrap_chars;
	for node in state.engine.visible_nodes() {
		ctx.set_global_alpha(node_alpha(highlight, node));
		ctx.save();
		let _ = ctx.translate(node.x, node.y);
		let _ = ctx.rotate(node_tilt_deg(&node.id).to_radians());
		draw_glyph(node, icons, ctx);
		draw_label(node, wrap, ctx);
		ctx.restore();
	}
	ctx.set_global_alpha(1.0);
}

fn node_alpha(highlight: &Highlight, node: &GraphNode) -> f64 {
	if highlight.contains_node(&node.id) {
		1.0
	} else {
		DIM_NODE_ALPHA
	}
}

fn draw_glyph(node: &GraphNode, icons: &mut IconCache, ctx: &CanvasRenderingContext2d) {
	let r = node.visual_radius();
	if node.has_icon() {
		let Some(url) = node.icon.as_deref().or(node.source.as_deref()) else {
			return;
		};
		if let Some(img) = icons.get(url) {
			let size = r * 2.0;
			let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(img, -r, -r, size, size);
		}
		return;
	}

	ctx.set_fill_style_str(node.fill());
	ctx.begin_path();
	if node.wants_triangle() {
		// Equilateral, circumradius r.
		let (x, y) = (r * (PI / 6.0).cos(), r * 0.5);
		ctx.move_to(0.0, -r);
		ctx.line_to(x, y);
		ctx.line_to(-x, y);
		ctx.close_path();
	} else {
		let _ = ctx.arc(0.0, 0.0, r, 0.0, 2.0 * PI);
	}
	ctx.fill();
}

fn draw_label(node: &GraphNode, wrap: usize, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(LABEL_COLOR);
	ctx.set_font(&format!("{LABEL_FONT_PX}px sans-serif"));
	ctx.set_text_align("center");
	ctx.set_text_baseline("alphabetic");
	let top = node.visual_radius() + LABEL_GAP;
	for (i, line) in node.label_lines(wrap).iter().enumerate() {
		let y = top + i as f64 * LABEL_FONT_PX * LABEL_LINE_HEIGHT;
		let _ = ctx.fill_text(line, 0.0, y);
	}
}
