use std::rc::Rc;

use super::disclosure::DisclosureEngine;
use super::model::GraphModel;
use super::path::Point;
use super::viewport::ViewportController;
use crate::config::ViewerConfig;

/// Pointer travel (px) below which a press/release counts as a click.
pub const CLICK_SLOP: f64 = 4.0;

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub moved: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub last_x: f64,
	pub last_y: f64,
}

/// What a completed click landed on.
#[derive(Clone, Debug, PartialEq)]
pub enum ClickTarget {
	Node(String),
	Background,
}

pub struct GraphCanvasState {
	pub engine: DisclosureEngine,
	pub viewport: ViewportController,
	pub config: ViewerConfig,
	pub pan: PanState,
	pub width: f64,
	pub height: f64,
}

impl GraphCanvasState {
	/// `width`/`height` size the canvas; `viewport_width` is the window width
	/// that picks the mobile or desktop starting zoom.
	pub fn new(
		model: Rc<GraphModel>,
		config: ViewerConfig,
		width: f64,
		height: f64,
		viewport_width: f64,
	) -> Self {
		let viewport = ViewportController::new(
			&config,
			model.nodes(),
			model.root(),
			config.initial_scale_for(viewport_width),
			width,
			height,
		);
		Self {
			engine: DisclosureEngine::new(model),
			viewport,
			config,
			pan: PanState::default(),
			width,
			height,
		}
	}

	/// Topmost visible node under a canvas position.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<String> {
		let p = self.viewport.screen_to_scene(sx, sy);
		// Later nodes draw on top, so the last hit wins.
		self.engine
			.visible_nodes()
			.filter(|n| (n.x - p.x).hypot(n.y - p.y) < n.hit_radius())
			.last()
			.map(|n| n.id.clone())
	}

	pub fn press(&mut self, x: f64, y: f64) {
		self.pan = PanState {
			active: true,
			moved: false,
			start_x: x,
			start_y: y,
			last_x: x,
			last_y: y,
		};
	}

	pub fn drag(&mut self, x: f64, y: f64) {
		if !self.pan.active {
			return;
		}
		if !self.pan.moved && (x - self.pan.start_x).hypot(y - self.pan.start_y) < CLICK_SLOP {
			return;
		}
		self.pan.moved = true;
		self.viewport
			.pan_by(x - self.pan.last_x, y - self.pan.last_y);
		self.pan.last_x = x;
		self.pan.last_y = y;
	}

	/// Ends a press. Returns the click target unless the press became a drag.
	pub fn release(&mut self, x: f64, y: f64) -> Option<ClickTarget> {
		let was_click = self.pan.active && !self.pan.moved;
		self.pan = PanState::default();
		if !was_click {
			return None;
		}
		Some(match self.node_at_position(x, y) {
			Some(id) => ClickTarget::Node(id),
			None => ClickTarget::Background,
		})
	}

	pub fn cancel_press(&mut self) {
		self.pan = PanState::default();
	}

	/// Click on a node: select it, reveal its children, recenter. A node
	/// that cannot be selected leaves everything untouched.
	pub fn activate_node(&mut self, id: &str) -> bool {
		if self.engine.select(id).is_err() {
			return false;
		}
		self.engine.reveal(id);
		let node = self.engine.selected();
		let target = Point::new(node.x, node.y);
		self.viewport
			.center_on(target, self.config.center_duration_ms);
		true
	}

	/// Click on empty space: reselect the root and recenter on it.
	pub fn activate_background(&mut self) {
		self.engine.select_root();
		let root = self.engine.model().root();
		let target = Point::new(root.x, root.y);
		self.viewport
			.center_on(target, self.config.center_duration_ms);
	}

	pub fn reset_view(&mut self) {
		self.viewport
			.reset_to_default(self.config.reset_duration_ms);
	}

	pub fn zoom(&mut self, x: f64, y: f64, delta_y: f64) {
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		self.viewport.zoom_at(x, y, factor);
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.viewport.resize(width, height);
	}
}
