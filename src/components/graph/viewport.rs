//! Pan/zoom for the graph scene.
//!
//! Scene coordinates are first mapped into a fixed view box (node extent plus
//! padding, independent of what is revealed), which is fitted into the canvas
//! uniformly. The zoom transform then operates in view box units.

use super::path::Point;
use super::types::GraphNode;
use crate::config::ViewerConfig;

/// `screen = translate(x, y) * scale(k) * scene`, in view box units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self { x: 0.0, y: 0.0, k: 1.0 }
	}
}

impl ViewTransform {
	pub fn apply(&self, p: Point) -> Point {
		Point::new(p.x * self.k + self.x, p.y * self.k + self.y)
	}

	pub fn invert(&self, p: Point) -> Point {
		Point::new((p.x - self.x) / self.k, (p.y - self.y) / self.k)
	}

	fn lerp(&self, to: &Self, t: f64) -> Self {
		Self {
			x: self.x + (to.x - self.x) * t,
			y: self.y + (to.y - self.y) * t,
			k: self.k + (to.k - self.k) * t,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewBox {
	pub x: f64,
	pub y: f64,
	pub width: f64,
	pub height: f64,
}

impl ViewBox {
	/// Node extent grown by `padding` on every side.
	pub fn around<'a>(nodes: impl IntoIterator<Item = &'a GraphNode>, padding: f64) -> Self {
		let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
		let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
		for n in nodes {
			min_x = min_x.min(n.x);
			min_y = min_y.min(n.y);
			max_x = max_x.max(n.x);
			max_y = max_y.max(n.y);
		}
		if !min_x.is_finite() {
			(min_x, min_y, max_x, max_y) = (0.0, 0.0, 0.0, 0.0);
		}
		let width = (max_x - min_x) + padding * 2.0;
		let height = (max_y - min_y) + padding * 2.0;
		Self {
			x: min_x - padding,
			y: min_y - padding,
			width: if width > 0.0 { width } else { 1.0 },
			height: if height > 0.0 { height } else { 1.0 },
		}
	}

	pub fn center(&self) -> Point {
		Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
	}
}

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

#[derive(Clone, Debug)]
struct Transition {
	from: ViewTransform,
	to: ViewTransform,
	start_ms: Option<f64>,
	duration_ms: f64,
}

pub struct ViewportController {
	view_box: ViewBox,
	width: f64,
	height: f64,
	transform: ViewTransform,
	default_transform: ViewTransform,
	min_scale: f64,
	max_scale: f64,
	transition: Option<Transition>,
}

impl ViewportController {
	/// Starts at the default transform for `root`, zoomed to `initial_scale`.
	pub fn new(
		config: &ViewerConfig,
		nodes: &[GraphNode],
		root: &GraphNode,
		initial_scale: f64,
		width: f64,
		height: f64,
	) -> Self {
		let view_box = ViewBox::around(nodes, config.view_box_padding);
		let default_transform = Self::compute_default_transform(
			Point::new(root.x, root.y),
			&view_box,
			config.start_x_frac,
			config.start_y_frac,
			initial_scale,
		);
		Self {
			view_box,
			width,
			height,
			transform: default_transform,
			default_transform,
			min_scale: config.min_scale,
			max_scale: config.max_scale,
			transition: None,
		}
	}

	/// Puts `root` at the given fractions of the view box, at `scale`.
	pub fn compute_default_transform(
		root: Point,
		view_box: &ViewBox,
		x_frac: f64,
		y_frac: f64,
		scale: f64,
	) -> ViewTransform {
		ViewTransform {
			x: view_box.x + view_box.width * x_frac - scale * root.x,
			y: view_box.y + view_box.height * y_frac - scale * root.y,
			k: scale,
		}
	}

	pub fn transform(&self) -> ViewTransform {
		self.transform
	}

	pub fn default_transform(&self) -> ViewTransform {
		self.default_transform
	}

	pub fn view_box(&self) -> ViewBox {
		self.view_box
	}

	pub fn is_animating(&self) -> bool {
		self.transition.is_some()
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	/// Uniform scale and offset mapping the view box into the canvas, centered.
	pub fn fit(&self) -> ViewTransform {
		let k = (self.width / self.view_box.width).min(self.height / self.view_box.height);
		let k = if k.is_finite() && k > 0.0 { k } else { 1.0 };
		ViewTransform {
			x: (self.width - self.view_box.width * k) / 2.0 - self.view_box.x * k,
			y: (self.height - self.view_box.height * k) / 2.0 - self.view_box.y * k,
			k,
		}
	}

	/// Full scene → canvas pixel transform.
	pub fn screen_transform(&self) -> ViewTransform {
		let fit = self.fit();
		ViewTransform {
			x: fit.x + fit.k * self.transform.x,
			y: fit.y + fit.k * self.transform.y,
			k: fit.k * self.transform.k,
		}
	}

	pub fn screen_to_scene(&self, sx: f64, sy: f64) -> Point {
		self.screen_transform().invert(Point::new(sx, sy))
	}

	/// Animates so `target` sits at the view box center. Scale is kept.
	pub fn center_on(&mut self, target: Point, duration_ms: f64) {
		let c = self.view_box.center();
		let k = self.transform.k;
		let to = ViewTransform {
			x: c.x - k * target.x,
			y: c.y - k * target.y,
			k,
		};
		self.animate_to(to, duration_ms);
	}

	pub fn reset_to_default(&mut self, duration_ms: f64) {
		self.animate_to(self.default_transform, duration_ms);
	}

	/// Drag pan by a screen-space delta. Interrupts any running animation.
	pub fn pan_by(&mut self, dx: f64, dy: f64) {
		self.transition = None;
		let k = self.fit().k;
		self.transform.x += dx / k;
		self.transform.y += dy / k;
	}

	/// Zoom by `factor` around a screen-space anchor, clamped to the scale range.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		self.transition = None;
		let fit = self.fit();
		let anchor = fit.invert(Point::new(sx, sy));
		let new_k = (self.transform.k * factor).clamp(self.min_scale, self.max_scale);
		let ratio = new_k / self.transform.k;
		self.transform.x = anchor.x - (anchor.x - self.transform.x) * ratio;
		self.transform.y = anchor.y - (anchor.y - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	/// Advances any running animation to `now_ms`. Returns whether one is still running.
	pub fn tick(&mut self, now_ms: f64) -> bool {
		let Some(transition) = self.transition.as_mut() else {
			return false;
		};
		let start = *transition.start_ms.get_or_insert(now_ms);
		let progress = if transition.duration_ms > 0.0 {
			((now_ms - start) / transition.duration_ms).clamp(0.0, 1.0)
		} else {
			1.0
		};
		self.transform = transition
			.from
			.lerp(&transition.to, ease_out_cubic(progress));
		if progress >= 1.0 {
			self.transform = transition.to;
			self.transition = None;
			return false;
		}
		true
	}

	fn animate_to(&mut self, to: ViewTransform, duration_ms: f64) {
		if duration_ms <= 0.0 {
			self.transform = to;
			self.transition = None;
			return;
		}
		self.transition = Some(Transition {
			from: self.transform,
			to,
			start_ms: None,
			duration_ms,
		});
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn node(id: &str, x: f64, y: f64) -> GraphNode {
		serde_json::from_value(serde_json::json!({ "id": id, "x": x, "y": y })).unwrap()
	}

	fn nodes() -> Vec<GraphNode> {
		vec![node("Root", 0.0, 0.0), node("A", 400.0, 200.0), node("B", -200.0, 100.0)]
	}

	fn controller(width: f64) -> ViewportController {
		let nodes = nodes();
		let config = ViewerConfig::default();
		let k = config.initial_scale_for(width);
		ViewportController::new(&config, &nodes, &nodes[0], k, width, 800.0)
	}

	fn approx(a: f64, b: f64) -> bool {
		(a - b).abs() < 1e-9
	}

	#[test]
	fn view_box_covers_all_nodes_with_padding() {
		let vb = ViewBox::around(&nodes(), 140.0);
		assert_eq!(vb, ViewBox { x: -340.0, y: -140.0, width: 880.0, height: 480.0 });
	}

	#[test]
	fn default_transform_places_root_off_center() {
		let c = controller(1440.0);
		let t = c.transform();
		let root_on_box = t.apply(Point::new(0.0, 0.0));
		let vb = c.view_box();
		assert!(approx(root_on_box.x, vb.x + vb.width * 0.48));
		assert!(approx(root_on_box.y, vb.y + vb.height * 0.44));
		assert_eq!(t.k, 1.0);
		assert_eq!(controller(600.0).transform().k, 2.5);
	}

	#[test]
	fn center_on_keeps_scale_and_lands_on_node() {
		let mut c = controller(1440.0);
		c.zoom_at(700.0, 400.0, 1.5);
		let k = c.transform().k;
		c.center_on(Point::new(400.0, 200.0), 240.0);
		assert!(c.tick(0.0));
		assert!(c.tick(120.0));
		assert!(!c.tick(240.0));
		let t = c.transform();
		assert_eq!(t.k, k);
		let p = t.apply(Point::new(400.0, 200.0));
		assert!(approx(p.x, c.view_box().center().x));
		assert!(approx(p.y, c.view_box().center().y));
	}

	#[test]
	fn zoom_is_clamped() {
		let mut c = controller(1440.0);
		for _ in 0..100 {
			c.zoom_at(10.0, 10.0, 1.1);
		}
		assert_eq!(c.transform().k, 5.0);
		for _ in 0..100 {
			c.zoom_at(10.0, 10.0, 0.9);
		}
		assert_eq!(c.transform().k, 0.3);
	}

	#[test]
	fn zoom_keeps_anchor_fixed_on_screen() {
		let mut c = controller(1440.0);
		let before = c.screen_to_scene(300.0, 200.0);
		c.zoom_at(300.0, 200.0, 1.7);
		let after = c.screen_to_scene(300.0, 200.0);
		assert!(approx(before.x, after.x) && approx(before.y, after.y));
	}

	#[test]
	fn reset_returns_to_default_after_pan() {
		let mut c = controller(1440.0);
		c.pan_by(120.0, -40.0);
		assert_ne!(c.transform(), c.default_transform());
		c.reset_to_default(220.0);
		c.tick(1000.0);
		c.tick(1300.0);
		assert_eq!(c.transform(), c.default_transform());
	}

	#[test]
	fn pan_interrupts_animation() {
		let mut c = controller(1440.0);
		c.center_on(Point::new(400.0, 200.0), 240.0);
		c.pan_by(5.0, 5.0);
		assert!(!c.is_animating());
	}
}
