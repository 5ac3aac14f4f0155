//! Viewer tunables.
//!
//! Every field has a default; a dataset may override any subset through an
//! optional `"viewer"` object next to `nodes` and `links`.

use serde::Deserialize;

/// Tunables shared by the graph canvas and the detail panel.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
	/// Location of the graph dataset, relative to the page.
	pub dataset_url: String,
	/// Id of the node the exploration starts from.
	pub root_id: String,
	/// Fraction of the view box width where the root lands (> 0.5 is right of center).
	pub start_x_frac: f64,
	/// Fraction of the view box height where the root lands (< 0.5 is above center).
	pub start_y_frac: f64,
	/// Initial zoom on wide viewports.
	pub initial_scale: f64,
	/// Initial zoom on narrow viewports.
	pub mobile_initial_scale: f64,
	/// Viewports at most this wide (CSS px) count as narrow.
	pub mobile_max_width: f64,
	/// Lower bound for interactive zoom.
	pub min_scale: f64,
	/// Upper bound for interactive zoom.
	pub max_scale: f64,
	/// Margin added around the node extent when building the view box.
	pub view_box_padding: f64,
	/// Duration of the recenter animation after a selection.
	pub center_duration_ms: f64,
	/// Duration of the double-click reset animation.
	pub reset_duration_ms: f64,
	/// Fraction of the detail area an html panel may fill.
	pub panel_fit_margin: f64,
	/// Extra gap between link strokes and node glyphs.
	pub link_end_inset_extra: f64,
	/// Soft wrap width for node labels, in characters.
	pub label_wrap_chars: usize,
}

impl Default for ViewerConfig {
	fn default() -> Self {
		Self {
			dataset_url: "graph.json".into(),
			root_id: "Root".into(),
			start_x_frac: 0.48,
			start_y_frac: 0.44,
			initial_scale: 1.0,
			mobile_initial_scale: 2.5,
			mobile_max_width: 900.0,
			min_scale: 0.3,
			max_scale: 5.0,
			view_box_padding: 140.0,
			center_duration_ms: 240.0,
			reset_duration_ms: 220.0,
			panel_fit_margin: 0.90,
			link_end_inset_extra: 6.0,
			label_wrap_chars: 20,
		}
	}
}

impl ViewerConfig {
	/// Initial zoom for a viewport of the given CSS width.
	pub fn initial_scale_for(&self, viewport_width: f64) -> f64 {
		if viewport_width <= self.mobile_max_width {
			self.mobile_initial_scale
		} else {
			self.initial_scale
		}
	}
}
