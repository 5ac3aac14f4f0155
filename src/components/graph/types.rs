use serde::Deserialize;

use crate::config::ViewerConfig;

const NODE_RADIUS: f64 = 14.0;
const ICON_SIZE: f64 = 28.0;
const HIT_RADIUS: f64 = 22.0;
const MIN_HIT_RADIUS: f64 = 18.0;

pub const DEFAULT_FILL: &str = "#64748b";

/// Either a plain type string (`"shape:triangle"`) or `{ "shape": "triangle" }`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NodeType {
	Name(String),
	Shape { shape: String },
}

impl NodeType {
	fn describe(&self) -> String {
		match self {
			Self::Name(name) => name.clone(),
			Self::Shape { shape } => format!("shape:{shape}"),
		}
	}
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct GraphNode {
	pub id: String,
	#[serde(default)]
	pub label: Option<String>,
	/// Longer name some panels prefer over the label.
	#[serde(default)]
	pub title: Option<String>,
	#[serde(default)]
	pub x: f64,
	#[serde(default)]
	pub y: f64,
	#[serde(default, rename = "type")]
	pub node_type: Option<NodeType>,
	#[serde(default)]
	pub shape: Option<String>,
	#[serde(default)]
	pub color: Option<String>,
	#[serde(default)]
	pub icon: Option<String>,
	/// Size in percent of the default glyph.
	#[serde(default)]
	pub size: Option<f64>,
	#[serde(default, rename = "panel-type")]
	pub panel_type: Option<String>,
	#[serde(default)]
	pub source: Option<String>,
	/// Outbound link for image panels.
	#[serde(default, rename = "ref")]
	pub reference: Option<String>,
	/// Shared panel template tried before the node's own panel files.
	#[serde(default)]
	pub template: Option<String>,
	/// Free-form settings read by panel behaviors.
	#[serde(default, rename = "panelData")]
	pub panel_data: Option<serde_json::Value>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct GraphLink {
	pub source: String,
	pub target: String,
}

impl GraphLink {
	/// Stable identity used for highlight bookkeeping and path jitter.
	pub fn key(&self) -> String {
		format!("{}→{}", self.source, self.target)
	}
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct GraphData {
	#[serde(default)]
	pub nodes: Vec<GraphNode>,
	#[serde(default)]
	pub links: Vec<GraphLink>,
	#[serde(default)]
	pub viewer: Option<ViewerConfig>,
}

pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
	value.map(str::trim).filter(|v| !v.is_empty())
}

impl GraphNode {
	pub fn display_label(&self) -> &str {
		self.label.as_deref().unwrap_or(&self.id)
	}

	pub fn scale(&self) -> f64 {
		let pct = self.size.filter(|s| s.is_finite()).unwrap_or(100.0);
		(pct / 100.0).clamp(0.25, 4.0)
	}

	pub fn has_icon(&self) -> bool {
		non_empty(self.icon.as_deref()).is_some()
			|| matches!(&self.node_type, Some(NodeType::Name(name)) if name == "image")
	}

	pub fn wants_triangle(&self) -> bool {
		let by_type = match &self.node_type {
			Some(NodeType::Name(name)) => name
				.split(|c: char| !c.is_alphanumeric())
				.any(|word| word.eq_ignore_ascii_case("triangle")),
			Some(NodeType::Shape { shape }) => shape == "triangle",
			None => false,
		};
		by_type || self.shape.as_deref() == Some("triangle")
	}

	pub fn visual_radius(&self) -> f64 {
		let s = self.scale();
		if self.has_icon() {
			ICON_SIZE * s / 2.0
		} else {
			NODE_RADIUS * s
		}
	}

	pub fn hit_radius(&self) -> f64 {
		MIN_HIT_RADIUS.max(HIT_RADIUS * self.scale())
	}

	pub fn fill(&self) -> &str {
		non_empty(self.color.as_deref()).unwrap_or(DEFAULT_FILL)
	}

	pub fn type_name(&self) -> String {
		self.node_type
			.as_ref()
			.map(NodeType::describe)
			.unwrap_or_default()
	}

	/// Label split into display lines: explicit newlines first, then soft
	/// wrapping on spaces. Overlong words are kept intact.
	pub fn label_lines(&self, max_chars: usize) -> Vec<String> {
		let mut lines = Vec::new();
		for hard in self.display_label().split('\n') {
			let mut current = String::new();
			for word in hard.split_whitespace() {
				if current.is_empty() {
					current.push_str(word);
				} else if current.chars().count() + 1 + word.chars().count() <= max_chars {
					current.push(' ');
					current.push_str(word);
				} else {
					lines.push(std::mem::replace(&mut current, word.to_string()));
				}
			}
			if !current.is_empty() {
				lines.push(current);
			}
		}
		if lines.is_empty() {
			lines.push(String::new());
		}
		lines
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn node(json: &str) -> GraphNode {
		serde_json::from_str(json).unwrap()
	}

	#[test]
	fn reads_hyphenated_and_reserved_fields() {
		let n = node(
			r#"{ "id": "a", "x": 10, "y": -4.5, "type": "doc", "panel-type": "img",
			     "source": "img/a.png", "ref": "https://example.org" }"#,
		);
		assert_eq!(n.panel_type.as_deref(), Some("img"));
		assert_eq!(n.reference.as_deref(), Some("https://example.org"));
		assert_eq!(n.type_name(), "doc");
		assert_eq!((n.x, n.y), (10.0, -4.5));
	}

	#[test]
	fn missing_coordinates_default_to_origin() {
		let n = node(r#"{ "id": "a" }"#);
		assert_eq!((n.x, n.y), (0.0, 0.0));
		assert_eq!(n.display_label(), "a");
	}

	#[test]
	fn size_is_clamped() {
		assert_eq!(node(r#"{ "id": "a", "size": 10 }"#).scale(), 0.25);
		assert_eq!(node(r#"{ "id": "a", "size": 1000 }"#).scale(), 4.0);
		assert_eq!(node(r#"{ "id": "a", "size": 150 }"#).scale(), 1.5);
	}

	#[test]
	fn icon_nodes_use_icon_radius() {
		let plain = node(r#"{ "id": "a" }"#);
		let icon = node(r#"{ "id": "b", "icon": "icons/b.svg", "size": 200 }"#);
		assert_eq!(plain.visual_radius(), 14.0);
		assert_eq!(icon.visual_radius(), 28.0);
		assert_eq!(plain.hit_radius(), 22.0);
		assert_eq!(node(r#"{ "id": "c", "size": 25 }"#).hit_radius(), 18.0);
	}

	#[test]
	fn triangle_shape_encodings() {
		assert!(node(r#"{ "id": "a", "type": "shape:triangle" }"#).wants_triangle());
		assert!(node(r#"{ "id": "a", "type": { "shape": "triangle" } }"#).wants_triangle());
		assert!(node(r#"{ "id": "a", "shape": "triangle" }"#).wants_triangle());
		assert!(!node(r#"{ "id": "a", "type": "triangles" }"#).wants_triangle());
	}

	#[test]
	fn label_wrapping_honors_newlines_and_long_words() {
		let n = node(r#"{ "id": "a", "label": "Selected writing about\nsupercalifragilisticexpialidocious things" }"#);
		assert_eq!(
			n.label_lines(20),
			vec![
				"Selected writing".to_string(),
				"about".to_string(),
				"supercalifragilisticexpialidocious".to_string(),
				"things".to_string(),
			]
		);
	}
}
