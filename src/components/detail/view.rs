//! What the detail surface can show.
//!
//! The resolver only ever produces one of these values; the surface decides
//! how to draw it. Keeping the surface behind a trait lets the resolver run
//! without a browser.

use crate::components::graph::GraphNode;

/// Structured summary of a node record, optionally with a load diagnostic.
#[derive(Clone, Debug, PartialEq)]
pub struct Metadata {
	pub label: String,
	pub lines: Vec<String>,
	pub diagnostic: Option<String>,
}

impl Metadata {
	pub fn for_node(node: &GraphNode) -> Self {
		let mut lines = vec![
			format!("id: {}", node.id),
			format!("type: {}", node.type_name()),
			format!("x: {}", node.x),
			format!("y: {}", node.y),
		];
		if let Some(icon) = node.icon.as_deref().filter(|s| !s.is_empty()) {
			lines.push(format!("icon: {icon}"));
		}
		if let Some(color) = node.color.as_deref().filter(|s| !s.is_empty()) {
			lines.push(format!("color: {color}"));
		}
		Self {
			label: node.display_label().to_string(),
			lines,
			diagnostic: None,
		}
	}

	pub fn with_diagnostic(mut self, diagnostic: impl Into<String>) -> Self {
		self.diagnostic = Some(diagnostic.into());
		self
	}

	/// Lines as shown in the meta block, diagnostic last after a blank line.
	pub fn text(&self) -> String {
		let mut text = self.lines.join("\n");
		if let Some(diagnostic) = &self.diagnostic {
			text.push_str("\n\n");
			text.push_str(diagnostic);
		}
		text.trim().to_string()
	}
}

#[derive(Clone, Debug, PartialEq)]
pub enum DetailView {
	/// Placeholder while content for `label` loads.
	Loading { label: String, message: String },
	/// Mounted html fragment.
	Panel { source: String, html: String },
	/// Rendered, sanitized markdown.
	Markdown { html: String },
	/// Decoded image, optionally wrapped in an outbound link.
	Image { src: String, alt: String, href: Option<String> },
	/// Preview card for an external page.
	Website { label: String, url: String },
	/// Node summary; also the fallback when content fails to load.
	Metadata(Metadata),
	/// Source rejected before any request.
	Unavailable { label: String, reason: String },
	/// The dataset itself failed to load.
	Failed { message: String },
}

impl Default for DetailView {
	fn default() -> Self {
		Self::Loading {
			label: "Loading".into(),
			message: "loading...".into(),
		}
	}
}

impl DetailView {
	pub fn kind(&self) -> &'static str {
		match self {
			Self::Loading { .. } => "loading",
			Self::Panel { .. } => "panel",
			Self::Markdown { .. } => "markdown",
			Self::Image { .. } => "img",
			Self::Website { .. } => "website",
			Self::Metadata(_) => "default",
			Self::Unavailable { .. } => "unavailable",
			Self::Failed { .. } => "failed",
		}
	}
}

/// The single container the resolver renders into.
pub trait DetailSurface {
	fn show(&self, view: DetailView);
}
