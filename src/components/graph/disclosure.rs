use std::collections::HashSet;
use std::rc::Rc;

use super::model::GraphModel;
use super::types::{GraphLink, GraphNode};
use crate::error::DisclosureError;

/// Selected node plus its neighbors among visible links.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Highlight {
	pub node_ids: HashSet<String>,
	pub link_keys: HashSet<String>,
}

impl Highlight {
	pub fn contains_node(&self, id: &str) -> bool {
		self.node_ids.contains(id)
	}

	pub fn contains_link(&self, link: &GraphLink) -> bool {
		self.link_keys.contains(&link.key())
	}
}

/// Owns which nodes are revealed and which one is selected.
///
/// The visible set only ever grows. Highlights are recomputed whenever either
/// input changes, so readers always see a consistent snapshot.
pub struct DisclosureEngine {
	model: Rc<GraphModel>,
	visible: HashSet<String>,
	selected: String,
	highlight: Highlight,
}

impl DisclosureEngine {
	/// Root and its direct children visible, root selected.
	pub fn new(model: Rc<GraphModel>) -> Self {
		let root = model.root_id().to_string();
		let mut visible = HashSet::from([root.clone()]);
		visible.extend(model.outgoing(&root).iter().cloned());
		let mut engine = Self {
			model,
			visible,
			selected: root,
			highlight: Highlight::default(),
		};
		engine.recompute_highlight();
		engine
	}

	pub fn model(&self) -> &Rc<GraphModel> {
		&self.model
	}

	/// Adds the outgoing neighbors of `id` to the visible set. Returns how many
	/// ids were newly revealed.
	pub fn reveal(&mut self, id: &str) -> usize {
		let before = self.visible.len();
		self.visible
			.extend(self.model.outgoing(id).iter().cloned());
		let added = self.visible.len() - before;
		if added > 0 {
			self.recompute_highlight();
		}
		added
	}

	/// Selects a visible node (the root is always selectable). On error the
	/// state is unchanged.
	pub fn select(&mut self, id: &str) -> Result<(), DisclosureError> {
		if !self.model.contains(id) {
			return Err(DisclosureError::UnknownNode(id.to_string()));
		}
		if id != self.model.root_id() && !self.visible.contains(id) {
			return Err(DisclosureError::NotSelectable(id.to_string()));
		}
		self.selected = id.to_string();
		self.recompute_highlight();
		Ok(())
	}

	/// Background click: back to the root without hiding anything.
	pub fn select_root(&mut self) {
		self.selected = self.model.root_id().to_string();
		self.recompute_highlight();
	}

	pub fn selected_id(&self) -> &str {
		&self.selected
	}

	pub fn selected(&self) -> &GraphNode {
		self.model
			.node(&self.selected)
			.unwrap_or_else(|| self.model.root())
	}

	pub fn is_visible(&self, id: &str) -> bool {
		self.visible.contains(id)
	}

	pub fn visible_ids(&self) -> &HashSet<String> {
		&self.visible
	}

	pub fn highlight(&self) -> &Highlight {
		&self.highlight
	}

	/// Visible nodes in dataset order.
	pub fn visible_nodes(&self) -> impl Iterator<Item = &GraphNode> {
		self.model
			.nodes()
			.iter()
			.filter(|n| self.visible.contains(&n.id))
	}

	/// Links with both endpoints visible.
	pub fn visible_links(&self) -> impl Iterator<Item = &GraphLink> {
		self.model
			.links()
			.iter()
			.filter(|l| self.visible.contains(&l.source) && self.visible.contains(&l.target))
	}

	fn recompute_highlight(&mut self) {
		let selected = self.selected.as_str();
		let mut node_ids = HashSet::from([selected.to_string()]);
		let mut link_keys = HashSet::new();
		for link in self.visible_links() {
			let other = if link.source == selected {
				&link.target
			} else if link.target == selected {
				&link.source
			} else {
				continue;
			};
			node_ids.insert(other.clone());
			link_keys.insert(link.key());
		}
		self.highlight = Highlight { node_ids, link_keys };
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn model() -> Rc<GraphModel> {
		let text = r#"{
			"nodes": [
				{ "id": "Root" }, { "id": "A" }, { "id": "B" }, { "id": "C" }, { "id": "D" }
			],
			"links": [
				{ "source": "Root", "target": "A" },
				{ "source": "Root", "target": "B" },
				{ "source": "A", "target": "C" },
				{ "source": "C", "target": "D" }
			]
		}"#;
		Rc::new(GraphModel::from_json(text, "Root").unwrap().0)
	}

	fn ids(set: &HashSet<String>) -> Vec<&str> {
		let mut v: Vec<&str> = set.iter().map(String::as_str).collect();
		v.sort_unstable();
		v
	}

	#[test]
	fn initial_state_shows_root_and_children() {
		let engine = DisclosureEngine::new(model());
		assert_eq!(ids(engine.visible_ids()), ["A", "B", "Root"]);
		assert_eq!(engine.selected_id(), "Root");
		assert_eq!(ids(&engine.highlight().node_ids), ["A", "B", "Root"]);
		assert_eq!(
			ids(&engine.highlight().link_keys),
			["Root→A", "Root→B"]
		);
	}

	#[test]
	fn reveal_is_idempotent_and_monotonic() {
		let mut engine = DisclosureEngine::new(model());
		assert_eq!(engine.reveal("A"), 1);
		let snapshot = engine.visible_ids().clone();
		assert_eq!(engine.reveal("A"), 0);
		assert_eq!(engine.reveal("B"), 0);
		assert_eq!(engine.reveal("ghost"), 0);
		assert!(snapshot.is_subset(engine.visible_ids()));
		assert_eq!(engine.visible_ids().len(), snapshot.len());
	}

	#[test]
	fn selecting_hidden_node_fails_without_mutation() {
		let mut engine = DisclosureEngine::new(model());
		let before = engine.highlight().clone();
		assert_eq!(
			engine.select("C"),
			Err(DisclosureError::NotSelectable("C".into()))
		);
		assert_eq!(
			engine.select("nope"),
			Err(DisclosureError::UnknownNode("nope".into()))
		);
		assert_eq!(engine.selected_id(), "Root");
		assert_eq!(engine.highlight(), &before);
	}

	#[test]
	fn highlight_only_contains_visible_neighbors() {
		let mut engine = DisclosureEngine::new(model());
		engine.reveal("A");
		engine.select("C").unwrap();
		// D is a neighbor of C but not yet visible.
		assert_eq!(ids(&engine.highlight().node_ids), ["A", "C"]);
		engine.reveal("C");
		assert_eq!(ids(&engine.highlight().node_ids), ["A", "C", "D"]);
	}

	#[test]
	fn highlight_is_selection_plus_visible_neighbors() {
		let mut engine = DisclosureEngine::new(model());
		for id in ["A", "C", "D", "B", "Root"] {
			engine.reveal(id);
			engine.select(id).unwrap();
			let h = engine.highlight().clone();
			assert!(h.contains_node(id));
			for other in h.node_ids.iter().filter(|n| n.as_str() != id) {
				assert!(engine.visible_links().any(|l| {
					(l.source == id && &l.target == other) || (l.target == id && &l.source == other)
				}));
			}
		}
	}

	#[test]
	fn background_click_keeps_revealed_nodes() {
		let mut engine = DisclosureEngine::new(model());
		engine.reveal("A");
		engine.select("A").unwrap();
		engine.select_root();
		assert_eq!(engine.selected_id(), "Root");
		assert!(engine.is_visible("C"));
	}
}
