use std::collections::HashMap;

use log::warn;

use super::types::{GraphData, GraphLink, GraphNode};
use crate::config::ViewerConfig;
use crate::error::LoadError;

/// Node and link lookup built once per dataset. Read-only afterwards.
#[derive(Clone, Debug)]
pub struct GraphModel {
	root_id: String,
	nodes: Vec<GraphNode>,
	links: Vec<GraphLink>,
	index: HashMap<String, usize>,
	outgoing: HashMap<String, Vec<String>>,
}

impl GraphModel {
	/// Parses a dataset document and builds the model around `root_id`.
	pub fn from_json(text: &str, root_id: &str) -> Result<(Self, GraphData), LoadError> {
		let data: GraphData =
			serde_json::from_str(text).map_err(|e| LoadError::Parse(e.to_string()))?;
		let model = Self::new(&data, root_id)?;
		Ok((model, data))
	}

	/// Parses a dataset document, letting its `"viewer"` object replace
	/// `defaults` before the root is looked up.
	pub fn from_dataset(text: &str, defaults: &ViewerConfig) -> Result<(Self, ViewerConfig), LoadError> {
		let data: GraphData =
			serde_json::from_str(text).map_err(|e| LoadError::Parse(e.to_string()))?;
		let config = data.viewer.clone().unwrap_or_else(|| defaults.clone());
		let model = Self::new(&data, &config.root_id)?;
		Ok((model, config))
	}

	/// Builds the model. Links touching unknown ids are dropped; a missing
	/// root or a duplicate id is fatal.
	pub fn new(data: &GraphData, root_id: &str) -> Result<Self, LoadError> {
		let mut index = HashMap::with_capacity(data.nodes.len());
		for (i, node) in data.nodes.iter().enumerate() {
			if index.insert(node.id.clone(), i).is_some() {
				return Err(LoadError::DuplicateNode(node.id.clone()));
			}
		}
		if !index.contains_key(root_id) {
			return Err(LoadError::MissingRoot(root_id.to_string()));
		}

		let mut links = Vec::with_capacity(data.links.len());
		let mut outgoing: HashMap<String, Vec<String>> = HashMap::new();
		for link in &data.links {
			if !index.contains_key(&link.source) || !index.contains_key(&link.target) {
				warn!("dropping link {} with unknown endpoint", link.key());
				continue;
			}
			let children = outgoing.entry(link.source.clone()).or_default();
			if !children.contains(&link.target) {
				children.push(link.target.clone());
			}
			links.push(link.clone());
		}

		Ok(Self {
			root_id: root_id.to_string(),
			nodes: data.nodes.clone(),
			links,
			index,
			outgoing,
		})
	}

	pub fn root_id(&self) -> &str {
		&self.root_id
	}

	pub fn root(&self) -> &GraphNode {
		// The constructor guarantees the root exists.
		&self.nodes[self.index[&self.root_id]]
	}

	pub fn node(&self, id: &str) -> Option<&GraphNode> {
		self.index.get(id).map(|&i| &self.nodes[i])
	}

	pub fn contains(&self, id: &str) -> bool {
		self.index.contains_key(id)
	}

	/// Nodes in dataset order.
	pub fn nodes(&self) -> &[GraphNode] {
		&self.nodes
	}

	/// Links whose endpoints both exist, in dataset order.
	pub fn links(&self) -> &[GraphLink] {
		&self.links
	}

	/// Directly reachable ids, for disclosure.
	pub fn outgoing(&self, id: &str) -> &[String] {
		self.outgoing.get(id).map(Vec::as_slice).unwrap_or(&[])
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const DATASET: &str = r#"{
		"nodes": [
			{ "id": "Root", "x": 0, "y": 0 },
			{ "id": "A", "x": 100, "y": 0 },
			{ "id": "B", "x": 0, "y": 100 }
		],
		"links": [
			{ "source": "Root", "target": "A" },
			{ "source": "Root", "target": "B" },
			{ "source": "Root", "target": "A" },
			{ "source": "A", "target": "ghost" }
		]
	}"#;

	#[test]
	fn builds_outgoing_adjacency_without_duplicates() {
		let (model, _) = GraphModel::from_json(DATASET, "Root").unwrap();
		assert_eq!(model.outgoing("Root"), ["A".to_string(), "B".to_string()]);
		assert!(model.outgoing("A").is_empty());
		assert_eq!(model.root().id, "Root");
	}

	#[test]
	fn drops_links_to_unknown_nodes() {
		let (model, _) = GraphModel::from_json(DATASET, "Root").unwrap();
		assert!(model.links().iter().all(|l| l.target != "ghost"));
		assert_eq!(model.links().len(), 3);
	}

	#[test]
	fn missing_root_is_fatal() {
		let err = GraphModel::from_json(DATASET, "Home").unwrap_err();
		assert_eq!(err, LoadError::MissingRoot("Home".into()));
	}

	#[test]
	fn duplicate_ids_are_fatal() {
		let text = r#"{ "nodes": [{ "id": "Root" }, { "id": "Root" }] }"#;
		let err = GraphModel::from_json(text, "Root").unwrap_err();
		assert_eq!(err, LoadError::DuplicateNode("Root".into()));
	}

	#[test]
	fn dataset_viewer_overrides_root() {
		let text = r#"{
			"nodes": [{ "id": "Home" }, { "id": "Blog" }],
			"links": [{ "source": "Home", "target": "Blog" }],
			"viewer": { "root_id": "Home", "max_scale": 3 }
		}"#;
		let (model, config) = GraphModel::from_dataset(text, &ViewerConfig::default()).unwrap();
		assert_eq!(model.root_id(), "Home");
		assert_eq!(config.max_scale, 3.0);
		assert_eq!(config.min_scale, 0.3);

		let (model, _) = GraphModel::from_dataset(DATASET, &ViewerConfig::default()).unwrap();
		assert_eq!(model.root_id(), "Root");
	}

	#[test]
	fn malformed_json_is_fatal() {
		assert!(matches!(
			GraphModel::from_json("{ nodes: ", "Root"),
			Err(LoadError::Parse(_))
		));
	}
}
