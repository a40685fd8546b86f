//! Graph data structures for input to the dependency graph view.

use std::collections::HashMap;

use log::warn;
use serde::Deserialize;

use super::error::GraphError;

/// A statement in the blueprint (definition, lemma, theorem, ...).
#[derive(Clone, Debug, Deserialize)]
pub struct GraphNode {
	/// Unique identifier. Must equal the DOM id of the statement's content block.
	pub id: String,
	/// Declaration kind, exposed to CSS as `kind-<kind>` (e.g. `kind-definition`).
	pub kind: Option<String>,
	/// Formalization status, exposed to CSS as `status-<status>` (e.g. `status-proved`).
	pub status: Option<String>,
}

/// A directed dependency between two statements.
#[derive(Clone, Debug, Deserialize)]
pub struct GraphLink {
	/// Source node ID.
	pub source: String,
	/// Target node ID.
	pub target: String,
	/// Whether the dependency comes from a proof rather than a statement.
	#[serde(default)]
	pub proof: bool,
}

/// Complete graph data: nodes and links.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct GraphData {
	pub nodes: Vec<GraphNode>,
	pub links: Vec<GraphLink>,
}

/// A link whose endpoints have been resolved to node positions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IndexedLink {
	pub source: usize,
	pub target: usize,
	pub proof: bool,
}

/// Graph with links resolved against node order. Built once per view.
#[derive(Clone, Debug, Default)]
pub struct IndexedGraph {
	pub nodes: Vec<GraphNode>,
	pub links: Vec<IndexedLink>,
	/// Links dropped because an endpoint id was unknown.
	pub dropped_links: usize,
	by_id: HashMap<String, usize>,
}

impl GraphData {
	/// Decode `{ "nodes": [...], "links": [...] }`.
	pub fn from_json(text: &str) -> Result<Self, GraphError> {
		Ok(serde_json::from_str(text)?)
	}

	/// Validate ids and resolve links. Dangling links are skipped and counted.
	pub fn index(&self) -> Result<IndexedGraph, GraphError> {
		let mut by_id = HashMap::with_capacity(self.nodes.len());
		for (index, node) in self.nodes.iter().enumerate() {
			if node.id.is_empty() {
				return Err(GraphError::EmptyId { index });
			}
			if by_id.insert(node.id.clone(), index).is_some() {
				return Err(GraphError::DuplicateId(node.id.clone()));
			}
		}

		let mut links = Vec::with_capacity(self.links.len());
		let mut dropped_links = 0;
		for link in &self.links {
			match (by_id.get(&link.source), by_id.get(&link.target)) {
				(Some(&source), Some(&target)) => links.push(IndexedLink {
					source,
					target,
					proof: link.proof,
				}),
				_ => {
					warn!(
						"depgraph: dropping link {} -> {} with unknown endpoint",
						link.source, link.target
					);
					dropped_links += 1;
				}
			}
		}

		Ok(IndexedGraph {
			nodes: self.nodes.clone(),
			links,
			dropped_links,
			by_id,
		})
	}
}

impl IndexedGraph {
	/// Position of the node with the given id.
	pub fn position(&self, id: &str) -> Option<usize> {
		self.by_id.get(id).copied()
	}

	pub fn len(&self) -> usize {
		self.nodes.len()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn two_node_graph() -> GraphData {
		GraphData::from_json(
			r#"{"nodes":[{"id":"a"},{"id":"b"}],"links":[{"source":"a","target":"b"}]}"#,
		)
		.unwrap()
	}

	#[test]
	fn decodes_minimal_graph() {
		let data = two_node_graph();
		assert_eq!(data.nodes.len(), 2);
		assert_eq!(data.links.len(), 1);
		assert!(data.nodes[0].kind.is_none());
		assert!(!data.links[0].proof);
	}

	#[test]
	fn decodes_optional_metadata_and_ignores_unknown_fields() {
		let data = GraphData::from_json(
			r#"{"nodes":[{"id":"thm:main","label":"main","kind":"theorem","status":"proved","x":3}],
			    "links":[{"source":"thm:main","target":"thm:main","proof":true}]}"#,
		)
		.unwrap();
		assert_eq!(data.nodes[0].kind.as_deref(), Some("theorem"));
		assert_eq!(data.nodes[0].status.as_deref(), Some("proved"));
		assert!(data.links[0].proof);
	}

	#[test]
	fn rejects_malformed_json() {
		assert!(matches!(
			GraphData::from_json(r#"{"nodes": 3}"#),
			Err(GraphError::Load(_))
		));
	}

	#[test]
	fn index_resolves_links_in_node_order() {
		let indexed = two_node_graph().index().unwrap();
		assert_eq!(indexed.len(), 2);
		assert_eq!(
			indexed.links,
			vec![IndexedLink {
				source: 0,
				target: 1,
				proof: false
			}]
		);
		assert_eq!(indexed.position("b"), Some(1));
		assert_eq!(indexed.position("c"), None);
	}

	#[test]
	fn index_drops_dangling_links() {
		let mut data = two_node_graph();
		data.links.push(GraphLink {
			source: "a".into(),
			target: "missing".into(),
			proof: false,
		});
		let indexed = data.index().unwrap();
		assert_eq!(indexed.links.len(), 1);
		assert_eq!(indexed.dropped_links, 1);
	}

	#[test]
	fn index_rejects_duplicate_and_empty_ids() {
		let dup = GraphData::from_json(r#"{"nodes":[{"id":"a"},{"id":"a"}],"links":[]}"#).unwrap();
		assert!(matches!(dup.index(), Err(GraphError::DuplicateId(id)) if id == "a"));

		let empty = GraphData::from_json(r#"{"nodes":[{"id":"a"},{"id":""}],"links":[]}"#).unwrap();
		assert!(matches!(empty.index(), Err(GraphError::EmptyId { index: 1 })));
	}
}
