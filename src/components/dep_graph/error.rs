//! Error taxonomy for loading and mounting the dependency graph.

use thiserror::Error;
use wasm_bindgen::JsValue;

/// Everything that can go wrong between reading the page and showing a graph.
#[derive(Debug, Error)]
pub enum GraphError {
	/// The embedded graph JSON could not be decoded.
	#[error("failed to parse graph data: {0}")]
	Load(#[from] serde_json::Error),
	/// Neither a `graph-data` script nor a `graph` global was found.
	#[error("no graph data found in page")]
	MissingGraph,
	/// A node was supplied without an id.
	#[error("node {index} has an empty id")]
	EmptyId { index: usize },
	/// Two nodes share the same id.
	#[error("duplicate node id: {0}")]
	DuplicateId(String),
	/// No `<svg>` element (or no document) to render into.
	#[error("no svg render target found")]
	RenderTargetMissing,
	/// A DOM call failed.
	#[error("DOM operation failed: {0}")]
	Dom(String),
}

impl From<JsValue> for GraphError {
	fn from(value: JsValue) -> Self {
		GraphError::Dom(value.as_string().unwrap_or_else(|| format!("{value:?}")))
	}
}
