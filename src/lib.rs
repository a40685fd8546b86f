//! blueprint-depgraph: interactive dependency graph for blueprint statements.
//!
//! This crate provides a WASM-based graph view that lays out the dependency
//! graph of a formalization blueprint with a force simulation, and lets the
//! reader pan, zoom, drag nodes and click a node to reveal its statement.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, HtmlScriptElement, SvgsvgElement};

pub mod components;

pub use components::dep_graph::{
	DepGraph, GraphData, GraphError, GraphLink, GraphNode, GraphView, ViewConfig,
};

/// Id of the `<script type="application/json">` element holding the graph.
pub const GRAPH_DATA_ID: &str = "graph-data";
/// Id of the optional `<script type="application/json">` holding `ViewConfig` overrides.
pub const GRAPH_CONFIG_ID: &str = "graph-config";

thread_local! {
	static MOUNTED: std::cell::RefCell<Option<GraphView>> = const { std::cell::RefCell::new(None) };
}

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("depgraph: logging initialized");
}

fn document() -> Result<Document, GraphError> {
	web_sys::window()
		.and_then(|w| w.document())
		.ok_or(GraphError::RenderTargetMissing)
}

fn script_text(document: &Document, id: &str) -> Option<String> {
	let element = document.get_element_by_id(id)?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	script.text().ok()
}

/// Read the page's `graph` global (`{nodes, links}`) through `JSON.stringify`.
fn global_graph_json() -> Option<String> {
	let window = web_sys::window()?;
	let graph = js_sys::Reflect::get(&window, &JsValue::from_str("graph")).ok()?;
	if graph.is_undefined() || graph.is_null() {
		return None;
	}
	js_sys::JSON::stringify(&graph).ok()?.as_string()
}

/// Load graph data from a script element with id="graph-data", falling back
/// to a global `graph` object.
pub fn load_graph_data() -> Result<GraphData, GraphError> {
	let document = document()?;
	let json_text = script_text(&document, GRAPH_DATA_ID)
		.or_else(global_graph_json)
		.ok_or(GraphError::MissingGraph)?;

	let data = GraphData::from_json(&json_text)?;
	info!(
		"depgraph: loaded {} nodes, {} links",
		data.nodes.len(),
		data.links.len()
	);
	Ok(data)
}

/// Load view configuration overrides; defaults when absent or invalid.
pub fn load_view_config() -> ViewConfig {
	let Some(text) = document()
		.ok()
		.and_then(|d| script_text(&d, GRAPH_CONFIG_ID))
	else {
		return ViewConfig::default();
	};
	ViewConfig::from_json(&text).unwrap_or_else(|e| {
		warn!("depgraph: ignoring invalid graph config: {}", e);
		ViewConfig::default()
	})
}

/// Start the graph view.
///
/// When the page already contains an `<svg>`, the view is attached to it and
/// lives for the rest of the page. Otherwise the [`App`] is mounted to the body.
pub fn start() -> Result<(), GraphError> {
	let document = document()?;
	let config = load_view_config();

	let existing = document
		.query_selector("svg")?
		.and_then(|e| e.dyn_into::<SvgsvgElement>().ok());
	let Some(svg) = existing else {
		mount_to_body(|| view! { <App /> });
		return Ok(());
	};

	let data = load_graph_data()?;
	let graph_view = GraphView::attach(svg, &data, config)?;
	MOUNTED.with(|m| *m.borrow_mut() = Some(graph_view));
	Ok(())
}

/// Main application component.
/// Loads graph data from the DOM and renders the dependency graph.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let graph_data = load_graph_data().unwrap_or_else(|e| {
		warn!("depgraph: {}", e);
		GraphData::default()
	});
	let graph_signal = Signal::derive(move || graph_data.clone());
	let config = load_view_config();

	view! {
		<Title text="Dependency graph" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="fullscreen-graph">
			<DepGraph data=graph_signal config=config />
			<div class="graph-overlay">
				<h1>"Dependency graph"</h1>
				<p class="subtitle">"Click a node to show its statement. Drag nodes to reposition. Scroll to zoom."</p>
			</div>
		</div>
	}
}
