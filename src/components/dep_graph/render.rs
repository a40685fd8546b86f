//! SVG scene construction and per-frame attribute syncing.
//!
//! The scene appended to the target svg:
//! ```text
//! <defs><marker id="arrow">...</marker></defs>
//! <g>                              root content group, carries the zoom transform
//!   <g class="links"><line marker-end="url(#arrow)"/>...</g>
//!   <g class="nodes"><circle r="1.5"><title>id</title></circle>...</g>
//! </g>
//! ```

use wasm_bindgen::JsCast;
use web_sys::{Document, Element, SvgGraphicsElement, SvgsvgElement};

use super::config::{FitConfig, RenderConfig};
use super::error::GraphError;
use super::selection::NodeClasses;
use super::types::{GraphNode, IndexedGraph, IndexedLink};
use super::zoom::{BBox, ZoomTransform};

const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// Elements created for one graph, indexed like the graph's nodes and links.
pub struct Scene {
	pub svg: SvgsvgElement,
	pub defs: Element,
	pub content: SvgGraphicsElement,
	pub lines: Vec<Element>,
	pub circles: Vec<Element>,
	links: Vec<IndexedLink>,
}

fn create(document: &Document, tag: &str) -> Result<Element, GraphError> {
	Ok(document.create_element_ns(Some(SVG_NS), tag)?)
}

fn set_attrs(element: &Element, attrs: &[(&str, &str)]) -> Result<(), GraphError> {
	for (name, value) in attrs {
		element.set_attribute(name, value)?;
	}
	Ok(())
}

/// Give the svg a viewBox matching the fit viewport if the page did not.
pub fn ensure_view_box(svg: &SvgsvgElement, fit: &FitConfig) -> Result<(), GraphError> {
	if !svg.has_attribute("viewBox") {
		svg.set_attribute(
			"viewBox",
			&format!("0 0 {} {}", fit.viewport_width, fit.viewport_height),
		)?;
	}
	Ok(())
}

fn append_marker(
	document: &Document,
	svg: &SvgsvgElement,
	config: &RenderConfig,
) -> Result<Element, GraphError> {
	let defs = create(document, "defs")?;
	let marker = create(document, "marker")?;
	set_attrs(
		&marker,
		&[
			("id", config.marker_id.as_str()),
			("refX", "6"),
			("refY", "3"),
			("markerWidth", "6"),
			("markerHeight", "6"),
			("orient", "auto"),
		],
	)?;
	let path = create(document, "path")?;
	set_attrs(&path, &[("d", "M 0 0 6 3 0 6 1.5 3"), ("style", "fill: black")])?;
	marker.append_child(&path)?;
	defs.append_child(&marker)?;
	svg.append_child(&defs)?;
	Ok(defs)
}

fn circle_class(node: &GraphNode) -> String {
	let mut classes = Vec::new();
	if let Some(kind) = &node.kind {
		classes.push(format!("kind-{kind}"));
	}
	if let Some(status) = &node.status {
		classes.push(format!("status-{status}"));
	}
	classes.join(" ")
}

impl Scene {
	/// Append markers, links and nodes for `graph` to `svg`.
	pub fn build(
		document: &Document,
		svg: SvgsvgElement,
		graph: &IndexedGraph,
		config: &RenderConfig,
	) -> Result<Self, GraphError> {
		let defs = append_marker(document, &svg, config)?;

		let content: SvgGraphicsElement = create(document, "g")?.unchecked_into();
		svg.append_child(&content)?;

		let link_group = create(document, "g")?;
		link_group.set_attribute("class", "links")?;
		content.append_child(&link_group)?;
		let marker_end = format!("url(#{})", config.marker_id);
		let mut lines = Vec::with_capacity(graph.links.len());
		for link in &graph.links {
			let line = create(document, "line")?;
			let class = if link.proof { "proof" } else { "statement" };
			set_attrs(&line, &[("marker-end", marker_end.as_str()), ("class", class)])?;
			link_group.append_child(&line)?;
			lines.push(line);
		}

		let node_group = create(document, "g")?;
		node_group.set_attribute("class", "nodes")?;
		content.append_child(&node_group)?;
		let radius = config.node_radius.to_string();
		let mut circles = Vec::with_capacity(graph.len());
		for node in &graph.nodes {
			let circle = create(document, "circle")?;
			circle.set_attribute("r", &radius)?;
			let class = circle_class(node);
			if !class.is_empty() {
				circle.set_attribute("class", &class)?;
			}
			let title = create(document, "title")?;
			title.set_text_content(Some(&node.id));
			circle.append_child(&title)?;
			node_group.append_child(&circle)?;
			circles.push(circle);
		}

		Ok(Self {
			svg,
			defs,
			content,
			lines,
			circles,
			links: graph.links.clone(),
		})
	}

	/// Move every line and circle to the given node positions.
	pub fn sync_positions(&self, positions: &[(f32, f32)]) {
		for (line, link) in self.lines.iter().zip(&self.links) {
			let (Some(&(x1, y1)), Some(&(x2, y2))) =
				(positions.get(link.source), positions.get(link.target))
			else {
				continue;
			};
			let _ = line.set_attribute("x1", &x1.to_string());
			let _ = line.set_attribute("y1", &y1.to_string());
			let _ = line.set_attribute("x2", &x2.to_string());
			let _ = line.set_attribute("y2", &y2.to_string());
		}
		for (circle, &(x, y)) in self.circles.iter().zip(positions) {
			let _ = circle.set_attribute("cx", &x.to_string());
			let _ = circle.set_attribute("cy", &y.to_string());
		}
	}

	pub fn apply_classes(&self, idx: usize, classes: NodeClasses) {
		let Some(circle) = self.circles.get(idx) else {
			return;
		};
		let list = circle.class_list();
		for (name, present) in classes.toggles() {
			let _ = list.toggle_with_force(name, present);
		}
	}

	/// Apply the zoom transform to the content group, compensating stroke width.
	pub fn apply_transform(&self, transform: &ZoomTransform) {
		let _ = self
			.content
			.set_attribute("transform", &transform.to_attribute());
		let _ = self
			.content
			.set_attribute("stroke-width", &transform.stroke_width().to_string());
	}

	/// Bounding box of the content in graph coordinates.
	pub fn bbox(&self) -> Result<BBox, GraphError> {
		let rect = self.content.get_b_box()?;
		Ok(BBox {
			x: rect.x() as f64,
			y: rect.y() as f64,
			width: rect.width() as f64,
			height: rect.height() as f64,
		})
	}

	/// Convert client (screen) coordinates into the coordinate space of `element`.
	pub fn client_to_local(
		&self,
		element: &SvgGraphicsElement,
		client_x: i32,
		client_y: i32,
	) -> Option<(f64, f64)> {
		let matrix = element.get_screen_ctm()?.inverse().ok()?;
		let point = self.svg.create_svg_point();
		point.set_x(client_x as f32);
		point.set_y(client_y as f32);
		let local = point.matrix_transform(&matrix);
		Some((local.x() as f64, local.y() as f64))
	}

	/// Client coordinates in graph space (inside the zoom transform).
	pub fn client_to_graph(&self, client_x: i32, client_y: i32) -> Option<(f64, f64)> {
		self.client_to_local(&self.content, client_x, client_y)
	}

	/// Client coordinates in the svg's user space (outside the zoom transform).
	pub fn client_to_svg(&self, client_x: i32, client_y: i32) -> Option<(f64, f64)> {
		let svg: &SvgGraphicsElement = self.svg.as_ref();
		self.client_to_local(svg, client_x, client_y)
	}

	/// Remove everything this scene appended.
	pub fn remove(&self) {
		self.defs.remove();
		self.content.remove();
	}
}
