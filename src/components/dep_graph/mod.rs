//! Force-directed dependency graph of blueprint statements.
//!
//! Renders an interactive graph into an svg element with:
//! - Physics-based node positioning via an alpha-decaying force simulation
//! - Pan, wheel zoom (scale clamped to `[1, 8]`) and node dragging
//! - Hover highlighting and click-to-select, which reveals the statement block
//!   whose DOM id matches the node id
//! - A one-shot animated fit of the content into the viewport
//!
//! # Example
//!
//! ```ignore
//! use blueprint_depgraph::{GraphData, GraphView, ViewConfig};
//!
//! let data = GraphData::from_json(r#"{"nodes":[{"id":"a"},{"id":"b"}],
//!                                      "links":[{"source":"a","target":"b"}]}"#)?;
//! let view = GraphView::attach(svg, &data, ViewConfig::default())?;
//! ```

mod component;
mod config;
mod content;
mod drag;
mod error;
mod render;
mod selection;
mod simulation;
mod types;
mod view;
mod zoom;

pub use component::DepGraph;
pub use config::{FitConfig, FitTrigger, RenderConfig, SimulationConfig, ViewConfig, ZoomConfig};
pub use error::GraphError;
pub use selection::{ACTIVE, ACTIVE_HIGHLIGHT, HIGHLIGHT};
pub use types::{GraphData, GraphLink, GraphNode};
pub use view::GraphView;
pub use zoom::ZoomTransform;
