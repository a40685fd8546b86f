//! UI components.

pub mod dep_graph;
