//! Leptos component hosting a [`GraphView`] in its own `<svg>`.
//!
//! The component renders the svg, attaches a view once the element is
//! mounted, re-attaches when the graph signal changes, and tears the view
//! down when the component is unmounted.

use leptos::prelude::*;
use log::error;
use wasm_bindgen::JsCast;
use web_sys::SvgsvgElement;

use super::config::ViewConfig;
use super::types::GraphData;
use super::view::GraphView;

/// Renders an interactive dependency graph.
///
/// Pass graph data via the reactive `data` signal. The svg fills its parent;
/// its viewBox is set to the auto-fit viewport when the view attaches.
#[component]
pub fn DepGraph(
	#[prop(into)] data: Signal<GraphData>,
	#[prop(optional)] config: Option<ViewConfig>,
) -> impl IntoView {
	let svg_ref = NodeRef::<leptos::svg::Svg>::new();
	let mounted: StoredValue<Option<GraphView>, LocalStorage> = StoredValue::new_local(None);
	let config = config.unwrap_or_default();

	Effect::new(move |_| {
		let data = data.get();
		let Some(svg) = svg_ref.get() else {
			return;
		};
		let Ok(svg) = svg.dyn_into::<SvgsvgElement>() else {
			error!("depgraph: node ref is not an <svg> element");
			return;
		};

		// Tear down the previous view before rendering into the same svg.
		mounted.set_value(None);
		match GraphView::attach(svg, &data, config.clone()) {
			Ok(attached) => mounted.set_value(Some(attached)),
			Err(e) => error!("depgraph: failed to render graph: {}", e),
		}
	});

	on_cleanup(move || {
		mounted.try_update_value(|v| v.take());
	});

	view! {
		<svg
			node_ref=svg_ref
			class="dep-graph"
			style="display: block; width: 100%; height: 100%; cursor: grab;"
		/>
	}
}
