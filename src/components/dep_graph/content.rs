//! Showing and hiding the statement blocks that live elsewhere on the page.

use log::warn;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement};

use super::error::GraphError;

fn hide(element: &HtmlElement) -> Result<(), GraphError> {
	element.style().set_property("display", "none")?;
	Ok(())
}

/// Clear an inline `display: none`; fall back to `block` when a stylesheet
/// still hides the element.
fn show(element: &HtmlElement) -> Result<(), GraphError> {
	let style = element.style();
	style.remove_property("display")?;
	let hidden_by_css = web_sys::window()
		.and_then(|w| w.get_computed_style(element).ok().flatten())
		.and_then(|computed| computed.get_property_value("display").ok())
		.is_some_and(|display| display == "none");
	if hidden_by_css {
		style.set_property("display", "block")?;
	}
	Ok(())
}

/// Hide every block of class `content_class`, then show the one with DOM id `id`.
///
/// Returns whether a matching block was found.
pub fn reveal(document: &Document, content_class: &str, id: &str) -> Result<bool, GraphError> {
	let selector = format!(".{}", web_sys::css::escape(content_class));
	let blocks = document.query_selector_all(&selector)?;
	for i in 0..blocks.length() {
		if let Some(block) = blocks.item(i).and_then(|n| n.dyn_into::<HtmlElement>().ok()) {
			hide(&block)?;
		}
	}

	let Some(target) = document
		.get_element_by_id(id)
		.and_then(|e| e.dyn_into::<HtmlElement>().ok())
	else {
		warn!("depgraph: no content block with id {id:?}");
		return Ok(false);
	};
	show(&target)?;
	Ok(true)
}
