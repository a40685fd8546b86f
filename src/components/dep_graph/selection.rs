//! Hover and click state of the nodes, mirrored onto CSS classes.

/// Class of the selected node.
pub const ACTIVE: &str = "active";
/// Class of a hovered node that is not selected.
pub const HIGHLIGHT: &str = "highlight";
/// Class of the selected node while hovered (also set on click).
pub const ACTIVE_HIGHLIGHT: &str = "activehighlight";

/// The interaction classes carried by one node's circle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NodeClasses {
	pub active: bool,
	pub highlight: bool,
	pub active_highlight: bool,
}

impl NodeClasses {
	/// `(class name, present)` pairs, for toggling on an element.
	pub fn toggles(&self) -> [(&'static str, bool); 3] {
		[
			(ACTIVE, self.active),
			(HIGHLIGHT, self.highlight),
			(ACTIVE_HIGHLIGHT, self.active_highlight),
		]
	}
}

/// Tracks which node is selected and which are highlighted.
///
/// At most one node is active at any time.
#[derive(Clone, Debug, Default)]
pub struct Selection {
	classes: Vec<NodeClasses>,
	active: Option<usize>,
}

impl Selection {
	pub fn new(len: usize) -> Self {
		Self {
			classes: vec![NodeClasses::default(); len],
			active: None,
		}
	}

	pub fn active(&self) -> Option<usize> {
		self.active
	}

	pub fn classes(&self, idx: usize) -> NodeClasses {
		self.classes.get(idx).copied().unwrap_or_default()
	}

	/// Pointer entered a node.
	pub fn hover_enter(&mut self, idx: usize) -> Option<NodeClasses> {
		let classes = self.classes.get_mut(idx)?;
		if classes.active {
			classes.active_highlight = true;
		} else {
			classes.highlight = true;
		}
		Some(*classes)
	}

	/// Pointer left a node; both highlight classes go regardless of state.
	pub fn hover_leave(&mut self, idx: usize) -> Option<NodeClasses> {
		let classes = self.classes.get_mut(idx)?;
		classes.highlight = false;
		classes.active_highlight = false;
		Some(*classes)
	}

	/// Select a node. Returns the indices whose classes changed.
	pub fn click(&mut self, idx: usize) -> Vec<usize> {
		if idx >= self.classes.len() {
			return Vec::new();
		}
		let mut changed = Vec::new();
		for (i, classes) in self.classes.iter_mut().enumerate() {
			let before = *classes;
			classes.active = false;
			classes.highlight = false;
			if i == idx {
				classes.active = true;
				classes.active_highlight = true;
			}
			if *classes != before {
				changed.push(i);
			}
		}
		self.active = Some(idx);
		changed
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn active_count(sel: &Selection, len: usize) -> usize {
		(0..len).filter(|&i| sel.classes(i).active).count()
	}

	#[test]
	fn hover_on_inactive_node_highlights() {
		let mut sel = Selection::new(2);
		let classes = sel.hover_enter(0).unwrap();
		assert!(classes.highlight);
		assert!(!classes.active_highlight);
	}

	#[test]
	fn hover_on_active_node_uses_active_highlight() {
		let mut sel = Selection::new(2);
		sel.click(1);
		sel.hover_leave(1);
		let classes = sel.hover_enter(1).unwrap();
		assert!(classes.active_highlight);
		assert!(!classes.highlight);
	}

	#[test]
	fn hover_leave_clears_both_highlights() {
		let mut sel = Selection::new(1);
		sel.hover_enter(0);
		sel.click(0);
		sel.hover_enter(0);
		let classes = sel.hover_leave(0).unwrap();
		assert!(!classes.highlight && !classes.active_highlight);
		assert!(classes.active);
	}

	#[test]
	fn click_moves_single_active_node() {
		let mut sel = Selection::new(3);
		sel.click(0);
		assert_eq!(active_count(&sel, 3), 1);

		sel.hover_enter(2);
		let changed = sel.click(2);
		assert_eq!(changed, vec![0, 2]);
		assert_eq!(active_count(&sel, 3), 1);
		assert_eq!(sel.active(), Some(2));
		assert_eq!(
			sel.classes(2),
			NodeClasses {
				active: true,
				highlight: false,
				active_highlight: true,
			}
		);
		assert!(!sel.classes(0).active);
	}

	#[test]
	fn click_clears_highlight_on_other_nodes() {
		let mut sel = Selection::new(2);
		sel.hover_enter(0);
		sel.click(1);
		assert!(!sel.classes(0).highlight);
	}

	#[test]
	fn out_of_range_indices_are_ignored() {
		let mut sel = Selection::new(1);
		assert!(sel.hover_enter(5).is_none());
		assert!(sel.click(5).is_empty());
		assert_eq!(sel.active(), None);
	}
}
