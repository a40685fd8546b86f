//! Node dragging: pinning, reheating the layout, and click suppression.

use super::simulation::{Phase, Simulation};

/// An in-progress node drag.
#[derive(Clone, Copy, Debug)]
struct Grab {
	node: usize,
	/// Node position minus pointer position at drag start.
	offset: (f64, f64),
	/// Whether this drag woke the simulation from rest.
	reheated: bool,
	moved: bool,
}

/// Drag bookkeeping for one view. Only one node is dragged at a time.
#[derive(Clone, Debug, Default)]
pub struct NodeDrag {
	grab: Option<Grab>,
	suppress_click: bool,
}

impl NodeDrag {
	/// Grab node `idx`. `pointer` is in graph coordinates when known.
	///
	/// A resting simulation is reheated toward `reheat_target`.
	pub fn start(
		&mut self,
		simulation: &mut Simulation,
		idx: usize,
		pointer: Option<(f64, f64)>,
		reheat_target: f64,
	) {
		self.suppress_click = false;
		let Some((x, y)) = simulation.position(idx) else {
			return;
		};
		let mut reheated = false;
		if simulation.phase() == Phase::Resting {
			simulation.set_alpha_target(reheat_target);
			reheated = simulation.restart();
		}
		simulation.pin(idx, x, y);

		let offset = pointer.map_or((0.0, 0.0), |(px, py)| (x as f64 - px, y as f64 - py));
		self.grab = Some(Grab {
			node: idx,
			offset,
			reheated,
			moved: false,
		});
	}

	/// Pin the grabbed node under the pointer. Returns `false` when not dragging.
	pub fn move_to(&mut self, simulation: &mut Simulation, (px, py): (f64, f64)) -> bool {
		let Some(grab) = self.grab.as_mut() else {
			return false;
		};
		grab.moved = true;
		let (x, y) = (px + grab.offset.0, py + grab.offset.1);
		simulation.pin(grab.node, x as f32, y as f32);
		true
	}

	/// Release the grabbed node and cool the simulation if this drag heated it.
	pub fn end(&mut self, simulation: &mut Simulation) {
		let Some(grab) = self.grab.take() else {
			return;
		};
		if grab.reheated {
			simulation.set_alpha_target(0.0);
		}
		simulation.unpin(grab.node);
		self.suppress_click = grab.moved;
	}

	pub fn is_dragging(&self) -> bool {
		self.grab.is_some()
	}

	/// Consume the pending suppression left by a drag that moved its node.
	pub fn take_click_suppression(&mut self) -> bool {
		std::mem::take(&mut self.suppress_click)
	}

	pub fn clear_click_suppression(&mut self) {
		self.suppress_click = false;
	}
}
