//! The interactive graph view.
//!
//! [`GraphView`] owns everything one graph needs: the simulation, the svg
//! scene, selection and zoom state, the DOM listeners and the animation loop.
//! Callbacks registered with the DOM borrow the shared [`ViewState`] and call
//! one of its `on_*` methods. Dropping the view (or calling
//! [`GraphView::destroy`]) cancels the loop, unregisters listeners and removes
//! the scene from the svg.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::{debug, info, warn};
use wasm_bindgen::prelude::*;
use web_sys::{
	AddEventListenerOptions, Document, EventTarget, MouseEvent, SvgsvgElement, WheelEvent, Window,
};

use super::config::ViewConfig;
use super::content;
use super::drag::NodeDrag;
use super::error::GraphError;
use super::render::{Scene, ensure_view_box};
use super::selection::Selection;
use super::simulation::{Phase, Simulation};
use super::types::{GraphData, IndexedGraph};
use super::zoom::{AutoFit, Zoom, ZoomTransform, ZoomTransition, fit_transform};

/// Mutable state shared by all callbacks of one view.
pub struct ViewState {
	graph: IndexedGraph,
	config: ViewConfig,
	document: Document,
	simulation: Simulation,
	selection: Selection,
	zoom: Zoom,
	scene: Scene,
	drag: NodeDrag,
	transition: Option<ZoomTransition>,
	auto_fit: AutoFit,
	destroyed: bool,
}

impl ViewState {
	fn new(svg: SvgsvgElement, data: &GraphData, config: ViewConfig) -> Result<Self, GraphError> {
		let document = svg
			.owner_document()
			.ok_or(GraphError::RenderTargetMissing)?;
		let graph = data.index()?;
		ensure_view_box(&svg, &config.fit)?;

		let scene = Scene::build(&document, svg, &graph, &config.render)?;
		let simulation = Simulation::new(&graph, &config.simulation);
		let zoom = Zoom::new(&config.zoom);
		let auto_fit = AutoFit::new(config.fit.trigger.clone());
		scene.sync_positions(simulation.positions());
		scene.apply_transform(&zoom.transform());

		info!(
			"depgraph: rendering {} nodes, {} links ({} dropped)",
			graph.len(),
			graph.links.len(),
			graph.dropped_links
		);

		Ok(Self {
			selection: Selection::new(graph.len()),
			graph,
			config,
			document,
			simulation,
			zoom,
			scene,
			drag: NodeDrag::default(),
			transition: None,
			auto_fit,
			destroyed: false,
		})
	}

	pub fn on_hover_enter(&mut self, idx: usize) {
		if let Some(classes) = self.selection.hover_enter(idx) {
			self.scene.apply_classes(idx, classes);
		}
	}

	pub fn on_hover_leave(&mut self, idx: usize) {
		if let Some(classes) = self.selection.hover_leave(idx) {
			self.scene.apply_classes(idx, classes);
		}
	}

	/// Pointer click on a node; ignored when it ends a drag that moved the node.
	fn on_node_click(&mut self, idx: usize) {
		if self.drag.take_click_suppression() {
			return;
		}
		self.on_click(idx);
	}

	/// Select a node and reveal its statement block.
	pub fn on_click(&mut self, idx: usize) {
		for changed in self.selection.click(idx) {
			self.scene.apply_classes(changed, self.selection.classes(changed));
		}
		let Some(node) = self.graph.nodes.get(idx) else {
			return;
		};
		if let Err(e) = content::reveal(&self.document, &self.config.render.content_class, &node.id)
		{
			warn!("depgraph: failed to reveal {}: {}", node.id, e);
		}
	}

	/// Begin dragging `idx`; `pointer` is in graph coordinates when known.
	pub fn on_drag_start(&mut self, idx: usize, pointer: Option<(f64, f64)>) {
		let reheat = self.config.simulation.drag_alpha_target;
		self.drag.start(&mut self.simulation, idx, pointer, reheat);
	}

	/// Move the dragged node so it follows the pointer (graph coordinates).
	pub fn on_drag_move(&mut self, pointer: (f64, f64)) {
		if self.drag.move_to(&mut self.simulation, pointer) {
			self.scene.sync_positions(self.simulation.positions());
		}
	}

	pub fn on_drag_end(&mut self) {
		self.drag.end(&mut self.simulation);
	}

	pub fn is_dragging(&self) -> bool {
		self.drag.is_dragging()
	}

	pub fn on_zoom(&mut self, transform: ZoomTransform) {
		self.scene.apply_transform(&transform);
	}

	fn on_wheel(&mut self, point: (f64, f64), delta_y: f64, delta_mode: u32) {
		self.transition = None;
		let transform = self.zoom.wheel(point, delta_y, delta_mode);
		self.on_zoom(transform);
	}

	fn on_pan_start(&mut self, point: (f64, f64)) {
		self.transition = None;
		self.drag.clear_click_suppression();
		self.zoom.pan_start(point);
	}

	fn on_pan_move(&mut self, point: (f64, f64)) {
		if let Some(transform) = self.zoom.pan_move(point) {
			self.on_zoom(transform);
		}
	}

	/// Advance one animation frame at time `now_ms`.
	pub fn on_frame(&mut self, now_ms: f64) {
		if self.destroyed {
			return;
		}
		if self.simulation.tick() {
			self.scene.sync_positions(self.simulation.positions());
		}

		let resting = self.simulation.phase() == Phase::Resting;
		if self.auto_fit.poll(now_ms, resting, self.simulation.alpha()) {
			self.fit_to_content();
		}

		if let Some(transition) = self.transition.as_mut() {
			let (transform, done) = transition.sample(now_ms);
			if done {
				self.transition = None;
			}
			self.zoom.set_transform(transform);
			self.on_zoom(transform);
		}
	}

	/// Start an animated transition that fits the content to the viewport.
	pub fn fit_to_content(&mut self) {
		let bbox = match self.scene.bbox() {
			Ok(bbox) => bbox,
			Err(e) => {
				warn!("depgraph: cannot measure content: {}", e);
				return;
			}
		};
		let Some(target) = fit_transform(&bbox, &self.config.fit) else {
			debug!("depgraph: nothing to fit");
			return;
		};
		debug!("depgraph: fitting {:?} with {:?}", bbox, target);
		self.transition = Some(ZoomTransition::new(
			self.zoom.transform(),
			target,
			self.config.fit.transition_ms,
		));
	}
}

type Handler = Closure<dyn FnMut(MouseEvent)>;

/// A registered DOM listener, kept so it can be removed on teardown.
struct Listener {
	target: EventTarget,
	kind: &'static str,
	handler: Handler,
}

/// An interactive dependency graph attached to an `<svg>` element.
pub struct GraphView {
	state: Rc<RefCell<ViewState>>,
	listeners: Vec<Listener>,
	frame: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>,
	frame_id: Rc<Cell<Option<i32>>>,
}

impl GraphView {
	/// Render `data` into `svg` and start the layout and interaction.
	pub fn attach(
		svg: SvgsvgElement,
		data: &GraphData,
		config: ViewConfig,
	) -> Result<Self, GraphError> {
		let window = web_sys::window().ok_or(GraphError::RenderTargetMissing)?;
		let document = window.document().ok_or(GraphError::RenderTargetMissing)?;
		let state = ViewState::new(svg.clone(), data, config)?;

		let mut view = Self {
			state: Rc::new(RefCell::new(state)),
			listeners: Vec::new(),
			frame: Rc::new(RefCell::new(None)),
			frame_id: Rc::new(Cell::new(None)),
		};
		view.wire_nodes()?;
		view.wire_zoom_and_drag(&svg, &document)?;
		view.start_loop(&window)?;
		Ok(view)
	}

	fn listen(
		&mut self,
		target: &EventTarget,
		kind: &'static str,
		handler: impl FnMut(MouseEvent) + 'static,
		passive: Option<bool>,
	) -> Result<(), GraphError> {
		let handler: Handler = Closure::new(handler);
		match passive {
			Some(passive) => {
				let options = AddEventListenerOptions::new();
				options.set_passive(passive);
				target.add_event_listener_with_callback_and_add_event_listener_options(
					kind,
					handler.as_ref().unchecked_ref(),
					&options,
				)?;
			}
			None => {
				target.add_event_listener_with_callback(kind, handler.as_ref().unchecked_ref())?
			}
		}
		self.listeners.push(Listener {
			target: target.clone(),
			kind,
			handler,
		});
		Ok(())
	}

	fn wire_nodes(&mut self) -> Result<(), GraphError> {
		let circles = self.state.borrow().scene.circles.clone();
		for (idx, circle) in circles.into_iter().enumerate() {
			let target: EventTarget = circle.into();

			let state = self.state.clone();
			self.listen(
				&target,
				"mouseover",
				move |_| state.borrow_mut().on_hover_enter(idx),
				None,
			)?;

			let state = self.state.clone();
			self.listen(
				&target,
				"mouseout",
				move |_| state.borrow_mut().on_hover_leave(idx),
				None,
			)?;

			let state = self.state.clone();
			self.listen(
				&target,
				"click",
				move |_| state.borrow_mut().on_node_click(idx),
				None,
			)?;

			let state = self.state.clone();
			self.listen(
				&target,
				"mousedown",
				move |ev: MouseEvent| {
					if ev.button() != 0 {
						return;
					}
					ev.stop_propagation();
					ev.prevent_default();
					let mut s = state.borrow_mut();
					let pointer = s.scene.client_to_graph(ev.client_x(), ev.client_y());
					s.on_drag_start(idx, pointer);
				},
				None,
			)?;
		}
		Ok(())
	}

	fn wire_zoom_and_drag(
		&mut self,
		svg: &SvgsvgElement,
		document: &Document,
	) -> Result<(), GraphError> {
		let svg_target: EventTarget = svg.clone().into();
		let doc_target: EventTarget = document.clone().into();

		let state = self.state.clone();
		self.listen(
			&svg_target,
			"wheel",
			move |ev: MouseEvent| {
				let Some(wheel) = ev.dyn_ref::<WheelEvent>() else {
					return;
				};
				ev.prevent_default();
				let mut s = state.borrow_mut();
				if let Some(point) = s.scene.client_to_svg(ev.client_x(), ev.client_y()) {
					s.on_wheel(point, wheel.delta_y(), wheel.delta_mode());
				}
			},
			Some(false),
		)?;

		let state = self.state.clone();
		self.listen(
			&svg_target,
			"mousedown",
			move |ev: MouseEvent| {
				if ev.button() != 0 {
					return;
				}
				let mut s = state.borrow_mut();
				if let Some(point) = s.scene.client_to_svg(ev.client_x(), ev.client_y()) {
					s.on_pan_start(point);
				}
			},
			None,
		)?;

		let state = self.state.clone();
		self.listen(
			&doc_target,
			"mousemove",
			move |ev: MouseEvent| {
				let mut s = state.borrow_mut();
				if s.is_dragging() {
					if let Some(point) = s.scene.client_to_graph(ev.client_x(), ev.client_y()) {
						s.on_drag_move(point);
					}
				} else if s.zoom.is_panning() {
					if let Some(point) = s.scene.client_to_svg(ev.client_x(), ev.client_y()) {
						s.on_pan_move(point);
					}
				}
			},
			None,
		)?;

		let state = self.state.clone();
		self.listen(
			&doc_target,
			"mouseup",
			move |_| {
				let mut s = state.borrow_mut();
				s.on_drag_end();
				s.zoom.pan_end();
			},
			None,
		)?;
		Ok(())
	}

	fn start_loop(&mut self, window: &Window) -> Result<(), GraphError> {
		let (state, frame, frame_id) = (
			self.state.clone(),
			self.frame.clone(),
			self.frame_id.clone(),
		);
		*self.frame.borrow_mut() = Some(Closure::new(move |now: f64| {
			frame_id.set(None);
			{
				let mut s = state.borrow_mut();
				if s.destroyed {
					return;
				}
				s.on_frame(now);
			}
			if let (Some(win), Some(cb)) = (web_sys::window(), frame.borrow().as_ref()) {
				if let Ok(id) = win.request_animation_frame(cb.as_ref().unchecked_ref()) {
					frame_id.set(Some(id));
				}
			}
		}));

		if let Some(cb) = self.frame.borrow().as_ref() {
			let id = window.request_animation_frame(cb.as_ref().unchecked_ref())?;
			self.frame_id.set(Some(id));
		}
		Ok(())
	}

	/// Select the node with the given id, as if it had been clicked.
	pub fn select(&self, id: &str) -> bool {
		let mut state = self.state.borrow_mut();
		let Some(idx) = state.graph.position(id) else {
			return false;
		};
		state.on_click(idx);
		true
	}

	/// Id of the currently selected node.
	pub fn selected(&self) -> Option<String> {
		let state = self.state.borrow();
		let idx = state.selection.active()?;
		state.graph.nodes.get(idx).map(|n| n.id.clone())
	}

	/// Animate the zoom so the whole graph fits the viewport.
	pub fn fit_to_content(&self) {
		self.state.borrow_mut().fit_to_content();
	}

	/// Current zoom transform.
	pub fn transform(&self) -> ZoomTransform {
		self.state.borrow().zoom.transform()
	}

	/// Stop the animation loop, remove listeners and the rendered scene.
	pub fn destroy(&mut self) {
		let Ok(mut state) = self.state.try_borrow_mut() else {
			return;
		};
		if state.destroyed {
			return;
		}
		state.destroyed = true;

		if let (Some(id), Some(window)) = (self.frame_id.take(), web_sys::window()) {
			let _ = window.cancel_animation_frame(id);
		}
		self.frame.borrow_mut().take();

		for listener in self.listeners.drain(..) {
			let _ = listener.target.remove_event_listener_with_callback(
				listener.kind,
				listener.handler.as_ref().unchecked_ref(),
			);
		}
		state.scene.remove();
		info!("depgraph: view destroyed");
	}
}

impl Drop for GraphView {
	fn drop(&mut self) {
		self.destroy();
	}
}
