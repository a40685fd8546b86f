//! Alpha-driven force layout.
//!
//! Wraps the `force_graph` physics (link springs and many-body repulsion) with
//! a decaying `alpha` that scales every force, a link rest length, two
//! centering forces toward the origin, and pinned coordinates for dragged
//! nodes. The simulation is either
//! [`Phase::Active`] (stepping) or [`Phase::Resting`] (alpha fell below
//! `alpha_min`); transitions only happen through [`Simulation::tick`] and
//! [`Simulation::restart`].

use std::f64::consts::PI;

use force_graph::{EdgeData, ForceGraph, NodeData, SimulationParameters};
use log::debug;

use super::config::SimulationConfig;
use super::types::IndexedGraph;

/// Lifecycle of the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
	Active,
	Resting,
}

/// Per-node data carried through `force_graph`.
#[derive(Clone, Debug, Default)]
pub struct NodeInfo {
	/// Position of the node in the input graph.
	pub order: usize,
	/// Pinned coordinates (`fx`, `fy`) while dragged.
	pub pin: Option<(f32, f32)>,
}

/// Rest-length constraint on one link, weighted like d3's link force.
#[derive(Clone, Copy, Debug)]
struct Spring {
	source: usize,
	target: usize,
	/// `1 / min(degree(source), degree(target))`.
	strength: f32,
	/// Share of the correction taken by the target.
	bias: f32,
}

pub struct Simulation {
	graph: ForceGraph<NodeInfo, ()>,
	springs: Vec<Spring>,
	positions: Vec<(f32, f32)>,
	phase: Phase,
	alpha: f64,
	alpha_target: f64,
	config: SimulationConfig,
}

/// Initial placement on a phyllotaxis spiral around the origin.
fn initial_position(i: usize) -> (f32, f32) {
	let radius = 10.0 * (0.5 + i as f64).sqrt();
	let angle = i as f64 * PI * (3.0 - 5f64.sqrt());
	((radius * angle.cos()) as f32, (radius * angle.sin()) as f32)
}

impl Simulation {
	pub fn new(data: &IndexedGraph, config: &SimulationConfig) -> Self {
		let mut graph = ForceGraph::new(SimulationParameters {
			force_charge: -config.charge_strength,
			force_spring: config.link_strength,
			force_max: config.force_max,
			node_speed: config.node_speed,
			damping_factor: config.velocity_damping,
		});

		let mut indices = Vec::with_capacity(data.len());
		let mut positions = Vec::with_capacity(data.len());
		for order in 0..data.len() {
			let (x, y) = initial_position(order);
			indices.push(graph.add_node(NodeData {
				x,
				y,
				mass: config.node_mass,
				is_anchor: false,
				user_data: NodeInfo { order, pin: None },
			}));
			positions.push((x, y));
		}
		// force_graph cannot step an edge from a node to itself.
		let links: Vec<_> = data
			.links
			.iter()
			.filter(|link| link.source != link.target)
			.collect();
		let mut degree = vec![0u32; data.len()];
		for link in &links {
			graph.add_edge(indices[link.source], indices[link.target], EdgeData::default());
			degree[link.source] += 1;
			degree[link.target] += 1;
		}
		let springs = links
			.iter()
			.map(|link| {
				let (ds, dt) = (degree[link.source] as f32, degree[link.target] as f32);
				Spring {
					source: link.source,
					target: link.target,
					strength: 1.0 / ds.min(dt),
					bias: ds / (ds + dt),
				}
			})
			.collect();

		Self {
			graph,
			springs,
			positions,
			phase: Phase::Active,
			alpha: 1.0,
			alpha_target: 0.0,
			config: config.clone(),
		}
	}

	pub fn phase(&self) -> Phase {
		self.phase
	}

	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	pub fn set_alpha_target(&mut self, target: f64) {
		self.alpha_target = target;
	}

	/// Node positions in input order, as of the last step.
	pub fn positions(&self) -> &[(f32, f32)] {
		&self.positions
	}

	pub fn position(&self, idx: usize) -> Option<(f32, f32)> {
		self.positions.get(idx).copied()
	}

	/// Resume stepping. Returns `false` when already active.
	pub fn restart(&mut self) -> bool {
		match self.phase {
			Phase::Active => false,
			Phase::Resting => {
				debug!("depgraph: simulation restarted (alpha {:.4})", self.alpha);
				self.phase = Phase::Active;
				true
			}
		}
	}

	/// Advance one step. Returns whether anything moved.
	pub fn tick(&mut self) -> bool {
		if self.phase == Phase::Resting {
			return false;
		}

		self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;
		let alpha = self.alpha as f32;

		let params = &mut self.graph.parameters;
		params.force_charge = -self.config.charge_strength * alpha;
		params.force_spring = self.config.link_strength * alpha;
		self.graph.update(self.config.step);

		let positions = &mut self.positions;
		self.graph.visit_nodes(|node| {
			positions[node.data.user_data.order] = (node.data.x, node.data.y);
		});
		relax_links(&mut self.positions, &self.springs, self.config.link_distance, alpha);

		let pull = self.config.center_strength * alpha;
		let positions = &mut self.positions;
		self.graph.visit_nodes_mut(|node| {
			let order = node.data.user_data.order;
			let (x, y) = match node.data.user_data.pin {
				Some(pin) => pin,
				None => {
					let (x, y) = positions[order];
					(x - x * pull, y - y * pull)
				}
			};
			node.data.x = x;
			node.data.y = y;
			positions[order] = (x, y);
		});

		if self.alpha < self.config.alpha_min {
			debug!("depgraph: simulation at rest");
			self.phase = Phase::Resting;
		}
		true
	}

	/// Pin a node at `(x, y)`, exempting it from simulated movement.
	pub fn pin(&mut self, idx: usize, x: f32, y: f32) {
		let Some(slot) = self.positions.get_mut(idx) else {
			return;
		};
		*slot = (x, y);
		self.graph.visit_nodes_mut(|node| {
			if node.data.user_data.order == idx {
				node.data.user_data.pin = Some((x, y));
				node.data.is_anchor = true;
				node.data.x = x;
				node.data.y = y;
			}
		});
	}

	/// Release a pinned node back to the simulation.
	pub fn unpin(&mut self, idx: usize) {
		self.graph.visit_nodes_mut(|node| {
			if node.data.user_data.order == idx {
				node.data.user_data.pin = None;
				node.data.is_anchor = false;
			}
		});
	}
}

/// Move both ends of every link toward `distance` apart.
fn relax_links(positions: &mut [(f32, f32)], springs: &[Spring], distance: f32, alpha: f32) {
	for spring in springs {
		let (sx, sy) = positions[spring.source];
		let (tx, ty) = positions[spring.target];
		let (dx, dy) = (tx - sx, ty - sy);
		let len = (dx * dx + dy * dy).sqrt();
		if len <= 0.0 {
			continue;
		}
		let l = (len - distance) / len * alpha * spring.strength;
		let (dx, dy) = (dx * l, dy * l);
		positions[spring.target] = (tx - dx * spring.bias, ty - dy * spring.bias);
		positions[spring.source] = (sx + dx * (1.0 - spring.bias), sy + dy * (1.0 - spring.bias));
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::dep_graph::types::GraphData;

	fn graph(n: usize, links: &[(usize, usize)]) -> IndexedGraph {
		let nodes: Vec<String> = (0..n)
			.map(|i| format!(r#"{{"id":"n{i}"}}"#))
			.collect();
		let links: Vec<String> = links
			.iter()
			.map(|(s, t)| format!(r#"{{"source":"n{s}","target":"n{t}"}}"#))
			.collect();
		GraphData::from_json(&format!(
			r#"{{"nodes":[{}],"links":[{}]}}"#,
			nodes.join(","),
			links.join(",")
		))
		.unwrap()
		.index()
		.unwrap()
	}

	fn chain(n: usize) -> IndexedGraph {
		let links: Vec<_> = (1..n).map(|i| (i - 1, i)).collect();
		graph(n, &links)
	}

	fn distance(a: (f32, f32), b: (f32, f32)) -> f32 {
		((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
	}

	fn ticks_until_rest(sim: &mut Simulation, limit: usize) -> Option<usize> {
		(1..=limit).find(|_| {
			sim.tick();
			sim.phase() == Phase::Resting
		})
	}

	#[test]
	fn starts_active_at_full_alpha() {
		let sim = Simulation::new(&chain(3), &SimulationConfig::default());
		assert_eq!(sim.phase(), Phase::Active);
		assert_eq!(sim.alpha(), 1.0);
		assert_eq!(sim.positions().len(), 3);
	}

	#[test]
	fn initial_positions_are_distinct() {
		let sim = Simulation::new(&chain(5), &SimulationConfig::default());
		let p = sim.positions();
		for i in 0..p.len() {
			for j in (i + 1)..p.len() {
				assert_ne!(p[i], p[j]);
			}
		}
	}

	#[test]
	fn comes_to_rest_after_about_300_ticks() {
		let mut sim = Simulation::new(&chain(4), &SimulationConfig::default());
		let ticks = ticks_until_rest(&mut sim, 1000).expect("simulation never rested");
		assert!((295..=305).contains(&ticks), "rested after {ticks} ticks");
		assert!(sim.alpha() < 0.001);
		assert!(!sim.tick());
	}

	#[test]
	fn restart_is_guarded_by_phase() {
		let mut sim = Simulation::new(&chain(2), &SimulationConfig::default());
		assert!(!sim.restart());
		ticks_until_rest(&mut sim, 1000);
		assert!(sim.restart());
		assert_eq!(sim.phase(), Phase::Active);
	}

	#[test]
	fn alpha_target_keeps_simulation_hot() {
		let config = SimulationConfig::default();
		let mut sim = Simulation::new(&chain(3), &config);
		ticks_until_rest(&mut sim, 1000);
		sim.set_alpha_target(config.drag_alpha_target);
		sim.restart();
		for _ in 0..1000 {
			sim.tick();
		}
		assert_eq!(sim.phase(), Phase::Active);
		assert!((sim.alpha() - 0.3).abs() < 0.01);

		sim.set_alpha_target(0.0);
		assert!(ticks_until_rest(&mut sim, 1000).is_some());
	}

	#[test]
	fn pinned_node_holds_position() {
		let mut sim = Simulation::new(&chain(3), &SimulationConfig::default());
		sim.pin(1, 42.0, -7.0);
		for _ in 0..20 {
			sim.tick();
		}
		assert_eq!(sim.position(1), Some((42.0, -7.0)));

		sim.unpin(1);
		for _ in 0..5 {
			sim.tick();
		}
		assert_ne!(sim.position(1), Some((42.0, -7.0)));
	}

	#[test]
	fn pin_out_of_range_is_ignored() {
		let mut sim = Simulation::new(&chain(2), &SimulationConfig::default());
		sim.pin(9, 1.0, 1.0);
		assert_eq!(sim.position(9), None);
		assert_eq!(sim.positions().len(), 2);
	}

	#[test]
	fn self_loop_does_not_break_stepping() {
		let mut sim = Simulation::new(&graph(2, &[(0, 0), (0, 1)]), &SimulationConfig::default());
		assert!(ticks_until_rest(&mut sim, 1000).is_some());
		for &(x, y) in sim.positions() {
			assert!(x.is_finite() && y.is_finite());
		}
	}

	#[test]
	fn linked_nodes_settle_near_link_distance() {
		let config = SimulationConfig::default();
		let mut sim = Simulation::new(&chain(4), &config);
		ticks_until_rest(&mut sim, 1000);
		let p = sim.positions();
		for i in 1..p.len() {
			let d = distance(p[i - 1], p[i]);
			assert!(
				(d - config.link_distance).abs() < 6.0,
				"link {} -> {i} is {d} long",
				i - 1
			);
		}
	}

	#[test]
	fn tree_nodes_do_not_overlap() {
		let links: Vec<_> = (1..40).map(|i| ((i - 1) / 2, i)).collect();
		let mut sim = Simulation::new(&graph(40, &links), &SimulationConfig::default());
		ticks_until_rest(&mut sim, 1000);
		let p = sim.positions();
		let closest = (0..p.len())
			.flat_map(|i| ((i + 1)..p.len()).map(move |j| (i, j)))
			.map(|(i, j)| distance(p[i], p[j]))
			.fold(f32::INFINITY, f32::min);
		assert!(closest > 5.0, "closest pair is {closest} apart");
	}
}
