//! Tunable constants for the simulation, zoom behavior, auto-fit and markup.
//!
//! Every struct deserializes with `#[serde(default)]`, so a page can override a
//! single value (e.g. `{"zoom": {"max_scale": 12}}`) and keep the rest.

use serde::Deserialize;

use super::error::GraphError;

/// Complete configuration of a graph view.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
	pub simulation: SimulationConfig,
	pub zoom: ZoomConfig,
	pub fit: FitConfig,
	pub render: RenderConfig,
}

impl ViewConfig {
	/// Decode configuration overrides from JSON.
	pub fn from_json(text: &str) -> Result<Self, GraphError> {
		Ok(serde_json::from_str(text)?)
	}
}

/// Force layout parameters.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
	/// Many-body strength. Negative values repel.
	pub charge_strength: f32,
	/// Spring constant of the link force.
	pub link_strength: f32,
	/// Rest length of a link.
	pub link_distance: f32,
	/// Strength of the pull toward x = 0 and y = 0.
	pub center_strength: f32,
	/// Upper bound on any single force.
	pub force_max: f32,
	pub node_speed: f32,
	pub node_mass: f32,
	/// Fraction of velocity kept between steps.
	pub velocity_damping: f32,
	/// Integration time step handed to the force engine.
	pub step: f32,
	/// The simulation comes to rest once alpha drops below this.
	pub alpha_min: f64,
	pub alpha_decay: f64,
	/// Alpha target held while a node is dragged.
	pub drag_alpha_target: f64,
}

impl Default for SimulationConfig {
	fn default() -> Self {
		let alpha_min = 0.001;
		Self {
			charge_strength: -50.0,
			link_strength: 0.05,
			link_distance: 30.0,
			center_strength: 0.1,
			force_max: 100.0,
			node_speed: 0.1,
			node_mass: 10.0,
			velocity_damping: 0.6,
			step: 1.0,
			alpha_min,
			// Rest after ~300 ticks from alpha = 1.
			alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
			drag_alpha_target: 0.3,
		}
	}
}

/// User zoom and pan behavior.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
	pub min_scale: f64,
	pub max_scale: f64,
	/// Scale exponent per wheel pixel (`k *= 2^(-delta * factor)`).
	pub wheel_factor: f64,
}

impl Default for ZoomConfig {
	fn default() -> Self {
		Self {
			min_scale: 1.0,
			max_scale: 8.0,
			wheel_factor: 0.002,
		}
	}
}

/// When the one-shot auto-fit fires.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(tag = "on", rename_all = "snake_case")]
pub enum FitTrigger {
	/// Once the simulation's alpha falls below `alpha` (layout has formed).
	Settled { alpha: f64 },
	/// A fixed delay after the first frame, in milliseconds.
	Delay { ms: f64 },
}

impl Default for FitTrigger {
	fn default() -> Self {
		FitTrigger::Settled { alpha: 0.1 }
	}
}

/// Auto-fit geometry and animation.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct FitConfig {
	pub viewport_width: f64,
	pub viewport_height: f64,
	/// Share of the viewport the content occupies after fitting.
	pub fill_ratio: f64,
	pub transition_ms: f64,
	pub trigger: FitTrigger,
}

impl Default for FitConfig {
	fn default() -> Self {
		Self {
			viewport_width: 100.0,
			viewport_height: 100.0,
			fill_ratio: 0.9,
			transition_ms: 750.0,
			trigger: FitTrigger::default(),
		}
	}
}

/// Markup produced and consumed by the view.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
	pub node_radius: f64,
	/// Class shared by every statement block the view shows and hides.
	pub content_class: String,
	pub marker_id: String,
}

impl Default for RenderConfig {
	fn default() -> Self {
		Self {
			node_radius: 1.5,
			content_class: "thm".into(),
			marker_id: "arrow".into(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_match_reference_layout() {
		let config = ViewConfig::default();
		assert_eq!(config.simulation.charge_strength, -50.0);
		assert_eq!(config.simulation.link_distance, 30.0);
		assert_eq!(config.zoom.min_scale, 1.0);
		assert_eq!(config.zoom.max_scale, 8.0);
		assert_eq!(config.fit.transition_ms, 750.0);
		assert_eq!(config.render.node_radius, 1.5);
		assert_eq!(config.render.content_class, "thm");
	}

	#[test]
	fn alpha_decay_reaches_alpha_min_in_300_ticks() {
		let sim = SimulationConfig::default();
		let alpha = (1.0 - sim.alpha_decay).powi(300);
		assert!((alpha - sim.alpha_min).abs() < 1e-9);
	}

	#[test]
	fn partial_overrides_keep_defaults() {
		let config = ViewConfig::from_json(
			r#"{"zoom":{"max_scale":12},"fit":{"trigger":{"on":"delay","ms":1000}}}"#,
		)
		.unwrap();
		assert_eq!(config.zoom.max_scale, 12.0);
		assert_eq!(config.zoom.min_scale, 1.0);
		assert_eq!(config.fit.trigger, FitTrigger::Delay { ms: 1000.0 });
		assert_eq!(config.fit.fill_ratio, 0.9);
		assert_eq!(config.simulation.drag_alpha_target, 0.3);
	}
}
