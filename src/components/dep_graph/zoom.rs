//! Pan/zoom transform math, fit-to-content, and animated transitions.
//!
//! Coordinates here are in the svg's user space. The transform maps graph
//! coordinates to svg coordinates: `svg = graph * k + (x, y)`.

use super::config::{FitConfig, FitTrigger, ZoomConfig};

/// Affine zoom transform (uniform scale then translate).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoomTransform {
	pub x: f64,
	pub y: f64,
	/// Zoom factor (1.0 = 100%).
	pub k: f64,
}

impl Default for ZoomTransform {
	fn default() -> Self {
		Self::IDENTITY
	}
}

impl ZoomTransform {
	pub const IDENTITY: Self = Self {
		x: 0.0,
		y: 0.0,
		k: 1.0,
	};

	pub fn apply(&self, (px, py): (f64, f64)) -> (f64, f64) {
		(px * self.k + self.x, py * self.k + self.y)
	}

	pub fn invert(&self, (sx, sy): (f64, f64)) -> (f64, f64) {
		((sx - self.x) / self.k, (sy - self.y) / self.k)
	}

	/// Value of the svg `transform` attribute.
	pub fn to_attribute(&self) -> String {
		format!("translate({},{}) scale({})", self.x, self.y, self.k)
	}

	/// Stroke width that keeps lines at constant apparent thickness.
	pub fn stroke_width(&self) -> f64 {
		1.0 / self.k
	}

	/// Interpolate toward `to`; `t` in `[0, 1]`.
	pub fn lerp(&self, to: &ZoomTransform, t: f64) -> Self {
		let t = t.clamp(0.0, 1.0);
		Self {
			x: self.x + (to.x - self.x) * t,
			y: self.y + (to.y - self.y) * t,
			k: self.k + (to.k - self.k) * t,
		}
	}
}

/// Bounding box of rendered content, in graph coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BBox {
	pub x: f64,
	pub y: f64,
	pub width: f64,
	pub height: f64,
}

impl BBox {
	pub fn center(&self) -> (f64, f64) {
		(self.x + self.width / 2.0, self.y + self.height / 2.0)
	}
}

/// Transform that centers `bbox` in the viewport, scaled to fill `fill_ratio` of it.
///
/// Returns `None` for an empty or degenerate box.
pub fn fit_transform(bbox: &BBox, config: &FitConfig) -> Option<ZoomTransform> {
	let extent = (bbox.width / config.viewport_width).max(bbox.height / config.viewport_height);
	if !extent.is_finite() || extent <= 0.0 {
		return None;
	}
	let k = config.fill_ratio / extent;
	let (cx, cy) = bbox.center();
	Some(ZoomTransform {
		x: config.viewport_width / 2.0 - k * cx,
		y: config.viewport_height / 2.0 - k * cy,
		k,
	})
}

/// Tracks an in-progress background pan.
#[derive(Clone, Copy, Debug)]
struct PanState {
	start: (f64, f64),
	transform_start: ZoomTransform,
}

/// Zoom behavior: current transform plus gesture handling with clamped scale.
#[derive(Clone, Debug)]
pub struct Zoom {
	transform: ZoomTransform,
	min_scale: f64,
	max_scale: f64,
	wheel_factor: f64,
	pan: Option<PanState>,
}

impl Zoom {
	pub fn new(config: &ZoomConfig) -> Self {
		Self {
			transform: ZoomTransform::IDENTITY,
			min_scale: config.min_scale,
			max_scale: config.max_scale,
			wheel_factor: config.wheel_factor,
			pan: None,
		}
	}

	pub fn transform(&self) -> ZoomTransform {
		self.transform
	}

	/// Set the transform programmatically (used by auto-fit; not clamped).
	pub fn set_transform(&mut self, transform: ZoomTransform) {
		self.transform = transform;
	}

	pub fn clamp_scale(&self, k: f64) -> f64 {
		k.clamp(self.min_scale, self.max_scale)
	}

	/// Wheel gesture at `point`. `delta_mode` follows `WheelEvent.deltaMode`.
	pub fn wheel(&mut self, point: (f64, f64), delta_y: f64, delta_mode: u32) -> ZoomTransform {
		let unit = match delta_mode {
			0 => self.wheel_factor,
			1 => 0.05,
			_ => 1.0,
		};
		let k = self.clamp_scale(self.transform.k * 2f64.powf(-delta_y * unit));
		self.scale_about(point, k)
	}

	/// Scale to `k` keeping `point` fixed on screen.
	fn scale_about(&mut self, (px, py): (f64, f64), k: f64) -> ZoomTransform {
		let ratio = k / self.transform.k;
		self.transform = ZoomTransform {
			x: px - (px - self.transform.x) * ratio,
			y: py - (py - self.transform.y) * ratio,
			k,
		};
		self.transform
	}

	pub fn pan_start(&mut self, point: (f64, f64)) {
		self.pan = Some(PanState {
			start: point,
			transform_start: self.transform,
		});
	}

	/// Move an active pan; `None` when no pan is in progress.
	pub fn pan_move(&mut self, (px, py): (f64, f64)) -> Option<ZoomTransform> {
		let pan = self.pan?;
		self.transform = ZoomTransform {
			x: pan.transform_start.x + (px - pan.start.0),
			y: pan.transform_start.y + (py - pan.start.1),
			k: self.transform.k,
		};
		Some(self.transform)
	}

	pub fn pan_end(&mut self) {
		self.pan = None;
	}

	pub fn is_panning(&self) -> bool {
		self.pan.is_some()
	}
}

fn ease_cubic_in_out(t: f64) -> f64 {
	let t = t * 2.0;
	if t <= 1.0 {
		t * t * t / 2.0
	} else {
		let t = t - 2.0;
		(t * t * t + 2.0) / 2.0
	}
}

/// Animated change from one transform to another.
#[derive(Clone, Debug)]
pub struct ZoomTransition {
	from: ZoomTransform,
	to: ZoomTransform,
	duration_ms: f64,
	start_ms: Option<f64>,
}

impl ZoomTransition {
	pub fn new(from: ZoomTransform, to: ZoomTransform, duration_ms: f64) -> Self {
		Self {
			from,
			to,
			duration_ms,
			start_ms: None,
		}
	}

	/// Transform at time `now_ms`, and whether the transition has finished.
	/// The clock starts on the first sample.
	pub fn sample(&mut self, now_ms: f64) -> (ZoomTransform, bool) {
		let start = *self.start_ms.get_or_insert(now_ms);
		if self.duration_ms <= 0.0 {
			return (self.to, true);
		}
		let t = ((now_ms - start) / self.duration_ms).clamp(0.0, 1.0);
		if t >= 1.0 {
			(self.to, true)
		} else {
			(self.from.lerp(&self.to, ease_cubic_in_out(t)), false)
		}
	}
}

/// Decides the frame on which the one-shot auto-fit runs.
#[derive(Clone, Debug)]
pub struct AutoFit {
	trigger: FitTrigger,
	first_frame_ms: Option<f64>,
	fired: bool,
}

impl AutoFit {
	pub fn new(trigger: FitTrigger) -> Self {
		Self {
			trigger,
			first_frame_ms: None,
			fired: false,
		}
	}

	/// Whether to fit on the frame at `now_ms`. Returns `true` at most once.
	pub fn poll(&mut self, now_ms: f64, resting: bool, alpha: f64) -> bool {
		if self.fired {
			return false;
		}
		let first = *self.first_frame_ms.get_or_insert(now_ms);
		self.fired = match self.trigger {
			FitTrigger::Settled { alpha: threshold } => resting || alpha < threshold,
			FitTrigger::Delay { ms } => now_ms - first >= ms,
		};
		self.fired
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn approx(a: f64, b: f64) -> bool {
		(a - b).abs() < 1e-9
	}

	#[test]
	fn wheel_scale_is_clamped() {
		let mut zoom = Zoom::new(&ZoomConfig::default());
		for _ in 0..50 {
			zoom.wheel((10.0, 10.0), -5000.0, 0);
		}
		assert_eq!(zoom.transform().k, 8.0);

		zoom.wheel((10.0, 10.0), 1e9, 0);
		assert_eq!(zoom.transform().k, 1.0);

		zoom.wheel((0.0, 0.0), 40.0, 2);
		assert_eq!(zoom.transform().k, 1.0);
	}

	#[test]
	fn wheel_keeps_pointer_fixed() {
		let mut zoom = Zoom::new(&ZoomConfig::default());
		let point = (30.0, 70.0);
		let before = zoom.transform().invert(point);
		let t = zoom.wheel(point, -200.0, 0);
		assert!(t.k > 1.0);
		let after = t.invert(point);
		assert!(approx(before.0, after.0) && approx(before.1, after.1));
	}

	#[test]
	fn wheel_into_clamp_from_unclamped_scale() {
		let mut zoom = Zoom::new(&ZoomConfig::default());
		zoom.set_transform(ZoomTransform {
			x: 0.0,
			y: 0.0,
			k: 0.25,
		});
		assert_eq!(zoom.wheel((0.0, 0.0), 1.0, 0).k, 1.0);
	}

	#[test]
	fn pan_translates_without_scaling() {
		let mut zoom = Zoom::new(&ZoomConfig::default());
		assert!(zoom.pan_move((5.0, 5.0)).is_none());
		zoom.pan_start((10.0, 10.0));
		let t = zoom.pan_move((15.0, 4.0)).unwrap();
		assert_eq!((t.x, t.y, t.k), (5.0, -6.0, 1.0));
		zoom.pan_end();
		assert!(!zoom.is_panning());
	}

	#[test]
	fn attribute_and_stroke_width() {
		let t = ZoomTransform {
			x: 1.5,
			y: -2.0,
			k: 4.0,
		};
		assert_eq!(t.to_attribute(), "translate(1.5,-2) scale(4)");
		assert_eq!(t.stroke_width(), 0.25);
	}

	#[test]
	fn fit_centers_and_scales_content() {
		let config = FitConfig::default();
		let bbox = BBox {
			x: -100.0,
			y: -50.0,
			width: 300.0,
			height: 100.0,
		};
		let t = fit_transform(&bbox, &config).unwrap();
		assert!(approx(t.k, 0.3));
		let (cx, cy) = t.apply(bbox.center());
		assert!(approx(cx, 50.0) && approx(cy, 50.0));
		let (left, _) = t.apply((bbox.x, bbox.y));
		let (right, _) = t.apply((bbox.x + bbox.width, bbox.y));
		assert!(approx(right - left, 90.0));
	}

	#[test]
	fn fit_of_empty_box_is_none() {
		let bbox = BBox {
			x: 0.0,
			y: 0.0,
			width: 0.0,
			height: 0.0,
		};
		assert!(fit_transform(&bbox, &FitConfig::default()).is_none());
	}

	#[test]
	fn transition_eases_from_start_to_target() {
		let to = ZoomTransform {
			x: 10.0,
			y: 20.0,
			k: 3.0,
		};
		let mut tr = ZoomTransition::new(ZoomTransform::IDENTITY, to, 750.0);
		assert_eq!(tr.sample(1000.0), (ZoomTransform::IDENTITY, false));
		let (mid, done) = tr.sample(1375.0);
		assert!(!done);
		assert!(approx(mid.k, 2.0));
		assert_eq!(tr.sample(1750.0), (to, true));
		assert_eq!(tr.sample(9000.0), (to, true));
	}

	#[test]
	fn settled_fit_fires_once_below_threshold() {
		let mut fit = AutoFit::new(FitTrigger::Settled { alpha: 0.1 });
		assert!(!fit.poll(0.0, false, 1.0));
		assert!(!fit.poll(16.0, false, 0.2));
		assert!(fit.poll(32.0, false, 0.09));
		assert!(!fit.poll(48.0, false, 0.05));
		assert!(!fit.poll(64.0, true, 0.0));
	}

	#[test]
	fn settled_fit_fires_when_resting() {
		let mut fit = AutoFit::new(FitTrigger::Settled { alpha: 0.0 });
		assert!(!fit.poll(0.0, false, 0.0005));
		assert!(fit.poll(16.0, true, 0.0005));
	}

	#[test]
	fn delayed_fit_counts_from_first_frame() {
		let mut fit = AutoFit::new(FitTrigger::Delay { ms: 1000.0 });
		assert!(!fit.poll(5000.0, true, 0.0));
		assert!(!fit.poll(5999.0, true, 0.0));
		assert!(fit.poll(6000.0, false, 1.0));
		assert!(!fit.poll(9000.0, false, 1.0));
	}
}
