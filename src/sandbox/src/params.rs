//! Tunable simulation parameters.
//!
//! The world reads a copy of [`Params`] at the start of every step, so edits
//! made through [`crate::world::World::params_mut`] take effect on the next
//! step. Values are in pixels and "frames" (one unit of dt is one frame at
//! simulation speed 1).

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ParamsError;
use crate::V2;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
	/// Multiplier from wall-clock seconds to simulation dt.
	pub simulation_speed: f32,
	pub gravity_x: f32,
	pub gravity_y: f32,
	/// Fraction of normal velocity kept when bouncing off the domain edge.
	pub edge_bounciness: f32,
	/// Kernel radius h, also the spatial hash cell size.
	pub interaction_radius: f32,
	pub rest_density: f32,
	pub stiffness: f32,
	pub near_stiffness: f32,
	pub linear_viscosity: f32,
	pub quadratic_viscosity: f32,
	/// Rate at which spring rest lengths drift once past the yield band.
	pub plasticity: f32,
	/// Half width of the yield band, relative to the rest length.
	pub yield_ratio: f32,
	pub spring_stiffness: f32,
	/// Radius used by particle spawning and removal.
	pub control_radius: f32,
	/// Particles spawned per unit of dt.
	pub particle_spawn_rate: f32,
	pub object_radius: f32,
	pub object_mass: f32,
}

impl Default for Params {
	fn default() -> Self {
		let mut result = Self::zero();
		for kind in ParamKind::ALL {
			*result.field_mut(kind) = kind.default();
		}
		result
	}
}

impl Params {
	fn zero() -> Self {
		Self {
			simulation_speed: 0.,
			gravity_x: 0.,
			gravity_y: 0.,
			edge_bounciness: 0.,
			interaction_radius: 0.,
			rest_density: 0.,
			stiffness: 0.,
			near_stiffness: 0.,
			linear_viscosity: 0.,
			quadratic_viscosity: 0.,
			plasticity: 0.,
			yield_ratio: 0.,
			spring_stiffness: 0.,
			control_radius: 0.,
			particle_spawn_rate: 0.,
			object_radius: 0.,
			object_mass: 0.,
		}
	}

	pub fn gravity(&self) -> V2 {
		V2::new(self.gravity_x, self.gravity_y)
	}

	pub fn with_gravity(mut self, g: V2) -> Self {
		self.gravity_x = g[0];
		self.gravity_y = g[1];
		self
	}

	pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ParamsError> {
		let contents = std::fs::read_to_string(path)?;
		Ok(ron::from_str(&contents)?)
	}

	pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
		let path = path.as_ref();
		match Self::load(path) {
			Ok(params) => {
				log::info!("loaded parameters from {}", path.display());
				params
			}
			Err(e) => {
				log::warn!(
					"using default parameters, {} unusable: {}",
					path.display(),
					e
				);
				Self::default()
			}
		}
	}

	pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ParamsError> {
		let contents =
			ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
		std::fs::write(path, contents)?;
		Ok(())
	}

	/// Copy with every knob forced into a range the solver tolerates:
	/// non-finite values become 0, physical magnitudes are non-negative.
	pub fn sanitized(&self) -> Self {
		let mut result = *self;
		for kind in ParamKind::ALL {
			let v = result.field_mut(kind);
			if !v.is_finite() {
				*v = 0.;
			}
			if kind.non_negative() {
				*v = v.max(0.);
			}
		}
		result.edge_bounciness = result.edge_bounciness.min(1.);
		result
	}

	fn field_mut(&mut self, kind: ParamKind) -> &mut f32 {
		use ParamKind::*;
		match kind {
			SimulationSpeed => &mut self.simulation_speed,
			GravityX => &mut self.gravity_x,
			GravityY => &mut self.gravity_y,
			EdgeBounciness => &mut self.edge_bounciness,
			InteractionRadius => &mut self.interaction_radius,
			RestDensity => &mut self.rest_density,
			Stiffness => &mut self.stiffness,
			NearStiffness => &mut self.near_stiffness,
			LinearViscosity => &mut self.linear_viscosity,
			QuadraticViscosity => &mut self.quadratic_viscosity,
			Plasticity => &mut self.plasticity,
			YieldRatio => &mut self.yield_ratio,
			SpringStiffness => &mut self.spring_stiffness,
			ControlRadius => &mut self.control_radius,
			ParticleSpawnRate => &mut self.particle_spawn_rate,
			ObjectRadius => &mut self.object_radius,
			ObjectMass => &mut self.object_mass,
		}
	}

	pub fn get(&self, kind: ParamKind) -> f32 {
		let mut copy = *self;
		*copy.field_mut(kind)
	}

	/// Sets a knob, clamped into its tuning range.
	pub fn set(&mut self, kind: ParamKind, value: f32) {
		let [lo, hi] = kind.range();
		*self.field_mut(kind) = value.max(lo).min(hi);
	}

	/// Moves a knob by `direction * step * dt`, the way a held key does.
	pub fn adjust(&mut self, kind: ParamKind, direction: f32, dt: f32) {
		let value = self.get(kind) + direction * kind.step() * dt;
		self.set(kind, value);
	}

	pub fn reset(&mut self, kind: ParamKind) {
		*self.field_mut(kind) = kind.default();
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParamKind {
	SimulationSpeed,
	GravityX,
	GravityY,
	EdgeBounciness,
	InteractionRadius,
	RestDensity,
	Stiffness,
	NearStiffness,
	LinearViscosity,
	QuadraticViscosity,
	Plasticity,
	YieldRatio,
	SpringStiffness,
	ControlRadius,
	ParticleSpawnRate,
	ObjectRadius,
	ObjectMass,
}

impl ParamKind {
	pub const ALL: [ParamKind; 17] = [
		ParamKind::SimulationSpeed,
		ParamKind::GravityX,
		ParamKind::GravityY,
		ParamKind::EdgeBounciness,
		ParamKind::InteractionRadius,
		ParamKind::RestDensity,
		ParamKind::Stiffness,
		ParamKind::NearStiffness,
		ParamKind::LinearViscosity,
		ParamKind::QuadraticViscosity,
		ParamKind::Plasticity,
		ParamKind::YieldRatio,
		ParamKind::SpringStiffness,
		ParamKind::ControlRadius,
		ParamKind::ParticleSpawnRate,
		ParamKind::ObjectRadius,
		ParamKind::ObjectMass,
	];

	pub fn name(self) -> &'static str {
		use ParamKind::*;
		match self {
			SimulationSpeed => "Sim Speed",
			GravityX => "Gravity X",
			GravityY => "Gravity Y",
			EdgeBounciness => "Edge Bounciness",
			InteractionRadius => "Interaction Radius",
			RestDensity => "Rest Density",
			Stiffness => "Stiffness",
			NearStiffness => "Near Stiffness",
			LinearViscosity => "Linear Viscosity",
			QuadraticViscosity => "Quad Viscosity",
			Plasticity => "Plasticity",
			YieldRatio => "Yield Ratio",
			SpringStiffness => "Spring Stiffness",
			ControlRadius => "Control Radius",
			ParticleSpawnRate => "Spawn Rate",
			ObjectRadius => "Object Radius",
			ObjectMass => "Object Mass",
		}
	}

	// (default, step per second of key hold, min, max)
	fn table(self) -> (f32, f32, f32, f32) {
		use ParamKind::*;
		const INF: f32 = f32::INFINITY;
		match self {
			SimulationSpeed => (100., 50., 0.01, 100.),
			GravityX => (0., 0.5, -INF, INF),
			GravityY => (0.4, 0.5, -INF, INF),
			EdgeBounciness => (0., 0.5, 0., 1.),
			InteractionRadius => (60., 20., 0., INF),
			RestDensity => (6., 5., 0., 10.),
			Stiffness => (0.5, 0.5, 0., INF),
			NearStiffness => (0.5, 0.5, 0., INF),
			LinearViscosity => (0., 0.5, 0., INF),
			QuadraticViscosity => (0., 0.5, 0., INF),
			Plasticity => (0., 0.5, 0., 1.),
			YieldRatio => (0.2, 0.2, 0., 1.),
			SpringStiffness => (0.5, 0.5, 0., 1.),
			ControlRadius => (50., 50., 0.01, INF),
			ParticleSpawnRate => (3., 5., 0.01, INF),
			ObjectRadius => (50., 50., 0.01, INF),
			ObjectMass => (50., 50., 0.01, INF),
		}
	}

	pub fn default(self) -> f32 {
		self.table().0
	}

	pub fn step(self) -> f32 {
		self.table().1
	}

	pub fn range(self) -> [f32; 2] {
		let (_, _, lo, hi) = self.table();
		[lo, hi]
	}

	fn non_negative(self) -> bool {
		!matches!(self, ParamKind::GravityX | ParamKind::GravityY)
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_defaults() {
		let p = Params::default();
		assert_eq!(p.simulation_speed, 100.);
		assert_eq!(p.gravity(), V2::new(0., 0.4));
		assert_eq!(p.interaction_radius, 60.);
		assert_eq!(p.rest_density, 6.);
		assert_eq!(p.yield_ratio, 0.2);
		for kind in ParamKind::ALL {
			let [lo, hi] = kind.range();
			assert!(lo <= kind.default() && kind.default() <= hi, "{:?}", kind);
		}
	}

	#[test]
	fn test_adjust_clamps() {
		let mut p = Params::default();
		p.adjust(ParamKind::RestDensity, 1.0, 2.0);
		assert_eq!(p.rest_density, 10.);
		p.adjust(ParamKind::RestDensity, -1.0, 0.2);
		assert_eq!(p.rest_density, 9.);
		p.set(ParamKind::EdgeBounciness, -3.);
		assert_eq!(p.edge_bounciness, 0.);
		p.reset(ParamKind::RestDensity);
		assert_eq!(p.get(ParamKind::RestDensity), 6.);
	}

	#[test]
	fn test_sanitized() {
		let mut p = Params::default();
		p.interaction_radius = -5.;
		p.object_mass = f32::NAN;
		p.gravity_x = -1.;
		p.edge_bounciness = 3.;
		let s = p.sanitized();
		assert_eq!(s.interaction_radius, 0.);
		assert_eq!(s.object_mass, 0.);
		assert_eq!(s.gravity_x, -1.);
		assert_eq!(s.edge_bounciness, 1.);
	}

	#[test]
	fn test_ron_partial() {
		let p: Params =
			ron::from_str("(rest_density: 3.0, gravity_y: 1.0)").unwrap();
		assert_eq!(p.rest_density, 3.);
		assert_eq!(p.gravity_y, 1.);
		assert_eq!(p.stiffness, 0.5);
	}

	#[test]
	fn test_load_missing_falls_back() {
		let p = Params::load_or_default("/nonexistent/params.ron");
		assert_eq!(p, Params::default());
		assert!(matches!(
			Params::load("/nonexistent/params.ron"),
			Err(ParamsError::Io(_))
		));
	}
}
