//! Double density relaxation.
//!
//! Each particle measures two densities over its cached neighbors with the
//! kernels `(1 - q)^2` and `(1 - q)^3`, `q = r / h`, turns them into
//! pressure and near pressure, and pushes its neighbors along the pair
//! axis. Neighbors move immediately, the particle itself moves by the
//! negated sum once its neighbor loop is done, so each pair exchanges an
//! equal and opposite displacement.

use crate::constraint::Order;
use crate::neighbor::NeighborCache;
use crate::params::Params;
use crate::particle::Particle;
use crate::{nudge, V2, EPS};

// weight of the previous stress in its moving average
pub const STRESS_SMOOTHING: f32 = 0.9;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Densities {
	pub density: f32,
	pub near_density: f32,
}

impl Densities {
	pub fn measure(
		particles: &[Particle],
		idx: usize,
		neighbors: &[usize],
		h: f32,
	) -> Self {
		let mut result = Self::default();
		let pos = particles[idx].pos;
		for &j in neighbors {
			let dist = (particles[j].pos - pos).magnitude();
			if dist > h {
				continue;
			}
			let one = 1. - dist / h;
			result.density += one * one;
			result.near_density += one * one * one;
		}
		result
	}

	/// (pressure, near pressure)
	pub fn pressures(&self, params: &Params) -> (f32, f32) {
		(
			params.stiffness * (self.density - params.rest_density),
			params.near_stiffness * self.near_density,
		)
	}
}

/// Displacement given to a neighbor at `offset` from the particle.
pub fn displacement(
	offset: V2,
	dist: f32,
	h: f32,
	pressure: f32,
	near_pressure: f32,
	dt: f32,
) -> V2 {
	let one = 1. - dist / h;
	let mag = 0.5 * dt * dt * (pressure * one + near_pressure * one * one);
	offset * (mag / dist)
}

pub fn relax_density(
	particles: &mut [Particle],
	neighbors: &NeighborCache,
	params: &Params,
	dt: f32,
	order: Order,
) {
	let h = params.interaction_radius;
	order.for_each(particles.len(), |i| {
		let list = neighbors.get(i);
		let (pressure, near_pressure) =
			Densities::measure(particles, i, list, h).pressures(params);
		let p = &mut particles[i];
		p.stress =
			STRESS_SMOOTHING * p.stress + (1. - STRESS_SMOOTHING) * near_pressure;
		if list.is_empty() {
			return;
		}

		let pos = particles[i].pos;
		let mut total = V2::zeros();
		for &j in list {
			let offset = particles[j].pos - pos;
			let dist = offset.magnitude();
			if dist > h {
				continue;
			}
			let dp = if dist < EPS {
				nudge() * 0.5
			} else {
				displacement(offset, dist, h, pressure, near_pressure, dt)
			};
			particles[j].add_pos(dp);
			total += dp;
		}
		particles[i].add_pos(-total);
	});
}
