use crate::constraint::Order;
use crate::neighbor::NeighborCache;
use crate::params::Params;
use crate::particle::Particle;
use crate::{pair_mut, EPS};

/// Damps the inward relative velocity of every neighboring pair.
pub fn apply_viscosity(
	particles: &mut [Particle],
	neighbors: &NeighborCache,
	params: &Params,
	dt: f32,
	order: Order,
) {
	let sigma = params.linear_viscosity;
	let beta = params.quadratic_viscosity;
	if sigma == 0. && beta == 0. {
		return;
	}
	let h = params.interaction_radius;
	order.for_each(particles.len(), |i| {
		for &j in neighbors.get(i) {
			let (pi, pj) = pair_mut(particles, i, j);
			if pj.id <= pi.id {
				continue;
			}
			let offset = pj.pos - pi.pos;
			let dist = offset.magnitude();
			if dist < EPS || dist > h {
				continue;
			}
			let n = offset / dist;
			let u = (pi.vel - pj.vel).dot(&n);
			if u <= 0. {
				continue;
			}
			let impulse =
				n * (0.5 * dt * (1. - dist / h) * (sigma * u + beta * u * u));
			pi.vel -= impulse;
			pj.vel += impulse;
		}
	});
}
