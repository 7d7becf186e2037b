//! Plastic springs between neighboring particles (viscoelasticity).

use fnv::FnvHashMap;

use crate::constraint::Order;
use crate::neighbor::NeighborCache;
use crate::params::Params;
use crate::particle::Particle;
use crate::{nudge, pair_mut, EPS};

/// Rest length after plastic drift, or `None` once the spring yields past
/// the interaction radius.
pub fn drift_rest_length(rest: f32, dist: f32, params: &Params, dt: f32) -> Option<f32> {
	let h = params.interaction_radius;
	let rate = params.plasticity * dt;
	let tolerance = params.yield_ratio * rest;
	let rest = if dist > rest + tolerance {
		rest + rate * (dist - rest - tolerance)
	} else if dist < rest - tolerance {
		rest - rate * (rest - tolerance - dist)
	} else {
		rest
	};
	if rest > h {
		None
	} else {
		Some(rest)
	}
}

/// Rebuilds every particle's spring map from the previous one and applies
/// the Hookean displacements. Springs live on the lower id of the pair.
/// Returns the number of springs kept.
pub fn apply_springs(
	particles: &mut [Particle],
	neighbors: &NeighborCache,
	params: &Params,
	dt: f32,
	order: Order,
) -> usize {
	if params.spring_stiffness == 0. {
		return particles.iter().map(|p| p.springs.len()).sum();
	}
	let h = params.interaction_radius;
	let k = params.spring_stiffness * dt * dt;
	let mut kept = 0;
	order.for_each(particles.len(), |i| {
		let old = std::mem::take(&mut particles[i].springs);
		let mut springs =
			FnvHashMap::with_capacity_and_hasher(old.len(), Default::default());
		for &j in neighbors.get(i) {
			let (pi, pj) = pair_mut(particles, i, j);
			if pj.id <= pi.id {
				continue;
			}
			let offset = pj.pos - pi.pos;
			let dist = offset.magnitude();
			if dist > h {
				continue;
			}
			if dist < EPS {
				pi.add_pos(-nudge() * 0.5);
				pj.add_pos(nudge() * 0.5);
				continue;
			}
			let rest = old.get(&pj.id).copied().unwrap_or(h);
			let rest = match drift_rest_length(rest, dist, params, dt) {
				Some(rest) => rest,
				None => continue,
			};
			springs.insert(pj.id, rest);
			let mag = k * (1. - rest / h) * (rest - dist);
			let dp = offset * (0.5 * mag / dist);
			pi.add_pos(-dp);
			pj.add_pos(dp);
		}
		kept += springs.len();
		particles[i].springs = springs;
	});
	kept
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::spatial_hash::SpatialHash;
	use crate::V2;

	fn setup(positions: &[V2], h: f32) -> (Vec<Particle>, NeighborCache) {
		let ps: Vec<Particle> = positions
			.iter()
			.enumerate()
			.map(|(id, &pos)| Particle::new(id, pos, V2::zeros()))
			.collect();
		let mut grid = SpatialHash::default();
		grid.rebuild(&ps, h);
		let mut cache = NeighborCache::default();
		cache.rebuild(&grid, &ps, h);
		(ps, cache)
	}

	fn params() -> Params {
		Params {
			interaction_radius: 60.,
			plasticity: 0.5,
			yield_ratio: 0.1,
			spring_stiffness: 0.5,
			..Params::default()
		}
	}

	#[test]
	fn test_drift() {
		let p = params();
		// inside the yield band: unchanged
		assert_eq!(drift_rest_length(40., 42., &p, 1.), Some(40.));
		// stretched past 44: grows toward the distance
		assert_eq!(drift_rest_length(40., 50., &p, 1.), Some(43.));
		// compressed below 36: shrinks
		assert_eq!(drift_rest_length(40., 26., &p, 1.), Some(35.));
		// pushed beyond h: dropped
		assert_eq!(drift_rest_length(58., 200., &p, 1.), None);
	}

	#[test]
	fn test_zero_stiffness_is_noop() {
		let p = Params {
			spring_stiffness: 0.,
			..params()
		};
		let (mut ps, cache) =
			setup(&[V2::new(10., 10.), V2::new(20., 10.), V2::new(15., 18.)], 60.);
		ps[0].springs.insert(1, 5.);
		let before: Vec<V2> = ps.iter().map(|x| x.pos).collect();
		let kept = apply_springs(&mut ps, &cache, &p, 1.0, Order::Forward);
		assert_eq!(kept, 1);
		for (q, b) in ps.iter().zip(before.iter()) {
			assert_eq!(q.pos, *b);
		}
	}

	#[test]
	fn test_compressed_spring_pushes_apart_symmetrically() {
		let p = params();
		let (mut ps, cache) = setup(&[V2::new(100., 100.), V2::new(110., 100.)], 60.);
		ps[0].springs.insert(1, 30.);
		let before = [ps[0].pos, ps[1].pos];
		let kept = apply_springs(&mut ps, &cache, &p, 1.0, Order::Forward);
		assert_eq!(kept, 1);
		// 30 shrinks toward 10 with rate 0.5: 30 - 0.5 * (27 - 10)
		let rest = ps[0].springs[&1];
		assert!((rest - 21.5).abs() < 1e-4);
		let d0 = ps[0].pos - before[0];
		let d1 = ps[1].pos - before[1];
		assert!((d0 + d1).magnitude() < 1e-5);
		assert!(d1[0] > 0.);
		assert_eq!(d1[1], 0.);
		// both directions are stored once, on the lower id
		assert!(ps[1].springs.is_empty());
	}

	#[test]
	fn test_coincident_pair_is_nudged() {
		let p = params();
		let (mut ps, cache) =
			setup(&[V2::new(10., 10.), V2::new(10., 10.)], 60.);
		let kept = apply_springs(&mut ps, &cache, &p, 1.0, Order::Forward);
		// no spring is formed for a degenerate pair
		assert_eq!(kept, 0);
		assert_eq!(ps[0].pos, V2::new(10., 10.) - nudge() * 0.5);
		assert_eq!(ps[1].pos, V2::new(10., 10.) + nudge() * 0.5);
		assert!(ps.iter().all(|q| q.pos[0].is_finite() && q.pos[1].is_finite()));
	}

	#[test]
	fn test_fresh_spring_rests_at_radius() {
		let p = Params {
			plasticity: 0.,
			..params()
		};
		let (mut ps, cache) = setup(&[V2::new(0., 0.), V2::new(30., 0.)], 60.);
		apply_springs(&mut ps, &cache, &p, 1.0, Order::Backward);
		assert_eq!(ps[0].springs.get(&1), Some(&60.));
		// rest length equal to h exerts no force
		assert_eq!(ps[1].pos, V2::new(30., 0.));
	}

	#[test]
	fn test_springs_out_of_range_are_forgotten() {
		let p = params();
		let (mut ps, _) = setup(&[V2::new(0., 0.), V2::new(30., 0.)], 60.);
		ps[0].springs.insert(1, 20.);
		// the pair is no longer cached as neighbors
		let empty = NeighborCache::default();
		let kept = apply_springs(&mut ps, &empty, &p, 1.0, Order::Forward);
		assert_eq!(kept, 0);
		assert!(ps[0].springs.is_empty());
	}
}
