//! Collision passes between particles, rigid bodies and the domain edge.
//!
//! Particles carry no velocity of their own during these passes: their
//! velocity is the implied `(pos - ppos) / dt`, and every correction is
//! written back through `ppos` so the later velocity reconstruction picks
//! it up. Particles weigh 1, bodies weigh `mass`, locked bodies are
//! treated as infinitely heavy.

use crate::object::Object;
use crate::particle::Particle;
use crate::pos_box::PosBox;
use crate::spatial_hash::SpatialHash;
use crate::{nudge, pair_mut, V2, EPS};

fn contact_normal(offset: V2, dist: f32) -> V2 {
	if dist < EPS {
		nudge().normalize()
	} else {
		offset / dist
	}
}

// NaN or overflowed coordinates fall back to the pre-step position,
// or to 0 when that is unusable too. Returns true when something was reset.
fn reset_non_finite(pos: &mut V2, ppos: &mut V2) -> bool {
	let mut flag = false;
	for axis in 0..2 {
		if !pos[axis].is_finite() {
			if !ppos[axis].is_finite() {
				ppos[axis] = 0.;
			}
			pos[axis] = ppos[axis];
			flag = true;
		} else if !ppos[axis].is_finite() {
			ppos[axis] = pos[axis];
			flag = true;
		}
	}
	flag
}

/// Clamps particles into the domain and reflects their outward velocity.
/// Returns how many particles had non-finite coordinates or velocity reset.
pub fn particles_vs_bounds(
	particles: &mut [Particle],
	bounds: &PosBox,
	bounciness: f32,
	dt: f32,
) -> usize {
	let mut reset_count = 0;
	for p in particles.iter_mut() {
		let mut reset = reset_non_finite(&mut p.pos, &mut p.ppos);
		let mut vel = p.implied_vel(dt);
		for axis in 0..2 {
			if !vel[axis].is_finite() {
				vel[axis] = 0.;
				p.ppos[axis] = p.pos[axis];
				reset = true;
			}
		}
		if reset {
			reset_count += 1;
		}
		let hit = bounds.bounce(&mut p.pos, &mut vel, bounciness);
		for axis in 0..2 {
			if hit[axis] {
				p.ppos[axis] = p.pos[axis] - vel[axis] * dt;
			}
		}
	}
	reset_count
}

/// Particles push bodies. Impulses are gathered per body and applied once,
/// then the body is re-integrated from its position before this step.
pub fn particles_vs_objects(
	objects: &mut [Object],
	particles: &[Particle],
	grid: &SpatialHash,
	dt: f32,
) {
	let mut found = Vec::new();
	for o in objects.iter_mut() {
		if o.locked {
			continue;
		}
		found.clear();
		grid.query_into(particles, o.pos, o.radius, &mut found);
		if found.is_empty() {
			continue;
		}
		let ratio = 1. / (1. + o.mass);
		let mut dv = V2::zeros();
		for &j in found.iter() {
			let p = &particles[j];
			let offset = p.pos - o.pos;
			let dist = offset.magnitude();
			let n = contact_normal(offset, dist);
			let vn = (p.implied_vel(dt) - o.vel).dot(&n);
			if vn < 0. {
				dv += n * (vn * ratio);
			}
			dv -= n * ((o.radius - dist).max(0.).sqrt() * ratio);
		}
		o.vel += dv;
		o.pos = o.ppos + o.vel * dt;
	}
}

/// Separates overlapping bodies and keeps unlocked bodies inside the
/// domain. `grid` is rebuilt here from the current body positions.
pub fn objects_vs_objects(
	objects: &mut [Object],
	grid: &mut SpatialHash,
	bounds: &PosBox,
	bounciness: f32,
) {
	let rmax = objects.iter().map(|o| o.radius).fold(0f32, f32::max);
	grid.rebuild(objects, 2. * rmax);
	let mut found = Vec::new();
	for i in 0..objects.len() {
		found.clear();
		let (pos, radius) = (objects[i].pos, objects[i].radius);
		grid.query_into(objects, pos, radius + rmax, &mut found);
		for &j in found.iter() {
			if j <= i {
				continue;
			}
			let (a, b) = pair_mut(objects, i, j);
			if a.locked && b.locked {
				continue;
			}
			let offset = b.pos - a.pos;
			let dist = offset.magnitude();
			let reach = a.radius + b.radius;
			if dist >= reach {
				continue;
			}
			let wa = a.imass();
			let wb = b.imass();
			let w = wa + wb;
			if w <= 0. {
				continue;
			}
			let n = contact_normal(offset, dist);
			let overlap = reach - dist;
			a.pos -= n * (overlap * wa / w);
			b.pos += n * (overlap * wb / w);
			let approach = (b.vel - a.vel).dot(&n);
			if approach < 0. {
				a.vel += n * (approach * wa / w);
				b.vel -= n * (approach * wb / w);
			}
		}
	}
	for o in objects.iter_mut() {
		if o.locked {
			continue;
		}
		if reset_non_finite(&mut o.pos, &mut o.ppos) {
			log::warn!("object {} had a non-finite position, reset", o.id);
		}
		if !o.vel[0].is_finite() || !o.vel[1].is_finite() {
			o.vel = V2::zeros();
		}
		bounds.inset(o.radius).bounce(&mut o.pos, &mut o.vel, bounciness);
	}
}

/// Bodies push particles out to their surface, removing inward velocity
/// in proportion to the body's share of the combined mass.
pub fn objects_vs_particles(
	objects: &[Object],
	particles: &mut [Particle],
	grid: &SpatialHash,
	bounds: &PosBox,
	dt: f32,
) {
	let mut found = Vec::new();
	for o in objects.iter() {
		found.clear();
		grid.query_into(particles, o.pos, o.radius, &mut found);
		let ratio = if o.locked { 1. } else { o.mass / (1. + o.mass) };
		for &j in found.iter() {
			let p = &mut particles[j];
			let offset = p.pos - o.pos;
			let dist = offset.magnitude();
			let n = contact_normal(offset, dist);
			let mut vel = p.implied_vel(dt);
			let vn = (vel - o.vel).dot(&n);
			if vn < 0. {
				vel -= n * (vn * ratio);
			}
			p.pos = o.pos + n * o.radius;
			bounds.apply(&mut p.pos);
			p.set_implied_vel(vel, dt);
		}
	}
}
