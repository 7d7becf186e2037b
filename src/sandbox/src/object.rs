use crate::spatial_hash::Positioned;
use crate::V2;
use protocol::pr_model::PrObject;

/// Rigid circular body.
#[derive(Clone, Debug)]
pub struct Object {
	pub id: usize,
	pub pos: V2,
	// position before this step's integration
	pub ppos: V2,
	pub vel: V2,
	pub radius: f32,
	pub mass: f32,
	pub locked: bool,
}

impl Object {
	pub fn new(id: usize, pos: V2, radius: f32, mass: f32) -> Self {
		Self {
			id,
			pos,
			ppos: pos,
			vel: V2::zeros(),
			radius,
			mass,
			locked: false,
		}
	}

	pub fn update(&mut self, dt: f32) {
		self.ppos = self.pos;
		if !self.locked {
			self.pos += self.vel * dt;
		}
	}

	pub fn toggle_lock(&mut self) {
		self.locked = !self.locked;
		self.vel = V2::zeros();
	}

	/// Zero for locked bodies, which behave as infinitely heavy.
	pub fn imass(&self) -> f32 {
		if self.locked || self.mass <= 0. {
			0.
		} else {
			1. / self.mass
		}
	}

	pub fn contains(&self, p: V2) -> bool {
		(p - self.pos).magnitude_squared() <= self.radius * self.radius
	}

	pub fn overlaps(&self, pos: V2, radius: f32) -> bool {
		let r = self.radius + radius;
		(pos - self.pos).magnitude_squared() < r * r
	}

	pub fn render(&self) -> PrObject {
		PrObject {
			id: self.id,
			pos: [self.pos[0], self.pos[1]],
			radius: self.radius,
			locked: self.locked,
		}
	}
}

impl Positioned for Object {
	fn get_pos(&self) -> V2 {
		self.pos
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_lock() {
		let mut o = Object::new(0, V2::new(100., 100.), 20., 40.);
		o.vel = V2::new(3., 4.);
		o.toggle_lock();
		assert!(o.locked);
		assert_eq!(o.vel, V2::zeros());
		assert_eq!(o.imass(), 0.);
		o.vel = V2::new(1., 1.);
		o.update(1.0);
		assert_eq!(o.pos, V2::new(100., 100.));
		o.toggle_lock();
		assert_eq!(o.imass(), 1. / 40.);
	}

	#[test]
	fn test_overlap() {
		let o = Object::new(0, V2::new(0., 0.), 10., 1.);
		assert!(o.contains(V2::new(6., 8.)));
		assert!(!o.contains(V2::new(6., 8.1)));
		assert!(o.overlaps(V2::new(19., 0.), 10.));
		assert!(!o.overlaps(V2::new(20., 0.), 10.));
	}
}
