use crate::V2;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PosBox {
	pub xmin: f32,
	pub xmax: f32,
	pub ymin: f32,
	pub ymax: f32,
}

impl PosBox {
	pub fn from_size(size: V2) -> Self {
		Self {
			xmin: 0.,
			xmax: size[0],
			ymin: 0.,
			ymax: size[1],
		}
	}

	/// Box for the center of a disk of radius `r` kept inside `self`.
	/// An axis narrower than the disk collapses to its midpoint.
	pub fn inset(&self, r: f32) -> Self {
		let shrink = |lo: f32, hi: f32| {
			if hi - lo >= 2. * r {
				(lo + r, hi - r)
			} else {
				let mid = (lo + hi) / 2.;
				(mid, mid)
			}
		};
		let (xmin, xmax) = shrink(self.xmin, self.xmax);
		let (ymin, ymax) = shrink(self.ymin, self.ymax);
		Self {
			xmin,
			xmax,
			ymin,
			ymax,
		}
	}

	fn limits(&self, axis: usize) -> (f32, f32) {
		if axis == 0 {
			(self.xmin, self.xmax)
		} else {
			(self.ymin, self.ymax)
		}
	}

	pub fn apply(&self, pos: &mut V2) -> bool {
		let mut flag = false;
		for axis in 0..2 {
			let (lo, hi) = self.limits(axis);
			if pos[axis] < lo {
				pos[axis] = lo;
				flag = true;
			} else if pos[axis] > hi {
				pos[axis] = hi;
				flag = true;
			}
		}
		flag
	}

	/// Clamps `pos` and reflects the outward component of `vel`, scaled by
	/// `bounciness`. Returns which axes were clamped.
	pub fn bounce(&self, pos: &mut V2, vel: &mut V2, bounciness: f32) -> [bool; 2] {
		let mut hit = [false; 2];
		for axis in 0..2 {
			let (lo, hi) = self.limits(axis);
			if pos[axis] < lo {
				pos[axis] = lo;
				if vel[axis] < 0. {
					vel[axis] = -vel[axis] * bounciness;
				}
				hit[axis] = true;
			} else if pos[axis] > hi {
				pos[axis] = hi;
				if vel[axis] > 0. {
					vel[axis] = -vel[axis] * bounciness;
				}
				hit[axis] = true;
			}
		}
		hit
	}

	pub fn contains(&self, pos: V2) -> bool {
		pos[0] >= self.xmin
			&& pos[0] <= self.xmax
			&& pos[1] >= self.ymin
			&& pos[1] <= self.ymax
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_bounce() {
		let b = PosBox::from_size(V2::new(800., 500.));
		let mut pos = V2::new(-3., 520.);
		let mut vel = V2::new(-2., 4.);
		assert_eq!(b.bounce(&mut pos, &mut vel, 0.5), [true, true]);
		assert_eq!(pos, V2::new(0., 500.));
		assert_eq!(vel, V2::new(1., -2.));
		let mut pos = V2::new(10., 10.);
		let mut vel = V2::new(-2., 4.);
		assert_eq!(b.bounce(&mut pos, &mut vel, 0.5), [false, false]);
		assert_eq!(vel, V2::new(-2., 4.));
	}

	#[test]
	fn test_inset() {
		let b = PosBox::from_size(V2::new(100., 30.)).inset(20.);
		assert_eq!(b.xmin, 20.);
		assert_eq!(b.xmax, 80.);
		assert_eq!(b.ymin, 15.);
		assert_eq!(b.ymax, 15.);
		let mut pos = V2::new(0., 0.);
		assert!(b.apply(&mut pos));
		assert_eq!(pos, V2::new(20., 15.));
		assert!(b.contains(pos));
	}
}
