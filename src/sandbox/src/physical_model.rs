use crate::V2;

#[derive(Clone, Debug, PartialEq)]
pub struct ObjectTemplate {
	pub pos: V2,
	pub radius: f32,
	pub mass: f32,
	pub locked: bool,
}

/// A batch of particles and bodies, positioned relative to its own origin
/// and placed into a world with [`crate::world::World::add_model`].
#[derive(Clone, Debug, Default)]
pub struct PhysicalModel {
	pub particles: Vec<V2>,
	pub objects: Vec<ObjectTemplate>,
}

impl PhysicalModel {
	/// `x` by `y` particles on a square lattice of spacing `size`.
	pub fn new_block(x: usize, y: usize, size: f32) -> Self {
		let mut particles = Vec::with_capacity(x * y);
		for idy in 0..y {
			for idx in 0..x {
				particles.push(V2::new(size * idx as f32, size * idy as f32));
			}
		}
		Self {
			particles,
			objects: Vec::new(),
		}
	}

	/// `n` particles filling a disk of `radius` on a sunflower spiral,
	/// evenly spread without randomness.
	pub fn new_blob(n: usize, radius: f32) -> Self {
		let golden = std::f32::consts::PI * (3. - 5f32.sqrt());
		let particles = (0..n)
			.map(|i| {
				let r = radius * ((i as f32 + 0.5) / n as f32).sqrt();
				let theta = golden * i as f32;
				V2::new(r * theta.cos(), r * theta.sin())
			})
			.collect();
		Self {
			particles,
			objects: Vec::new(),
		}
	}

	pub fn with_object(mut self, pos: V2, radius: f32, mass: f32) -> Self {
		self.objects.push(ObjectTemplate {
			pos,
			radius,
			mass,
			locked: false,
		});
		self
	}

	pub fn with_locked_object(mut self, pos: V2, radius: f32) -> Self {
		self.objects.push(ObjectTemplate {
			pos,
			radius,
			mass: 1.,
			locked: true,
		});
		self
	}

	pub fn merge(mut self, other: PhysicalModel, offset: V2) -> Self {
		self.particles
			.extend(other.particles.into_iter().map(|p| p + offset));
		self.objects.extend(other.objects.into_iter().map(|mut o| {
			o.pos += offset;
			o
		}));
		self
	}

	/// Dam break: a block of fluid against the left wall with a ball above
	/// the open side, sized for an 800 x 500 domain.
	pub fn dam_break() -> Self {
		PhysicalModel::default()
			.merge(PhysicalModel::new_block(30, 25, 8.), V2::new(10., 290.))
			.with_object(V2::new(600., 100.), 40., 50.)
	}
}
