use fnv::FnvHashMap;

use crate::spatial_hash::Positioned;
use crate::V2;
use protocol::pr_model::PrParticle;

#[derive(Clone, Debug)]
pub struct Particle {
	pub id: usize, // canonical pair order
	pub pos: V2,
	pub ppos: V2,
	pub vel: V2,
	// neighbor id -> rest length, only on the lower id of each pair
	pub springs: FnvHashMap<usize, f32>,
	pub stress: f32,
}

impl Particle {
	pub fn new(id: usize, pos: V2, vel: V2) -> Self {
		Self {
			id,
			pos,
			ppos: pos,
			vel,
			springs: FnvHashMap::default(),
			stress: 0.,
		}
	}

	pub fn add_pos(&mut self, dp: V2) {
		self.pos += dp
	}

	pub fn update(&mut self, dt: f32) {
		self.ppos = self.pos;
		self.pos += self.vel * dt;
	}

	// velocity implied by this step's displacement
	pub fn implied_vel(&self, dt: f32) -> V2 {
		(self.pos - self.ppos) / dt
	}

	// rewrite ppos so that implied_vel returns `vel`
	pub fn set_implied_vel(&mut self, vel: V2, dt: f32) {
		self.ppos = self.pos - vel * dt;
	}

	pub fn render(&self) -> PrParticle {
		PrParticle {
			id: self.id,
			pos: [self.pos[0], self.pos[1]],
			stress: self.stress,
		}
	}
}

impl Positioned for Particle {
	fn get_pos(&self) -> V2 {
		self.pos
	}
}
