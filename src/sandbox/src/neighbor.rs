use crate::particle::Particle;
use crate::spatial_hash::SpatialHash;

/// Per-particle neighbor indices within the interaction radius, taken
/// once per step and shared by the spring, density and viscosity passes.
#[derive(Default)]
pub struct NeighborCache {
	lists: Vec<Vec<usize>>,
}

impl NeighborCache {
	pub fn get(&self, idx: usize) -> &[usize] {
		self.lists.get(idx).map(Vec::as_slice).unwrap_or(&[])
	}

	pub fn len(&self) -> usize {
		self.lists.len()
	}

	pub fn is_empty(&self) -> bool {
		self.lists.is_empty()
	}

	pub fn pair_len(&self) -> usize {
		self.lists.iter().map(Vec::len).sum::<usize>() / 2
	}

	pub fn clear(&mut self) {
		self.lists.clear();
	}

	fn collect_one(
		grid: &SpatialHash,
		particles: &[Particle],
		idx: usize,
		radius: f32,
		out: &mut Vec<usize>,
	) {
		out.clear();
		if !(radius > 0.) {
			return;
		}
		grid.query_into(particles, particles[idx].pos, radius, out);
		out.retain(|&j| j != idx);
	}

	// the grid must have been rebuilt from `particles`
	#[cfg(not(debug_assertions))]
	pub fn rebuild(
		&mut self,
		grid: &SpatialHash,
		particles: &[Particle],
		radius: f32,
	) {
		use rayon::prelude::*;
		self.lists.resize_with(particles.len(), Vec::new);
		self.lists
			.par_iter_mut()
			.enumerate()
			.for_each(|(idx, list)| {
				Self::collect_one(grid, particles, idx, radius, list)
			});
	}

	#[cfg(debug_assertions)]
	pub fn rebuild(
		&mut self,
		grid: &SpatialHash,
		particles: &[Particle],
		radius: f32,
	) {
		self.lists.resize_with(particles.len(), Vec::new);
		for (idx, list) in self.lists.iter_mut().enumerate() {
			Self::collect_one(grid, particles, idx, radius, list);
		}
	}
}
