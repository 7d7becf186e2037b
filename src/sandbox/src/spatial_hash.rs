use fnv::FnvHashMap;

use crate::{C2, V2};

pub const HASH_PRIME: i64 = 1168639;
const MIN_CSIZE: f32 = 1.0;

pub trait Positioned {
	fn get_pos(&self) -> V2;
}

/// Uniform grid over entity indices, fully rebuilt once per step.
///
/// Buckets hold indices into the slice given to [`SpatialHash::rebuild`],
/// so the same slice (possibly with moved positions) must be passed to
/// [`SpatialHash::query`]. Positions that moved since the rebuild are still
/// tested exactly, they are only looked up in their old cell.
pub struct SpatialHash {
	csize: f32,
	data: FnvHashMap<i64, Vec<usize>>,
	// rolling estimate of the most crowded cell, used as bucket capacity
	cell_hint: usize,
}

impl Default for SpatialHash {
	fn default() -> Self {
		Self {
			csize: 20.,
			data: FnvHashMap::default(),
			cell_hint: 4,
		}
	}
}

impl SpatialHash {
	pub fn csize(&self) -> f32 {
		self.csize
	}

	pub fn cell_hint(&self) -> usize {
		self.cell_hint
	}

	pub fn cell_len(&self) -> usize {
		self.data.len()
	}

	fn get_cpos(&self, p: V2) -> C2 {
		// float -> int casts saturate, NaN lands in cell 0
		C2::new(
			(p[0] / self.csize).floor() as i32,
			(p[1] / self.csize).floor() as i32,
		)
	}

	fn key(cpos: C2) -> i64 {
		(cpos[0] as i64).wrapping_add((cpos[1] as i64).wrapping_mul(HASH_PRIME))
	}

	pub fn rebuild<T: Positioned>(&mut self, items: &[T], csize: f32) {
		self.csize = if csize.is_finite() && csize >= MIN_CSIZE {
			csize
		} else {
			MIN_CSIZE
		};
		self.data.clear();
		let hint = self.cell_hint;
		for (idx, item) in items.iter().enumerate() {
			let key = Self::key(self.get_cpos(item.get_pos()));
			self.data
				.entry(key)
				.or_insert_with(|| Vec::with_capacity(hint))
				.push(idx);
		}
		let observed = self.data.values().map(Vec::len).max().unwrap_or(0);
		self.cell_hint = observed.max(self.cell_hint * 3 / 4).max(1);
	}

	pub fn query<T: Positioned>(
		&self,
		items: &[T],
		center: V2,
		radius: f32,
	) -> Vec<usize> {
		let mut result = Vec::new();
		self.query_into(items, center, radius, &mut result);
		result
	}

	/// Appends to `out` every index whose position lies within `radius`
	/// of `center`.
	pub fn query_into<T: Positioned>(
		&self,
		items: &[T],
		center: V2,
		radius: f32,
		out: &mut Vec<usize>,
	) {
		if !(radius >= 0.) || self.data.is_empty() {
			return;
		}
		let r2 = radius * radius;
		let mut test = |idx: usize| {
			if let Some(item) = items.get(idx) {
				if (item.get_pos() - center).magnitude_squared() <= r2 {
					out.push(idx);
				}
			}
		};
		let lo = self.get_cpos(center - V2::new(radius, radius));
		let hi = self.get_cpos(center + V2::new(radius, radius));
		let ncell = (hi[0] as i128 - lo[0] as i128 + 1)
			* (hi[1] as i128 - lo[1] as i128 + 1);
		if ncell > self.data.len() as i128 {
			// range wider than the populated part of the grid
			for bucket in self.data.values() {
				bucket.iter().copied().for_each(&mut test);
			}
			return;
		}
		for cy in lo[1]..=hi[1] {
			for cx in lo[0]..=hi[0] {
				if let Some(bucket) = self.data.get(&Self::key(C2::new(cx, cy))) {
					bucket.iter().copied().for_each(&mut test);
				}
			}
		}
	}
}
