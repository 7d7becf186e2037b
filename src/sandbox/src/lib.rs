pub mod collision;
pub mod constraint;
pub mod controller_message;
pub mod error;
pub mod neighbor;
pub mod object;
pub mod params;
pub mod particle;
pub mod physical_model;
pub mod pos_box;
pub mod spatial_hash;
pub mod time_manager;
pub mod world;

pub type V2 = nalgebra::Vector2<f32>;
pub type C2 = nalgebra::Vector2<i32>;

// below this distance two entities are treated as coincident
pub const EPS: f32 = 1e-4;

// fixed separation applied to coincident pairs instead of a force,
// a constant keeps repeated runs bit-identical
pub fn nudge() -> V2 {
	V2::new(0.01, 0.007)
}

// two distinct mutable elements of one slice
pub(crate) fn pair_mut<T>(v: &mut [T], i: usize, j: usize) -> (&mut T, &mut T) {
	assert_ne!(i, j);
	if i < j {
		let (a, b) = v.split_at_mut(j);
		(&mut a[i], &mut b[0])
	} else {
		let (a, b) = v.split_at_mut(i);
		(&mut b[0], &mut a[j])
	}
}
