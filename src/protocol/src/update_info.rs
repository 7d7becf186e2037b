#[derive(Clone, Debug, Default, PartialEq)]
pub struct UpdateInfo {
	// wall time spent stepping / simulated time
	pub load: f32,
	pub particle_len: usize,
	pub object_len: usize,
	pub spring_len: usize,
}
