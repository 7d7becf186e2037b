// pr_model: simulation state as seen by renderers and tuning UIs

use crate::V2;

#[derive(Clone, Debug)]
pub struct PrParticle {
	pub id: usize,
	pub pos: [f32; 2],
	pub stress: f32,
}

#[derive(Clone, Debug)]
pub struct PrObject {
	pub id: usize,
	pub pos: [f32; 2],
	pub radius: f32,
	pub locked: bool,
}

#[derive(Clone, Debug)]
pub struct PrModel {
	pub size: V2,
	pub particles: Vec<PrParticle>,
	pub objects: Vec<PrObject>,
}

impl PrModel {
	// renderers map stress to size/color, so they need the span
	pub fn stress_range(&self) -> Option<[f32; 2]> {
		let mut iter = self.particles.iter().map(|p| p.stress);
		let first = iter.next()?;
		Some(iter.fold([first, first], |[lo, hi], s| [lo.min(s), hi.max(s)]))
	}
}
