use std::time::Instant;

use sandbox::physical_model::PhysicalModel;
use sandbox::world::World;
use sandbox::V2;

fn main() {
	env_logger::init();
	let mut world = World::new(V2::new(800., 500.)).with_seed(0);
	world.add_model(PhysicalModel::dam_break(), V2::zeros());
	let rframes = 300;
	let elapsed = 1. / 144.;
	let start = Instant::now();
	for _ in 0..rframes {
		world.update(elapsed);
	}
	let time = rframes as f32 * elapsed;
	let duration = start.elapsed().as_secs_f32();
	let info = world.update_info();
	eprintln!(
		"{} particles, {} springs: {:.3}%",
		info.particle_len,
		info.spring_len,
		duration / time * 100.
	);
}
