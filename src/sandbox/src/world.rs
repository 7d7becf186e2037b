use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::collision;
use crate::constraint::density::relax_density;
use crate::constraint::spring::apply_springs;
use crate::constraint::viscosity::apply_viscosity;
use crate::constraint::Order;
use crate::controller_message::ControllerMessage;
use crate::error::WorldError;
use crate::neighbor::NeighborCache;
use crate::object::Object;
use crate::params::Params;
use crate::particle::Particle;
use crate::physical_model::PhysicalModel;
use crate::pos_box::PosBox;
use crate::spatial_hash::SpatialHash;
use crate::time_manager::TimeManager;
use crate::V2;
use protocol::pr_model::PrModel;
use protocol::update_info::UpdateInfo;

const MIN_OBJECT_RADIUS: f32 = 1.;
const MIN_OBJECT_MASS: f32 = 1e-3;
// upper bound on particles created by one spawn call
pub const MAX_SPAWN_PER_CALL: usize = 1000;

/// Stable reference to a body, survives removal of other bodies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObjectHandle(usize);

impl ObjectHandle {
	pub fn id(&self) -> usize {
		self.0
	}
}

pub struct World {
	size: V2,
	params: Params,
	time: TimeManager,
	order: Order,

	particles: Vec<Particle>,
	objects: Vec<Object>,
	particle_id_alloc: usize,
	object_id_alloc: usize,

	pgrid: SpatialHash,
	ogrid: SpatialHash,
	neighbors: NeighborCache,

	rng: StdRng,
	spring_len: usize,
	load: f32,
}

impl World {
	pub fn new(size: V2) -> Self {
		Self {
			size,
			params: Params::default(),
			time: TimeManager::default(),
			order: Order::default(),
			particles: Vec::new(),
			objects: Vec::new(),
			particle_id_alloc: 0,
			object_id_alloc: 0,
			pgrid: SpatialHash::default(),
			ogrid: SpatialHash::default(),
			neighbors: NeighborCache::default(),
			rng: StdRng::from_entropy(),
			spring_len: 0,
			load: 0.,
		}
	}

	pub fn with_params(mut self, params: Params) -> Self {
		self.params = params;
		self
	}

	/// Fixed spawn randomness, for replayable runs.
	pub fn with_seed(mut self, seed: u64) -> Self {
		self.rng = StdRng::seed_from_u64(seed);
		self
	}

	pub fn with_paused(mut self) -> Self {
		self.time = TimeManager::default().with_paused();
		self
	}

	pub fn with_order(mut self, order: Order) -> Self {
		self.order = order;
		self
	}

	pub fn size(&self) -> V2 {
		self.size
	}

	pub fn params(&self) -> &Params {
		&self.params
	}

	pub fn params_mut(&mut self) -> &mut Params {
		&mut self.params
	}

	pub fn order(&self) -> Order {
		self.order
	}

	pub fn is_paused(&self) -> bool {
		self.time.is_paused()
	}

	pub fn particle_count(&self) -> usize {
		self.particles.len()
	}

	pub fn object_count(&self) -> usize {
		self.objects.len()
	}

	pub fn particles(&self) -> &[Particle] {
		&self.particles
	}

	pub fn objects(&self) -> &[Object] {
		&self.objects
	}

	pub fn object(&self, handle: ObjectHandle) -> Option<&Object> {
		self.objects.iter().find(|o| o.id == handle.0)
	}

	pub fn pr_model(&self) -> PrModel {
		PrModel {
			size: self.size,
			particles: self.particles.iter().map(Particle::render).collect(),
			objects: self.objects.iter().map(Object::render).collect(),
		}
	}

	pub fn update_info(&self) -> UpdateInfo {
		UpdateInfo {
			load: self.load,
			particle_len: self.particles.len(),
			object_len: self.objects.len(),
			spring_len: self.spring_len,
		}
	}

	pub fn add_particle(&mut self, pos: V2, vel: V2) -> usize {
		let id = self.particle_id_alloc;
		self.particle_id_alloc += 1;
		self.particles.push(Particle::new(id, pos, vel));
		id
	}

	/// Spawns `spawn_rate * dt` particles in the control radius around
	/// `center`; the fractional part is spawned with that probability.
	pub fn spawn_particles(&mut self, center: V2, elapsed: f32) -> usize {
		let params = self.params.sanitized();
		let dt = self.time.scale(elapsed, params.simulation_speed);
		let rate = params.particle_spawn_rate * dt;
		if !rate.is_finite() {
			return 0;
		}
		let mut count = rate.floor() as usize;
		if self.rng.gen::<f32>() < rate.fract() {
			count += 1;
		}
		let count = count.min(MAX_SPAWN_PER_CALL);
		for _ in 0..count {
			let theta = self.rng.gen_range(0.0..std::f32::consts::TAU);
			let r = params.control_radius * self.rng.gen::<f32>().sqrt();
			let pos = center + V2::new(theta.cos(), theta.sin()) * r;
			self.add_particle(pos, V2::zeros());
		}
		count
	}

	pub fn remove_particles(&mut self, center: V2) -> usize {
		let r = self.params.sanitized().control_radius;
		let r2 = r * r;
		let before = self.particles.len();
		self.particles
			.retain(|p| (p.pos - center).magnitude_squared() > r2);
		before - self.particles.len()
	}

	pub fn push(&mut self, dv: V2) {
		for p in self.particles.iter_mut() {
			p.vel += dv;
		}
		for o in self.objects.iter_mut().filter(|o| !o.locked) {
			o.vel += dv;
		}
	}

	fn insert_object(
		&mut self,
		pos: V2,
		radius: f32,
		mass: f32,
	) -> Result<ObjectHandle, WorldError> {
		let radius = radius.max(MIN_OBJECT_RADIUS);
		if let Some(other) = self.objects.iter().find(|o| o.overlaps(pos, radius)) {
			return Err(WorldError::ObjectOverlap {
				pos,
				radius,
				other: other.id,
			});
		}
		let id = self.object_id_alloc;
		self.object_id_alloc += 1;
		self.objects
			.push(Object::new(id, pos, radius, mass.max(MIN_OBJECT_MASS)));
		Ok(ObjectHandle(id))
	}

	/// Spawns a body with the current default radius and mass, rejected
	/// when it would overlap an existing body.
	pub fn spawn_object(&mut self, pos: V2) -> Result<ObjectHandle, WorldError> {
		let params = self.params.sanitized();
		let result = self.insert_object(pos, params.object_radius, params.object_mass);
		if let Err(e) = &result {
			log::warn!("spawn rejected: {}", e);
		}
		result
	}

	fn object_at(&self, pos: V2) -> Option<usize> {
		self.objects.iter().position(|o| o.contains(pos))
	}

	pub fn remove_object(&mut self, pos: V2) -> bool {
		match self.object_at(pos) {
			Some(idx) => {
				self.objects.remove(idx);
				true
			}
			None => false,
		}
	}

	/// Returns the new lock state of the body under `pos`.
	pub fn toggle_lock(&mut self, pos: V2) -> Option<bool> {
		let idx = self.object_at(pos)?;
		let o = &mut self.objects[idx];
		o.toggle_lock();
		Some(o.locked)
	}

	pub fn grab_object(&self, pos: V2) -> Option<ObjectHandle> {
		self.object_at(pos).map(|idx| ObjectHandle(self.objects[idx].id))
	}

	/// Steers a grabbed body toward `target`: unlocked bodies get the
	/// velocity that reaches it in one unit of dt, locked ones are moved.
	pub fn drag_object(
		&mut self,
		handle: ObjectHandle,
		target: V2,
	) -> Result<(), WorldError> {
		let o = self
			.objects
			.iter_mut()
			.find(|o| o.id == handle.0)
			.ok_or(WorldError::UnknownObject(handle.0))?;
		if o.locked {
			o.pos = target;
			o.ppos = target;
		} else {
			o.vel = target - o.pos;
		}
		Ok(())
	}

	pub fn add_model(&mut self, model: PhysicalModel, offset: V2) {
		log::info!(
			"add model: {} particles, {} objects",
			model.particles.len(),
			model.objects.len()
		);
		for pos in model.particles.into_iter() {
			self.add_particle(pos + offset, V2::zeros());
		}
		for o in model.objects.into_iter() {
			match self.insert_object(o.pos + offset, o.radius, o.mass) {
				Ok(handle) => {
					if o.locked {
						if let Some(obj) =
							self.objects.iter_mut().find(|x| x.id == handle.0)
						{
							obj.toggle_lock();
						}
					}
				}
				Err(e) => log::warn!("model object skipped: {}", e),
			}
		}
	}

	pub fn clear(&mut self) {
		log::info!(
			"clear {} particles, {} objects",
			self.particles.len(),
			self.objects.len()
		);
		self.particles.clear();
		self.objects.clear();
		self.neighbors.clear();
		self.spring_len = 0;
	}

	pub fn resize(&mut self, size: V2) {
		log::info!("resize domain to {} x {}", size[0], size[1]);
		self.size = size;
	}

	pub fn apply(&mut self, msg: ControllerMessage, elapsed: f32) {
		use ControllerMessage::*;
		match msg {
			TogglePause => self.time.toggle_pause(),
			FrameForward => self.time.frame_forward(),
			SpawnParticles(pos) => {
				self.spawn_particles(pos, elapsed);
			}
			RemoveParticles(pos) => {
				self.remove_particles(pos);
			}
			Push(dv) => self.push(dv),
			SpawnObject(pos) => {
				let _ = self.spawn_object(pos);
			}
			RemoveObject(pos) => {
				self.remove_object(pos);
			}
			ToggleLock(pos) => {
				self.toggle_lock(pos);
			}
			DragObject(handle, target) => {
				if let Err(e) = self.drag_object(handle, target) {
					log::debug!("drag ignored: {}", e);
				}
			}
			Clear => self.clear(),
			Resize(size) => self.resize(size),
			AdjustParam(kind, direction) => {
				self.params.adjust(kind, direction, elapsed)
			}
			ResetParam(kind) => self.params.reset(kind),
		}
	}

	/// Advances by a frame that took `elapsed` wall-clock seconds.
	pub fn update(&mut self, elapsed: f32) {
		let params = self.params.sanitized();
		let dt = self.time.take_dt(elapsed, params.simulation_speed);
		if dt == 0f32 {
			return;
		}
		let start = Instant::now();
		self.step(dt, &params);
		if elapsed > 0. {
			self.load = start.elapsed().as_secs_f32() / elapsed;
		}
	}

	/// One pipeline pass with an already scaled dt.
	pub fn step(&mut self, dt: f32, params: &Params) {
		if !(dt > 0.) {
			return;
		}
		let h = params.interaction_radius;
		let order = self.order;

		for p in self.particles.iter_mut() {
			p.update(dt);
		}
		for o in self.objects.iter_mut() {
			o.update(dt);
		}
		self.pgrid.rebuild(&self.particles, h);
		self.neighbors.rebuild(&self.pgrid, &self.particles, h);

		self.spring_len =
			apply_springs(&mut self.particles, &self.neighbors, params, dt, order);
		relax_density(&mut self.particles, &self.neighbors, params, dt, order);

		let bounds = PosBox::from_size(self.size);
		let reset_count = collision::particles_vs_bounds(
			&mut self.particles,
			&bounds,
			params.edge_bounciness,
			dt,
		);
		if reset_count > 0 {
			log::warn!("reset {} particles with non-finite state", reset_count);
		}
		// relaxation moved everything, bodies need current cells
		self.pgrid.rebuild(&self.particles, h);
		collision::particles_vs_objects(
			&mut self.objects,
			&self.particles,
			&self.pgrid,
			dt,
		);
		collision::objects_vs_objects(
			&mut self.objects,
			&mut self.ogrid,
			&bounds,
			params.edge_bounciness,
		);
		collision::objects_vs_particles(
			&self.objects,
			&mut self.particles,
			&self.pgrid,
			&bounds,
			dt,
		);

		let g = params.gravity() * dt;
		for p in self.particles.iter_mut() {
			p.vel = p.implied_vel(dt) + g;
		}
		for o in self.objects.iter_mut().filter(|o| !o.locked) {
			o.vel += g;
		}
		apply_viscosity(&mut self.particles, &self.neighbors, params, dt, order);

		self.order = order.flip();
		log::debug!(
			"step dt={:.4} particles={} pairs={} springs={} objects={}",
			dt,
			self.particles.len(),
			self.neighbors.pair_len(),
			self.spring_len,
			self.objects.len()
		);
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::params::ParamKind;

	fn world() -> World {
		World::new(V2::new(800., 500.)).with_seed(7)
	}

	#[test]
	fn test_spawn_count_follows_rate() {
		let mut w = world();
		w.params_mut().simulation_speed = 1.;
		w.params_mut().particle_spawn_rate = 10.;
		// 10 per unit * 0.5 = 5 exactly, no random extra
		assert_eq!(w.spawn_particles(V2::new(400., 250.), 0.5), 5);
		assert_eq!(w.particle_count(), 5);
		let r = w.params().control_radius;
		for p in w.particles() {
			assert!((p.pos - V2::new(400., 250.)).magnitude() <= r + 1e-3);
		}
		let ids: Vec<usize> = w.particles().iter().map(|p| p.id).collect();
		assert_eq!(ids, vec![0, 1, 2, 3, 4]);
	}

	#[test]
	fn test_fractional_spawn_is_probabilistic() {
		let mut w = world();
		w.params_mut().simulation_speed = 1.;
		w.params_mut().particle_spawn_rate = 0.5;
		let total: usize =
			(0..400).map(|_| w.spawn_particles(V2::new(400., 250.), 1.)).sum();
		assert!(total > 100 && total < 300, "spawned {}", total);
	}

	#[test]
	fn test_huge_spawn_rate_is_capped() {
		let mut w = world();
		w.params_mut().simulation_speed = 1.;
		w.params_mut().particle_spawn_rate = 1e30;
		let n = w.spawn_particles(V2::new(400., 250.), 0.5);
		assert_eq!(n, MAX_SPAWN_PER_CALL);
		assert_eq!(w.particle_count(), MAX_SPAWN_PER_CALL);
	}

	#[test]
	fn test_remove_particles_in_radius() {
		let mut w = world();
		w.add_particle(V2::new(100., 100.), V2::zeros());
		w.add_particle(V2::new(130., 100.), V2::zeros());
		w.add_particle(V2::new(300., 100.), V2::zeros());
		assert_eq!(w.remove_particles(V2::new(100., 100.)), 2);
		assert_eq!(w.particles()[0].id, 2);
	}

	#[test]
	fn test_object_lifecycle() {
		let mut w = world();
		let a = w.spawn_object(V2::new(200., 200.)).unwrap();
		assert!(matches!(
			w.spawn_object(V2::new(260., 200.)),
			Err(WorldError::ObjectOverlap { other: 0, .. })
		));
		let b = w.spawn_object(V2::new(400., 200.)).unwrap();
		assert_ne!(a, b);
		assert_eq!(w.grab_object(V2::new(410., 210.)), Some(b));
		assert_eq!(w.grab_object(V2::new(300., 300.)), None);
		assert_eq!(w.toggle_lock(V2::new(200., 200.)), Some(true));
		assert!(w.object(a).unwrap().locked);
		assert!(w.remove_object(V2::new(200., 200.)));
		assert!(!w.remove_object(V2::new(200., 200.)));
		assert!(w.object(a).is_none());
		assert!(w.drag_object(a, V2::zeros()).is_err());
		w.drag_object(b, V2::new(420., 200.)).unwrap();
		assert_eq!(w.object(b).unwrap().vel, V2::new(20., 0.));
	}

	#[test]
	fn test_push_skips_locked() {
		let mut w = world();
		w.add_particle(V2::new(10., 10.), V2::zeros());
		w.spawn_object(V2::new(100., 100.)).unwrap();
		w.spawn_object(V2::new(300., 100.)).unwrap();
		w.toggle_lock(V2::new(300., 100.));
		w.push(V2::new(1., -2.));
		assert_eq!(w.particles()[0].vel, V2::new(1., -2.));
		assert_eq!(w.objects()[0].vel, V2::new(1., -2.));
		assert_eq!(w.objects()[1].vel, V2::zeros());
	}

	#[test]
	fn test_messages() {
		let mut w = world().with_paused();
		w.apply(ControllerMessage::AdjustParam(ParamKind::RestDensity, 1.), 0.2);
		assert_eq!(w.params().rest_density, 7.);
		w.apply(ControllerMessage::ResetParam(ParamKind::RestDensity), 0.);
		assert_eq!(w.params().rest_density, 6.);
		w.apply(ControllerMessage::SpawnObject(V2::new(100., 100.)), 0.);
		assert_eq!(w.object_count(), 1);
		w.add_particle(V2::new(400., 100.), V2::zeros());
		w.update(0.01);
		assert_eq!(w.particles()[0].vel, V2::zeros());
		w.apply(ControllerMessage::FrameForward, 0.);
		w.update(0.01);
		assert!(w.particles()[0].vel[1] > 0.);
		w.apply(ControllerMessage::Clear, 0.);
		assert_eq!(w.particle_count() + w.object_count(), 0);
	}

	#[test]
	fn test_order_alternates() {
		let mut w = world();
		w.add_particle(V2::new(400., 250.), V2::zeros());
		assert_eq!(w.order(), Order::Forward);
		w.update(0.01);
		assert_eq!(w.order(), Order::Backward);
		w.update(0.01);
		assert_eq!(w.order(), Order::Forward);
	}

	#[test]
	fn test_pr_model_reflects_state() {
		let mut w = world();
		w.add_particle(V2::new(1., 2.), V2::zeros());
		w.spawn_object(V2::new(100., 100.)).unwrap();
		let m = w.pr_model();
		assert_eq!(m.particles.len(), 1);
		assert_eq!(m.particles[0].pos, [1., 2.]);
		assert_eq!(m.objects[0].radius, 50.);
		assert_eq!(m.size, V2::new(800., 500.));
		let info = w.update_info();
		assert_eq!(info.particle_len, 1);
		assert_eq!(info.object_len, 1);
	}
}
