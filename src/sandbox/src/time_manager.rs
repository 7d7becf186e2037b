// caps dt, the dt² terms of the relaxation blow up beyond one frame
pub const MAX_DT: f32 = 1.0;

pub struct TimeManager {
	// -1: always play
	// 0: pause
	// n: play n frames
	forward_frames: i32,
	max_dt: f32,
}

impl Default for TimeManager {
	fn default() -> Self {
		Self {
			forward_frames: -1,
			max_dt: MAX_DT,
		}
	}
}

impl TimeManager {
	pub fn with_paused(mut self) -> Self {
		self.forward_frames = 0;
		self
	}

	pub fn is_paused(&self) -> bool {
		self.forward_frames == 0
	}

	pub fn toggle_pause(&mut self) {
		if self.forward_frames == 0 {
			self.forward_frames = -1;
		} else {
			self.forward_frames = 0;
		}
	}

	pub fn frame_forward(&mut self) {
		if self.forward_frames >= 0 {
			self.forward_frames += 1;
		}
	}

	/// Scaled and capped dt, ignoring the run state.
	pub fn scale(&self, elapsed: f32, speed: f32) -> f32 {
		let dt = elapsed * speed;
		if dt > 0. {
			dt.min(self.max_dt)
		} else {
			0.
		}
	}

	/// Simulation dt for a frame that took `elapsed` seconds, or 0 when
	/// nothing should be simulated.
	pub fn take_dt(&mut self, elapsed: f32, speed: f32) -> f32 {
		if self.forward_frames == 0 {
			return 0.;
		}
		let dt = self.scale(elapsed, speed);
		if dt > 0. && self.forward_frames > 0 {
			self.forward_frames -= 1;
		}
		dt
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_scale_and_cap() {
		let mut tm = TimeManager::default();
		assert_eq!(tm.take_dt(0.25, 2.), 0.5);
		assert_eq!(tm.take_dt(0.5, 100.), MAX_DT);
		assert_eq!(tm.take_dt(f32::NAN, 100.), 0.);
		assert_eq!(tm.take_dt(-1., 100.), 0.);
	}

	#[test]
	fn test_pause_and_forward() {
		let mut tm = TimeManager::default().with_paused();
		assert_eq!(tm.take_dt(0.01, 1.), 0.);
		tm.frame_forward();
		tm.frame_forward();
		assert_eq!(tm.take_dt(0.01, 1.), 0.01);
		assert_eq!(tm.take_dt(0.01, 1.), 0.01);
		assert_eq!(tm.take_dt(0.01, 1.), 0.);
		assert!(tm.is_paused());
		tm.toggle_pause();
		assert!(!tm.is_paused());
		tm.frame_forward();
		assert_eq!(tm.take_dt(0.01, 1.), 0.01);
		assert_eq!(tm.take_dt(0.01, 1.), 0.01);
	}
}
