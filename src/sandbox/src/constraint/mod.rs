pub mod density;
pub mod spring;
pub mod viscosity;

/// Traversal order of the in-place pair passes.
///
/// Each pass mutates neighbor state while it iterates, so the result
/// depends on visiting order. The world flips the order every step to
/// cancel the directional drift a fixed order would accumulate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Order {
	Forward,
	Backward,
}

impl Default for Order {
	fn default() -> Self {
		Order::Forward
	}
}

impl Order {
	pub fn flip(self) -> Self {
		match self {
			Order::Forward => Order::Backward,
			Order::Backward => Order::Forward,
		}
	}

	pub fn for_each(self, len: usize, f: impl FnMut(usize)) {
		match self {
			Order::Forward => (0..len).for_each(f),
			Order::Backward => (0..len).rev().for_each(f),
		}
	}
}
