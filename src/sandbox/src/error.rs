use crate::V2;

#[derive(Debug, thiserror::Error)]
pub enum WorldError {
	#[error("object at ({}, {}) with radius {radius} overlaps object {other}", pos[0], pos[1])]
	ObjectOverlap { pos: V2, radius: f32, other: usize },
	#[error("no object with id {0}")]
	UnknownObject(usize),
}

/// Error type for parameter file loading.
#[derive(Debug, thiserror::Error)]
pub enum ParamsError {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	#[error("RON parse error: {0}")]
	Ron(#[from] ron::error::SpannedError),
	#[error("RON serialize error: {0}")]
	RonSer(#[from] ron::Error),
}
