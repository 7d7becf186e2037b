use crate::params::ParamKind;
use crate::world::ObjectHandle;
use crate::V2;

/// Input queued by a frontend, applied by [`crate::world::World::apply`].
#[derive(Clone, Debug, PartialEq)]
pub enum ControllerMessage {
	TogglePause,
	FrameForward,
	SpawnParticles(V2),
	RemoveParticles(V2),
	Push(V2),
	SpawnObject(V2),
	RemoveObject(V2),
	ToggleLock(V2),
	DragObject(ObjectHandle, V2),
	Clear,
	Resize(V2),
	AdjustParam(ParamKind, f32),
	ResetParam(ParamKind),
}
