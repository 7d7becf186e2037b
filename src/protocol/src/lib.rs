pub mod pr_model;
pub mod update_info;

pub type V2 = nalgebra::Vector2<f32>;
