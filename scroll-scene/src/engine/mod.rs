pub mod activity;
pub mod camera;
pub mod core;
pub mod lifecycle;
pub mod loading;
pub mod particles;
pub mod scene;
pub mod scroll;
pub mod systems;
pub mod tween;
