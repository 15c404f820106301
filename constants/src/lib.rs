pub mod activity;
pub mod palette;
pub mod particles;
pub mod render_settings;
pub mod scroll;
pub mod sequence;
