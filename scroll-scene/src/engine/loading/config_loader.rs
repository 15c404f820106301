use bevy::asset::LoadState;
use bevy::prelude::*;

use crate::engine::loading::progress::LoadingProgress;
use crate::engine::loading::scene_config::SceneConfig;

pub const SCENE_CONFIG_PATH: &str = "scene_config.json";

#[derive(Resource, Default)]
pub struct ConfigLoader {
    handle: Option<Handle<SceneConfig>>,
}

// Start the loading process
pub fn start_loading(mut config_loader: ResMut<ConfigLoader>, asset_server: Res<AssetServer>) {
    println!("→ Loading {}", SCENE_CONFIG_PATH);
    config_loader.handle = Some(asset_server.load(SCENE_CONFIG_PATH));
}

// Publish the config as a resource once the asset resolves
pub fn load_config_system(
    mut loading_progress: ResMut<LoadingProgress>,
    config_loader: Res<ConfigLoader>,
    configs: Res<Assets<SceneConfig>>,
    asset_server: Res<AssetServer>,
    mut commands: Commands,
) {
    if loading_progress.config_loaded {
        return;
    }

    let Some(ref handle) = config_loader.handle else {
        return;
    };

    if let Some(config) = configs.get(handle) {
        println!("✓ Scene config loaded");
        commands.insert_resource(config.clone());
        loading_progress.config_loaded = true;
    } else if matches!(asset_server.load_state(handle), LoadState::Failed(_)) {
        warn!(
            "Failed to load {}, continuing with built-in defaults",
            SCENE_CONFIG_PATH
        );
        commands.insert_resource(SceneConfig::default());
        loading_progress.config_loaded = true;
    }
}
