use bevy::asset::AssetMetaCheck;
use bevy::prelude::*;
use bevy::winit::WinitSettings;
use bevy_common_assets::json::JsonAssetPlugin;
use std::time::Duration;

use constants::activity::MAX_FRAME_DELTA_SECS;

use crate::engine::core::app_state::{AppState, transition_to_running};
use crate::engine::core::window_config::create_window_config;
use crate::engine::loading::config_loader::{ConfigLoader, load_config_system, start_loading};
use crate::engine::loading::progress::LoadingProgress;
use crate::engine::loading::scene_config::SceneConfig;
use crate::engine::scene::adapters::{FrameRequests, PendingReleases, ProductControls};
use crate::engine::scene::setup::{create_scene_when_ready, setup, start_scene};
use crate::engine::systems::frame::{
    advance_scene, apply_frame_requests, apply_scroll, notify_product_controls, sync_particles,
};
use crate::engine::systems::releases::apply_pending_releases;
use crate::engine::systems::scene_commands::{SceneCommand, ScrollInput, handle_scene_commands};
use crate::engine::systems::teardown::cleanup_on_exit;
use crate::rpc::web_rpc::WebRpcPlugin;

#[cfg(not(target_arch = "wasm32"))]
use crate::engine::systems::native_input::native_scroll_input;

pub fn create_app() -> App {
    let mut app = App::new();

    app.add_plugins(create_default_plugins())
        .init_state::<AppState>()
        // Registers SceneConfig as a loadable asset type from JSON files.
        .add_plugins(JsonAssetPlugin::<SceneConfig>::new(&["json"]))
        .add_plugins(WebRpcPlugin)
        // Starts continuous; the activity monitor switches to reactive when idle.
        .insert_resource(WinitSettings::game())
        .insert_resource(Time::<Virtual>::from_max_delta(Duration::from_secs_f64(
            MAX_FRAME_DELTA_SECS,
        )));

    // Initialise resources early
    app.init_resource::<LoadingProgress>()
        .init_resource::<ConfigLoader>()
        .init_resource::<ProductControls>()
        .init_resource::<FrameRequests>()
        .init_resource::<PendingReleases>()
        .add_event::<SceneCommand>();

    // Native builds have no host page measuring sections.
    #[cfg(not(target_arch = "wasm32"))]
    app.insert_resource(ScrollInput::native_default());
    #[cfg(target_arch = "wasm32")]
    app.init_resource::<ScrollInput>();

    // State-based system scheduling
    app.add_systems(Startup, (setup, start_loading).chain())
        .add_systems(
            Update,
            (
                // Loading phase systems
                load_config_system,
                create_scene_when_ready,
                start_scene,
                transition_to_running,
            )
                .chain()
                .run_if(in_state(AppState::Loading)),
        )
        // Host input is buffered during loading and replayed at start.
        .add_systems(Update, handle_scene_commands);

    #[cfg(not(target_arch = "wasm32"))]
    {
        app.add_systems(
            Update,
            native_scroll_input
                .before(handle_scene_commands)
                .run_if(in_state(AppState::Running)),
        );
    }

    app.add_systems(
        Update,
        (
            apply_scroll,
            advance_scene,
            sync_particles,
            apply_frame_requests,
            notify_product_controls,
            apply_pending_releases,
        )
            .chain()
            .after(handle_scene_commands)
            .run_if(in_state(AppState::Running)),
    )
    .add_systems(PostUpdate, cleanup_on_exit);

    app
}

fn create_default_plugins() -> impl PluginGroup {
    let window_config = WindowPlugin {
        primary_window: Some(create_window_config()),
        ..default()
    };

    let asset_config = AssetPlugin {
        meta_check: AssetMetaCheck::Never,
        ..default()
    };

    DefaultPlugins.set(window_config).set(asset_config)
}
