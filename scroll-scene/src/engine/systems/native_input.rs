use bevy::input::mouse::{MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use bevy::window::CursorMoved;

use constants::scroll::NATIVE_PIXELS_PER_LINE;

use crate::engine::scene::adapters::{ActiveScene, ProductControls};
use crate::engine::systems::scene_commands::{SceneCommand, ScrollInput};

const SWATCH_KEYS: [KeyCode; 5] = [
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
    KeyCode::Digit5,
];

/// Wheel scrolls a virtual page, cursor motion counts as pointer activity and
/// number keys pick palette swatches.
pub fn native_scroll_input(
    mut wheel: EventReader<MouseWheel>,
    mut cursor: EventReader<CursorMoved>,
    keys: Res<ButtonInput<KeyCode>>,
    scroll_input: Res<ScrollInput>,
    controls: Res<ProductControls>,
    scene: Option<Res<ActiveScene>>,
    mut scene_commands: EventWriter<SceneCommand>,
) {
    let delta: f32 = wheel
        .read()
        .map(|event| match event.unit {
            MouseScrollUnit::Line => event.y * NATIVE_PIXELS_PER_LINE,
            MouseScrollUnit::Pixel => event.y,
        })
        .sum();

    if delta != 0.0 {
        if controls.scroll_locked {
            scene_commands.write(SceneCommand::ScrollActivity);
        } else {
            // Wheel down reports negative deltas; the page offset grows.
            let offset = (scroll_input.offset - delta).clamp(0.0, scroll_input.max_offset());
            scene_commands.write(SceneCommand::Scroll {
                offset,
                viewport_height: scroll_input.viewport_height,
            });
        }
    }

    if cursor.read().count() > 0 {
        scene_commands.write(SceneCommand::PointerActivity);
    }

    let Some(scene) = scene else {
        return;
    };
    for (index, key) in SWATCH_KEYS.iter().enumerate() {
        if !keys.just_pressed(*key) || !controls.controls_enabled {
            continue;
        }
        if let Some(entry) = scene.palette().get(index) {
            scene_commands.write(SceneCommand::PointerActivity);
            scene_commands.write(SceneCommand::TriggerColorChange(entry.id.clone()));
        }
    }
}
