use bevy::prelude::*;

use constants::scroll::{NATIVE_REGION_LAYOUT, NATIVE_VIEWPORT_HEIGHT};

use crate::engine::activity::activity_monitor::ActivityTransition;
use crate::engine::lifecycle::registry::LifecycleIntent;
use crate::engine::scene::adapters::{ActiveScene, SceneWorld};
use crate::engine::scroll::progress_mapper::{RegionName, ScrollRegion};
use crate::rpc::web_rpc::WebRpcInterface;

/// Requests from the host page (or native input) for the scene.
#[derive(Event, Debug, Clone, PartialEq)]
pub enum SceneCommand {
    Scroll { offset: f32, viewport_height: f32 },
    MeasureRegions(Vec<ScrollRegion>),
    PointerActivity,
    ScrollActivity,
    TriggerColorChange(String),
    DisposeGroup(String),
    ReinstateGroup(String),
    /// Debounced dispose or reinstate, applied by the frame loop.
    RequestGroup {
        name: String,
        intent: LifecycleIntent,
    },
    CleanupAll,
}

/// Latest scroll position and section measurements reported by the host.
///
/// Kept outside the scene so reports that arrive while loading are replayed
/// once the scene starts.
#[derive(Resource, Debug, Clone, Default)]
pub struct ScrollInput {
    pub offset: f32,
    pub viewport_height: f32,
    pub regions: Vec<ScrollRegion>,
    pub offset_dirty: bool,
    pub regions_dirty: bool,
}

impl ScrollInput {
    /// Built-in section layout for builds without a host page.
    pub fn native_default() -> Self {
        let regions = NATIVE_REGION_LAYOUT
            .iter()
            .filter_map(|(name, top, bottom)| {
                RegionName::from_string(name).map(|name| ScrollRegion::new(name, *top, *bottom))
            })
            .collect();
        Self {
            offset: 0.0,
            viewport_height: NATIVE_VIEWPORT_HEIGHT,
            regions,
            offset_dirty: true,
            regions_dirty: true,
        }
    }

    /// Largest offset worth scrolling to: the bottom of the last section.
    pub fn max_offset(&self) -> f32 {
        self.regions
            .iter()
            .map(|region| region.dom_bottom_offset)
            .fold(0.0, f32::max)
    }
}

pub(crate) fn notify_activity(rpc: &mut WebRpcInterface, transition: Option<ActivityTransition>) {
    if let Some(state) = transition {
        rpc.send_notification(
            "activity_state_changed",
            serde_json::json!({ "state": state }),
        );
    }
}

pub(crate) fn notify_group(rpc: &mut WebRpcInterface, group: &str, intent: LifecycleIntent) {
    let method = match intent {
        LifecycleIntent::Dispose => "group_disposed",
        LifecycleIntent::Reinstate => "group_reinstated",
    };
    rpc.send_notification(method, serde_json::json!({ "group": group }));
}

pub fn handle_scene_commands(
    mut events: EventReader<SceneCommand>,
    mut scene: Option<ResMut<ActiveScene>>,
    mut scroll_input: ResMut<ScrollInput>,
    mut world: SceneWorld,
    mut rpc_interface: ResMut<WebRpcInterface>,
    mut commands: Commands,
) {
    for command in events.read() {
        match command {
            SceneCommand::Scroll {
                offset,
                viewport_height,
            } => {
                scroll_input.offset = *offset;
                scroll_input.viewport_height = *viewport_height;
                scroll_input.offset_dirty = true;
            }
            SceneCommand::MeasureRegions(regions) => {
                scroll_input.regions = regions.clone();
                scroll_input.regions_dirty = true;
            }
            _ => {}
        }

        let Some(active) = scene.as_mut() else {
            debug!("Scene not ready, buffered or dropped {:?}", command);
            continue;
        };

        let now = world.now();
        let mut ports = world.ports();
        let mut cleaned_up = false;

        match command {
            SceneCommand::Scroll { .. } | SceneCommand::ScrollActivity => {
                let transition = active.on_scroll_activity(now, &mut ports.driver);
                notify_activity(&mut rpc_interface, transition);
            }
            SceneCommand::PointerActivity => {
                let transition = active.on_pointer_activity(now, &mut ports.driver);
                notify_activity(&mut rpc_interface, transition);
            }
            SceneCommand::MeasureRegions(_) => {}
            SceneCommand::TriggerColorChange(color_id) => {
                match active.trigger_color_change(color_id, &mut ports.rig) {
                    Ok(true) => {
                        rpc_interface.send_notification(
                            "color_change_started",
                            serde_json::json!({
                                "color": color_id,
                                "name": active
                                    .palette_color(color_id)
                                    .map_or("unknown", |entry| entry.name.as_str()),
                            }),
                        );
                    }
                    Ok(false) => debug!("Colour change to '{}' not started", color_id),
                    Err(error) => warn!("Colour change rejected: {}", error),
                }
            }
            SceneCommand::DisposeGroup(name) => {
                match active.dispose_group(name, &mut ports.resources) {
                    Ok(true) => notify_group(&mut rpc_interface, name, LifecycleIntent::Dispose),
                    Ok(false) => {}
                    Err(error) => warn!("Dispose rejected: {}", error),
                }
            }
            SceneCommand::ReinstateGroup(name) => {
                match active.reinstate_group(name, &mut ports.resources) {
                    Ok(true) => notify_group(&mut rpc_interface, name, LifecycleIntent::Reinstate),
                    Ok(false) => {}
                    Err(error) => warn!("Reinstate rejected: {}", error),
                }
            }
            SceneCommand::RequestGroup { name, intent } => {
                if let Err(error) = active.request_group(name, *intent, now) {
                    warn!("Group request rejected: {}", error);
                }
            }
            SceneCommand::CleanupAll => {
                let report =
                    active.cleanup_all(&mut ports.rig, &mut ports.resources, &mut ports.driver);
                rpc_interface.send_notification(
                    "scene_cleaned_up",
                    serde_json::to_value(report).unwrap_or_default(),
                );
                commands.remove_resource::<ActiveScene>();
                cleaned_up = true;
            }
        }

        if cleaned_up {
            scene = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_layout_covers_every_region() {
        let input = ScrollInput::native_default();
        let names: Vec<_> = input.regions.iter().map(|r| r.name).collect();
        assert_eq!(names, RegionName::PRIORITY.to_vec());
        assert_eq!(input.max_offset(), 5400.0);
        assert!(input.regions_dirty && input.offset_dirty);
    }
}
