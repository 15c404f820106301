use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::hash::Hash;

use crate::engine::core::error::SceneError;
use crate::engine::core::scene_context::SceneContext;
use crate::engine::lifecycle::registry::{HandlerId, LifecycleIntent, ListenerKey};
use crate::engine::scene::adapters::{ActiveScene, PendingReleases};
use crate::engine::scroll::progress_mapper::{RegionName, ScrollRegion};
use crate::engine::scroll::scroll_controller::ScrollController;
use crate::engine::systems::scene_commands::SceneCommand;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsValue;

#[cfg(target_arch = "wasm32")]
use web_sys::{MessageEvent, window};

/// Handler id of the window `message` listener installed at startup.
pub const MESSAGE_HANDLER: HandlerId = HandlerId(1);

/// JSON-RPC 2.0 request structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
    #[serde(default)]
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 response structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub result: Option<serde_json::Value>,
    pub error: Option<RpcError>,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 notification structure for one-way communication.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcNotification {
    pub jsonrpc: String,
    pub method: String,
    pub params: serde_json::Value,
}

/// JSON-RPC error structure following specification.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

/// Resource managing bidirectional RPC communication between the page and Bevy.
/// Handles both request-response patterns and notification broadcasting.
#[derive(Resource, Default)]
pub struct WebRpcInterface {
    outgoing_notifications: Vec<RpcNotification>,
    outgoing_responses: Vec<RpcResponse>,
}

impl WebRpcInterface {
    /// Send notification to the page without expecting response.
    pub fn send_notification(&mut self, method: &str, params: serde_json::Value) {
        self.outgoing_notifications.push(RpcNotification {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
        });
    }

    /// Queue response for transmission to the page.
    fn queue_response(&mut self, response: RpcResponse) {
        self.outgoing_responses.push(response);
    }
}

/// DOM listeners installed by the bridge, handed to the scene's lifecycle
/// manager so a full cleanup detaches them.
#[derive(Resource, Default)]
pub struct TrackedListeners(pub Vec<ListenerKey>);

/// Plugin establishing WebRPC communication layer for iframe-based deployment.
pub struct WebRpcPlugin;

impl Plugin for WebRpcPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WebRpcInterface>()
            .init_resource::<TrackedListeners>()
            .add_event::<IncomingRpcMessage>()
            .add_systems(
                Update,
                (
                    process_incoming_messages,
                    handle_rpc_messages,
                    send_outgoing_messages,
                )
                    .chain(),
            )
            .add_systems(Last, detach_message_listeners);

        #[cfg(target_arch = "wasm32")]
        app.add_systems(Startup, setup_message_listener);
    }
}

/// Owner of the JS closure behind the window `message` listener.
#[cfg(target_arch = "wasm32")]
struct MessageListener {
    key: ListenerKey,
    closure: Option<Closure<dyn FnMut(MessageEvent)>>,
}

#[cfg(target_arch = "wasm32")]
fn setup_message_listener(world: &mut World) {
    use std::sync::Arc;
    use std::sync::Mutex;

    // Thread-safe message queue for cross-thread communication.
    let message_queue: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let queue_clone = message_queue.clone();

    let closure = Closure::wrap(Box::new(move |event: MessageEvent| {
        // Filter messages to ensure they contain string data.
        if let Ok(data) = event.data().dyn_into::<js_sys::JsString>() {
            let message_str: String = data.into();

            if message_str.contains("jsonrpc") {
                if let Ok(mut queue) = queue_clone.lock() {
                    queue.push(message_str);
                }
            }
        }
    }) as Box<dyn FnMut(MessageEvent)>);

    let Some(window) = window() else {
        error!("Window object not available, RPC bridge disabled");
        return;
    };
    if let Err(e) =
        window.add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
    {
        error!("Failed to register message listener: {:?}", e);
        return;
    }

    let key = ListenerKey::new("window", "message", MESSAGE_HANDLER);
    world.resource_mut::<TrackedListeners>().0.push(key.clone());
    world.insert_non_send_resource(MessageListener {
        key,
        closure: Some(closure),
    });
    world.insert_resource(MessageQueue(message_queue));
}

/// Detach listeners released by a scene cleanup.
fn detach_message_listeners(
    mut pending: ResMut<PendingReleases>,
    #[cfg(target_arch = "wasm32")] listener: Option<NonSendMut<MessageListener>>,
) {
    if pending.listeners.is_empty() {
        return;
    }
    let released: Vec<ListenerKey> = pending.listeners.drain(..).collect();

    #[cfg(target_arch = "wasm32")]
    {
        let Some(mut listener) = listener else {
            return;
        };
        for key in released {
            if key != listener.key {
                warn!("No closure held for listener {:?}", key);
                continue;
            }
            let Some(closure) = listener.closure.take() else {
                continue;
            };
            if let Some(window) = window() {
                if let Err(e) = window.remove_event_listener_with_callback(
                    &key.event_type,
                    closure.as_ref().unchecked_ref(),
                ) {
                    error!("Failed to remove {} listener: {:?}", key.event_type, e);
                }
            }
            info!("Detached '{}' listener from {}", key.event_type, key.owner);
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        debug!("{} listeners released", released.len());
    }
}

/// Resource wrapping thread-safe message queue for WASM event handling.
#[derive(Resource)]
struct MessageQueue(std::sync::Arc<std::sync::Mutex<Vec<String>>>);

/// Event representing incoming RPC message from the page.
#[derive(Event)]
struct IncomingRpcMessage {
    content: String,
}

fn process_incoming_messages(
    message_queue: Option<Res<MessageQueue>>,
    mut message_events: EventWriter<IncomingRpcMessage>,
) {
    let Some(queue_res) = message_queue else {
        return;
    };

    let messages = if let Ok(mut queue) = queue_res.0.lock() {
        std::mem::take(&mut *queue)
    } else {
        Vec::new()
    };

    for message_str in messages {
        message_events.write(IncomingRpcMessage {
            content: message_str,
        });
    }
}

fn handle_rpc_messages(
    mut events: EventReader<IncomingRpcMessage>,
    scene: Option<Res<ActiveScene>>,
    mut rpc_interface: ResMut<WebRpcInterface>,
    mut scene_commands: EventWriter<SceneCommand>,
) {
    // One batch per frame, so requests can see what earlier ones queued.
    let mut dispatched = Vec::new();
    for event in events.read() {
        match serde_json::from_str::<RpcRequest>(&event.content) {
            Ok(request) => {
                let context = scene.as_deref().map(|active| &active.0);
                if let Some(response) = handle_rpc_request(&request, context, &mut dispatched) {
                    rpc_interface.queue_response(response);
                }
            }
            Err(parse_error) => {
                warn!("Unparseable RPC message: {}", parse_error);
                rpc_interface.send_notification(
                    "debug_message",
                    serde_json::json!({
                        "message": format!("Parse error: {}", parse_error)
                    }),
                );
            }
        }
    }
    scene_commands.write_batch(dispatched);
}

/// Handle individual RPC request, dispatching scene commands into
/// `dispatched`. Returns a response only for requests carrying an id.
pub fn handle_rpc_request<R, N>(
    request: &RpcRequest,
    scene: Option<&SceneContext<R, N>>,
    dispatched: &mut Vec<SceneCommand>,
) -> Option<RpcResponse>
where
    R: Clone + Eq + Hash,
    N: Clone + Eq,
{
    let result = match request.method.as_str() {
        "on_scroll" | "scroll" => handle_scroll(&request.params, dispatched),
        "measure_regions" => handle_measure_regions(&request.params, dispatched),
        "on_pointer_activity" | "pointer_activity" => {
            dispatched.push(SceneCommand::PointerActivity);
            Ok(serde_json::json!({ "success": true }))
        }
        "on_scroll_activity" | "scroll_activity" => {
            dispatched.push(SceneCommand::ScrollActivity);
            Ok(serde_json::json!({ "success": true }))
        }
        "trigger_color_change" => {
            handle_trigger_color_change(&request.params, scene, dispatched)
        }
        "dispose_group" => {
            handle_group(&request.params, scene, dispatched, SceneCommand::DisposeGroup)
        }
        "reinstate_group" => {
            handle_group(&request.params, scene, dispatched, SceneCommand::ReinstateGroup)
        }
        "request_group" => handle_request_group(&request.params, scene, dispatched),
        "cleanup_all" => {
            dispatched.push(SceneCommand::CleanupAll);
            Ok(serde_json::json!({ "success": true }))
        }
        "get_scene_state" => handle_get_scene_state(scene),
        "get_palette" => handle_get_palette(scene),
        _ => {
            warn!("Unknown RPC method: {}", request.method);
            Err(RpcError {
                code: -32601,
                message: "Method not found".to_string(),
                data: Some(serde_json::json!({"method": request.method})),
            })
        }
    };

    // Notifications are processed but never answered.
    let id = request.id.clone()?;

    match result {
        Ok(result_value) => Some(RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: Some(result_value),
            error: None,
            id: Some(id),
        }),
        Err(error) => Some(RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(error),
            id: Some(id),
        }),
    }
}

fn handle_scroll(
    params: &serde_json::Value,
    dispatched: &mut Vec<SceneCommand>,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    struct ScrollParams {
        offset: f32,
        #[serde(alias = "viewportHeight")]
        viewport_height: f32,
    }

    let scroll = serde_json::from_value::<ScrollParams>(params.clone()).map_err(|_| {
        RpcError::invalid_params("Expected 'offset' and 'viewport_height' parameters")
    })?;
    if !scroll.offset.is_finite()
        || !scroll.viewport_height.is_finite()
        || scroll.viewport_height <= 0.0
    {
        return Err(RpcError::invalid_params(
            "Offset must be finite and viewport height positive",
        ));
    }

    dispatched.push(SceneCommand::Scroll {
        offset: scroll.offset,
        viewport_height: scroll.viewport_height,
    });
    Ok(serde_json::json!({ "success": true }))
}

fn handle_measure_regions(
    params: &serde_json::Value,
    dispatched: &mut Vec<SceneCommand>,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    struct RegionParams {
        name: String,
        #[serde(alias = "dom_top_offset", alias = "domTopOffset")]
        top: f32,
        #[serde(alias = "dom_bottom_offset", alias = "domBottomOffset")]
        bottom: f32,
    }

    #[derive(Deserialize)]
    struct MeasureParams {
        regions: Vec<RegionParams>,
    }

    let measured = serde_json::from_value::<MeasureParams>(params.clone()).map_err(|_| {
        RpcError::invalid_params("Expected 'regions' list of { name, top, bottom }")
    })?;

    let regions = measured
        .regions
        .into_iter()
        .map(|region| {
            RegionName::from_string(&region.name)
                .map(|name| ScrollRegion::new(name, region.top, region.bottom))
                .ok_or(SceneError::UnknownRegion(region.name))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let regions = ScrollController::prepare_regions(regions)?;

    let names: Vec<&str> = regions.iter().map(|region| region.name.as_str()).collect();
    let response = serde_json::json!({
        "success": true,
        "regions": names,
    });
    dispatched.push(SceneCommand::MeasureRegions(regions));
    Ok(response)
}

fn handle_trigger_color_change<R, N>(
    params: &serde_json::Value,
    scene: Option<&SceneContext<R, N>>,
    dispatched: &mut Vec<SceneCommand>,
) -> Result<serde_json::Value, RpcError>
where
    R: Clone + Eq + Hash,
    N: Clone + Eq,
{
    #[derive(Deserialize)]
    struct ColorParams {
        #[serde(alias = "color_id", alias = "targetColorId")]
        color: String,
    }

    let color_params = serde_json::from_value::<ColorParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'color' parameter"))?;
    let scene = scene.ok_or_else(RpcError::scene_not_ready)?;

    // Whether the sequence actually starts is only known once the command
    // runs; the page learns it from `color_change_started`.
    let already_queued = dispatched
        .iter()
        .any(|command| matches!(command, SceneCommand::TriggerColorChange(_)));
    let queued = scene.can_change_color(&color_params.color)? && !already_queued;
    if queued {
        dispatched.push(SceneCommand::TriggerColorChange(color_params.color.clone()));
        info!("Colour change queued: {}", color_params.color);
    }

    Ok(serde_json::json!({
        "success": true,
        "queued": queued,
        "color": color_params.color,
    }))
}

fn handle_group<R, N>(
    params: &serde_json::Value,
    scene: Option<&SceneContext<R, N>>,
    dispatched: &mut Vec<SceneCommand>,
    command: fn(String) -> SceneCommand,
) -> Result<serde_json::Value, RpcError>
where
    R: Clone + Eq + Hash,
    N: Clone + Eq,
{
    #[derive(Deserialize)]
    struct GroupParams {
        group: String,
    }

    let group_params = serde_json::from_value::<GroupParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'group' parameter"))?;
    let scene = scene.ok_or_else(RpcError::scene_not_ready)?;
    if !scene.lifecycle().has_group(&group_params.group) {
        return Err(SceneError::UnknownGroup(group_params.group).into());
    }

    let response = serde_json::json!({
        "success": true,
        "group": group_params.group,
    });
    dispatched.push(command(group_params.group));
    Ok(response)
}

fn handle_request_group<R, N>(
    params: &serde_json::Value,
    scene: Option<&SceneContext<R, N>>,
    dispatched: &mut Vec<SceneCommand>,
) -> Result<serde_json::Value, RpcError>
where
    R: Clone + Eq + Hash,
    N: Clone + Eq,
{
    #[derive(Deserialize)]
    struct RequestGroupParams {
        group: String,
        intent: LifecycleIntent,
    }

    let request = serde_json::from_value::<RequestGroupParams>(params.clone()).map_err(|_| {
        RpcError::invalid_params("Expected 'group' and 'intent' (dispose or reinstate)")
    })?;
    let scene = scene.ok_or_else(RpcError::scene_not_ready)?;
    if !scene.lifecycle().has_group(&request.group) {
        return Err(SceneError::UnknownGroup(request.group).into());
    }

    let response = serde_json::json!({
        "success": true,
        "group": request.group,
        "intent": request.intent,
    });
    dispatched.push(SceneCommand::RequestGroup {
        name: request.group,
        intent: request.intent,
    });
    Ok(response)
}

fn handle_get_scene_state<R, N>(
    scene: Option<&SceneContext<R, N>>,
) -> Result<serde_json::Value, RpcError>
where
    R: Clone + Eq + Hash,
    N: Clone + Eq,
{
    let scene = scene.ok_or_else(RpcError::scene_not_ready)?;
    serde_json::to_value(scene.state_summary())
        .map_err(|e| RpcError::internal_error(&format!("Failed to serialise state: {}", e)))
}

fn handle_get_palette<R, N>(
    scene: Option<&SceneContext<R, N>>,
) -> Result<serde_json::Value, RpcError>
where
    R: Clone + Eq + Hash,
    N: Clone + Eq,
{
    let scene = scene.ok_or_else(RpcError::scene_not_ready)?;
    Ok(serde_json::json!({
        "colors": scene.palette(),
        "settled": scene.color().settled_color(),
    }))
}

/// Send queued notifications and responses to the page.
fn send_outgoing_messages(mut rpc_interface: ResMut<WebRpcInterface>) {
    // Send notifications first.
    for notification in rpc_interface.outgoing_notifications.drain(..) {
        send_message_to_parent(&notification);
    }

    // Send responses second to maintain order.
    for response in rpc_interface.outgoing_responses.drain(..) {
        send_message_to_parent(&response);
    }
}

/// Send serialized message to parent window (host page).
fn send_message_to_parent<T: Serialize>(message: &T) {
    #[cfg(target_arch = "wasm32")]
    {
        match serde_json::to_string(message) {
            Ok(json) => {
                if let Some(window) = window() {
                    if let Some(parent) = window.parent().ok().flatten() {
                        if let Err(e) = parent.post_message(&JsValue::from_str(&json), "*") {
                            error!("Failed to send message to parent: {:?}", e);
                        }
                    } else {
                        warn!("No parent window available for message transmission");
                    }
                } else {
                    error!("Window object not available");
                }
            }
            Err(e) => {
                error!("Failed to serialize message: {}", e);
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        // No-op for non-WASM targets.
        let _ = message;
    }
}

/// Standard RPC error codes and constructors.
impl RpcError {
    pub fn invalid_params(message: &str) -> Self {
        Self {
            code: -32602,
            message: message.to_string(),
            data: None,
        }
    }

    pub fn internal_error(message: &str) -> Self {
        Self {
            code: -32603,
            message: message.to_string(),
            data: None,
        }
    }

    pub fn scene_not_ready() -> Self {
        Self {
            code: -32000,
            message: "Scene not ready".to_string(),
            data: None,
        }
    }
}

impl From<SceneError> for RpcError {
    fn from(error: SceneError) -> Self {
        Self::invalid_params(&error.to_string())
    }
}
