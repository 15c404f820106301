use bevy::log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use super::debounce::Debouncer;
use crate::engine::core::error::SceneError;

/// Engine side of resource release. `R` is a GPU resource handle, `N` a
/// scene node id.
pub trait SceneResources<R, N> {
    fn release_resource(&mut self, resource: &R);
    fn remove_listener(&mut self, listener: &ListenerKey);
    /// Current visibility, or `None` if the node no longer exists.
    fn node_visible(&self, node: &N) -> Option<bool>;
    fn set_node_visible(&mut self, node: &N, visible: bool);
    fn despawn_node(&mut self, node: &N);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HandlerId(pub u64);

/// Exact identity of a registered DOM listener.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListenerKey {
    pub owner: String,
    pub event_type: String,
    pub handler: HandlerId,
}

impl ListenerKey {
    pub fn new(owner: &str, event_type: &str, handler: HandlerId) -> Self {
        Self {
            owner: owner.to_string(),
            event_type: event_type.to_string(),
            handler,
        }
    }
}

/// How a group is taken down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupMode {
    /// Nodes are hidden and can be reinstated with their prior visibility.
    Hide,
    /// Resources are released and nodes despawned.
    Destroy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleIntent {
    Dispose,
    Reinstate,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    pub resources: usize,
    pub listeners: usize,
    pub nodes: usize,
}

#[derive(Debug, Clone)]
struct DisposalGroup<R, N> {
    mode: GroupMode,
    nodes: Vec<N>,
    resources: Vec<R>,
    disposed: bool,
    captured: Vec<(N, bool)>,
}

#[derive(Debug, Clone)]
pub struct ResourceLifecycleManager<R, N> {
    resources: HashSet<R>,
    listeners: HashMap<String, HashMap<String, HashSet<HandlerId>>>,
    groups: HashMap<String, DisposalGroup<R, N>>,
    debouncer: Debouncer<String, LifecycleIntent>,
}

impl<R, N> ResourceLifecycleManager<R, N>
where
    R: Clone + Eq + Hash,
    N: Clone + Eq,
{
    pub fn new(debounce_window: f64) -> Self {
        Self {
            resources: HashSet::new(),
            listeners: HashMap::new(),
            groups: HashMap::new(),
            debouncer: Debouncer::new(debounce_window),
        }
    }

    pub fn track_resource(&mut self, resource: R) -> bool {
        self.resources.insert(resource)
    }

    pub fn is_tracked(&self, resource: &R) -> bool {
        self.resources.contains(resource)
    }

    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }

    pub fn track_listener(&mut self, listener: ListenerKey) -> bool {
        self.listeners
            .entry(listener.owner)
            .or_default()
            .entry(listener.event_type)
            .or_default()
            .insert(listener.handler)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners
            .values()
            .flat_map(|types| types.values())
            .map(HashSet::len)
            .sum()
    }

    /// Detach one listener. Returns `false` if it was not tracked.
    pub fn remove_listener<S: SceneResources<R, N>>(
        &mut self,
        listener: &ListenerKey,
        resources: &mut S,
    ) -> bool {
        let Some(types) = self.listeners.get_mut(&listener.owner) else {
            return false;
        };
        let Some(handlers) = types.get_mut(&listener.event_type) else {
            return false;
        };
        if !handlers.remove(&listener.handler) {
            return false;
        }
        if handlers.is_empty() {
            types.remove(&listener.event_type);
        }
        if types.is_empty() {
            self.listeners.remove(&listener.owner);
        }
        resources.remove_listener(listener);
        true
    }

    /// Register (or re-register) a logical group. Its resources join the
    /// tracked set so a full cleanup still reaches them. Re-registering a
    /// destroyed group re-arms it with fresh members.
    pub fn register_group(
        &mut self,
        name: &str,
        mode: GroupMode,
        nodes: Vec<N>,
        resources: Vec<R>,
    ) {
        for resource in &resources {
            self.resources.insert(resource.clone());
        }
        self.groups.insert(
            name.to_string(),
            DisposalGroup {
                mode,
                nodes,
                resources,
                disposed: false,
                captured: Vec::new(),
            },
        );
    }

    pub fn has_group(&self, name: &str) -> bool {
        self.groups.contains_key(name)
    }

    pub fn is_disposed(&self, name: &str) -> Option<bool> {
        self.groups.get(name).map(|group| group.disposed)
    }

    pub fn disposed_groups(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .groups
            .iter()
            .filter(|(_, group)| group.disposed)
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    /// Take a group down. Returns `Ok(false)` if it is already disposed.
    pub fn dispose<S: SceneResources<R, N>>(
        &mut self,
        name: &str,
        resources: &mut S,
    ) -> Result<bool, SceneError> {
        let group = self
            .groups
            .get_mut(name)
            .ok_or_else(|| SceneError::UnknownGroup(name.to_string()))?;
        if group.disposed {
            debug!("Group '{}' already disposed", name);
            return Ok(false);
        }

        match group.mode {
            GroupMode::Hide => {
                group.captured.clear();
                for node in &group.nodes {
                    match resources.node_visible(node) {
                        Some(visible) => {
                            group.captured.push((node.clone(), visible));
                            resources.set_node_visible(node, false);
                        }
                        None => warn!("Group '{}' references a missing node", name),
                    }
                }
            }
            GroupMode::Destroy => {
                for resource in &group.resources {
                    if self.resources.remove(resource) {
                        resources.release_resource(resource);
                    }
                }
                for node in &group.nodes {
                    resources.despawn_node(node);
                }
            }
        }

        group.disposed = true;
        info!("Group '{}' disposed ({:?})", name, group.mode);
        Ok(true)
    }

    /// Restore a hidden group to the visibility captured at disposal.
    /// Returns `Ok(false)` if the group is live or was destroyed.
    pub fn reinstate<S: SceneResources<R, N>>(
        &mut self,
        name: &str,
        resources: &mut S,
    ) -> Result<bool, SceneError> {
        let group = self
            .groups
            .get_mut(name)
            .ok_or_else(|| SceneError::UnknownGroup(name.to_string()))?;
        if !group.disposed {
            return Ok(false);
        }
        if group.mode == GroupMode::Destroy {
            warn!("Group '{}' was destroyed; register it again instead", name);
            return Ok(false);
        }

        for (node, visible) in group.captured.drain(..) {
            resources.set_node_visible(&node, visible);
        }
        group.disposed = false;
        info!("Group '{}' reinstated", name);
        Ok(true)
    }

    /// Debounced entry point for bursts of scroll-driven requests.
    pub fn request(
        &mut self,
        name: &str,
        intent: LifecycleIntent,
        now: f64,
    ) -> Result<(), SceneError> {
        if !self.groups.contains_key(name) {
            return Err(SceneError::UnknownGroup(name.to_string()));
        }
        self.debouncer.request(name.to_string(), intent, now);
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn has_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Apply debounced requests once the window has elapsed. Returns the
    /// requests that changed a group's state.
    pub fn flush<S: SceneResources<R, N>>(
        &mut self,
        now: f64,
        resources: &mut S,
    ) -> Vec<(String, LifecycleIntent)> {
        let mut applied = Vec::new();
        for (name, intent) in self.debouncer.take_ready(now) {
            let result = match intent {
                LifecycleIntent::Dispose => self.dispose(&name, resources),
                LifecycleIntent::Reinstate => self.reinstate(&name, resources),
            };
            match result {
                Ok(true) => applied.push((name, intent)),
                Ok(false) => {}
                Err(error) => warn!("Debounced {:?} failed: {}", intent, error),
            }
        }
        applied
    }

    /// Release everything unconditionally. A second call finds nothing left.
    pub fn cleanup_all<S: SceneResources<R, N>>(&mut self, resources: &mut S) -> CleanupReport {
        let mut report = CleanupReport::default();

        for (_, group) in self.groups.drain() {
            if group.mode == GroupMode::Destroy && group.disposed {
                continue;
            }
            for node in &group.nodes {
                resources.despawn_node(node);
                report.nodes += 1;
            }
        }

        for resource in self.resources.drain() {
            resources.release_resource(&resource);
            report.resources += 1;
        }

        for (owner, types) in self.listeners.drain() {
            for (event_type, handlers) in types {
                for handler in handlers {
                    resources.remove_listener(&ListenerKey {
                        owner: owner.clone(),
                        event_type: event_type.clone(),
                        handler,
                    });
                    report.listeners += 1;
                }
            }
        }

        self.debouncer.clear();
        if report != CleanupReport::default() {
            info!(
                "Scene cleanup released {} resources, {} listeners, {} nodes",
                report.resources, report.listeners, report.nodes
            );
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct MockScene {
        visible: HashMap<u32, bool>,
        released: Vec<&'static str>,
        removed_listeners: Vec<ListenerKey>,
        despawned: Vec<u32>,
    }

    impl SceneResources<&'static str, u32> for MockScene {
        fn release_resource(&mut self, resource: &&'static str) {
            self.released.push(*resource);
        }
        fn remove_listener(&mut self, listener: &ListenerKey) {
            self.removed_listeners.push(listener.clone());
        }
        fn node_visible(&self, node: &u32) -> Option<bool> {
            self.visible.get(node).copied()
        }
        fn set_node_visible(&mut self, node: &u32, visible: bool) {
            if let Some(v) = self.visible.get_mut(node) {
                *v = visible;
            }
        }
        fn despawn_node(&mut self, node: &u32) {
            self.visible.remove(node);
            self.despawned.push(*node);
        }
    }

    fn scene() -> MockScene {
        let mut scene = MockScene::default();
        scene.visible.insert(1, true);
        scene.visible.insert(2, false);
        scene.visible.insert(3, true);
        scene
    }

    fn manager() -> ResourceLifecycleManager<&'static str, u32> {
        let mut manager = ResourceLifecycleManager::new(0.15);
        manager.register_group("cell", GroupMode::Hide, vec![1, 2], vec!["cell-mesh"]);
        manager.register_group(
            "product",
            GroupMode::Destroy,
            vec![3],
            vec!["pod-mesh", "pod-material"],
        );
        manager.track_resource("star-mesh");
        manager
    }

    #[test]
    fn repeated_dispose_releases_once() {
        let mut scene = scene();
        let mut manager = manager();
        assert_eq!(manager.dispose("product", &mut scene), Ok(true));
        for _ in 0..4 {
            assert_eq!(manager.dispose("product", &mut scene), Ok(false));
        }
        scene.released.sort();
        assert_eq!(scene.released, vec!["pod-material", "pod-mesh"]);
        assert_eq!(scene.despawned, vec![3]);
        assert!(!manager.is_tracked(&"pod-mesh"));
    }

    #[test]
    fn reinstate_restores_captured_visibility() {
        let mut scene = scene();
        let mut manager = manager();
        manager.dispose("cell", &mut scene).unwrap();
        assert_eq!(scene.visible[&1], false);
        assert_eq!(scene.visible[&2], false);

        assert_eq!(manager.reinstate("cell", &mut scene), Ok(true));
        assert_eq!(scene.visible[&1], true);
        assert_eq!(scene.visible[&2], false);
        assert_eq!(manager.reinstate("cell", &mut scene), Ok(false));
        // Hide mode never releases GPU resources.
        assert!(scene.released.is_empty());
    }

    #[test]
    fn destroyed_group_cannot_be_reinstated_until_registered_again() {
        let mut scene = scene();
        let mut manager = manager();
        manager.dispose("product", &mut scene).unwrap();
        assert_eq!(manager.reinstate("product", &mut scene), Ok(false));

        scene.visible.insert(4, true);
        manager.register_group("product", GroupMode::Destroy, vec![4], vec!["pod-mesh-2"]);
        assert_eq!(manager.is_disposed("product"), Some(false));
        assert_eq!(manager.dispose("product", &mut scene), Ok(true));
        assert_eq!(scene.despawned, vec![3, 4]);
        assert!(scene.released.contains(&"pod-mesh-2"));
    }

    #[test]
    fn unknown_group_is_an_error() {
        let mut scene = scene();
        let mut manager = manager();
        assert_eq!(
            manager.dispose("footer", &mut scene),
            Err(SceneError::UnknownGroup("footer".into()))
        );
        assert!(manager.request("footer", LifecycleIntent::Dispose, 0.0).is_err());
    }

    #[test]
    fn debounced_requests_collapse_into_one_pass() {
        let mut scene = scene();
        let mut manager = manager();
        for i in 0..20 {
            let intent = if i % 2 == 0 {
                LifecycleIntent::Dispose
            } else {
                LifecycleIntent::Reinstate
            };
            manager.request("cell", intent, i as f64 * 0.01).unwrap();
        }
        manager.request("cell", LifecycleIntent::Dispose, 0.2).unwrap();

        assert!(manager.flush(0.25, &mut scene).is_empty());
        assert_eq!(
            manager.flush(0.4, &mut scene),
            vec![("cell".to_string(), LifecycleIntent::Dispose)]
        );
        assert_eq!(manager.is_disposed("cell"), Some(true));
        assert!(!manager.has_pending());
    }

    #[test]
    fn listeners_are_removed_exactly() {
        let mut scene = scene();
        let mut manager = manager();
        let scroll = ListenerKey::new("window", "scroll", HandlerId(1));
        let message = ListenerKey::new("window", "message", HandlerId(2));
        assert!(manager.track_listener(scroll.clone()));
        assert!(!manager.track_listener(scroll.clone()));
        manager.track_listener(message.clone());
        assert_eq!(manager.listener_count(), 2);

        assert!(manager.remove_listener(&scroll, &mut scene));
        assert!(!manager.remove_listener(&scroll, &mut scene));
        assert_eq!(scene.removed_listeners, vec![scroll]);
        assert_eq!(manager.listener_count(), 1);
    }

    #[test]
    fn cleanup_all_drains_everything_once() {
        let mut scene = scene();
        let mut manager = manager();
        manager.track_listener(ListenerKey::new("canvas", "pointermove", HandlerId(7)));
        manager.dispose("product", &mut scene).unwrap();

        let report = manager.cleanup_all(&mut scene);
        assert_eq!(
            report,
            CleanupReport {
                resources: 2,
                listeners: 1,
                nodes: 2,
            }
        );
        let mut released = scene.released.clone();
        released.sort();
        assert_eq!(
            released,
            vec!["cell-mesh", "pod-material", "pod-mesh", "star-mesh"]
        );

        assert_eq!(manager.cleanup_all(&mut scene), CleanupReport::default());
        assert!(!manager.has_group("cell"));
    }
}
