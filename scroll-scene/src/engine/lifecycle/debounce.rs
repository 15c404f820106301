/// Collects keyed requests and releases each one once no new request for
/// the same key has arrived for `window` seconds. A later request for a key
/// replaces the earlier one and restarts that key's window only.
#[derive(Debug, Clone)]
pub struct Debouncer<K, V> {
    window: f64,
    pending: Vec<Pending<K, V>>,
}

#[derive(Debug, Clone)]
struct Pending<K, V> {
    key: K,
    value: V,
    requested_at: f64,
}

impl<K: PartialEq, V> Debouncer<K, V> {
    pub fn new(window: f64) -> Self {
        Self {
            window: window.max(0.0),
            pending: Vec::new(),
        }
    }

    pub fn request(&mut self, key: K, value: V, now: f64) {
        match self.pending.iter_mut().find(|entry| entry.key == key) {
            Some(entry) => {
                entry.value = value;
                entry.requested_at = now;
            }
            None => self.pending.push(Pending {
                key,
                value,
                requested_at: now,
            }),
        }
    }

    #[cfg(test)]
    pub(crate) fn is_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Drain the requests whose own window has elapsed, in arrival order.
    pub fn take_ready(&mut self, now: f64) -> Vec<(K, V)> {
        let window = self.window;
        let (ready, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|entry| now - entry.requested_at >= window);
        self.pending = waiting;
        ready
            .into_iter()
            .map(|entry| (entry.key, entry.value))
            .collect()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_collapses_to_latest_value() {
        let mut debouncer = Debouncer::new(0.15);
        for step in 0..10 {
            debouncer.request("product", step, step as f64 * 0.05);
        }
        assert!(debouncer.take_ready(0.5).is_empty());
        assert_eq!(debouncer.take_ready(0.7), vec![("product", 9)]);
        assert!(!debouncer.is_pending());
        assert!(debouncer.take_ready(5.0).is_empty());
    }

    #[test]
    fn each_key_settles_on_its_own_deadline() {
        let mut debouncer = Debouncer::new(0.15);
        debouncer.request("cell", 'd', 0.0);
        debouncer.request("product", 'r', 0.2);
        // A later request for another key does not push back "cell".
        assert_eq!(debouncer.take_ready(0.15), vec![("cell", 'd')]);
        assert!(debouncer.is_pending());
        assert!(debouncer.take_ready(0.3).is_empty());
        assert_eq!(debouncer.take_ready(0.35), vec![("product", 'r')]);
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn keys_ready_in_the_same_flush_keep_arrival_order() {
        let mut debouncer = Debouncer::new(0.1);
        debouncer.request("cell", 'd', 0.0);
        debouncer.request("product", 'r', 0.05);
        assert_eq!(debouncer.take_ready(0.1), vec![("cell", 'd')]);
        debouncer.request("cell", 'r', 0.12);
        assert_eq!(debouncer.take_ready(0.3), vec![("product", 'r'), ("cell", 'r')]);
    }
}
