//! Caching environment lookups for application code.
//!
//! [`VarProxy`] looks each name up once for its whole lifetime and
//! remembers the raw answer, absence included. Defaults are applied on the
//! way out, so two callers asking for the same unset variable with
//! different defaults each get their own.
//!
//! The optional observer is told about every name exactly once, which makes
//! it a cheap way to record which variables a running service really reads.

use std::collections::HashMap;
use std::fmt;

use parking_lot::{ReentrantMutex, RwLock};

use crate::env::ProcessEnv;

/// Source of raw values.
pub type Lookup = dyn Fn(&str) -> Option<String> + Send + Sync;

/// Called once per name with whether the variable was set.
pub type Observer = dyn Fn(&str, bool) + Send + Sync;

pub struct VarProxy {
    lookup: Box<Lookup>,
    observer: Option<Box<Observer>>,
    cache: RwLock<HashMap<String, Option<String>>>,
    // Reentrant: the lookup or observer may read through this proxy.
    miss_lock: ReentrantMutex<()>,
}

impl VarProxy {
    pub fn new<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            lookup: Box::new(lookup),
            observer: None,
            cache: RwLock::new(HashMap::new()),
            miss_lock: ReentrantMutex::new(()),
        }
    }

    /// Proxy over the process environment.
    pub fn from_process_env() -> Self {
        Self::new(ProcessEnv::lookup)
    }

    pub fn with_observer<F>(mut self, observer: F) -> Self
    where
        F: Fn(&str, bool) + Send + Sync + 'static,
    {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Value of `name`, or `default` when unset.
    pub fn get(&self, name: &str, default: Option<&str>) -> Option<String> {
        let raw = match self.cached(name) {
            Some(raw) => raw,
            None => self.load(name),
        };
        raw.or_else(|| default.map(str::to_string))
    }

    pub fn get_or(&self, name: &str, default: &str) -> String {
        self.get(name, Some(default))
            .unwrap_or_else(|| default.to_string())
    }

    /// True once `name` has been looked up.
    pub fn is_cached(&self, name: &str) -> bool {
        self.cache.read().contains_key(name)
    }

    /// Number of distinct names looked up so far.
    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.read().is_empty()
    }

    fn cached(&self, name: &str) -> Option<Option<String>> {
        self.cache.read().get(name).cloned()
    }

    fn load(&self, name: &str) -> Option<String> {
        let _guard = self.miss_lock.lock();

        // another thread may have won the race while we waited
        if let Some(raw) = self.cached(name) {
            return raw;
        }

        let raw = (self.lookup)(name);
        self.cache.write().insert(name.to_string(), raw.clone());

        tracing::trace!(name, found = raw.is_some(), "first lookup");
        if let Some(observer) = &self.observer {
            observer(name, raw.is_some());
        }
        raw
    }
}

impl fmt::Debug for VarProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VarProxy")
            .field("cached", &self.len())
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex, OnceLock};

    fn counting(values: &'static [(&'static str, &'static str)]) -> (VarProxy, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let proxy = VarProxy::new(move |name| {
            counter.fetch_add(1, Ordering::SeqCst);
            values
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string())
        });
        (proxy, calls)
    }

    #[test]
    fn test_value_is_cached() {
        let (proxy, calls) = counting(&[("HOST", "db")]);

        assert_eq!(proxy.get("HOST", None), Some("db".to_string()));
        assert_eq!(proxy.get("HOST", Some("ignored")), Some("db".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_absence_is_cached_and_defaults_vary() {
        let (proxy, calls) = counting(&[]);

        assert_eq!(proxy.get("PORT", Some("8080")), Some("8080".to_string()));
        assert_eq!(proxy.get("PORT", Some("9090")), Some("9090".to_string()));
        assert_eq!(proxy.get("PORT", None), None);
        assert_eq!(proxy.get_or("PORT", "1"), "1");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(proxy.is_cached("PORT"));
        assert_eq!(proxy.len(), 1);
    }

    #[test]
    fn test_observer_fires_once_per_name() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        let proxy = VarProxy::new(|name| (name == "SET").then(|| "yes".to_string()))
            .with_observer(move |name, found| log.lock().unwrap().push((name.to_string(), found)));

        proxy.get("SET", None);
        proxy.get("UNSET", Some("d"));
        proxy.get("SET", None);
        proxy.get("UNSET", None);

        assert_eq!(
            *seen.lock().unwrap(),
            vec![("SET".to_string(), true), ("UNSET".to_string(), false)]
        );
    }

    #[test]
    fn test_observer_may_read_through_proxy() {
        let slot: Arc<OnceLock<Arc<VarProxy>>> = Arc::new(OnceLock::new());
        let inner = Arc::clone(&slot);
        let proxy = Arc::new(
            VarProxy::new(|name| Some(format!("value-of-{}", name))).with_observer(move |name, _| {
                let proxy = inner.get().unwrap();
                // same name hits the cache, a new name re-enters the lock
                assert_eq!(proxy.get(name, None), Some(format!("value-of-{}", name)));
                if name == "FIRST" {
                    proxy.get("SECOND", None);
                }
            }),
        );
        slot.set(Arc::clone(&proxy)).unwrap();

        assert_eq!(proxy.get("FIRST", None), Some("value-of-FIRST".to_string()));
        assert!(proxy.is_cached("SECOND"));
    }
}
