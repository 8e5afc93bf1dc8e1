use crate::media_type::essence;
use mime::Mime;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Anything registered under a media type.
pub trait MediaTyped {
    fn content_type(&self) -> &Mime;
}

/// An ordered map from bare media type to `T`.
///
/// The first entry ever registered is the default. Registering a media type
/// twice replaces the exact match, but never the default.
pub struct MediaTypeRegistry<T: ?Sized> {
    entries: HashMap<String, Arc<T>>,
    default: Option<Arc<T>>,
}

impl<T: ?Sized + MediaTyped> MediaTypeRegistry<T> {
    pub fn new() -> Self {
        Self { entries: HashMap::new(), default: None }
    }

    pub fn register(&mut self, entry: Arc<T>) {
        let key = essence(entry.content_type().as_ref());
        if self.default.is_none() {
            self.default = Some(Arc::clone(&entry));
        }
        self.entries.insert(key, entry);
    }

    /// Exact match on `media_type`, then the default, then nothing.
    pub fn resolve(&self, media_type: &str) -> Option<&Arc<T>> {
        match self.entries.get(media_type) {
            Some(entry) => {
                trace!(media_type, "matched registered media type");
                Some(entry)
            }
            None => self.default.as_ref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.default.is_none()
    }
}

impl<T: ?Sized + MediaTyped> Default for MediaTypeRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized + MediaTyped> fmt::Debug for MediaTypeRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys = self.entries.keys().collect::<Vec<_>>();
        keys.sort();
        f.debug_struct("MediaTypeRegistry")
            .field("media_types", &keys)
            .field("default", &self.default.as_ref().map(|d| d.content_type().to_string()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{MediaTypeRegistry, MediaTyped};
    use mime::Mime;
    use std::sync::Arc;

    struct Entry {
        mime: Mime,
        tag: &'static str,
    }

    impl MediaTyped for Entry {
        fn content_type(&self) -> &Mime {
            &self.mime
        }
    }

    fn entry(mime: &str, tag: &'static str) -> Arc<Entry> {
        Arc::new(Entry { mime: mime.parse().unwrap(), tag })
    }

    fn resolved(registry: &MediaTypeRegistry<Entry>, media_type: &str) -> Option<&'static str> {
        registry.resolve(media_type).map(|e| e.tag)
    }

    #[test]
    fn empty_registry_never_matches() {
        let registry = MediaTypeRegistry::<Entry>::new();
        assert!(registry.is_empty());
        assert_eq!(resolved(&registry, "application/json"), None);
        assert_eq!(resolved(&registry, ""), None);
    }

    #[test]
    fn exact_match_wins() {
        let mut registry = MediaTypeRegistry::new();
        registry.register(entry("application/json", "json"));
        registry.register(entry("application/yaml", "yaml"));

        assert_eq!(resolved(&registry, "application/json"), Some("json"));
        assert_eq!(resolved(&registry, "application/yaml"), Some("yaml"));
    }

    #[test]
    fn first_registered_is_default() {
        let mut registry = MediaTypeRegistry::new();
        registry.register(entry("application/json", "json"));
        registry.register(entry("application/yaml", "yaml"));

        assert_eq!(resolved(&registry, ""), Some("json"));
        assert_eq!(resolved(&registry, "text/html"), Some("json"));
        assert_eq!(resolved(&registry, "*/*"), Some("json"));
    }

    #[test]
    fn last_duplicate_wins_but_default_stays() {
        let mut registry = MediaTypeRegistry::new();
        registry.register(entry("application/json", "first"));
        registry.register(entry("application/json", "second"));

        assert_eq!(resolved(&registry, "application/json"), Some("second"));
        assert_eq!(resolved(&registry, "text/plain"), Some("first"));
    }

    #[test]
    fn registered_parameters_are_ignored_for_lookup() {
        let mut registry = MediaTypeRegistry::new();
        registry.register(entry("text/plain", "other"));
        registry.register(entry("application/json; charset=utf-8", "json"));

        assert_eq!(resolved(&registry, "application/json"), Some("json"));
    }
}
