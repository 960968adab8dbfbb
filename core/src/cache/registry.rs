//! Bidirectional tag registry.
//!
//! Tracks which cache entries provide which tags, enabling invalidation to
//! find affected entries without scanning the whole cache, and eviction to
//! clean up its index rows.

use std::collections::{HashMap, HashSet};

use super::keys::{QueryKey, Tag};

/// Maps tag → providing keys and key → provided tags.
#[derive(Debug, Default)]
pub(crate) struct TagRegistry {
    tag_to_keys: HashMap<Tag, HashSet<QueryKey>>,
    key_to_tags: HashMap<QueryKey, HashSet<Tag>>,
}

impl TagRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Register the tags a cache entry provides, replacing any previous
    /// registration for the same key (a refetched list may provide a
    /// different set of per-item tags).
    pub(crate) fn register(&mut self, key: QueryKey, tags: HashSet<Tag>) {
        self.unregister(&key);
        for tag in &tags {
            self.tag_to_keys.entry(*tag).or_default().insert(key.clone());
        }
        self.key_to_tags.insert(key, tags);
    }

    /// All cache keys currently providing `tag`.
    pub(crate) fn keys_for_tag(&self, tag: &Tag) -> HashSet<QueryKey> {
        self.tag_to_keys.get(tag).cloned().unwrap_or_default()
    }

    /// Remove a key and its index rows. Called on eviction.
    pub(crate) fn unregister(&mut self, key: &QueryKey) {
        let Some(tags) = self.key_to_tags.remove(key) else {
            return;
        };
        for tag in tags {
            if let Some(keys) = self.tag_to_keys.get_mut(&tag) {
                keys.remove(key);
                if keys.is_empty() {
                    self.tag_to_keys.remove(&tag);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::keys::Query;

    fn list_key() -> QueryKey {
        Query::ListTodos.key()
    }

    fn get_key(id: u64) -> QueryKey {
        Query::GetTodo(id).key()
    }

    #[test]
    fn register_indexes_every_tag() {
        let mut registry = TagRegistry::new();
        registry.register(
            list_key(),
            HashSet::from([Tag::TodoList, Tag::Todo(1), Tag::Todo(2)]),
        );

        assert!(registry.keys_for_tag(&Tag::TodoList).contains(&list_key()));
        assert!(registry.keys_for_tag(&Tag::Todo(2)).contains(&list_key()));
        assert!(registry.keys_for_tag(&Tag::Todo(3)).is_empty());
    }

    #[test]
    fn reregister_replaces_previous_tags() {
        let mut registry = TagRegistry::new();
        registry.register(list_key(), HashSet::from([Tag::TodoList, Tag::Todo(1)]));
        registry.register(list_key(), HashSet::from([Tag::TodoList, Tag::Todo(2)]));

        assert!(registry.keys_for_tag(&Tag::Todo(1)).is_empty());
        assert!(registry.keys_for_tag(&Tag::Todo(2)).contains(&list_key()));
    }

    #[test]
    fn unregister_cleans_both_directions() {
        let mut registry = TagRegistry::new();
        registry.register(list_key(), HashSet::from([Tag::TodoList, Tag::Todo(1)]));
        registry.register(get_key(1), HashSet::from([Tag::Todo(1)]));

        registry.unregister(&list_key());

        assert!(registry.keys_for_tag(&Tag::TodoList).is_empty());
        let remaining = registry.keys_for_tag(&Tag::Todo(1));
        assert_eq!(remaining, HashSet::from([get_key(1)]));
    }

    #[test]
    fn unregister_unknown_key_is_a_no_op() {
        let mut registry = TagRegistry::new();
        registry.unregister(&get_key(9));
        assert!(registry.keys_for_tag(&Tag::Todo(9)).is_empty());
    }
}
