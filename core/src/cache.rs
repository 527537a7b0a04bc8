use std::num::NonZeroUsize;
use std::sync::Arc;

use rapid_utils_cache::BlockingLruCache;
use tracing::trace;

use crate::config::DEFAULT_CACHE_CAPACITY;
use crate::types::Query;
use crate::types::ResultPage;

/// Pages keyed by [`Query::cache_key`]. Cloning yields another handle to the
/// same store, which is how two widgets opt into sharing results.
#[derive(Clone)]
pub struct ResultCache {
    inner: Arc<BlockingLruCache<String, ResultPage>>,
}

impl ResultCache {
    /// `capacity` of zero is bumped to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Arc::new(BlockingLruCache::new(capacity)),
        }
    }

    pub fn get(&self, key: &str) -> Option<ResultPage> {
        self.inner.get(key)
    }

    pub fn put(&self, key: impl Into<String>, page: ResultPage) {
        if let Some((evicted, _)) = self.inner.insert(key.into(), page) {
            trace!(key = %evicted, "evicted cached page");
        }
    }

    pub fn get_query(&self, query: &Query) -> Option<ResultPage> {
        self.get(&query.cache_key())
    }

    pub fn put_query(&self, query: &Query, page: ResultPage) {
        self.put(query.cache_key(), page);
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity().get()
    }

    pub fn clear(&self) {
        self.inner.clear();
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SelectOption;
    use pretty_assertions::assert_eq;

    fn page(name: &str) -> ResultPage {
        ResultPage::new(vec![SelectOption::new(name, name)], false)
    }

    #[test]
    fn overflow_evicts_least_recently_accessed() {
        let cache = ResultCache::new(20);
        for i in 0..20 {
            cache.put(format!("q{i}_0"), page(&i.to_string()));
        }
        // Touch the oldest so the second-oldest becomes the victim.
        assert!(cache.get("q0_0").is_some());
        cache.put("q20_0", page("20"));

        assert_eq!(20, cache.len());
        assert_eq!(None, cache.get("q1_0"));
        for i in (0..=20).filter(|i| *i != 1) {
            assert!(cache.get(&format!("q{i}_0")).is_some(), "q{i}_0 should survive");
        }
    }

    #[test]
    fn capacity_plus_one_drops_first_untouched_key() {
        let cache = ResultCache::new(3);
        for i in 0..4 {
            cache.put(format!("k{i}"), page("x"));
        }
        assert_eq!(None, cache.get("k0"));
        assert_eq!(3, cache.len());
        assert_eq!(3, cache.capacity());
    }

    #[test]
    fn clones_share_storage() {
        let a = ResultCache::new(4);
        let b = a.clone();
        a.put_query(&Query::first_page("x"), page("x"));
        assert_eq!(Some(page("x")), b.get_query(&Query::first_page("x")));
    }

    #[test]
    fn zero_capacity_is_clamped() {
        assert_eq!(1, ResultCache::new(0).capacity());
    }
}
