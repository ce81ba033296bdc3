use ahash::AHashMap;

use crate::{exception::ScanResult, format::ArgSpec};

/// Default number of distinct format strings a [`SpecCache`] remembers.
pub const DEFAULT_SPEC_CACHE_CAPACITY: usize = 64;

/// Memoizes parsed format strings for a call site.
///
/// Native methods pass the same literal format on every call, so parsing can be done
/// once. Once `capacity` distinct formats have been seen the cache stops admitting new
/// entries; further formats are parsed on every call, like a megamorphic inline cache.
/// Invalid formats are never cached.
#[derive(Debug, Clone)]
pub struct SpecCache {
    entries: AHashMap<Box<str>, ArgSpec>,
    capacity: usize,
    hits: usize,
    misses: usize,
}

impl SpecCache {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: AHashMap::with_capacity(capacity.min(DEFAULT_SPEC_CACHE_CAPACITY)),
            capacity,
            hits: 0,
            misses: 0,
        }
    }

    /// Returns the shape for `format` and whether it was served from the cache.
    pub fn get_or_parse(&mut self, format: &str) -> ScanResult<(ArgSpec, bool)> {
        if let Some(spec) = self.entries.get(format) {
            self.hits += 1;
            return Ok((*spec, true));
        }
        self.misses += 1;
        let spec = ArgSpec::parse(format)?;
        if self.entries.len() < self.capacity {
            self.entries.insert(format.into(), spec);
        }
        Ok((spec, false))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn hits(&self) -> usize {
        self.hits
    }

    #[must_use]
    pub fn misses(&self) -> usize {
        self.misses
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }
}

impl Default for SpecCache {
    fn default() -> Self {
        Self::new(DEFAULT_SPEC_CACHE_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exception::ScanError;

    #[test]
    fn second_lookup_hits() {
        let mut cache = SpecCache::default();
        let (first, cached) = cache.get_or_parse("1*:").unwrap();
        assert!(!cached);
        let (second, cached) = cache.get_or_parse("1*:").unwrap();
        assert!(cached);
        assert_eq!(first, second);
        assert_eq!((cache.hits(), cache.misses()), (1, 1));
    }

    #[test]
    fn stops_admitting_at_capacity() {
        let mut cache = SpecCache::new(1);
        cache.get_or_parse("1").unwrap();
        cache.get_or_parse("2").unwrap();
        assert_eq!(cache.len(), 1);
        let (_, cached) = cache.get_or_parse("2").unwrap();
        assert!(!cached);
        let (_, cached) = cache.get_or_parse("1").unwrap();
        assert!(cached);
    }

    #[test]
    fn invalid_formats_are_not_cached() {
        let mut cache = SpecCache::default();
        assert!(matches!(cache.get_or_parse("x"), Err(ScanError::InvalidFormat { .. })));
        assert!(cache.is_empty());
    }
}
