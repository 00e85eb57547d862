//! Per-run taxonomy term resolution

use crate::error::Result;
use crate::types::{term_key, TaxonomyKind, TaxonomyTerm};
use crate::wordpress::WordPressBackend;
use std::collections::HashMap;
use tracing::debug;

/// Resolves term names to ids, reusing ids already resolved in this run
///
/// Lives for one pipeline run only; nothing is shared across requests.
pub struct TermResolver<'a> {
    backend: &'a dyn WordPressBackend,
    cache: HashMap<(TaxonomyKind, String), TaxonomyTerm>,
}

impl<'a> TermResolver<'a> {
    pub fn new(backend: &'a dyn WordPressBackend) -> Self {
        Self {
            backend,
            cache: HashMap::new(),
        }
    }

    /// Resolve one name, hitting WordPress only on a cache miss
    pub async fn resolve(&mut self, name: &str, kind: TaxonomyKind) -> Result<TaxonomyTerm> {
        let key = (kind, term_key(name));
        if let Some(term) = self.cache.get(&key) {
            debug!(kind = kind.as_str(), name, id = term.id, "Term cache hit");
            return Ok(term.clone());
        }

        let term = self.backend.resolve_or_create_term(name, kind).await?;
        self.cache.insert(key, term.clone());
        Ok(term)
    }

    /// Resolve names in order, returning the distinct ids
    ///
    /// Stops at the first failure; terms created before it stay created.
    pub async fn resolve_all(&mut self, names: &[String], kind: TaxonomyKind) -> Result<Vec<u64>> {
        let mut ids = Vec::with_capacity(names.len());
        for name in names {
            let term = self.resolve(name, kind).await?;
            if !ids.contains(&term.id) {
                ids.push(term.id);
            }
        }
        Ok(ids)
    }

    /// Number of distinct terms resolved so far
    pub fn resolved_count(&self) -> usize {
        self.cache.len()
    }
}
