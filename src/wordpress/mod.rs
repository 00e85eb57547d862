//! WordPress adapter
//!
//! [`WordPressBackend`] is the seam the pipeline and the registry talk to;
//! [`WordPressClient`] implements it against the REST API at
//! `/wp-json/wp/v2/`.

pub mod client;
pub(crate) mod responses;

pub use client::WordPressClient;

use crate::error::{Result, ScribeError};
use crate::types::{
    term_key, DeletedPost, MediaItem, MediaMetadata, NewTerm, Post, PostFields, PostFilter,
    TaxonomyKind, TaxonomyTerm, TermQuery,
};
use async_trait::async_trait;
use tracing::{debug, info};

/// Operations against a WordPress site
///
/// Every method issues its own authenticated call(s); nothing is cached
/// between calls.
#[async_trait]
pub trait WordPressBackend: Send + Sync {
    /// List posts matching a filter
    async fn list_posts(&self, filter: &PostFilter) -> Result<Vec<Post>>;

    /// Fetch one post by id
    async fn get_post(&self, id: u64) -> Result<Post>;

    /// Create a post
    async fn create_post(&self, fields: &PostFields) -> Result<Post>;

    /// Update the given fields of a post
    async fn update_post(&self, id: u64, fields: &PostFields) -> Result<Post>;

    /// Trash a post, or remove it permanently when `force` is set
    async fn delete_post(&self, id: u64, force: bool) -> Result<DeletedPost>;

    /// List terms of one taxonomy
    async fn list_terms(&self, kind: TaxonomyKind, query: &TermQuery)
        -> Result<Vec<TaxonomyTerm>>;

    /// Create a term
    async fn create_term(&self, kind: TaxonomyKind, term: &NewTerm) -> Result<TaxonomyTerm>;

    /// Upload a file to the media library
    async fn upload_media(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        metadata: &MediaMetadata,
    ) -> Result<MediaItem>;

    async fn list_categories(&self, query: &TermQuery) -> Result<Vec<TaxonomyTerm>> {
        self.list_terms(TaxonomyKind::Category, query).await
    }

    async fn list_tags(&self, query: &TermQuery) -> Result<Vec<TaxonomyTerm>> {
        self.list_terms(TaxonomyKind::Tag, query).await
    }

    /// Look a term up by name (case-insensitive) and create it when absent
    ///
    /// Not transactional: two concurrent callers may both miss the lookup.
    async fn resolve_or_create_term(&self, name: &str, kind: TaxonomyKind) -> Result<TaxonomyTerm> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ScribeError::validation("term name cannot be empty"));
        }

        if let Some(existing) = find_term(self.list_terms(kind, &TermQuery::search(name)).await?, name)
        {
            debug!(kind = kind.as_str(), name, id = existing.id, "Resolved existing term");
            return Ok(existing);
        }

        let created = self.create_term(kind, &NewTerm::named(name)).await?;
        info!(kind = kind.as_str(), name, id = created.id, "Created term");
        Ok(created)
    }
}

/// Pick the term whose name matches case-insensitively
pub fn find_term(terms: Vec<TaxonomyTerm>, name: &str) -> Option<TaxonomyTerm> {
    let wanted = term_key(name);
    terms.into_iter().find(|term| term_key(&term.name) == wanted)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn term(id: u64, name: &str) -> TaxonomyTerm {
        TaxonomyTerm {
            id,
            name: name.to_string(),
            kind: TaxonomyKind::Tag,
            slug: None,
            count: None,
        }
    }

    #[test]
    fn test_find_term_case_insensitive() {
        let terms = vec![term(1, "Coffee Beans"), term(2, "coffee")];
        assert_eq!(find_term(terms.clone(), "COFFEE").map(|t| t.id), Some(2));
        assert_eq!(find_term(terms.clone(), " coffee beans ").map(|t| t.id), Some(1));
        assert!(find_term(terms, "tea").is_none());
    }
}
