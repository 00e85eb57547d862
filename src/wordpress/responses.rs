//! WordPress REST API wire shapes
//!
//! WordPress wraps rendered fields (`{"title": {"rendered": "..."}}`) and
//! reports errors as `{"code", "message", "data": {"status"}}`. These types
//! exist only to be converted into the crate's own types.

use crate::types::{MediaItem, Post, PostStatus, TaxonomyKind, TaxonomyTerm};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Rendered {
    #[serde(default)]
    pub rendered: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WpPost {
    pub id: u64,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub link: String,
    pub status: PostStatus,
    #[serde(default)]
    pub title: Rendered,
    #[serde(default)]
    pub content: Rendered,
    #[serde(default)]
    pub excerpt: Rendered,
    #[serde(default)]
    pub categories: Vec<u64>,
    #[serde(default)]
    pub tags: Vec<u64>,
    #[serde(default)]
    pub featured_media: Option<u64>,
}

impl From<WpPost> for Post {
    fn from(wp: WpPost) -> Self {
        Post {
            id: wp.id,
            title: wp.title.rendered,
            body_html: wp.content.rendered,
            excerpt: wp.excerpt.rendered,
            status: wp.status,
            category_ids: wp.categories,
            tag_ids: wp.tags,
            link: wp.link,
            date: wp.date,
            featured_media: wp.featured_media.filter(|id| *id != 0),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct WpTerm {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub count: Option<u64>,
}

impl WpTerm {
    pub fn into_term(self, kind: TaxonomyKind) -> TaxonomyTerm {
        TaxonomyTerm {
            id: self.id,
            name: self.name,
            kind,
            slug: self.slug,
            count: self.count,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct WpMedia {
    pub id: u64,
    #[serde(default)]
    pub source_url: String,
    #[serde(default)]
    pub title: Rendered,
    #[serde(default)]
    pub mime_type: String,
}

impl From<WpMedia> for MediaItem {
    fn from(wp: WpMedia) -> Self {
        MediaItem {
            id: wp.id,
            source_url: wp.source_url,
            title: wp.title.rendered,
            mime_type: wp.mime_type,
        }
    }
}

/// Body of `DELETE /posts/{id}`
///
/// With `force=true` WordPress answers `{"deleted": true, "previous": {...}}`;
/// otherwise it returns the trashed post.
#[derive(Debug, Deserialize)]
pub(crate) struct WpDeleted {
    #[serde(default)]
    pub deleted: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WpError {
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub data: Option<WpErrorData>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WpErrorData {
    /// Present on `term_exists` errors
    #[serde(default)]
    pub term_id: Option<u64>,
}
