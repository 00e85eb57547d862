//! Core data types for scribe
//!
//! Requests coming in through MCP or HTTP, the content returned by the
//! generator, and the WordPress resources (posts, terms, media) as this
//! crate sees them. WordPress owns every post and term; nothing here is
//! persisted beyond a single request.

use crate::error::{Result, ScribeError};
use serde::{Deserialize, Serialize};

/// Writing style for generated content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WritingStyle {
    #[default]
    #[serde(alias = "profesional")]
    Professional,
    Casual,
    #[serde(alias = "técnico", alias = "tecnico")]
    Technical,
    #[serde(alias = "creativo")]
    Creative,
}

impl WritingStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            WritingStyle::Professional => "professional",
            WritingStyle::Casual => "casual",
            WritingStyle::Technical => "technical",
            WritingStyle::Creative => "creative",
        }
    }
}

/// Tone of generated content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    #[serde(alias = "informativo")]
    Informative,
    #[serde(alias = "persuasivo")]
    Persuasive,
    #[serde(alias = "educativo")]
    Educational,
    #[serde(alias = "entretenido")]
    Entertaining,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Informative => "informative",
            Tone::Persuasive => "persuasive",
            Tone::Educational => "educational",
            Tone::Entertaining => "entertaining",
        }
    }
}

/// WordPress post status
///
/// Only `draft`, `publish` and `pending` may be requested; the rest are
/// statuses WordPress can report back on reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Draft,
    Publish,
    Pending,
    Private,
    Future,
    Trash,
    /// Plugin or custom status (e.g. Edit Flow's `pitch`); read-only
    #[serde(other)]
    Other,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Publish => "publish",
            PostStatus::Pending => "pending",
            PostStatus::Private => "private",
            PostStatus::Future => "future",
            PostStatus::Trash => "trash",
            PostStatus::Other => "other",
        }
    }

    /// Whether a caller may ask for this status on create/update
    pub fn is_requestable(&self) -> bool {
        matches!(
            self,
            PostStatus::Draft | PostStatus::Publish | PostStatus::Pending
        )
    }

    fn ensure_requestable(self) -> Result<Self> {
        if self.is_requestable() {
            Ok(self)
        } else {
            Err(ScribeError::validation(format!(
                "status must be one of draft, publish, pending (got {})",
                self.as_str()
            )))
        }
    }
}

/// Arguments for AI generation as they arrive over the wire
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerationArgs {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub style: Option<WritingStyle>,
    #[serde(default)]
    pub tone: Option<Tone>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default, alias = "desired_status", alias = "desiredStatus")]
    pub status: Option<PostStatus>,
}

/// A validated request to generate a post
///
/// Constructed once per incoming call and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    prompt: String,
    style: WritingStyle,
    tone: Tone,
    language: Option<String>,
    desired_status: PostStatus,
}

impl GenerationRequest {
    /// Build a request with default style, tone, language and status
    pub fn new(prompt: impl Into<String>) -> Result<Self> {
        Self::try_from(GenerationArgs {
            prompt: Some(prompt.into()),
            ..Default::default()
        })
    }

    pub fn with_style(mut self, style: WritingStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_tone(mut self, tone: Tone) -> Self {
        self.tone = tone;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = non_blank(Some(language.into()));
        self
    }

    pub fn with_status(mut self, status: PostStatus) -> Result<Self> {
        self.desired_status = status.ensure_requestable()?;
        Ok(self)
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn style(&self) -> WritingStyle {
        self.style
    }

    pub fn tone(&self) -> Tone {
        self.tone
    }

    /// Requested output language; `None` means the language of the prompt
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn desired_status(&self) -> PostStatus {
        self.desired_status
    }
}

impl TryFrom<GenerationArgs> for GenerationRequest {
    type Error = ScribeError;

    fn try_from(args: GenerationArgs) -> Result<Self> {
        let prompt = non_blank(args.prompt)
            .ok_or_else(|| ScribeError::validation("prompt is required and cannot be empty"))?;

        Ok(Self {
            prompt,
            style: args.style.unwrap_or_default(),
            tone: args.tone.unwrap_or_default(),
            language: non_blank(args.language),
            desired_status: args.status.unwrap_or_default().ensure_requestable()?,
        })
    }
}

/// Structured content returned by the generator
///
/// The wire shape matches the JSON the generator is asked to produce:
/// `{title, content, excerpt, categories, tags}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedContent {
    pub title: String,
    #[serde(rename = "content")]
    pub body_html: String,
    pub excerpt: String,
    #[serde(rename = "categories")]
    pub suggested_categories: Vec<String>,
    #[serde(rename = "tags")]
    pub suggested_tags: Vec<String>,
}

impl GeneratedContent {
    /// Build content, normalizing the suggested term names into sets
    pub fn new(
        title: impl Into<String>,
        body_html: impl Into<String>,
        excerpt: impl Into<String>,
        categories: impl IntoIterator<Item = String>,
        tags: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            title: title.into(),
            body_html: body_html.into(),
            excerpt: excerpt.into(),
            suggested_categories: normalize_term_names(categories),
            suggested_tags: normalize_term_names(tags),
        }
    }

    /// Field-presence check that gates every post creation
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(ScribeError::ContentMalformed("title is empty".to_string()));
        }
        if self.body_html.trim().is_empty() {
            return Err(ScribeError::ContentMalformed("content is empty".to_string()));
        }
        Ok(())
    }
}

/// Case-insensitive identity of a term name
pub fn term_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Trim names, drop blanks, and de-duplicate case-insensitively.
///
/// The first-seen casing of each name is kept.
pub fn normalize_term_names(names: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    names
        .into_iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .filter(|name| seen.insert(term_key(name)))
        .collect()
}

/// Which WordPress taxonomy a term belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaxonomyKind {
    Category,
    Tag,
}

impl TaxonomyKind {
    /// REST collection name under `/wp/v2/`
    pub fn endpoint(&self) -> &'static str {
        match self {
            TaxonomyKind::Category => "categories",
            TaxonomyKind::Tag => "tags",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaxonomyKind::Category => "category",
            TaxonomyKind::Tag => "tag",
        }
    }
}

/// A WordPress category or tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyTerm {
    pub id: u64,
    pub name: String,
    pub kind: TaxonomyKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
}

/// Payload for creating a term
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTerm {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<u64>,
}

impl NewTerm {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ScribeError::validation("name is required and cannot be empty"));
        }
        Ok(())
    }
}

/// A WordPress post as returned by the REST API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: u64,
    pub title: String,
    #[serde(rename = "content")]
    pub body_html: String,
    pub excerpt: String,
    pub status: PostStatus,
    #[serde(rename = "categories")]
    pub category_ids: Vec<u64>,
    #[serde(rename = "tags")]
    pub tag_ids: Vec<u64>,
    pub link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured_media: Option<u64>,
}

/// Writable post fields for create and update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PostStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<u64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<u64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured_media: Option<u64>,
}

impl PostFields {
    /// Fields for a new post built from generated content
    pub fn from_generated(
        content: &GeneratedContent,
        status: PostStatus,
        category_ids: Vec<u64>,
        tag_ids: Vec<u64>,
    ) -> Self {
        Self {
            title: Some(content.title.clone()),
            content: Some(content.body_html.clone()),
            excerpt: Some(content.excerpt.clone()),
            status: Some(status),
            categories: non_empty(category_ids),
            tags: non_empty(tag_ids),
            featured_media: None,
        }
    }

    /// Presence checks for a manual create
    pub fn validate_for_create(&self) -> Result<()> {
        if self.title.as_deref().map_or(true, |t| t.trim().is_empty()) {
            return Err(ScribeError::validation("title is required and cannot be empty"));
        }
        if self.content.as_deref().map_or(true, |c| c.trim().is_empty()) {
            return Err(ScribeError::validation("content is required and cannot be empty"));
        }
        self.validate_for_update()
    }

    /// Checks shared by create and update
    pub fn validate_for_update(&self) -> Result<()> {
        if let Some(status) = self.status {
            status.ensure_requestable()?;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        *self == PostFields::default()
    }
}

/// Filter for listing posts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostFilter {
    #[serde(default = "default_posts_per_page")]
    pub per_page: u32,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_status_filter")]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl Default for PostFilter {
    fn default() -> Self {
        Self {
            per_page: default_posts_per_page(),
            page: default_page(),
            status: default_status_filter(),
            search: None,
        }
    }
}

impl PostFilter {
    pub fn validate(&self) -> Result<()> {
        validate_per_page(self.per_page)?;
        if self.page == 0 {
            return Err(ScribeError::validation("page must be at least 1"));
        }
        Ok(())
    }
}

/// Query for listing terms
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermQuery {
    #[serde(default = "default_terms_per_page")]
    pub per_page: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl Default for TermQuery {
    fn default() -> Self {
        Self {
            per_page: default_terms_per_page(),
            search: None,
        }
    }
}

impl TermQuery {
    pub fn search(name: impl Into<String>) -> Self {
        Self {
            per_page: 100,
            search: Some(name.into()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_per_page(self.per_page)
    }
}

/// Optional metadata applied to an uploaded media item
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
}

impl MediaMetadata {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.alt_text.is_none()
    }
}

/// An uploaded media item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: u64,
    pub source_url: String,
    pub title: String,
    pub mime_type: String,
}

/// Result of deleting a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedPost {
    pub id: u64,
    /// True when the post was removed permanently rather than trashed
    pub deleted: bool,
}

fn validate_per_page(per_page: u32) -> Result<()> {
    if !(1..=100).contains(&per_page) {
        return Err(ScribeError::validation(format!(
            "per_page must be between 1 and 100 (got {})",
            per_page
        )));
    }
    Ok(())
}

fn default_posts_per_page() -> u32 {
    10
}

fn default_terms_per_page() -> u32 {
    100
}

fn default_page() -> u32 {
    1
}

fn default_status_filter() -> String {
    "any".to_string()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn non_empty(ids: Vec<u64>) -> Option<Vec<u64>> {
    if ids.is_empty() {
        None
    } else {
        Some(ids)
    }
}
