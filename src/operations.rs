//! Operations shared by the MCP tools and the HTTP routes
//!
//! Each method takes loosely-typed JSON arguments, validates them into the
//! crate's types, and returns the JSON body both surfaces send back.
//! Every error leaves here as a [`ScribeError`] for the surface to map.

use crate::config::Config;
use crate::error::{Result, ScribeError};
use crate::pipeline::{PublishPipeline, PublishedPost};
use crate::services::{ContentGenerator, LlmService};
use crate::types::{
    GenerationArgs, GenerationRequest, MediaMetadata, NewTerm, PostFields, PostFilter,
    PostStatus, TaxonomyKind, TaxonomyTerm, TermQuery,
};
use crate::wordpress::{WordPressBackend, WordPressClient};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Registry of every externally reachable operation
#[derive(Clone)]
pub struct Operations {
    wordpress: Arc<dyn WordPressBackend>,
    generator: Option<Arc<dyn ContentGenerator>>,
}

impl Operations {
    pub fn new(
        wordpress: Arc<dyn WordPressBackend>,
        generator: Option<Arc<dyn ContentGenerator>>,
    ) -> Self {
        Self {
            wordpress,
            generator,
        }
    }

    /// Build the registry against the configured WordPress site and LLM
    pub fn from_config(config: &Config) -> Result<Self> {
        let wordpress: Arc<dyn WordPressBackend> =
            Arc::new(WordPressClient::new(&config.wordpress)?);
        let generator = match &config.llm {
            Some(llm) => Some(Arc::new(LlmService::new(llm)?) as Arc<dyn ContentGenerator>),
            None => {
                warn!("ANTHROPIC_API_KEY not set, AI operations are disabled");
                None
            }
        };
        Ok(Self::new(wordpress, generator))
    }

    /// Whether AI operations can run
    pub fn ai_available(&self) -> bool {
        self.generator.is_some()
    }

    fn pipeline(&self) -> Result<PublishPipeline> {
        let generator = self
            .generator
            .clone()
            .ok_or(ScribeError::GeneratorUnavailable)?;
        Ok(PublishPipeline::new(self.wordpress.clone(), generator))
    }

    // === Posts ===

    pub async fn list_posts(&self, args: Value) -> Result<Value> {
        let filter: PostFilter = parse_args(args)?;
        filter.validate()?;

        let posts = self.wordpress.list_posts(&filter).await?;
        Ok(json!({
            "success": true,
            "count": posts.len(),
            "posts": posts,
        }))
    }

    pub async fn search_posts(&self, args: Value) -> Result<Value> {
        #[derive(Deserialize)]
        struct SearchParams {
            search: String,
            #[serde(default)]
            per_page: Option<u32>,
        }

        let params: SearchParams = parse_args(args)?;
        let search = required_text(params.search, "search")?;
        let filter = PostFilter {
            per_page: params.per_page.unwrap_or(10),
            search: Some(search),
            ..Default::default()
        };
        self.list_posts(serde_json::to_value(filter)?).await
    }

    pub async fn get_post(&self, args: Value) -> Result<Value> {
        let params: PostIdParams = parse_args(args)?;
        let post = self.wordpress.get_post(params.post_id).await?;
        Ok(json!({
            "success": true,
            "post": post,
        }))
    }

    pub async fn create_post(&self, args: Value) -> Result<Value> {
        let fields: PostFields = parse_args(args)?;
        fields.validate_for_create()?;

        let fields = PostFields {
            status: Some(fields.status.unwrap_or_default()),
            ..fields
        };
        let post = self.wordpress.create_post(&fields).await?;
        Ok(json!({
            "success": true,
            "post_id": post.id,
            "title": post.title,
            "link": post.link,
            "status": post.status,
        }))
    }

    pub async fn update_post(&self, args: Value) -> Result<Value> {
        #[derive(Deserialize)]
        struct UpdateParams {
            post_id: u64,
            #[serde(flatten)]
            fields: PostFields,
        }

        let params: UpdateParams = parse_args(args)?;
        if params.fields.is_empty() {
            return Err(ScribeError::validation("no fields to update"));
        }
        params.fields.validate_for_update()?;

        let post = self
            .wordpress
            .update_post(params.post_id, &params.fields)
            .await?;
        Ok(json!({
            "success": true,
            "post_id": post.id,
            "title": post.title,
            "link": post.link,
            "status": post.status,
        }))
    }

    pub async fn delete_post(&self, args: Value) -> Result<Value> {
        #[derive(Deserialize)]
        struct DeleteParams {
            post_id: u64,
            #[serde(default)]
            force: bool,
        }

        let params: DeleteParams = parse_args(args)?;
        let outcome = self
            .wordpress
            .delete_post(params.post_id, params.force)
            .await?;
        Ok(json!({
            "success": true,
            "post_id": outcome.id,
            "deleted": outcome.deleted,
        }))
    }

    // === Media ===

    pub async fn upload_media(&self, args: Value) -> Result<Value> {
        #[derive(Deserialize)]
        struct UploadParams {
            file_path: String,
            #[serde(flatten)]
            metadata: MediaMetadata,
        }

        let params: UploadParams = parse_args(args)?;
        let path = Path::new(&params.file_path);
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| ScribeError::validation("file_path must name a file"))?;
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            ScribeError::validation(format!("cannot read {}: {}", params.file_path, e))
        })?;
        debug!(file = %params.file_path, size = bytes.len(), "Read media file");

        let media = self
            .wordpress
            .upload_media(bytes, filename, &params.metadata)
            .await?;
        Ok(json!({
            "success": true,
            "media_id": media.id,
            "source_url": media.source_url,
            "title": media.title,
            "mime_type": media.mime_type,
        }))
    }

    // === Taxonomies ===

    pub async fn list_categories(&self, args: Value) -> Result<Value> {
        let query: TermQuery = parse_args(args)?;
        query.validate()?;
        let categories = self.wordpress.list_categories(&query).await?;
        Ok(term_list("categories", categories))
    }

    pub async fn list_tags(&self, args: Value) -> Result<Value> {
        let query: TermQuery = parse_args(args)?;
        query.validate()?;
        let tags = self.wordpress.list_tags(&query).await?;
        Ok(term_list("tags", tags))
    }

    pub async fn search_tags(&self, args: Value) -> Result<Value> {
        let query: TermQuery = parse_args(args)?;
        let search = query
            .search
            .clone()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ScribeError::validation("search is required and cannot be empty"))?;
        self.list_tags(serde_json::to_value(TermQuery {
            search: Some(search),
            ..query
        })?)
        .await
    }

    pub async fn create_tag(&self, args: Value) -> Result<Value> {
        let term: NewTerm = parse_args(args)?;
        if term.parent.is_some() {
            return Err(ScribeError::validation("tags cannot have a parent"));
        }
        self.create_term(TaxonomyKind::Tag, term).await
    }

    pub async fn create_category(&self, args: Value) -> Result<Value> {
        let term: NewTerm = parse_args(args)?;
        self.create_term(TaxonomyKind::Category, term).await
    }

    async fn create_term(&self, kind: TaxonomyKind, term: NewTerm) -> Result<Value> {
        term.validate()?;
        let created = self.wordpress.create_term(kind, &term).await?;
        Ok(json!({
            "success": true,
            "term_id": created.id,
            "name": created.name,
            "kind": created.kind,
            "slug": created.slug,
        }))
    }

    // === AI ===

    pub async fn generate_post_with_ai(&self, args: Value) -> Result<Value> {
        let request = parse_generation(args)?;
        let pipeline = self.pipeline()?;
        info!(status = request.desired_status().as_str(), "Generating post with AI");

        let published = pipeline.generate_and_publish(&request).await?;
        Ok(generated_post_body(&published))
    }

    pub async fn generate_content_from_prompt(&self, args: Value) -> Result<Value> {
        let request = parse_generation(args)?;
        let content = self.pipeline()?.preview(&request).await?;
        Ok(json!({
            "success": true,
            "ai_generated": true,
            "content": content,
        }))
    }

    pub async fn improve_post_with_ai(&self, args: Value) -> Result<Value> {
        #[derive(Deserialize)]
        struct ImproveParams {
            post_id: u64,
            #[serde(default, alias = "instructions")]
            improvements: Option<String>,
            #[serde(default)]
            status: Option<PostStatus>,
        }

        let params: ImproveParams = parse_args(args)?;
        let pipeline = self.pipeline()?;
        let published = pipeline
            .improve_post(
                params.post_id,
                params.improvements.as_deref().unwrap_or_default(),
                params.status,
            )
            .await?;
        Ok(json!({
            "success": true,
            "post_id": published.post.id,
            "title": published.post.title,
            "link": published.post.link,
            "status": published.post.status,
            "ai_improved": true,
        }))
    }
}

#[derive(Debug, Deserialize)]
struct PostIdParams {
    post_id: u64,
}

/// Deserialize tool or route arguments, treating `null` as `{}`
pub fn parse_args<T: DeserializeOwned>(args: Value) -> Result<T> {
    let args = if args.is_null() { json!({}) } else { args };
    serde_json::from_value(args)
        .map_err(|e| ScribeError::validation(format!("invalid arguments: {}", e)))
}

fn parse_generation(args: Value) -> Result<GenerationRequest> {
    let args: GenerationArgs = parse_args(args)?;
    GenerationRequest::try_from(args)
}

fn required_text(value: String, field: &str) -> Result<String> {
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(ScribeError::validation(format!(
            "{} is required and cannot be empty",
            field
        )));
    }
    Ok(value)
}

fn term_list(key: &str, terms: Vec<TaxonomyTerm>) -> Value {
    let mut body = json!({
        "success": true,
        "count": terms.len(),
    });
    body[key] = json!(terms);
    body
}

fn generated_post_body(published: &PublishedPost) -> Value {
    json!({
        "success": true,
        "post_id": published.post.id,
        "title": published.post.title,
        "link": published.post.link,
        "status": published.post.status,
        "excerpt": published.content.excerpt,
        "ai_generated": true,
        "ai_categories": published.content.suggested_categories,
        "ai_tags": published.content.suggested_tags,
        "category_ids": published.category_ids,
        "tag_ids": published.tag_ids,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_parse_args_null_is_empty_object() {
        let filter: PostFilter = parse_args(Value::Null).unwrap();
        assert_eq!(filter, PostFilter::default());
    }

    #[test]
    fn test_parse_args_type_mismatch_is_validation() {
        let err = parse_args::<PostIdParams>(json!({"post_id": "seven"})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationFailed);
        assert!(err.to_string().contains("invalid arguments"));
    }

    #[test]
    fn test_parse_generation_requires_prompt() {
        let err = parse_generation(json!({"style": "casual"})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationFailed);

        let request = parse_generation(json!({
            "prompt": "coffee",
            "style": "técnico",
            "desiredStatus": "pending"
        }))
        .unwrap();
        assert_eq!(request.desired_status(), PostStatus::Pending);
    }

    #[test]
    fn test_term_list_shape() {
        let body = term_list("tags", vec![]);
        assert_eq!(body, json!({"success": true, "count": 0, "tags": []}));
    }
}
