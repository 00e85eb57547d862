//! Prompt to published post orchestration
//!
//! A run moves through Drafting → Generating → Resolving → Publishing → Done,
//! or stops in Failed carrying the error kind of the step that failed.
//! Network calls inside a run are strictly sequential. Nothing is rolled
//! back on failure: terms created before the failing step stay created.

pub mod resolver;
pub mod state;

pub use resolver::TermResolver;
pub use state::{PipelineReport, PipelineState};

use crate::error::{Result, ScribeError};
use crate::services::ContentGenerator;
use crate::types::{
    GeneratedContent, GenerationRequest, Post, PostFields, PostStatus, TaxonomyKind,
};
use crate::wordpress::WordPressBackend;
use std::sync::Arc;
use tracing::{debug, info, info_span, warn, Instrument};

/// A post written by the pipeline together with what produced it
#[derive(Debug, Clone)]
pub struct PublishedPost {
    pub post: Post,
    pub content: GeneratedContent,
    pub category_ids: Vec<u64>,
    pub tag_ids: Vec<u64>,
}

/// Result of a run plus its report
#[derive(Debug)]
pub struct PipelineOutcome {
    pub report: PipelineReport,
    pub result: Result<PublishedPost>,
}

impl PipelineOutcome {
    pub fn into_result(self) -> Result<PublishedPost> {
        self.result
    }
}

/// Drives generation, term resolution and publishing for one request at a time
#[derive(Clone)]
pub struct PublishPipeline {
    wordpress: Arc<dyn WordPressBackend>,
    generator: Arc<dyn ContentGenerator>,
}

impl PublishPipeline {
    pub fn new(wordpress: Arc<dyn WordPressBackend>, generator: Arc<dyn ContentGenerator>) -> Self {
        Self {
            wordpress,
            generator,
        }
    }

    /// Generate a post from a prompt and create it in WordPress
    pub async fn generate_and_publish(&self, request: &GenerationRequest) -> Result<PublishedPost> {
        self.run_generate(request).await.into_result()
    }

    /// Generate-and-publish, keeping the run report
    pub async fn run_generate(&self, request: &GenerationRequest) -> PipelineOutcome {
        let mut report = PipelineReport::new();
        let span = info_span!("pipeline", run_id = %report.run_id, op = "generate");
        let result = self
            .generate_steps(request, &mut report)
            .instrument(span)
            .await;
        finish(report, result)
    }

    /// Rewrite an existing post with the generator and update it in place
    ///
    /// The post keeps its status unless `status` is given. Categories and
    /// tags are replaced only when the generator suggests some.
    pub async fn improve_post(
        &self,
        post_id: u64,
        instructions: &str,
        status: Option<PostStatus>,
    ) -> Result<PublishedPost> {
        self.run_improve(post_id, instructions, status)
            .await
            .into_result()
    }

    /// Improve, keeping the run report
    pub async fn run_improve(
        &self,
        post_id: u64,
        instructions: &str,
        status: Option<PostStatus>,
    ) -> PipelineOutcome {
        let mut report = PipelineReport::new();
        let span = info_span!("pipeline", run_id = %report.run_id, op = "improve", post_id);
        let result = self
            .improve_steps(post_id, instructions, status, &mut report)
            .instrument(span)
            .await;
        finish(report, result)
    }

    /// Generate content without touching WordPress
    pub async fn preview(&self, request: &GenerationRequest) -> Result<GeneratedContent> {
        let content = self.generator.generate(request).await?;
        content.validate()?;
        Ok(content)
    }

    async fn generate_steps(
        &self,
        request: &GenerationRequest,
        report: &mut PipelineReport,
    ) -> Result<PublishedPost> {
        report.advance(PipelineState::Generating)?;
        info!(style = request.style().as_str(), tone = request.tone().as_str(), "Generating content");
        let content = self.generator.generate(request).await?;
        content.validate()?;

        report.advance(PipelineState::Resolving)?;
        let (category_ids, tag_ids) = self.resolve_terms(&content).await?;

        report.advance(PipelineState::Publishing)?;
        let fields = PostFields::from_generated(
            &content,
            request.desired_status(),
            category_ids.clone(),
            tag_ids.clone(),
        );
        let post = self.wordpress.create_post(&fields).await?;
        ensure_link(&post)?;

        report.advance(PipelineState::Done)?;
        info!(post_id = post.id, status = post.status.as_str(), "Published generated post");

        Ok(PublishedPost {
            post,
            content,
            category_ids,
            tag_ids,
        })
    }

    async fn improve_steps(
        &self,
        post_id: u64,
        instructions: &str,
        status: Option<PostStatus>,
        report: &mut PipelineReport,
    ) -> Result<PublishedPost> {
        let status_only = PostFields {
            status,
            ..Default::default()
        };
        status_only.validate_for_update()?;
        report.advance(PipelineState::Generating)?;

        let existing = self.wordpress.get_post(post_id).await?;
        let content = self.generator.improve(&existing, instructions).await?;
        content.validate()?;

        report.advance(PipelineState::Resolving)?;
        let (category_ids, tag_ids) = self.resolve_terms(&content).await?;

        report.advance(PipelineState::Publishing)?;
        let fields = PostFields {
            title: Some(content.title.clone()),
            content: Some(content.body_html.clone()),
            excerpt: Some(content.excerpt.clone()),
            status,
            categories: Some(category_ids.clone()).filter(|ids| !ids.is_empty()),
            tags: Some(tag_ids.clone()).filter(|ids| !ids.is_empty()),
            featured_media: None,
        };
        let post = self.wordpress.update_post(post_id, &fields).await?;
        ensure_link(&post)?;

        report.advance(PipelineState::Done)?;
        info!(post_id = post.id, status = post.status.as_str(), "Improved post");

        Ok(PublishedPost {
            post,
            content,
            category_ids,
            tag_ids,
        })
    }

    /// Categories first, then tags, one name at a time
    async fn resolve_terms(&self, content: &GeneratedContent) -> Result<(Vec<u64>, Vec<u64>)> {
        let mut resolver = TermResolver::new(self.wordpress.as_ref());
        let category_ids = resolver
            .resolve_all(&content.suggested_categories, TaxonomyKind::Category)
            .await?;
        let tag_ids = resolver
            .resolve_all(&content.suggested_tags, TaxonomyKind::Tag)
            .await?;
        debug!(terms = resolver.resolved_count(), "Resolved taxonomy");
        Ok((category_ids, tag_ids))
    }
}

fn ensure_link(post: &Post) -> Result<()> {
    if post.link.trim().is_empty() {
        return Err(ScribeError::RemoteUnavailable {
            service: "wordpress",
            message: format!("post {} was saved without a link", post.id),
        });
    }
    Ok(())
}

fn finish(mut report: PipelineReport, result: Result<PublishedPost>) -> PipelineOutcome {
    if let Err(e) = &result {
        report.fail(e);
        warn!(
            run_id = %report.run_id,
            kind = e.kind().as_str(),
            visited = ?report.visited,
            "Pipeline failed: {}",
            e
        );
    }
    PipelineOutcome { report, result }
}
