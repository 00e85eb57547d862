//! Services layer for scribe
//!
//! The content generation seam and its LLM-backed implementation.

pub mod llm;
pub mod prompts;

pub use llm::{parse_generated_content, LlmConfig, LlmService};

use crate::error::Result;
use crate::types::{GeneratedContent, GenerationRequest, Post};
use async_trait::async_trait;

/// Produces structured post content from a prompt
///
/// Each call is atomic from the caller's side: it returns a complete
/// [`GeneratedContent`] or fails. No retries, no partial output.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Generate a new post from a request
    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedContent>;

    /// Rewrite an existing post following the given instructions
    async fn improve(&self, post: &Post, instructions: &str) -> Result<GeneratedContent>;
}
