//! Scribe - WordPress publishing with LLM-generated content
//!
//! Turns a natural-language prompt into a WordPress post: an LLM drafts the
//! title, body, excerpt and suggested taxonomy, the suggested categories and
//! tags are resolved (or created) on the site, and the post is saved.
//!
//! # Architecture
//!
//! - **Types**: requests, generated content, posts, taxonomy terms
//! - **WordPress**: REST API adapter behind [`WordPressBackend`]
//! - **Services**: LLM content generation behind [`ContentGenerator`]
//! - **Pipeline**: the prompt to published post state machine
//! - **Operations**: the registry both surfaces call into
//! - **MCP** and **API**: JSON-RPC over stdio and the HTTP façade
//!
//! # Example
//!
//! ```ignore
//! use scribe_core::{Config, Operations};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load(None)?;
//!     let ops = Operations::from_config(&config)?;
//!
//!     let body = ops
//!         .generate_post_with_ai(json!({
//!             "prompt": "Five benefits of drinking coffee",
//!             "style": "casual"
//!         }))
//!         .await?;
//!     println!("{}", body["link"]);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod mcp;
pub mod operations;
pub mod pipeline;
pub mod services;
pub mod types;
pub mod wordpress;

pub use config::Config;
pub use error::{ErrorKind, Result, ScribeError};
pub use operations::Operations;
pub use pipeline::{PipelineReport, PipelineState, PublishPipeline, PublishedPost};
pub use services::{ContentGenerator, LlmService};
pub use types::{
    GeneratedContent, GenerationRequest, Post, PostFields, PostStatus, TaxonomyKind,
    TaxonomyTerm, Tone, WritingStyle,
};
pub use wordpress::{WordPressBackend, WordPressClient};
