//! MCP tool catalogue
//!
//! WordPress tools (posts, media, taxonomies) and AI tools (generate,
//! improve, preview). Execution is delegated to [`Operations`].

use crate::error::{Result, ScribeError};
use crate::operations::Operations;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

/// Tool schema definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tool {
    pub name: String,

    pub description: String,

    /// JSON Schema for input parameters
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

impl Tool {
    fn new(name: &str, description: &str, input_schema: Value) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            input_schema,
        }
    }
}

/// Dispatches tool calls to the operations registry
#[derive(Clone)]
pub struct ToolHandler {
    operations: Arc<Operations>,
    /// Whether tools that read the server's filesystem are exposed
    local_files: bool,
}

/// Tools that read paths on the machine running the server
const LOCAL_FILE_TOOLS: &[&str] = &["upload_media"];

impl ToolHandler {
    /// Full tool set, for the local stdio transport
    pub fn new(operations: Arc<Operations>) -> Self {
        Self {
            operations,
            local_files: true,
        }
    }

    /// Tool set without filesystem access, for network transports
    pub fn without_local_files(operations: Arc<Operations>) -> Self {
        Self {
            operations,
            local_files: false,
        }
    }

    /// All tools exposed on this transport
    pub fn list_tools(&self) -> Vec<Tool> {
        let mut tools = self.catalogue();
        if !self.local_files {
            tools.retain(|tool| !LOCAL_FILE_TOOLS.contains(&tool.name.as_str()));
        }
        tools
    }

    fn catalogue(&self) -> Vec<Tool> {
        let generation_properties = json!({
            "prompt": {
                "type": "string",
                "description": "What the post should be about"
            },
            "style": {
                "type": "string",
                "enum": ["professional", "casual", "technical", "creative"],
                "default": "professional"
            },
            "tone": {
                "type": "string",
                "enum": ["informative", "persuasive", "educational", "entertaining"],
                "default": "informative"
            },
            "language": {
                "type": "string",
                "description": "Output language; defaults to the language of the prompt"
            },
            "status": {
                "type": "string",
                "enum": ["draft", "publish", "pending"],
                "default": "draft"
            }
        });

        vec![
            // Posts
            Tool::new(
                "list_posts",
                "List WordPress posts, newest first.",
                json!({
                    "type": "object",
                    "properties": {
                        "per_page": {"type": "integer", "minimum": 1, "maximum": 100, "default": 10},
                        "page": {"type": "integer", "minimum": 1, "default": 1},
                        "status": {"type": "string", "default": "any"}
                    }
                }),
            ),
            Tool::new(
                "search_posts",
                "Search posts by text.",
                json!({
                    "type": "object",
                    "properties": {
                        "search": {"type": "string", "description": "Text to search for"},
                        "per_page": {"type": "integer", "minimum": 1, "maximum": 100, "default": 10}
                    },
                    "required": ["search"]
                }),
            ),
            Tool::new(
                "get_post",
                "Fetch one post by id.",
                json!({
                    "type": "object",
                    "properties": {
                        "post_id": {"type": "integer"}
                    },
                    "required": ["post_id"]
                }),
            ),
            Tool::new(
                "create_post",
                "Create a post from the given fields.",
                json!({
                    "type": "object",
                    "properties": {
                        "title": {"type": "string"},
                        "content": {"type": "string", "description": "Post body (HTML)"},
                        "excerpt": {"type": "string"},
                        "status": {"type": "string", "enum": ["draft", "publish", "pending"], "default": "draft"},
                        "categories": {"type": "array", "items": {"type": "integer"}},
                        "tags": {"type": "array", "items": {"type": "integer"}},
                        "featured_media": {"type": "integer"}
                    },
                    "required": ["title", "content"]
                }),
            ),
            Tool::new(
                "update_post",
                "Update selected fields of an existing post.",
                json!({
                    "type": "object",
                    "properties": {
                        "post_id": {"type": "integer"},
                        "title": {"type": "string"},
                        "content": {"type": "string"},
                        "excerpt": {"type": "string"},
                        "status": {"type": "string", "enum": ["draft", "publish", "pending"]},
                        "categories": {"type": "array", "items": {"type": "integer"}},
                        "tags": {"type": "array", "items": {"type": "integer"}},
                        "featured_media": {"type": "integer"}
                    },
                    "required": ["post_id"]
                }),
            ),
            Tool::new(
                "delete_post",
                "Move a post to the trash, or delete it permanently with force.",
                json!({
                    "type": "object",
                    "properties": {
                        "post_id": {"type": "integer"},
                        "force": {"type": "boolean", "default": false}
                    },
                    "required": ["post_id"]
                }),
            ),
            // Media
            Tool::new(
                "upload_media",
                "Upload a local file to the media library.",
                json!({
                    "type": "object",
                    "properties": {
                        "file_path": {"type": "string", "description": "Path of the file to upload"},
                        "title": {"type": "string"},
                        "alt_text": {"type": "string", "description": "Alternative text for images"}
                    },
                    "required": ["file_path"]
                }),
            ),
            // Taxonomies
            Tool::new(
                "list_categories",
                "List categories.",
                json!({
                    "type": "object",
                    "properties": {
                        "per_page": {"type": "integer", "minimum": 1, "maximum": 100, "default": 100}
                    }
                }),
            ),
            Tool::new(
                "list_tags",
                "List tags.",
                json!({
                    "type": "object",
                    "properties": {
                        "per_page": {"type": "integer", "minimum": 1, "maximum": 100, "default": 100}
                    }
                }),
            ),
            Tool::new(
                "search_tags",
                "Search tags by name.",
                json!({
                    "type": "object",
                    "properties": {
                        "search": {"type": "string"},
                        "per_page": {"type": "integer", "minimum": 1, "maximum": 100, "default": 100}
                    },
                    "required": ["search"]
                }),
            ),
            Tool::new(
                "create_tag",
                "Create a tag.",
                json!({
                    "type": "object",
                    "properties": {
                        "name": {"type": "string"},
                        "description": {"type": "string"},
                        "slug": {"type": "string"}
                    },
                    "required": ["name"]
                }),
            ),
            Tool::new(
                "create_category",
                "Create a category, optionally under a parent.",
                json!({
                    "type": "object",
                    "properties": {
                        "name": {"type": "string"},
                        "description": {"type": "string"},
                        "slug": {"type": "string"},
                        "parent": {"type": "integer", "description": "Parent category id"}
                    },
                    "required": ["name"]
                }),
            ),
            // AI
            Tool::new(
                "generate_post_with_ai",
                "Generate a complete post from a prompt, create missing categories and tags, and save it to WordPress.",
                json!({
                    "type": "object",
                    "properties": generation_properties.clone(),
                    "required": ["prompt"]
                }),
            ),
            Tool::new(
                "improve_post_with_ai",
                "Rewrite an existing post with AI and save the result.",
                json!({
                    "type": "object",
                    "properties": {
                        "post_id": {"type": "integer"},
                        "improvements": {
                            "type": "string",
                            "description": "What to improve",
                            "default": "improve SEO, clarity and structure"
                        },
                        "status": {"type": "string", "enum": ["draft", "publish", "pending"]}
                    },
                    "required": ["post_id"]
                }),
            ),
            Tool::new(
                "generate_content_from_prompt",
                "Generate post content from a prompt without saving anything to WordPress.",
                json!({
                    "type": "object",
                    "properties": generation_properties,
                    "required": ["prompt"]
                }),
            ),
        ]
    }

    /// Execute a tool by name
    pub async fn execute(&self, tool_name: &str, params: Value) -> Result<Value> {
        debug!(tool = tool_name, "Executing tool");
        if !self.has_tool(tool_name) {
            return Err(ScribeError::McpProtocol(format!("Unknown tool: {}", tool_name)));
        }
        let ops = &self.operations;

        match tool_name {
            "list_posts" => ops.list_posts(params).await,
            "search_posts" => ops.search_posts(params).await,
            "get_post" => ops.get_post(params).await,
            "create_post" => ops.create_post(params).await,
            "update_post" => ops.update_post(params).await,
            "delete_post" => ops.delete_post(params).await,
            "upload_media" => ops.upload_media(params).await,
            "list_categories" => ops.list_categories(params).await,
            "list_tags" => ops.list_tags(params).await,
            "search_tags" => ops.search_tags(params).await,
            "create_tag" => ops.create_tag(params).await,
            "create_category" => ops.create_category(params).await,
            "generate_post_with_ai" => ops.generate_post_with_ai(params).await,
            "improve_post_with_ai" => ops.improve_post_with_ai(params).await,
            "generate_content_from_prompt" => ops.generate_content_from_prompt(params).await,
            _ => Err(ScribeError::McpProtocol(format!("Unknown tool: {}", tool_name))),
        }
    }

    /// Whether a tool with this name exists
    pub fn has_tool(&self, tool_name: &str) -> bool {
        self.list_tools().iter().any(|tool| tool.name == tool_name)
    }
}
