//! Prompt templates for content generation
//!
//! Both templates ask for the same JSON object so a single parser handles
//! generation and improvement.

use crate::types::{GenerationRequest, Post};

/// Default instructions when improving a post
pub const DEFAULT_IMPROVEMENTS: &str = "improve SEO, clarity and structure";

const RESPONSE_SHAPE: &str = r#"IMPORTANT: respond ONLY with a valid JSON object with this exact structure:
{
    "title": "Attractive, SEO-friendly title (60 characters max)",
    "content": "Full article as HTML using <h2>, <h3>, <p>, <ul>, <li>, <strong>, <em>. Well structured and informative, at least 800 words.",
    "excerpt": "Short, engaging summary (160 characters max)",
    "categories": ["Category 1", "Category 2"],
    "tags": ["tag1", "tag2", "tag3", "tag4", "tag5"]
}

Do not include any text outside the JSON object. The content must be valid HTML."#;

/// System prompt for generating a new post
pub fn generation_system_prompt(request: &GenerationRequest) -> String {
    format!(
        "You are an expert WordPress content writer.\n\
         Your task is to produce high quality, SEO-optimized, well structured articles.\n\n\
         Style: {}\n\
         Tone: {}\n\
         Language: {}\n\n\
         {}",
        request.style().as_str(),
        request.tone().as_str(),
        language_line(request.language()),
        RESPONSE_SHAPE
    )
}

/// System prompt for improving an existing post
pub fn improvement_system_prompt() -> String {
    format!(
        "You are an expert WordPress editor.\n\
         You improve existing articles while keeping their subject, structure and language.\n\n\
         {}",
        RESPONSE_SHAPE
    )
}

/// User message for improving an existing post
pub fn improvement_user_prompt(post: &Post, instructions: &str) -> String {
    let instructions = if instructions.trim().is_empty() {
        DEFAULT_IMPROVEMENTS
    } else {
        instructions.trim()
    };

    format!(
        "Improve the following post focusing on: {}\n\n\
         Current title:\n{}\n\n\
         Current excerpt:\n{}\n\n\
         Current content:\n{}\n\n\
         Return the improved post as the JSON object described above.",
        instructions, post.title, post.excerpt, post.body_html
    )
}

fn language_line(language: Option<&str>) -> &str {
    language.unwrap_or("same language as the user's request")
}
