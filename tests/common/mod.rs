//! Common test utilities and helpers

#![allow(dead_code)]

use async_trait::async_trait;
use scribe_core::types::{
    DeletedPost, MediaItem, MediaMetadata, NewTerm, PostFilter, TermQuery,
};
use scribe_core::{
    ContentGenerator, GeneratedContent, GenerationRequest, Operations, Post, PostFields,
    PostStatus, Result, ScribeError, TaxonomyKind, TaxonomyTerm, WordPressBackend,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// A mutating call made against [`FakeWordPress`]
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    CreatePost(PostFields),
    UpdatePost(u64, PostFields),
    DeletePost(u64),
    CreateTerm(TaxonomyKind, String),
    UploadMedia(String, usize),
}

#[derive(Default)]
struct SiteState {
    posts: Vec<Post>,
    terms: Vec<TaxonomyTerm>,
    mutations: Vec<Mutation>,
    term_lookups: usize,
    next_id: u64,
}

/// In-memory WordPress site that records every mutating call
#[derive(Default)]
pub struct FakeWordPress {
    state: Mutex<SiteState>,
    reject_credentials: bool,
}

impl FakeWordPress {
    pub fn new() -> Self {
        Self::default()
    }

    /// A site that answers every call as if the application password were wrong
    pub fn with_bad_credentials() -> Self {
        Self {
            reject_credentials: true,
            ..Self::default()
        }
    }

    pub fn add_term(&self, kind: TaxonomyKind, name: &str) -> u64 {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = state.next_id;
        state.terms.push(TaxonomyTerm {
            id,
            name: name.to_string(),
            kind,
            slug: Some(name.to_lowercase().replace(' ', "-")),
            count: Some(0),
        });
        id
    }

    pub fn add_post(&self, title: &str, status: PostStatus) -> u64 {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = state.next_id;
        state.posts.push(Post {
            id,
            title: title.to_string(),
            body_html: format!("<p>{}</p>", title),
            excerpt: String::new(),
            status,
            category_ids: vec![],
            tag_ids: vec![],
            link: format!("https://blog.example.com/?p={}", id),
            date: None,
            featured_media: None,
        });
        id
    }

    pub fn mutations(&self) -> Vec<Mutation> {
        self.state.lock().unwrap().mutations.clone()
    }

    pub fn posts(&self) -> Vec<Post> {
        self.state.lock().unwrap().posts.clone()
    }

    pub fn terms(&self, kind: TaxonomyKind) -> Vec<TaxonomyTerm> {
        self.state
            .lock()
            .unwrap()
            .terms
            .iter()
            .filter(|t| t.kind == kind)
            .cloned()
            .collect()
    }

    pub fn term_lookups(&self) -> usize {
        self.state.lock().unwrap().term_lookups
    }

    fn check_credentials(&self) -> Result<()> {
        if self.reject_credentials {
            return Err(ScribeError::AuthenticationFailed {
                service: "wordpress",
                message: "The provided password is an invalid application password.".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl WordPressBackend for FakeWordPress {
    async fn list_posts(&self, filter: &PostFilter) -> Result<Vec<Post>> {
        self.check_credentials()?;
        let needle = filter.search.clone().unwrap_or_default().to_lowercase();
        Ok(self
            .posts()
            .into_iter()
            .filter(|p| p.title.to_lowercase().contains(&needle))
            .take(filter.per_page as usize)
            .collect())
    }

    async fn get_post(&self, id: u64) -> Result<Post> {
        self.check_credentials()?;
        self.posts()
            .into_iter()
            .find(|p| p.id == id)
            .ok_or_else(|| ScribeError::NotFound(format!("post {}", id)))
    }

    async fn create_post(&self, fields: &PostFields) -> Result<Post> {
        self.check_credentials()?;
        let mut state = self.state.lock().unwrap();
        state.mutations.push(Mutation::CreatePost(fields.clone()));
        state.next_id += 1;
        let id = state.next_id;
        let post = Post {
            id,
            title: fields.title.clone().unwrap_or_default(),
            body_html: fields.content.clone().unwrap_or_default(),
            excerpt: fields.excerpt.clone().unwrap_or_default(),
            status: fields.status.unwrap_or_default(),
            category_ids: fields.categories.clone().unwrap_or_default(),
            tag_ids: fields.tags.clone().unwrap_or_default(),
            link: format!("https://blog.example.com/?p={}", id),
            date: None,
            featured_media: fields.featured_media,
        };
        state.posts.push(post.clone());
        Ok(post)
    }

    async fn update_post(&self, id: u64, fields: &PostFields) -> Result<Post> {
        self.check_credentials()?;
        let mut state = self.state.lock().unwrap();
        state.mutations.push(Mutation::UpdatePost(id, fields.clone()));
        let post = state
            .posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| ScribeError::NotFound(format!("post {}", id)))?;
        if let Some(title) = &fields.title {
            post.title = title.clone();
        }
        if let Some(content) = &fields.content {
            post.body_html = content.clone();
        }
        if let Some(excerpt) = &fields.excerpt {
            post.excerpt = excerpt.clone();
        }
        if let Some(status) = fields.status {
            post.status = status;
        }
        if let Some(categories) = &fields.categories {
            post.category_ids = categories.clone();
        }
        if let Some(tags) = &fields.tags {
            post.tag_ids = tags.clone();
        }
        Ok(post.clone())
    }

    async fn delete_post(&self, id: u64, force: bool) -> Result<DeletedPost> {
        self.check_credentials()?;
        let mut state = self.state.lock().unwrap();
        state.mutations.push(Mutation::DeletePost(id));
        let index = state
            .posts
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| ScribeError::NotFound(format!("post {}", id)))?;
        if force {
            state.posts.remove(index);
        } else {
            state.posts[index].status = PostStatus::Trash;
        }
        Ok(DeletedPost { id, deleted: force })
    }

    async fn list_terms(&self, kind: TaxonomyKind, query: &TermQuery) -> Result<Vec<TaxonomyTerm>> {
        self.check_credentials()?;
        self.state.lock().unwrap().term_lookups += 1;
        let needle = query.search.clone().unwrap_or_default().to_lowercase();
        Ok(self
            .terms(kind)
            .into_iter()
            .filter(|t| t.name.to_lowercase().contains(&needle))
            .take(query.per_page as usize)
            .collect())
    }

    async fn create_term(&self, kind: TaxonomyKind, term: &NewTerm) -> Result<TaxonomyTerm> {
        self.check_credentials()?;
        {
            let mut state = self.state.lock().unwrap();
            if state
                .terms
                .iter()
                .any(|t| t.kind == kind && t.name.eq_ignore_ascii_case(&term.name))
            {
                return Err(ScribeError::Rejected {
                    service: "wordpress",
                    status: 400,
                    code: Some("term_exists".to_string()),
                    message: "A term with the name provided already exists.".to_string(),
                });
            }
            state
                .mutations
                .push(Mutation::CreateTerm(kind, term.name.clone()));
        }
        let id = self.add_term(kind, &term.name);
        Ok(self
            .terms(kind)
            .into_iter()
            .find(|t| t.id == id)
            .ok_or_else(|| ScribeError::Other("term vanished".to_string()))?)
    }

    async fn upload_media(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        metadata: &MediaMetadata,
    ) -> Result<MediaItem> {
        self.check_credentials()?;
        let mut state = self.state.lock().unwrap();
        state
            .mutations
            .push(Mutation::UploadMedia(filename.to_string(), bytes.len()));
        state.next_id += 1;
        Ok(MediaItem {
            id: state.next_id,
            source_url: format!("https://blog.example.com/uploads/{}", filename),
            title: metadata.title.clone().unwrap_or_else(|| filename.to_string()),
            mime_type: "application/octet-stream".to_string(),
        })
    }
}

/// Generator that replays queued results and records the requests it saw
#[derive(Default)]
pub struct ScriptedGenerator {
    responses: Mutex<VecDeque<Result<GeneratedContent>>>,
    requests: Mutex<Vec<GenerationRequest>>,
    improved: Mutex<Vec<(u64, String)>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(self, response: Result<GeneratedContent>) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn improved(&self) -> Vec<(u64, String)> {
        self.improved.lock().unwrap().clone()
    }

    fn next(&self) -> Result<GeneratedContent> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ScribeError::Other("no scripted response left".to_string())))
    }
}

#[async_trait]
impl ContentGenerator for ScriptedGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedContent> {
        self.requests.lock().unwrap().push(request.clone());
        self.next()
    }

    async fn improve(&self, post: &Post, instructions: &str) -> Result<GeneratedContent> {
        self.improved
            .lock()
            .unwrap()
            .push((post.id, instructions.to_string()));
        self.next()
    }
}

/// The coffee article used across tests
pub fn coffee_article() -> GeneratedContent {
    GeneratedContent::new(
        "5 Health Benefits of Coffee",
        "<h2>Why coffee</h2><p>Moderate coffee intake is linked to longevity.</p>",
        "A quick look at what science says about coffee.",
        vec!["Health".to_string()],
        vec!["coffee".to_string(), "health".to_string()],
    )
}

/// Registry over a fake site, with or without a generator
pub fn operations(
    site: Arc<FakeWordPress>,
    generator: Option<Arc<ScriptedGenerator>>,
) -> Operations {
    Operations::new(
        site,
        generator.map(|g| g as Arc<dyn ContentGenerator>),
    )
}
