//! Local entity store - the canonical in-memory post lists.
//!
//! Single source of truth for rendering. Each operation is atomic under
//! its own write guard; no lock is ever held across a remote call, so two
//! in-flight mutations can only race on *which* completion applies last,
//! never on a half-applied list. The store itself performs no network I/O.

use tokio::sync::RwLock;

use crate::domain::{BeerDetails, BreweryDetails, Post, PostDetails, PostKind};

/// Ordered list of posts of one kind, most recent first.
pub struct PostList<D> {
    posts: RwLock<Vec<Post<D>>>,
}

impl<D: PostDetails> PostList<D> {
    pub fn new() -> Self {
        Self {
            posts: RwLock::new(Vec::new()),
        }
    }

    /// Full replacement - initial load or fallback to the sample dataset.
    pub async fn replace_all(&self, posts: Vec<Post<D>>) {
        *self.posts.write().await = posts;
    }

    /// New post becomes the first element.
    pub async fn insert_front(&self, post: Post<D>) {
        self.posts.write().await.insert(0, post);
    }

    /// Remove at most one matching post. Absent id is a no-op, not an
    /// error; returns whether anything was removed.
    pub async fn remove_by_id(&self, id: i64) -> bool {
        let mut posts = self.posts.write().await;
        let before = posts.len();
        posts.retain(|p| p.id != id);
        posts.len() != before
    }

    /// Apply a transformation to the one post matching `id`, leaving all
    /// others untouched. Absent id is a no-op; returns whether a post was
    /// updated.
    pub async fn update_by_id<F>(&self, id: i64, mutate: F) -> bool
    where
        F: FnOnce(&mut Post<D>),
    {
        let mut posts = self.posts.write().await;
        match posts.iter_mut().find(|p| p.id == id) {
            Some(post) => {
                mutate(post);
                true
            }
            None => false,
        }
    }

    pub async fn get(&self, id: i64) -> Option<Post<D>> {
        self.posts.read().await.iter().find(|p| p.id == id).cloned()
    }

    pub async fn snapshot(&self) -> Vec<Post<D>> {
        self.posts.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.posts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.posts.read().await.is_empty()
    }
}

impl<D: PostDetails> Default for PostList<D> {
    fn default() -> Self {
        Self::new()
    }
}

/// The post currently open in a detail view. The detail view is a lookup
/// into the store by this key, never a separate copy, so engine mutations
/// reach it without a dual update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectedPost {
    pub kind: PostKind,
    pub id: i64,
}

/// One list per post kind plus the open-detail selection.
pub struct EntityStore {
    pub beers: PostList<BeerDetails>,
    pub breweries: PostList<BreweryDetails>,
    selection: RwLock<Option<SelectedPost>>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self {
            beers: PostList::new(),
            breweries: PostList::new(),
            selection: RwLock::new(None),
        }
    }

    pub async fn open_detail(&self, kind: PostKind, id: i64) {
        *self.selection.write().await = Some(SelectedPost { kind, id });
    }

    pub async fn close_detail(&self) {
        *self.selection.write().await = None;
    }

    pub async fn selection(&self) -> Option<SelectedPost> {
        *self.selection.read().await
    }

    /// Drop the selection if it points at the given post. Called by the
    /// engine after a successful delete.
    pub async fn clear_selection_of(&self, kind: PostKind, id: i64) {
        let mut selection = self.selection.write().await;
        if *selection == Some(SelectedPost { kind, id }) {
            *selection = None;
        }
    }
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}
