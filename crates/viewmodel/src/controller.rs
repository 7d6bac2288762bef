use domain::protocol::CommentRecord;
use domain::{
    CommentId, LikeState, NewPost, Outcome, Post, PostId, PostPatch, Reply, SkipReason,
    SyncError, SyncResult, TopLevelComment, UserId, ViewEvent, Viewer,
};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::flight::InFlight;
use crate::state::ViewState;
use crate::traits::PostStore;
use crate::tree::CommentTree;

/// Asks the user before something destructive is sent.
pub trait Confirm: Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F: Fn(&str) -> bool + Sync> Confirm for F {
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Owns one view's state and runs every mutation against the store.
///
/// Only confirmed responses are applied. A failed request leaves the state as it
/// was. The state lock is never held across an `.await`, so other posts stay
/// usable while a request is out.
#[derive(Clone)]
pub struct Controller {
    store: Arc<dyn PostStore>,
    state: Arc<Mutex<ViewState>>,
    likes: InFlight<PostId>,
    events: broadcast::Sender<ViewEvent>,
    detached: CancellationToken,
}

impl Controller {
    pub fn new(store: Arc<dyn PostStore>) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            store,
            state: Arc::new(Mutex::new(ViewState::default())),
            likes: InFlight::new(),
            events,
            detached: CancellationToken::new(),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ViewEvent> {
        self.events.subscribe()
    }

    /// Tears the view down. Responses that arrive afterwards are dropped.
    pub fn detach(&self) {
        info!("View detached, late responses will be ignored");
        self.detached.cancel();
    }

    pub fn is_detached(&self) -> bool {
        self.detached.is_cancelled()
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut ViewState) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    fn emit(&self, event: ViewEvent) {
        debug!("View event: {:?}", event);
        // 没有订阅者时发送失败，忽略即可
        let _ = self.events.send(event);
    }

    // --- 读取 ---

    pub fn posts(&self) -> Vec<Post> {
        self.with_state(|s| s.posts.posts().to_vec())
    }

    pub fn post(&self, post_id: &PostId) -> Option<Post> {
        self.with_state(|s| s.posts.get(post_id).cloned())
    }

    /// `None` until the comment panel for this post has been loaded.
    pub fn comments(&self, post_id: &PostId) -> Option<Vec<TopLevelComment>> {
        self.with_state(|s| s.panels.get(post_id).map(|t| t.threads().to_vec()))
    }

    pub fn is_loading_comments(&self, post_id: &PostId) -> bool {
        self.with_state(|s| s.loads.is_loading(post_id))
    }

    pub fn is_like_pending(&self, post_id: &PostId) -> bool {
        self.likes.is_held(post_id)
    }

    // --- 帖子列表 ---

    pub async fn load_feed(&self, viewer: Option<&Viewer>) -> SyncResult<usize> {
        let posts = self
            .store
            .list_posts(viewer.map(|v| &v.id))
            .await
            .map_err(transport)?;
        Ok(self.replace_feed(posts))
    }

    pub async fn load_author_feed(
        &self,
        author: &UserId,
        viewer: Option<&Viewer>,
    ) -> SyncResult<usize> {
        let posts = self
            .store
            .list_posts_by(author, viewer.map(|v| &v.id))
            .await
            .map_err(transport)?;
        Ok(self.replace_feed(posts))
    }

    fn replace_feed(&self, posts: Vec<Post>) -> Outcome<usize> {
        if self.is_detached() {
            return Outcome::Skipped(SkipReason::Detached);
        }
        let count = posts.len();
        self.with_state(|s| {
            s.posts.replace_all(posts);
            s.panels.clear();
            s.loads.cancel_all();
        });
        info!("Feed loaded with {} posts", count);
        self.emit(ViewEvent::FeedReplaced { count });
        Outcome::Applied(count)
    }

    pub async fn create_post(&self, viewer: Option<&Viewer>, new_post: NewPost) -> SyncResult<Post> {
        let viewer = viewer.ok_or(SyncError::Unauthenticated)?;
        if new_post.title.trim().is_empty() {
            return Err(SyncError::InvalidInput("title"));
        }
        if new_post.content.trim().is_empty() {
            return Err(SyncError::InvalidInput("content"));
        }

        let post = self
            .store
            .create_post(&new_post, &viewer.id)
            .await
            .map_err(transport)?;
        if self.is_detached() {
            return Ok(Outcome::Skipped(SkipReason::Detached));
        }

        self.with_state(|s| s.posts.prepend(post.clone()));
        info!("Post {} created by {}", post.id, viewer.username);
        self.emit(ViewEvent::PostPrepended {
            post_id: post.id.clone(),
        });
        Ok(Outcome::Applied(post))
    }

    // --- 评论面板 ---

    /// Loads (or reloads) the comment tree of one post and replaces it wholesale.
    /// A newer load for the same post supersedes this one.
    pub async fn open_comments(&self, post_id: &PostId) -> SyncResult<u32> {
        let ticket = self.with_state(|s| s.loads.issue(post_id));
        debug!("Loading comments for post {} (ticket {})", post_id, ticket);

        let threads = match self.store.list_comments(post_id).await {
            Ok(t) => t,
            Err(e) => {
                self.with_state(|s| {
                    s.loads.redeem(post_id, ticket);
                });
                return Err(transport(e));
            }
        };

        if self.is_detached() {
            return Ok(Outcome::Skipped(SkipReason::Detached));
        }

        let applied = self.with_state(|s| {
            if !s.loads.redeem(post_id, ticket) {
                return None;
            }
            let tree = CommentTree::from_threads(threads);
            let total = tree.total();
            s.panels.insert(post_id.clone(), tree);
            s.posts
                .patch_one(post_id, &PostPatch::CommentCount(total));
            Some(total)
        });

        match applied {
            Some(count) => {
                self.emit(ViewEvent::CommentsLoaded {
                    post_id: post_id.clone(),
                    count,
                });
                Ok(Outcome::Applied(count))
            }
            None => {
                debug!("Comment load {} for post {} was superseded", ticket, post_id);
                Ok(Outcome::Skipped(SkipReason::Superseded))
            }
        }
    }

    /// Drops the tree and any load still out for it.
    pub fn close_comments(&self, post_id: &PostId) {
        self.with_state(|s| {
            s.loads.cancel(post_id);
            s.panels.remove(post_id);
        });
    }

    // --- 变更操作 ---

    pub async fn toggle_like(&self, viewer: Option<&Viewer>, post_id: &PostId) -> SyncResult<LikeState> {
        let viewer = viewer.ok_or(SyncError::Unauthenticated)?;
        let Some(_guard) = self.likes.try_acquire(post_id) else {
            debug!("Like for post {} already in flight, ignoring", post_id);
            return Ok(Outcome::Skipped(SkipReason::InFlight));
        };

        let state = self
            .store
            .toggle_like(post_id, &viewer.id)
            .await
            .map_err(transport)?;
        if self.is_detached() {
            return Ok(Outcome::Skipped(SkipReason::Detached));
        }

        self.with_state(|s| {
            s.posts.patch_one(post_id, &PostPatch::Like(state));
        });
        info!(
            "Post {} now has {} likes (liked: {})",
            post_id, state.likes, state.liked_by_user
        );
        self.emit(ViewEvent::PostPatched {
            post_id: post_id.clone(),
        });
        Ok(Outcome::Applied(state))
    }

    pub async fn add_comment(
        &self,
        viewer: Option<&Viewer>,
        post_id: &PostId,
        content: &str,
    ) -> SyncResult<TopLevelComment> {
        let viewer = viewer.ok_or(SyncError::Unauthenticated)?;
        let content = content.trim();
        if content.is_empty() {
            return Err(SyncError::InvalidInput("comment"));
        }

        let record = self
            .store
            .create_comment(post_id, &viewer.id, content, None)
            .await
            .map_err(transport)?;
        let comment = match record {
            CommentRecord::TopLevel(c) => c,
            CommentRecord::Reply(r) => {
                return Err(SyncError::Transport(format!(
                    "service filed comment {} as a reply to {}",
                    r.id, r.parent_id
                )))
            }
        };
        if self.is_detached() {
            return Ok(Outcome::Skipped(SkipReason::Detached));
        }

        let added = self.with_state(|s| {
            let added = match s.panels.get_mut(post_id) {
                Some(tree) => tree.insert_top_level(comment.clone()),
                None => true,
            };
            if added {
                s.posts.patch_one(post_id, &PostPatch::CommentsAdded(1));
            }
            added
        });
        if !added {
            debug!("Comment {} already arrived with a reload", comment.id);
            return Ok(Outcome::Applied(comment));
        }
        self.emit(ViewEvent::CommentAdded {
            post_id: post_id.clone(),
            comment_id: comment.id.clone(),
            parent_id: None,
        });
        Ok(Outcome::Applied(comment))
    }

    /// Replies always land in a thread: replying to a reply goes to its thread.
    pub async fn add_reply(
        &self,
        viewer: Option<&Viewer>,
        post_id: &PostId,
        parent_id: &CommentId,
        content: &str,
    ) -> SyncResult<Reply> {
        let viewer = viewer.ok_or(SyncError::Unauthenticated)?;
        let content = content.trim();
        if content.is_empty() {
            return Err(SyncError::InvalidInput("reply"));
        }

        let target = self.with_state(|s| match s.panels.get(post_id) {
            Some(tree) => tree.root_of(parent_id).cloned().ok_or(SkipReason::ParentMissing),
            None => Ok(parent_id.clone()),
        });
        let target = match target {
            Ok(t) => t,
            Err(reason) => return Ok(Outcome::Skipped(reason)),
        };

        let record = self
            .store
            .create_comment(post_id, &viewer.id, content, Some(&target))
            .await
            .map_err(transport)?;
        let reply = match record {
            CommentRecord::Reply(r) => r,
            CommentRecord::TopLevel(c) => Reply {
                id: c.id,
                parent_id: target.clone(),
                author: c.author,
                content: c.content,
                created_at: c.created_at,
            },
        };
        if self.is_detached() {
            return Ok(Outcome::Skipped(SkipReason::Detached));
        }

        let inserted = self.with_state(|s| {
            let inserted = match s.panels.get_mut(post_id) {
                Some(tree) if tree.contains(&reply.id) => None,
                Some(tree) => Some(tree.insert_reply(&target, reply.clone())),
                None => Some(true),
            };
            if inserted == Some(true) {
                s.posts.patch_one(post_id, &PostPatch::CommentsAdded(1));
            }
            inserted
        });
        let Some(inserted) = inserted else {
            debug!("Reply {} already arrived with a reload", reply.id);
            return Ok(Outcome::Applied(reply));
        };
        if !inserted {
            warn!(
                "Reply {} arrived after its parent {} was removed, dropping it",
                reply.id, target
            );
            return Ok(Outcome::Skipped(SkipReason::ParentMissing));
        }

        self.emit(ViewEvent::CommentAdded {
            post_id: post_id.clone(),
            comment_id: reply.id.clone(),
            parent_id: Some(target),
        });
        Ok(Outcome::Applied(reply))
    }

    /// Deletes a comment (with its replies, for a thread) after the user confirms.
    /// Returns how many comments left the tree.
    pub async fn delete_comment(
        &self,
        viewer: Option<&Viewer>,
        post_id: &PostId,
        comment_id: &CommentId,
        confirm: &dyn Confirm,
    ) -> SyncResult<u32> {
        let viewer = viewer.ok_or(SyncError::Unauthenticated)?;

        let authored = self.with_state(|s| {
            s.panels
                .get(post_id)
                .and_then(|tree| tree.get(comment_id))
                .map(|c| c.is_authored_by(&viewer.id))
        });
        match authored {
            None => return Ok(Outcome::Skipped(SkipReason::NotLoaded)),
            Some(false) => return Err(SyncError::NotAuthor),
            Some(true) => {}
        }

        if !confirm.confirm("Delete this comment?") {
            return Ok(Outcome::Skipped(SkipReason::Declined));
        }

        self.store
            .delete_comment(post_id, comment_id, &viewer.id)
            .await
            .map_err(transport)?;
        if self.is_detached() {
            return Ok(Outcome::Skipped(SkipReason::Detached));
        }

        let removed = self.with_state(|s| {
            let removed = s
                .panels
                .get_mut(post_id)
                .map(|tree| tree.remove(comment_id))
                .unwrap_or(0);
            if removed > 0 {
                s.posts
                    .patch_one(post_id, &PostPatch::CommentsRemoved(removed));
            }
            removed
        });
        info!("Deleted comment {} on post {} ({} removed)", comment_id, post_id, removed);
        self.emit(ViewEvent::CommentRemoved {
            post_id: post_id.clone(),
            comment_id: comment_id.clone(),
            removed,
        });
        Ok(Outcome::Applied(removed))
    }
}

fn transport(e: anyhow::Error) -> SyncError {
    warn!("Request failed: {:#}", e);
    SyncError::Transport(format!("{:#}", e))
}
