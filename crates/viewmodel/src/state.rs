use crate::feed::PostList;
use crate::tree::CommentTree;
use domain::PostId;
use std::collections::HashMap;

/// Everything one view holds locally. A post without an entry in `panels`
/// has never had its comments opened: its tree is absent, not empty.
#[derive(Debug, Default)]
pub struct ViewState {
    pub posts: PostList,
    pub panels: HashMap<PostId, CommentTree>,
    pub(crate) loads: LoadTickets,
}

/// Outstanding comment loads. Each load takes a ticket; only the newest ticket
/// for a post may apply its response.
#[derive(Debug, Default)]
pub(crate) struct LoadTickets {
    next: u64,
    current: HashMap<PostId, u64>,
}

impl LoadTickets {
    pub(crate) fn issue(&mut self, post_id: &PostId) -> u64 {
        self.next += 1;
        self.current.insert(post_id.clone(), self.next);
        self.next
    }

    /// Consumes the ticket if it is still the newest one.
    pub(crate) fn redeem(&mut self, post_id: &PostId, ticket: u64) -> bool {
        if self.current.get(post_id) == Some(&ticket) {
            self.current.remove(post_id);
            true
        } else {
            false
        }
    }

    pub(crate) fn cancel(&mut self, post_id: &PostId) {
        self.current.remove(post_id);
    }

    pub(crate) fn cancel_all(&mut self) {
        self.current.clear();
    }

    pub(crate) fn is_loading(&self, post_id: &PostId) -> bool {
        self.current.contains_key(post_id)
    }
}
