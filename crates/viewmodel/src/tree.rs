use domain::{CommentId, Reply, TopLevelComment, UserId};

/// Comments of one post, two levels deep. Display order is insertion order:
/// nothing is re-sorted, so threads do not jump around when they get replies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentTree {
    threads: Vec<TopLevelComment>,
}

/// Borrowed view of any comment in the tree.
#[derive(Debug, Clone, Copy)]
pub enum CommentRef<'a> {
    TopLevel(&'a TopLevelComment),
    Reply(&'a Reply),
}

impl CommentRef<'_> {
    pub fn is_authored_by(&self, user: &UserId) -> bool {
        match self {
            CommentRef::TopLevel(c) => c.is_authored_by(user),
            CommentRef::Reply(r) => r.is_authored_by(user),
        }
    }
}

impl CommentTree {
    /// Tree as fetched from the service, order preserved.
    pub fn from_threads(threads: Vec<TopLevelComment>) -> Self {
        Self { threads }
    }

    pub fn threads(&self) -> &[TopLevelComment] {
        &self.threads
    }

    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }

    /// Top-level comments plus every reply.
    pub fn total(&self) -> u32 {
        self.threads.iter().map(TopLevelComment::weight).sum()
    }

    pub fn contains(&self, id: &CommentId) -> bool {
        self.get(id).is_some()
    }

    /// Prepends a new thread. Returns false, changing nothing, when a comment with
    /// this id is already in the tree (a reload picked it up first).
    pub fn insert_top_level(&mut self, mut comment: TopLevelComment) -> bool {
        if self.contains(&comment.id) {
            return false;
        }
        comment.replies.clear();
        self.threads.insert(0, comment);
        true
    }

    /// Appends to the parent's replies. Returns false, changing nothing, when the
    /// parent is gone (deleted while the reply was in flight) or the reply is
    /// already in the tree.
    pub fn insert_reply(&mut self, parent_id: &CommentId, mut reply: Reply) -> bool {
        if self.contains(&reply.id) {
            return false;
        }
        match self.threads.iter_mut().find(|c| &c.id == parent_id) {
            Some(parent) => {
                reply.parent_id = parent.id.clone();
                parent.replies.push(reply);
                true
            }
            None => false,
        }
    }

    /// Removes a comment and returns how many comments went with it:
    /// `1 + replies` for a thread, `1` for a reply, `0` if nothing matched.
    pub fn remove(&mut self, id: &CommentId) -> u32 {
        if let Some(pos) = self.threads.iter().position(|c| &c.id == id) {
            return self.threads.remove(pos).weight();
        }
        for thread in &mut self.threads {
            if let Some(pos) = thread.replies.iter().position(|r| &r.id == id) {
                thread.replies.remove(pos);
                return 1;
            }
        }
        0
    }

    pub fn get(&self, id: &CommentId) -> Option<CommentRef<'_>> {
        for thread in &self.threads {
            if &thread.id == id {
                return Some(CommentRef::TopLevel(thread));
            }
            if let Some(r) = thread.replies.iter().find(|r| &r.id == id) {
                return Some(CommentRef::Reply(r));
            }
        }
        None
    }

    /// Id of the thread a comment lives in. Replying to a reply goes to its thread.
    pub fn root_of(&self, id: &CommentId) -> Option<&CommentId> {
        self.get(id).map(|c| match c {
            CommentRef::TopLevel(t) => &t.id,
            CommentRef::Reply(r) => &r.parent_id,
        })
    }
}
