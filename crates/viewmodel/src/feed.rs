use domain::{Post, PostId, PostPatch};

/// Posts of one feed view, in display order.
#[derive(Debug, Clone, Default)]
pub struct PostList {
    posts: Vec<Post>,
}

impl PostList {
    pub fn replace_all(&mut self, posts: Vec<Post>) {
        self.posts = posts;
    }

    pub fn prepend(&mut self, post: Post) {
        self.posts.insert(0, post);
    }

    /// Patches the post with `id` and nothing else. `None` if it is not in the list.
    pub fn patch_one(&mut self, id: &PostId, patch: &PostPatch) -> Option<&Post> {
        let post = self.posts.iter_mut().find(|p| &p.id == id)?;
        post.apply(patch);
        Some(post)
    }

    pub fn get(&self, id: &PostId) -> Option<&Post> {
        self.posts.iter().find(|p| &p.id == id)
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::LikeState;

    fn post(id: &str, likes: u32) -> Post {
        Post {
            id: PostId::new(id).unwrap(),
            title: format!("Post {}", id),
            content: "c".to_string(),
            image_url: None,
            like_count: likes,
            liked_by_viewer: false,
            comment_count: 2,
            author: None,
        }
    }

    #[test]
    fn patch_touches_only_the_target() {
        let mut list = PostList::default();
        list.replace_all(vec![post("1", 5), post("2", 7), post("3", 0)]);
        let others: Vec<Post> = vec![list.posts()[0].clone(), list.posts()[2].clone()];

        let patched = list
            .patch_one(
                &PostId::new("2").unwrap(),
                &PostPatch::Like(LikeState {
                    likes: 8,
                    liked_by_user: true,
                }),
            )
            .cloned()
            .unwrap();
        assert_eq!(patched.like_count, 8);
        assert!(patched.liked_by_viewer);
        assert_eq!(patched.comment_count, 2);
        assert_eq!(patched.title, "Post 2");

        assert_eq!(list.posts()[0], others[0]);
        assert_eq!(list.posts()[2], others[1]);
    }

    #[test]
    fn patch_of_unknown_post_changes_nothing() {
        let mut list = PostList::default();
        list.replace_all(vec![post("1", 5)]);
        assert!(list
            .patch_one(&PostId::new("9").unwrap(), &PostPatch::CommentsAdded(1))
            .is_none());
        assert_eq!(list.posts()[0], post("1", 5));
    }

    #[test]
    fn prepend_puts_new_post_first_and_replace_is_wholesale() {
        let mut list = PostList::default();
        list.replace_all(vec![post("1", 0), post("2", 0)]);
        list.prepend(post("3", 0));
        let ids: Vec<&str> = list.posts().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["3", "1", "2"]);

        list.replace_all(vec![post("9", 0)]);
        assert_eq!(list.len(), 1);
        assert!(list.get(&PostId::new("1").unwrap()).is_none());
    }
}
