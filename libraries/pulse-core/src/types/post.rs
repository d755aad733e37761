/// Post domain type and its client-facing projection
use super::{IdSet, MediaRef, PostId, Toggled, UserId, UserSummary};
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// A post as stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Unique post identifier
    pub id: PostId,

    /// Author. Fixed at creation.
    pub owner: UserId,

    /// Text body, editable by the owner
    pub caption: String,

    /// Uploaded image
    pub image: MediaRef,

    /// Users who liked the post
    pub likes: IdSet<UserId>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Build a post for `owner` from creation input
    pub fn create(owner: UserId, new_post: NewPost) -> Self {
        Self {
            id: PostId::generate(),
            owner,
            caption: new_post.caption,
            image: new_post.image,
            likes: IdSet::new(),
            created_at: Utc::now().trunc_subsecs(3),
        }
    }

    /// Whether `user` owns this post
    pub fn is_owned_by(&self, user: &UserId) -> bool {
        &self.owner == user
    }

    /// Like the post if `user` has not, otherwise withdraw the like
    pub fn toggle_like(&mut self, user: &UserId) -> Toggled {
        self.likes.toggle(user.clone())
    }
}

/// Input for a new post, after the image has been uploaded
#[derive(Debug, Clone)]
pub struct NewPost {
    /// Text body
    pub caption: String,
    /// Image already stored on the media host
    pub image: MediaRef,
}

/// Post as returned to a particular viewer.
///
/// Carries the like count and whether the viewer is among the likers, never
/// the identities of the likers themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    /// Post identifier
    pub id: PostId,
    /// Text body
    pub caption: String,
    /// Uploaded image
    pub image: MediaRef,
    /// Author's public summary
    pub owner: UserSummary,
    /// Number of users who liked the post
    pub likes_count: usize,
    /// Whether the viewer is among them
    pub is_liked: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl PostView {
    /// Project `post` for `viewer`
    pub fn for_viewer(post: &Post, owner: UserSummary, viewer: &UserId) -> Self {
        Self {
            id: post.id.clone(),
            caption: post.caption.clone(),
            image: post.image.clone(),
            owner,
            likes_count: post.likes.len(),
            is_liked: post.likes.contains(viewer),
            created_at: post.created_at,
        }
    }
}
