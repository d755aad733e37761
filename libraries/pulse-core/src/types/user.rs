/// User domain type
use super::{IdSet, MediaRef, PostId, UserId};
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// User account
///
/// The credential hash is deliberately not part of this type; it is only
/// reachable through [`Credentials`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user identifier
    pub id: UserId,

    /// Login email, unique across users
    pub email: String,

    /// Display name
    pub name: String,

    /// Free-form profile text
    pub bio: Option<String>,

    /// Profile image
    pub avatar: Option<MediaRef>,

    /// Owned posts, oldest first
    pub posts: IdSet<PostId>,

    /// Users following this user
    pub followers: IdSet<UserId>,

    /// Users this user follows
    pub followings: IdSet<UserId>,

    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a fresh user with a generated id and no edges
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: UserId::generate(),
            email: email.into(),
            name: name.into(),
            bio: None,
            avatar: None,
            posts: IdSet::new(),
            followers: IdSet::new(),
            followings: IdSet::new(),
            created_at: Utc::now().trunc_subsecs(3),
        }
    }

    /// Apply a profile edit. Absent or blank text fields are left untouched.
    pub fn apply_profile(&mut self, update: ProfileUpdate) {
        if let Some(name) = update.name.filter(|n| !n.trim().is_empty()) {
            self.name = name;
        }
        if let Some(bio) = update.bio.filter(|b| !b.trim().is_empty()) {
            self.bio = Some(bio);
        }
        if let Some(avatar) = update.avatar {
            self.avatar = Some(avatar);
        }
    }

    /// Public projection used in feeds and post owners
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            avatar: self.avatar.clone(),
        }
    }
}

/// Compact public view of a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    /// User identifier
    pub id: UserId,
    /// Display name
    pub name: String,
    /// Profile image
    pub avatar: Option<MediaRef>,
}

/// Data required to register a user
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Login email, already normalized
    pub email: String,
    /// Display name
    pub name: String,
    /// bcrypt hash of the password
    pub password_hash: String,
}

/// Stored login material for a user
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Owner of the credentials
    pub user_id: UserId,
    /// bcrypt hash of the password
    pub password_hash: String,
}

/// Profile fields a user may change about themselves
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    /// New display name
    pub name: Option<String>,
    /// New profile text
    pub bio: Option<String>,
    /// Newly uploaded profile image
    pub avatar: Option<MediaRef>,
}
