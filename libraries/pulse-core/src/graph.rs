//! Social graph rules
//!
//! A follow edge lives on two records: `A.followings ∋ B` and
//! `B.followers ∋ A`. [`toggle_follow`] is the only place that changes
//! those sets, and it always changes both sides together. Persisting both
//! records is the caller's job (see `SocialStore::save_follow_edges`).

use crate::error::{PulseError, Result};
use crate::types::{Post, Toggled, User, UserId};
use serde::{Deserialize, Serialize};

/// Direction of a follow toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FollowChange {
    /// `actor` now follows `target`
    Followed,
    /// `actor` no longer follows `target`
    Unfollowed,
}

/// Follow `target` if `actor` does not already, otherwise unfollow.
///
/// The actor's `followings` decides the direction. The target's `followers`
/// is then brought in line with add-if-absent / remove-if-present, so a
/// previously half-written edge is repaired rather than duplicated.
pub fn toggle_follow(actor: &mut User, target: &mut User) -> Result<FollowChange> {
    ensure_distinct(&actor.id, &target.id)?;

    if actor.followings.contains(&target.id) {
        actor.followings.remove(&target.id);
        target.followers.remove(&actor.id);
        Ok(FollowChange::Unfollowed)
    } else {
        actor.followings.insert(target.id.clone());
        target.followers.insert(actor.id.clone());
        Ok(FollowChange::Followed)
    }
}

/// Reject a relation from a user to themselves
pub fn ensure_distinct(actor: &UserId, target: &UserId) -> Result<()> {
    if actor == target {
        return Err(PulseError::SelfReference(
            "You can't follow yourself".to_string(),
        ));
    }
    Ok(())
}

/// Toggle `actor`'s like on `post`. Likes have no reciprocal edge.
pub fn toggle_like(post: &mut Post, actor: &UserId) -> Toggled {
    post.toggle_like(actor)
}
