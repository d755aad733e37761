//! Domain types shared by storage and the server

mod id_set;
mod ids;
mod media;
mod post;
mod user;

pub use id_set::{IdSet, Toggled};
pub use ids::{PostId, UserId};
pub use media::MediaRef;
pub use post::{NewPost, Post, PostView};
pub use user::{Credentials, NewUser, ProfileUpdate, User, UserSummary};
