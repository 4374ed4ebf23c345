//! Profile read service backing `GET /users/me`.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ports::{UserProfileQuery, UserRepository};
use crate::domain::{Error, PublicUser, UserId};

/// Reads profiles through a [`UserRepository`].
#[derive(Clone)]
pub struct UserProfileService<R: ?Sized> {
    users: Arc<R>,
}

impl<R: ?Sized> UserProfileService<R> {
    /// Create the service over `users`.
    pub fn new(users: Arc<R>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl<R> UserProfileQuery for UserProfileService<R>
where
    R: UserRepository + ?Sized,
{
    async fn fetch_profile(&self, user_id: &UserId) -> Result<PublicUser, Error> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| Error::not_found("user not found"))?;
        Ok(PublicUser::from(&user))
    }
}
