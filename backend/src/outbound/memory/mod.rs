//! In-process document-store adapters.
//!
//! Records live under the same paths the hosted document store uses:
//! users at `users/{uid}`, posts in collection `posts_{network}` under
//! document `{proposal_type}_{post_id}`. All mutations happen under a
//! write lock, so concurrent increments and updates never lose writes.

mod document;
mod posts;
mod users;

pub use document::DocumentPath;
pub use posts::InMemoryPostRepository;
pub use users::InMemoryUserRepository;
