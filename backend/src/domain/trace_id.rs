//! Request-scoped correlation identifier.
//!
//! The inbound trace middleware places a `TraceId` in task-local storage for
//! the lifetime of a request so domain errors and log events can pick it up
//! without threading it through every call.
//!
//! Tokio task-locals do not follow spawned tasks; wrap spawned work in
//! [`TraceId::scope`] to keep correlation.

use std::future::Future;

use tokio::task_local;
use uuid::Uuid;

task_local! {
    pub(crate) static TRACE_ID: TraceId;
}

/// Response header echoing the request's trace identifier.
pub const TRACE_ID_HEADER: &str = "trace-id";

/// Correlation identifier attached to a single inbound request.
///
/// # Examples
/// ```
/// use backend::TraceId;
///
/// # tokio::runtime::Runtime::new().expect("runtime").block_on(async {
/// let trace_id: TraceId = "00000000-0000-0000-0000-000000000000"
///     .parse()
///     .expect("valid UUID");
/// let observed = TraceId::scope(trace_id, async { TraceId::current() }).await;
/// assert_eq!(observed, Some(trace_id));
/// # });
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(Uuid);

impl TraceId {
    /// Generate a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Identifier of the request currently being served, if any.
    #[must_use]
    pub fn current() -> Option<Self> {
        TRACE_ID.try_with(|id| *id).ok()
    }

    /// Borrow the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Run `fut` with `trace_id` in scope.
    pub async fn scope<Fut>(trace_id: Self, fut: Fut) -> Fut::Output
    where
        Fut: Future,
    {
        TRACE_ID.scope(trace_id, fut).await
    }
}

impl std::fmt::Display for TraceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scope_exposes_identifier() {
        let expected = TraceId::generate();
        let observed = TraceId::scope(expected, async { TraceId::current() }).await;
        assert_eq!(observed, Some(expected));
    }

    #[tokio::test]
    async fn no_identifier_outside_scope() {
        assert!(TraceId::current().is_none());
    }

    #[test]
    fn parses_canonical_uuid_text() {
        let trace_id: TraceId = "6f1c1d8e-8f43-4e7e-9f55-3c1d9f4e2a10"
            .parse()
            .expect("uuid text");
        assert_eq!(
            trace_id.as_uuid().to_string(),
            "6f1c1d8e-8f43-4e7e-9f55-3c1d9f4e2a10"
        );
    }

    #[test]
    fn rejects_non_uuid_text() {
        assert!("trace-me".parse::<TraceId>().is_err());
    }
}
