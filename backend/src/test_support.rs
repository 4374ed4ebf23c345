//! Test utilities shared by unit tests (in `src/`) and integration tests
//! (in `tests/`). Compiled for `cfg(test)` or the `test-support` feature.

use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;

/// Clock whose reading only moves when a test advances it.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    /// Clock stopped at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    /// Move forward by `delta`.
    pub fn advance(&self, delta: Duration) {
        let delta = match TimeDelta::from_std(delta) {
            Ok(delta) => delta,
            Err(error) => panic!("duration out of range: {error}; delta={delta:?}"),
        };
        *self.lock_clock() += delta;
    }

    /// Move by whole seconds; negative values move back.
    pub fn advance_seconds(&self, seconds: i64) {
        *self.lock_clock() += TimeDelta::seconds(seconds);
    }

    /// Jump to `now`.
    pub fn set(&self, now: DateTime<Utc>) {
        *self.lock_clock() = now;
    }

    fn lock_clock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

pub mod openapi {
    //! OpenAPI schema traversal helpers.

    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::{Object, Schema};

    /// Extract an `Object` schema, panicking with a diagnostic otherwise.
    pub fn unwrap_object_schema<'a>(schema: &'a RefOr<Schema>, name: &str) -> &'a Object {
        match schema {
            RefOr::T(Schema::Object(obj)) => obj,
            RefOr::Ref(reference) => panic!(
                "schema '{name}' is a $ref to '{}'; resolve the reference first",
                reference.ref_location
            ),
            _ => panic!("schema '{name}' is not an Object"),
        }
    }

    /// Property `field` of `obj`; panics when absent.
    pub fn get_property<'a>(obj: &'a Object, field: &str) -> &'a RefOr<Schema> {
        match obj.properties.get(field) {
            Some(property) => property,
            None => panic!("property '{field}' not found"),
        }
    }
}
