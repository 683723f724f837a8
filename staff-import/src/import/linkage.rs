//! Bounded wait for the staff row created by the backend for a new account
//!
//! The backend inserts the `staff` row from a trigger on account creation, with
//! no latency guarantee. The importer polls for it a fixed number of times.

use std::time::Duration;

use log::debug;
use serde_json::Value;

use super::context::STAFF_TABLE;
use crate::api::{Backend, FilterValue, Query};

/// Fixed-interval polling bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkagePolicy {
    /// Number of lookups before giving up (at least one is always made)
    pub max_attempts: u32,
    /// Pause between two lookups
    pub interval: Duration,
}

impl Default for LinkagePolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            interval: Duration::from_millis(500),
        }
    }
}

/// Primary key of a `staff` row, kept in the JSON type the backend returned
#[derive(Debug, Clone, PartialEq)]
pub struct StaffId(Value);

impl StaffId {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_json(&self) -> &Value {
        &self.0
    }

    /// Filter operand addressing this row
    pub fn filter_value(&self) -> FilterValue {
        FilterValue::from_json(&self.0).unwrap_or_else(|| FilterValue::String(self.to_string()))
    }
}

impl std::fmt::Display for StaffId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            Value::String(s) => write!(f, "{}", s),
            other => write!(f, "{}", other),
        }
    }
}

/// Why the staff row could not be found
#[derive(Debug)]
pub enum LinkageError {
    /// The row never became visible
    TimedOut { attempts: u32 },
    /// A lookup call failed; lookups are not retried on error
    Backend(anyhow::Error),
}

impl std::fmt::Display for LinkageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LinkageError::TimedOut { attempts } => {
                write!(f, "staff row did not appear after {} lookup(s)", attempts)
            }
            LinkageError::Backend(err) => write!(f, "staff lookup failed: {:#}", err),
        }
    }
}

impl std::error::Error for LinkageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LinkageError::TimedOut { .. } => None,
            LinkageError::Backend(err) => Some(err.as_ref()),
        }
    }
}

/// Poll `staff` for the row whose `profile_id` is `account_id`.
///
/// Returns as soon as a row with an `id` is seen. Sleeps `policy.interval`
/// between lookups but not after the last one.
pub async fn await_staff_record<B>(
    backend: &B,
    account_id: &str,
    policy: &LinkagePolicy,
) -> Result<StaffId, LinkageError>
where
    B: Backend + ?Sized,
{
    let query = Query::new(STAFF_TABLE)
        .select(&["id"])
        .eq("profile_id", account_id)
        .limit(1);
    let attempts = policy.max_attempts.max(1);

    for attempt in 1..=attempts {
        let rows = backend.select(&query).await.map_err(LinkageError::Backend)?;

        if let Some(id) = rows
            .first()
            .and_then(|row| row.get("id"))
            .filter(|id| !id.is_null())
        {
            debug!(
                "Staff row for account {} found on attempt {}/{}",
                account_id, attempt, attempts
            );
            return Ok(StaffId::new(id.clone()));
        }

        debug!(
            "Staff row for account {} not visible yet (attempt {}/{})",
            account_id, attempt, attempts
        );
        if attempt < attempts {
            tokio::time::sleep(policy.interval).await;
        }
    }

    Err(LinkageError::TimedOut { attempts })
}
