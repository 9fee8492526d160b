//! Asynchronous provider operations: handles, payloads and poll results.
//!
//! Pure types only. The poller that produces these lives in
//! `application::services::operation`.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::error::PollError;

/// Status value reported by the provider once an operation has finished.
pub const STATUS_DONE: &str = "DONE";

/// Default upper bound on how long a single operation is polled.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(300);

/// Default delay between two status queries.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

// ── Handle ───────────────────────────────────────────────────────────────────

/// Where the provider tracks an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationScope {
    /// Zonal operation (instance insert/start/stop/delete).
    Zone(String),
    /// Global operation (image insert/delete).
    Global,
}

impl OperationScope {
    /// Parse a scope name plus optional zone.
    ///
    /// # Errors
    ///
    /// Returns `PollError::InvalidScope` if `scope` is neither `zone` nor
    /// `global`, or if `zone` is requested without a zone.
    pub fn parse(scope: &str, zone: Option<&str>) -> Result<Self, PollError> {
        match (scope, zone) {
            ("zone", Some(zone)) if !zone.is_empty() => Ok(Self::Zone(zone.to_owned())),
            ("global", _) => Ok(Self::Global),
            _ => Err(PollError::InvalidScope {
                scope: scope.to_owned(),
            }),
        }
    }

    /// The scope name as used on the wire (`zone` or `global`).
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Zone(_) => "zone",
            Self::Global => "global",
        }
    }
}

/// Identifies a pending asynchronous action on the provider side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationHandle {
    name: String,
    scope: OperationScope,
}

impl OperationHandle {
    /// Handle for a zonal operation.
    pub fn zonal(name: impl Into<String>, zone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scope: OperationScope::Zone(zone.into()),
        }
    }

    /// Handle for a global operation.
    pub fn global(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scope: OperationScope::Global,
        }
    }

    /// Build a handle from raw scope/zone strings.
    ///
    /// # Errors
    ///
    /// Returns `PollError::InvalidScope` for an unknown scope or a zonal
    /// scope without a zone.
    pub fn new(name: impl Into<String>, scope: &str, zone: Option<&str>) -> Result<Self, PollError> {
        Ok(Self {
            name: name.into(),
            scope: OperationScope::parse(scope, zone)?,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn scope(&self) -> &OperationScope {
        &self.scope
    }
}

// ── Payload ──────────────────────────────────────────────────────────────────

/// Operation resource as returned by the provider.
///
/// Only the fields the tool reads are typed; everything else is kept in
/// `extra` so the payload survives a round trip untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(default)]
    pub name: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl Operation {
    /// Whether the provider reports the operation as finished.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.status == STATUS_DONE
    }

    /// Last path segment of `targetLink`, i.e. the affected resource name.
    #[must_use]
    pub fn target_name(&self) -> Option<&str> {
        self.target_link
            .as_deref()
            .and_then(|link| link.rsplit('/').next())
            .filter(|name| !name.is_empty())
    }
}

// ── Results ──────────────────────────────────────────────────────────────────

/// Terminal outcome of polling one operation.
///
/// Success is derived from the payload's `error` field, so the error detail
/// is present exactly when the result is a failure.
#[derive(Debug, Clone, PartialEq)]
pub struct PollResult {
    operation: Operation,
}

impl PollResult {
    #[must_use]
    pub fn new(operation: Operation) -> Self {
        Self { operation }
    }

    #[must_use]
    pub fn success(&self) -> bool {
        self.operation.error.is_none()
    }

    #[must_use]
    pub fn error(&self) -> Option<&Value> {
        self.operation.error.as_ref()
    }

    #[must_use]
    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    #[must_use]
    pub fn into_operation(self) -> Operation {
        self.operation
    }
}

/// Why a waited-on operation did not succeed.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationFailure {
    /// The provider finished the operation with an error, kept verbatim.
    Provider(Value),
    /// A local fault: timeout, transport error, malformed payload.
    Fault(String),
}

impl OperationFailure {
    /// Human-readable message for the failure.
    ///
    /// Provider errors come either as `{code, message}` or in the Compute
    /// Engine shape `{errors: [{code, message}, ...]}`.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Fault(message) => message.clone(),
            Self::Provider(value) => provider_message(value)
                .unwrap_or_else(|| "Unknown error".to_string()),
        }
    }
}

fn provider_message(value: &Value) -> Option<String> {
    if let Some(message) = value.get("message").and_then(Value::as_str) {
        return Some(message.to_owned());
    }
    let messages: Vec<&str> = value
        .get("errors")?
        .as_array()?
        .iter()
        .filter_map(|e| e.get("message").and_then(Value::as_str))
        .collect();
    (!messages.is_empty()).then(|| messages.join("; "))
}

/// Normalized result handed back to workflows by the poll orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    Succeeded(Operation),
    Failed {
        error: OperationFailure,
        /// Terminal payload, when the provider returned one.
        operation: Option<Operation>,
    },
}

impl PollOutcome {
    /// A local fault with no terminal payload.
    pub fn fault(message: impl Into<String>) -> Self {
        Self::Failed {
            error: OperationFailure::Fault(message.into()),
            operation: None,
        }
    }

    #[must_use]
    pub fn success(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }

    #[must_use]
    pub fn operation(&self) -> Option<&Operation> {
        match self {
            Self::Succeeded(op) => Some(op),
            Self::Failed { operation, .. } => operation.as_ref(),
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&OperationFailure> {
        match self {
            Self::Succeeded(_) => None,
            Self::Failed { error, .. } => Some(error),
        }
    }
}

impl From<PollResult> for PollOutcome {
    fn from(result: PollResult) -> Self {
        let operation = result.into_operation();
        match operation.error.clone() {
            None => Self::Succeeded(operation),
            Some(error) => Self::Failed {
                error: OperationFailure::Provider(error),
                operation: Some(operation),
            },
        }
    }
}

/// Timing parameters for one poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub timeout: Duration,
    pub interval: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_POLL_TIMEOUT,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}
