//! Error types for route planning

use serde::Serialize;
use thiserror::Error;

use super::dijkstra::SearchTimedOut;

/// What a lookup was for; carried by `NotFound`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Entrance,
    Exit,
    Slot,
    Point,
}

impl std::fmt::Display for TargetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TargetKind::Entrance => "entrance",
            TargetKind::Exit => "exit",
            TargetKind::Slot => "slot",
            TargetKind::Point => "point",
        };
        f.write_str(s)
    }
}

/// Planner failure
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlannerError {
    #[error("{kind} {id} not found")]
    NotFound { kind: TargetKind, id: String },

    #[error("no route from {from} to {to}")]
    Unreachable { from: String, to: String },

    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("search deadline exceeded")]
    Timeout,
}

impl PlannerError {
    pub fn not_found(kind: TargetKind, id: impl Into<String>) -> Self {
        PlannerError::NotFound { kind, id: id.into() }
    }

    pub fn unreachable(from: impl ToString, to: impl ToString) -> Self {
        PlannerError::Unreachable { from: from.to_string(), to: to.to_string() }
    }

    /// Stable tag for callers that branch on the failure class.
    pub fn kind(&self) -> &'static str {
        match self {
            PlannerError::NotFound { .. } => "not_found",
            PlannerError::Unreachable { .. } => "unreachable",
            PlannerError::MalformedInput(_) => "malformed_input",
            PlannerError::Timeout => "timeout",
        }
    }

    /// HTTP status a request boundary should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            PlannerError::NotFound { .. } => 404,
            PlannerError::MalformedInput(_) => 400,
            PlannerError::Unreachable { .. } => 422,
            PlannerError::Timeout => 504,
        }
    }
}

impl From<SearchTimedOut> for PlannerError {
    fn from(_: SearchTimedOut) -> Self {
        PlannerError::Timeout
    }
}

pub type Result<T> = std::result::Result<T, PlannerError>;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ErrorBody {
    pub kind: &'static str,
    pub message: String,
    pub status: u16,
}

/// Envelope handed across the service boundary: never a raw error.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl<T: Serialize> From<Result<T>> for ApiResponse<T> {
    fn from(r: Result<T>) -> Self {
        match r {
            Ok(data) => ApiResponse { success: true, data: Some(data), error: None },
            Err(e) => ApiResponse {
                success: false,
                data: None,
                error: Some(ErrorBody { kind: e.kind(), message: e.to_string(), status: e.status_code() }),
            },
        }
    }
}
