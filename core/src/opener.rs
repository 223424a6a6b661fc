//! HTTP transport collaborator contract (spec §4.5, §6): `opener.send(request)`.
//! The transport itself is out of scope for this crate — this module only
//! defines the seam the prober calls through.

use s404_types::{HttpResponse, Url};
use thiserror::Error;

/// A single outbound GET issued by the prober.
#[derive(Debug, Clone)]
pub struct ProbeRequest {
    pub url: Url,
}

/// Late-bound HTTP transport (spec §6: `set_opener`).
pub trait HttpOpener: Send + Sync {
    fn send(&self, request: &ProbeRequest) -> Result<HttpResponse, OpenerError>;
}

#[derive(Debug, Error)]
pub enum OpenerError {
    #[error("{0}")]
    Transport(String),
}

/// Opaque worker pool handed to the classifier (spec §6: `set_worker_pool`).
/// The core never calls into it — it only threads the handle through for
/// whatever transport/scheduling layer the caller wires up.
pub trait WorkerPool: Send + Sync {}
