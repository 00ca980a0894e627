//! Operation dispatch
//!
//! Every query and mutation of a node passes through [`invoke`]. The
//! dispatcher only routes: it looks the request's kind up in the node's
//! registry and reports `UnsupportedOperation` when nothing is there.

use crate::capability::{CapabilityKind, Outcome, Request};
use crate::error::{Error, Result};
use crate::node::Addressable;
use tracing::debug;

pub fn invoke<N: Addressable + ?Sized>(node: &N, request: Request) -> Result<Outcome> {
    let kind = request.kind();
    match node.capabilities().try_get(&kind) {
        Some(capability) => {
            debug!(%kind, node = node.name(), "dispatch");
            capability.invoke(request)
        }
        None => {
            debug!(%kind, node = node.name(), "unsupported");
            Err(Error::unsupported(kind, node.name()))
        }
    }
}

pub fn supports<N: Addressable + ?Sized>(node: &N, kind: &CapabilityKind) -> bool {
    node.capabilities().supports(kind)
}
