//! Arbor Core - storage-agnostic namespace tree
//!
//! Nodes are containers or leaves; what a node can do is whatever its
//! adapter registered in its capability registry.

pub mod capability;
pub mod config;
pub mod dispatch;
pub mod drive;
pub mod error;
pub mod node;
pub mod path;
pub mod resolver;

pub use capability::{
    Capability, CapabilityKind, CapabilityRegistry, FnCapability, Outcome, Request,
};
pub use config::{ArborConfig, BackendConfig, DriveConfig, PathConfig};
pub use dispatch::{invoke, supports};
pub use drive::Drive;
pub use error::{Error, Result};
pub use node::{
    Addressable, ChildEntry, Children, ContainerNode, LeafNode, Node, NodeIter, NodeKind,
};
pub use path::PathTool;
pub use resolver::{exists, resolve, resolve_parent, walk};
