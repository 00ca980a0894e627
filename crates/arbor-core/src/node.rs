//! Node model - containers and leaves
//!
//! A node is a name plus the capability registry its adapter built for it.
//! Nodes never point at their parent; the parent/child relation exists only
//! while walking down from a root.

use crate::capability::{CapabilityKind, CapabilityRegistry, Request};
use crate::dispatch;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Container,
    Leaf,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Container => write!(f, "container"),
            Self::Leaf => write!(f, "leaf"),
        }
    }
}

/// Anything the dispatcher can route a request to.
pub trait Addressable {
    fn name(&self) -> &str;
    fn capabilities(&self) -> &CapabilityRegistry;
}

type Factory = Box<dyn FnOnce() -> Result<Node> + Send>;

/// A child as listed by its container: name and kind up front, the node
/// itself built only on demand.
pub struct ChildEntry {
    name: String,
    kind: NodeKind,
    factory: Factory,
}

impl ChildEntry {
    pub fn new(
        name: impl Into<String>,
        kind: NodeKind,
        factory: impl FnOnce() -> Result<Node> + Send + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            factory: Box::new(factory),
        }
    }

    /// Wrap a node that already exists.
    pub fn ready(node: Node) -> Self {
        let name = node.name().to_string();
        let kind = node.kind();
        Self::new(name, kind, move || Ok(node))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn materialize(self) -> Result<Node> {
        (self.factory)()
    }
}

impl fmt::Debug for ChildEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChildEntry")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Lazy listing produced by a ListChildren capability. Single pass.
pub type Children = Box<dyn Iterator<Item = Result<ChildEntry>> + Send>;

/// Lazy sequence of materialized children.
pub type NodeIter = Box<dyn Iterator<Item = Result<Node>> + Send>;

#[derive(Clone)]
pub struct ContainerNode {
    name: Arc<str>,
    capabilities: Arc<CapabilityRegistry>,
}

#[derive(Clone)]
pub struct LeafNode {
    name: Arc<str>,
    capabilities: Arc<CapabilityRegistry>,
}

/// A tree node, tagged by variant so callers match instead of type-testing.
#[derive(Clone, Debug)]
pub enum Node {
    Container(ContainerNode),
    Leaf(LeafNode),
}

macro_rules! impl_addressable {
    ($ty:ty, $label:literal) => {
        impl Addressable for $ty {
            fn name(&self) -> &str {
                &self.name
            }

            fn capabilities(&self) -> &CapabilityRegistry {
                &self.capabilities
            }
        }

        impl fmt::Debug for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct($label)
                    .field("name", &self.name)
                    .field("capabilities", &self.capabilities)
                    .finish()
            }
        }
    };
}

impl_addressable!(ContainerNode, "ContainerNode");
impl_addressable!(LeafNode, "LeafNode");

impl Addressable for Node {
    fn name(&self) -> &str {
        match self {
            Self::Container(c) => c.name(),
            Self::Leaf(l) => l.name(),
        }
    }

    fn capabilities(&self) -> &CapabilityRegistry {
        match self {
            Self::Container(c) => c.capabilities(),
            Self::Leaf(l) => l.capabilities(),
        }
    }
}

impl Node {
    pub fn container(name: impl Into<String>, capabilities: CapabilityRegistry) -> Self {
        Self::Container(ContainerNode {
            name: Arc::from(name.into()),
            capabilities: Arc::new(capabilities),
        })
    }

    pub fn leaf(name: impl Into<String>, capabilities: CapabilityRegistry) -> Self {
        Self::Leaf(LeafNode {
            name: Arc::from(name.into()),
            capabilities: Arc::new(capabilities),
        })
    }

    pub fn name(&self) -> &str {
        Addressable::name(self)
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Container(_) => NodeKind::Container,
            Self::Leaf(_) => NodeKind::Leaf,
        }
    }

    pub fn capabilities(&self) -> &CapabilityRegistry {
        Addressable::capabilities(self)
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Self::Container(_))
    }

    pub fn as_container(&self) -> Option<&ContainerNode> {
        match self {
            Self::Container(c) => Some(c),
            Self::Leaf(_) => None,
        }
    }

    pub fn into_container(self) -> Option<ContainerNode> {
        match self {
            Self::Container(c) => Some(c),
            Self::Leaf(_) => None,
        }
    }

    /// Children of this node. A leaf yields nothing, whatever its adapter registered.
    pub fn children(&self) -> Result<NodeIter> {
        match self {
            Self::Container(c) => c.enumerate_children(),
            Self::Leaf(_) => Ok(Box::new(std::iter::empty())),
        }
    }

    pub fn get_property(&self, name: &str) -> Result<Value> {
        get_property(self, name)
    }

    pub fn set_property(&self, name: &str, value: Value) -> Result<()> {
        set_property(self, name, value)
    }

    pub fn clear_property(&self, name: &str) -> Result<()> {
        clear_property(self, name)
    }

    pub fn get_content(&self) -> Result<Value> {
        dispatch::invoke(self, Request::GetItemContent)?.into_value(CapabilityKind::GetItemContent)
    }

    pub fn set_content(&self, value: Value) -> Result<()> {
        dispatch::invoke(self, Request::SetItemContent { value })?
            .into_unit(CapabilityKind::SetItemContent)
    }
}

impl From<ContainerNode> for Node {
    fn from(c: ContainerNode) -> Self {
        Self::Container(c)
    }
}

impl From<LeafNode> for Node {
    fn from(l: LeafNode) -> Self {
        Self::Leaf(l)
    }
}

impl ContainerNode {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name-level listing. No ListChildren capability means no children.
    pub fn child_entries(&self) -> Result<Children> {
        match dispatch::invoke(self, Request::ListChildren) {
            Ok(outcome) => outcome.into_children(CapabilityKind::ListChildren),
            Err(e) if e.is_unsupported() => Ok(Box::new(std::iter::empty())),
            Err(e) => Err(e),
        }
    }

    pub fn enumerate_children(&self) -> Result<NodeIter> {
        let entries = self.child_entries()?;
        Ok(Box::new(
            entries.map(|entry| entry.and_then(ChildEntry::materialize)),
        ))
    }

    pub fn child_names(&self) -> Result<Vec<String>> {
        self.child_entries()?
            .map(|entry| entry.map(|e| e.name))
            .collect()
    }

    pub fn has_children(&self) -> Result<bool> {
        match self.child_entries()?.next() {
            Some(entry) => entry.map(|_| true),
            None => Ok(false),
        }
    }

    /// Child with exactly this name, if any. Only the match is materialized.
    pub fn find_child(&self, name: &str) -> Result<Option<Node>> {
        for entry in self.child_entries()? {
            let entry = entry?;
            if entry.name == name {
                return entry.materialize().map(Some);
            }
        }
        Ok(None)
    }

    pub fn create_child(
        &self,
        name: &str,
        type_hint: Option<&str>,
        value: Option<Value>,
    ) -> Result<Node> {
        let request = Request::NewItem {
            name: name.to_string(),
            type_hint: type_hint.map(str::to_string),
            value,
        };
        dispatch::invoke(self, request)?.into_node(CapabilityKind::NewItem)
    }

    pub fn remove_child(&self, name: &str, recursive: bool) -> Result<()> {
        let request = Request::RemoveItem {
            name: name.to_string(),
            recursive,
        };
        dispatch::invoke(self, request)?.into_unit(CapabilityKind::RemoveItem)
    }

    pub fn rename_child(&self, old_name: &str, new_name: &str) -> Result<()> {
        let request = Request::RenameItem {
            old_name: old_name.to_string(),
            new_name: new_name.to_string(),
        };
        dispatch::invoke(self, request)?.into_unit(CapabilityKind::RenameItem)
    }
}

impl LeafNode {
    pub fn name(&self) -> &str {
        &self.name
    }
}

fn get_property(node: &impl Addressable, name: &str) -> Result<Value> {
    let request = Request::GetProperty {
        name: name.to_string(),
    };
    dispatch::invoke(node, request)?.into_value(CapabilityKind::GetProperty)
}

fn set_property(node: &impl Addressable, name: &str, value: Value) -> Result<()> {
    let request = Request::SetProperty {
        name: name.to_string(),
        value,
    };
    dispatch::invoke(node, request)?.into_unit(CapabilityKind::SetProperty)
}

fn clear_property(node: &impl Addressable, name: &str) -> Result<()> {
    let request = Request::ClearProperty {
        name: name.to_string(),
    };
    dispatch::invoke(node, request)?.into_unit(CapabilityKind::ClearProperty)
}
