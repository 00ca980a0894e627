//! Capability registry and trait definitions
//!
//! A node's behavior is whatever set of capabilities its adapter registered.
//! Each capability handles exactly one kind; absence of a kind is a normal
//! answer, not a fault.

use crate::error::{Error, Result};
use crate::node::{Children, Node};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// The kinds of operation a node may support. `Custom` keeps the set open.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CapabilityKind {
    ListChildren,
    NewItem,
    RemoveItem,
    RenameItem,
    CopyItem,
    MoveItem,
    GetItemContent,
    SetItemContent,
    GetProperty,
    SetProperty,
    ClearProperty,
    Custom(Arc<str>),
}

impl CapabilityKind {
    pub fn custom(name: impl Into<String>) -> Self {
        Self::Custom(Arc::from(name.into()))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::ListChildren => "ListChildren",
            Self::NewItem => "NewItem",
            Self::RemoveItem => "RemoveItem",
            Self::RenameItem => "RenameItem",
            Self::CopyItem => "CopyItem",
            Self::MoveItem => "MoveItem",
            Self::GetItemContent => "GetItemContent",
            Self::SetItemContent => "SetItemContent",
            Self::GetProperty => "GetProperty",
            Self::SetProperty => "SetProperty",
            Self::ClearProperty => "ClearProperty",
            Self::Custom(name) => name.as_ref(),
        }
    }
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CapabilityKind {
    type Err = Error;

    /// Built-in names map to their variant; any other non-empty name is custom.
    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "" => return Err(Error::InvalidArgument("empty capability kind".into())),
            "ListChildren" => Self::ListChildren,
            "NewItem" => Self::NewItem,
            "RemoveItem" => Self::RemoveItem,
            "RenameItem" => Self::RenameItem,
            "CopyItem" => Self::CopyItem,
            "MoveItem" => Self::MoveItem,
            "GetItemContent" => Self::GetItemContent,
            "SetItemContent" => Self::SetItemContent,
            "GetProperty" => Self::GetProperty,
            "SetProperty" => Self::SetProperty,
            "ClearProperty" => Self::ClearProperty,
            other => Self::custom(other),
        })
    }
}

/// Arguments of one invocation. The variant determines the capability kind.
#[derive(Clone, Debug, PartialEq)]
pub enum Request {
    ListChildren,
    NewItem {
        name: String,
        type_hint: Option<String>,
        value: Option<Value>,
    },
    RemoveItem {
        name: String,
        recursive: bool,
    },
    RenameItem {
        old_name: String,
        new_name: String,
    },
    /// Paths are segment lists relative to the node the request is sent to.
    CopyItem {
        source: Vec<String>,
        destination: Vec<String>,
        recursive: bool,
    },
    MoveItem {
        source: Vec<String>,
        destination: Vec<String>,
    },
    GetItemContent,
    SetItemContent {
        value: Value,
    },
    GetProperty {
        name: String,
    },
    SetProperty {
        name: String,
        value: Value,
    },
    ClearProperty {
        name: String,
    },
    Custom {
        kind: Arc<str>,
        args: Value,
    },
}

impl Request {
    pub fn kind(&self) -> CapabilityKind {
        match self {
            Self::ListChildren => CapabilityKind::ListChildren,
            Self::NewItem { .. } => CapabilityKind::NewItem,
            Self::RemoveItem { .. } => CapabilityKind::RemoveItem,
            Self::RenameItem { .. } => CapabilityKind::RenameItem,
            Self::CopyItem { .. } => CapabilityKind::CopyItem,
            Self::MoveItem { .. } => CapabilityKind::MoveItem,
            Self::GetItemContent => CapabilityKind::GetItemContent,
            Self::SetItemContent { .. } => CapabilityKind::SetItemContent,
            Self::GetProperty { .. } => CapabilityKind::GetProperty,
            Self::SetProperty { .. } => CapabilityKind::SetProperty,
            Self::ClearProperty { .. } => CapabilityKind::ClearProperty,
            Self::Custom { kind, .. } => CapabilityKind::Custom(kind.clone()),
        }
    }

    pub fn custom(kind: impl Into<String>, args: Value) -> Self {
        Self::Custom {
            kind: Arc::from(kind.into()),
            args,
        }
    }
}

/// What a capability hands back.
pub enum Outcome {
    Unit,
    Value(Value),
    Node(Node),
    Children(Children),
}

impl fmt::Debug for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unit => write!(f, "Unit"),
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::Node(n) => f.debug_tuple("Node").field(n).finish(),
            Self::Children(_) => write!(f, "Children(..)"),
        }
    }
}

impl Outcome {
    fn shape(&self) -> &'static str {
        match self {
            Self::Unit => "unit",
            Self::Value(_) => "value",
            Self::Node(_) => "node",
            Self::Children(_) => "children",
        }
    }

    pub fn into_unit(self, kind: CapabilityKind) -> Result<()> {
        match self {
            Self::Unit => Ok(()),
            other => Err(unexpected(kind, "unit", &other)),
        }
    }

    pub fn into_value(self, kind: CapabilityKind) -> Result<Value> {
        match self {
            Self::Value(v) => Ok(v),
            other => Err(unexpected(kind, "value", &other)),
        }
    }

    pub fn into_node(self, kind: CapabilityKind) -> Result<Node> {
        match self {
            Self::Node(n) => Ok(n),
            other => Err(unexpected(kind, "node", &other)),
        }
    }

    pub fn into_children(self, kind: CapabilityKind) -> Result<Children> {
        match self {
            Self::Children(c) => Ok(c),
            other => Err(unexpected(kind, "children", &other)),
        }
    }
}

fn unexpected(kind: CapabilityKind, expected: &'static str, got: &Outcome) -> Error {
    tracing::debug!(%kind, expected, got = got.shape(), "capability outcome mismatch");
    Error::UnexpectedOutcome { kind, expected }
}

/// One unit of behavior an adapter provides for a node.
pub trait Capability: Send + Sync {
    /// The single kind this capability answers to.
    fn kind(&self) -> CapabilityKind;

    fn invoke(&self, request: Request) -> Result<Outcome>;
}

/// Closure-backed capability, so adapters need not declare a type per kind.
pub struct FnCapability<F> {
    kind: CapabilityKind,
    f: F,
}

impl<F> FnCapability<F>
where
    F: Fn(Request) -> Result<Outcome> + Send + Sync,
{
    pub fn new(kind: CapabilityKind, f: F) -> Self {
        Self { kind, f }
    }
}

impl<F> Capability for FnCapability<F>
where
    F: Fn(Request) -> Result<Outcome> + Send + Sync,
{
    fn kind(&self) -> CapabilityKind {
        self.kind.clone()
    }

    fn invoke(&self, request: Request) -> Result<Outcome> {
        (self.f)(request)
    }
}

/// Per-node map from capability kind to implementation.
///
/// Filled once while the node is assembled, then shared read-only.
#[derive(Default)]
pub struct CapabilityRegistry {
    capabilities: HashMap<CapabilityKind, Arc<dyn Capability>>,
}

impl fmt::Debug for CapabilityRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.kinds()).finish()
    }
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a capability under its own kind. At most one per kind.
    pub fn register(&mut self, capability: impl Capability + 'static) -> Result<()> {
        self.register_arc(Arc::new(capability))
    }

    pub fn register_arc(&mut self, capability: Arc<dyn Capability>) -> Result<()> {
        let kind = capability.kind();
        if self.capabilities.contains_key(&kind) {
            return Err(Error::duplicate_name(kind.as_str()));
        }
        self.capabilities.insert(kind, capability);
        Ok(())
    }

    /// Builder form of [`register`](Self::register) for closures.
    pub fn with<F>(mut self, kind: CapabilityKind, f: F) -> Result<Self>
    where
        F: Fn(Request) -> Result<Outcome> + Send + Sync + 'static,
    {
        self.register(FnCapability::new(kind, f))?;
        Ok(self)
    }

    pub fn try_get(&self, kind: &CapabilityKind) -> Option<Arc<dyn Capability>> {
        self.capabilities.get(kind).cloned()
    }

    pub fn supports(&self, kind: &CapabilityKind) -> bool {
        self.capabilities.contains_key(kind)
    }

    /// Registered kinds, sorted.
    pub fn kinds(&self) -> Vec<CapabilityKind> {
        let mut kinds: Vec<_> = self.capabilities.keys().cloned().collect();
        kinds.sort();
        kinds
    }

    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }
}
