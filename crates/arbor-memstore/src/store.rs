//! Dictionary-backed store
//!
//! Every node handed out holds the shared tree plus its own path inside
//! it, and re-walks that path on each call. A handle whose item was removed
//! or renamed away reports `NotFound`.

use crate::item::{missing, Body, Item};
use arbor_core::{
    CapabilityKind, CapabilityRegistry, ChildEntry, Drive, Error, FnCapability, Node, NodeKind,
    Outcome, PathTool, Request, Result,
};
use serde_json::Value;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

const ADAPTER: &str = "memstore";

#[derive(Clone, Debug)]
pub struct DictionaryStore {
    tree: Arc<RwLock<Item>>,
}

impl Default for DictionaryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DictionaryStore {
    /// An empty store: the root is a container with no children.
    pub fn new() -> Self {
        Self {
            tree: Arc::new(RwLock::new(Item::container())),
        }
    }

    /// Build from a JSON-like seed. The seed itself must be an object.
    pub fn from_seed(seed: Value) -> Result<Self> {
        if !seed.is_object() {
            return Err(Error::Config("memory seed must be a table".into()));
        }
        Ok(Self {
            tree: Arc::new(RwLock::new(Item::from_seed(seed))),
        })
    }

    /// Current contents in seed form. Properties are not included.
    pub fn snapshot(&self) -> Result<Value> {
        Ok(self.read()?.to_seed())
    }

    pub fn root_node(&self, name: &str) -> Result<Node> {
        build_node(self.clone(), Vec::new(), name.to_string(), NodeKind::Container)
    }

    pub fn drive(&self, name: &str) -> Result<Drive> {
        self.drive_with(name, PathTool::default())
    }

    pub fn drive_with(&self, name: &str, paths: PathTool) -> Result<Drive> {
        Ok(Drive::with_paths(name, self.root_node(name)?, paths))
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Item>> {
        self.tree
            .read()
            .map_err(|_| Error::adapter(ADAPTER, "store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Item>> {
        self.tree
            .write()
            .map_err(|_| Error::adapter(ADAPTER, "store lock poisoned"))
    }

    // ============================================================
    // Container operations
    // ============================================================

    fn list(&self, path: &[String]) -> Result<Vec<(String, NodeKind)>> {
        let tree = self.read()?;
        let children = tree.lookup(path)?.children()?;
        Ok(children
            .iter()
            .map(|(name, item)| (name.clone(), item.kind()))
            .collect())
    }

    fn new_item(
        &self,
        path: &[String],
        name: String,
        type_hint: Option<String>,
        value: Option<Value>,
    ) -> Result<Node> {
        if name.is_empty() {
            return Err(Error::InvalidArgument("item name is empty".into()));
        }
        let item = match type_hint.as_deref().map(str::to_ascii_lowercase).as_deref() {
            Some("container" | "directory" | "folder") => Item::container(),
            None | Some("leaf" | "item" | "file") => Item::leaf(value.unwrap_or(Value::Null)),
            Some(other) => {
                return Err(Error::InvalidArgument(format!("unknown item type '{}'", other)))
            }
        };
        let kind = item.kind();
        {
            let mut tree = self.write()?;
            let children = tree.lookup_mut(path)?.children_mut()?;
            if children.contains_key(&name) {
                return Err(Error::duplicate_name(name));
            }
            children.insert(name.clone(), item);
        }
        debug!(parent = %path.join("/"), %name, %kind, "new item");
        let mut child_path = path.to_vec();
        child_path.push(name.clone());
        build_node(self.clone(), child_path, name, kind)
    }

    fn remove_item(&self, path: &[String], name: &str, recursive: bool) -> Result<()> {
        let mut tree = self.write()?;
        let children = tree.lookup_mut(path)?.children_mut()?;
        let child = children.get(name).ok_or_else(|| Error::not_found(name))?;
        if let Body::Container(grandchildren) = &child.body {
            if !recursive && !grandchildren.is_empty() {
                return Err(Error::not_empty(name));
            }
        }
        children.remove(name);
        debug!(parent = %path.join("/"), name, recursive, "removed item");
        Ok(())
    }

    fn rename_item(&self, path: &[String], old_name: &str, new_name: &str) -> Result<()> {
        if new_name.is_empty() {
            return Err(Error::InvalidArgument("item name is empty".into()));
        }
        let mut tree = self.write()?;
        let children = tree.lookup_mut(path)?.children_mut()?;
        if !children.contains_key(old_name) {
            return Err(Error::not_found(old_name));
        }
        if old_name == new_name {
            return Ok(());
        }
        if children.contains_key(new_name) {
            return Err(Error::duplicate_name(new_name));
        }
        if let Some(item) = children.remove(old_name) {
            children.insert(new_name.to_string(), item);
        }
        debug!(parent = %path.join("/"), old_name, new_name, "renamed item");
        Ok(())
    }

    /// Where `source` lands for a copy or move to `destination`: into
    /// `destination` when it is an existing container, otherwise as the last
    /// segment of `destination` inside its parent.
    fn placement(
        tree: &Item,
        source: &[String],
        destination: &[String],
    ) -> Result<(Vec<String>, String)> {
        let source_name = source
            .last()
            .ok_or_else(|| Error::InvalidArgument("cannot copy or move the root".into()))?;
        if let Ok(target) = tree.lookup(destination) {
            if target.kind() == NodeKind::Container {
                return Ok((destination.to_vec(), source_name.clone()));
            }
            return Err(Error::duplicate_name(destination.join("/")));
        }
        let (name, parent) = destination
            .split_last()
            .ok_or_else(|| Error::InvalidArgument("destination is empty".into()))?;
        match tree.lookup(parent)?.kind() {
            NodeKind::Container => Ok((parent.to_vec(), name.clone())),
            NodeKind::Leaf => Err(missing(destination)),
        }
    }

    fn copy_item(&self, source: &[String], destination: &[String], recursive: bool) -> Result<()> {
        let mut tree = self.write()?;
        let copy = tree.lookup(source)?.copy(recursive);
        let (parent, name) = Self::placement(&tree, source, destination)?;
        let children = tree.lookup_mut(&parent)?.children_mut()?;
        if children.contains_key(&name) {
            return Err(Error::duplicate_name(name));
        }
        children.insert(name.clone(), copy);
        debug!(
            source = %source.join("/"),
            parent = %parent.join("/"),
            %name,
            recursive,
            "copied item"
        );
        Ok(())
    }

    fn move_item(&self, source: &[String], destination: &[String]) -> Result<()> {
        let mut tree = self.write()?;
        let _ = tree.lookup(source)?;
        let (parent, name) = Self::placement(&tree, source, destination)?;
        if parent.starts_with(source) {
            return Err(Error::InvalidArgument(format!(
                "cannot move '{}' into itself",
                source.join("/")
            )));
        }
        if tree.lookup(&parent)?.children()?.contains_key(&name) {
            return Err(Error::duplicate_name(name));
        }
        let (source_name, source_parent) = match source.split_last() {
            Some(split) => split,
            None => return Err(Error::InvalidArgument("cannot move the root".into())),
        };
        let item = tree
            .lookup_mut(source_parent)?
            .children_mut()?
            .remove(source_name)
            .ok_or_else(|| missing(source))?;
        tree.lookup_mut(&parent)?
            .children_mut()?
            .insert(name.clone(), item);
        debug!(source = %source.join("/"), parent = %parent.join("/"), %name, "moved item");
        Ok(())
    }

    // ============================================================
    // Content and properties
    // ============================================================

    fn get_content(&self, path: &[String]) -> Result<Value> {
        let tree = self.read()?;
        match &tree.lookup(path)?.body {
            Body::Leaf(content) => Ok(content.clone()),
            Body::Container(_) => Err(Error::InvalidArgument("containers have no content".into())),
        }
    }

    fn set_content(&self, path: &[String], value: Value) -> Result<()> {
        let mut tree = self.write()?;
        match &mut tree.lookup_mut(path)?.body {
            Body::Leaf(content) => {
                *content = value;
                Ok(())
            }
            Body::Container(_) => Err(Error::InvalidArgument("containers have no content".into())),
        }
    }

    fn get_property(&self, path: &[String], name: &str) -> Result<Value> {
        let tree = self.read()?;
        tree.lookup(path)?
            .properties
            .get(name)
            .cloned()
            .ok_or_else(|| Error::not_found(name))
    }

    fn set_property(&self, path: &[String], name: String, value: Value) -> Result<()> {
        let mut tree = self.write()?;
        tree.lookup_mut(path)?.properties.insert(name, value);
        Ok(())
    }

    /// The name stays known with a null value. Clearing a never-set name fails.
    fn clear_property(&self, path: &[String], name: String) -> Result<()> {
        let mut tree = self.write()?;
        match tree.lookup_mut(path)?.properties.get_mut(&name) {
            Some(value) => {
                *value = Value::Null;
                Ok(())
            }
            None => Err(Error::not_found(name)),
        }
    }
}

// ============================================================
// Node construction
// ============================================================

fn build_node(
    store: DictionaryStore,
    path: Vec<String>,
    name: String,
    kind: NodeKind,
) -> Result<Node> {
    let mut reg = CapabilityRegistry::new();
    let mut add = |cap: CapabilityKind| {
        let store = store.clone();
        let path = path.clone();
        reg.register(FnCapability::new(cap, move |req| handle(&store, &path, req)))
    };

    add(CapabilityKind::GetProperty)?;
    add(CapabilityKind::SetProperty)?;
    add(CapabilityKind::ClearProperty)?;
    match kind {
        NodeKind::Container => {
            add(CapabilityKind::ListChildren)?;
            add(CapabilityKind::NewItem)?;
            add(CapabilityKind::RemoveItem)?;
            add(CapabilityKind::RenameItem)?;
            if path.is_empty() {
                add(CapabilityKind::CopyItem)?;
                add(CapabilityKind::MoveItem)?;
            }
        }
        NodeKind::Leaf => {
            add(CapabilityKind::GetItemContent)?;
            add(CapabilityKind::SetItemContent)?;
        }
    }
    Ok(match kind {
        NodeKind::Container => Node::container(name, reg),
        NodeKind::Leaf => Node::leaf(name, reg),
    })
}

fn handle(store: &DictionaryStore, path: &[String], request: Request) -> Result<Outcome> {
    match request {
        Request::ListChildren => {
            let store = store.clone();
            let base = path.to_vec();
            let entries = store.list(path)?.into_iter().map(move |(name, kind)| {
                let store = store.clone();
                let mut child_path = base.clone();
                child_path.push(name.clone());
                let child_name = name.clone();
                Ok::<_, Error>(ChildEntry::new(name, kind, move || {
                    build_node(store, child_path, child_name, kind)
                }))
            });
            Ok(Outcome::Children(Box::new(entries)))
        }
        Request::NewItem {
            name,
            type_hint,
            value,
        } => store.new_item(path, name, type_hint, value).map(Outcome::Node),
        Request::RemoveItem { name, recursive } => {
            store.remove_item(path, &name, recursive).map(|_| Outcome::Unit)
        }
        Request::RenameItem { old_name, new_name } => store
            .rename_item(path, &old_name, &new_name)
            .map(|_| Outcome::Unit),
        Request::CopyItem {
            source,
            destination,
            recursive,
        } => store
            .copy_item(&source, &destination, recursive)
            .map(|_| Outcome::Unit),
        Request::MoveItem {
            source,
            destination,
        } => store.move_item(&source, &destination).map(|_| Outcome::Unit),
        Request::GetItemContent => store.get_content(path).map(Outcome::Value),
        Request::SetItemContent { value } => store.set_content(path, value).map(|_| Outcome::Unit),
        Request::GetProperty { name } => store.get_property(path, &name).map(Outcome::Value),
        Request::SetProperty { name, value } => {
            store.set_property(path, name, value).map(|_| Outcome::Unit)
        }
        Request::ClearProperty { name } => store.clear_property(path, name).map(|_| Outcome::Unit),
        Request::Custom { kind, .. } => Err(Error::unsupported(
            CapabilityKind::Custom(kind),
            path.join("/"),
        )),
    }
}
