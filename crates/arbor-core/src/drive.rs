//! Drive - a named root plus its path syntax
//!
//! The unit an integration layer mounts. Paths handed to a drive have
//! already lost any drive or provider prefix.

use crate::capability::{CapabilityKind, Outcome, Request};
use crate::dispatch;
use crate::error::{Error, Result};
use crate::node::Node;
use crate::path::PathTool;
use crate::resolver;
use serde_json::Value;

#[derive(Clone, Debug)]
pub struct Drive {
    name: String,
    root: Node,
    paths: PathTool,
}

impl Drive {
    pub fn new(name: impl Into<String>, root: Node) -> Self {
        Self::with_paths(name, root, PathTool::default())
    }

    pub fn with_paths(name: impl Into<String>, root: Node, paths: PathTool) -> Self {
        Self {
            name: name.into(),
            root,
            paths,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn paths(&self) -> &PathTool {
        &self.paths
    }

    pub fn segments(&self, path: Option<&str>) -> Vec<String> {
        self.paths.split(path)
    }

    pub fn resolve(&self, path: Option<&str>) -> Result<Node> {
        resolver::resolve(&self.root, &self.segments(path))
    }

    pub fn exists(&self, path: Option<&str>) -> Result<bool> {
        resolver::exists(&self.root, &self.segments(path))
    }

    pub fn is_container(&self, path: Option<&str>) -> Result<bool> {
        Ok(self.resolve(path)?.is_container())
    }

    /// Materialized children of the item at `path`; empty for a leaf.
    pub fn list(&self, path: Option<&str>) -> Result<Vec<Node>> {
        self.resolve(path)?.children()?.collect()
    }

    pub fn child_names(&self, path: Option<&str>) -> Result<Vec<String>> {
        match self.resolve(path)? {
            Node::Container(c) => c.child_names(),
            Node::Leaf(_) => Ok(Vec::new()),
        }
    }

    pub fn has_children(&self, path: Option<&str>) -> Result<bool> {
        match self.resolve(path)? {
            Node::Container(c) => c.has_children(),
            Node::Leaf(_) => Ok(false),
        }
    }

    /// Everything below `path`, as textual paths relative to the drive root.
    pub fn walk(
        &self,
        path: Option<&str>,
        max_depth: Option<usize>,
    ) -> Result<Vec<(String, Node)>> {
        let base = self.segments(path);
        let start = resolver::resolve(&self.root, &base)?;
        Ok(resolver::walk(&start, max_depth)?
            .into_iter()
            .map(|(rel, node)| {
                let mut full = base.clone();
                full.extend(rel);
                (self.paths.join(&full), node)
            })
            .collect())
    }

    pub fn new_item(
        &self,
        path: &str,
        type_hint: Option<&str>,
        value: Option<Value>,
    ) -> Result<Node> {
        let (parent, name) = resolver::resolve_parent(&self.root, &self.segments(Some(path)))?;
        parent.create_child(&name, type_hint, value)
    }

    pub fn remove_item(&self, path: &str, recursive: bool) -> Result<()> {
        let (parent, name) = resolver::resolve_parent(&self.root, &self.segments(Some(path)))?;
        parent.remove_child(&name, recursive)
    }

    pub fn rename_item(&self, path: &str, new_name: &str) -> Result<()> {
        if !self.paths.is_valid_name(new_name) {
            return Err(Error::InvalidArgument(format!("invalid item name '{}'", new_name)));
        }
        let (parent, name) = resolver::resolve_parent(&self.root, &self.segments(Some(path)))?;
        parent.rename_child(&name, new_name)
    }

    /// Copy is routed to the drive root with both paths relative to it.
    pub fn copy_item(&self, source: &str, destination: &str, recursive: bool) -> Result<()> {
        let request = Request::CopyItem {
            source: self.segments(Some(source)),
            destination: self.segments(Some(destination)),
            recursive,
        };
        dispatch::invoke(&self.root, request)?.into_unit(CapabilityKind::CopyItem)
    }

    pub fn move_item(&self, source: &str, destination: &str) -> Result<()> {
        let request = Request::MoveItem {
            source: self.segments(Some(source)),
            destination: self.segments(Some(destination)),
        };
        dispatch::invoke(&self.root, request)?.into_unit(CapabilityKind::MoveItem)
    }

    pub fn get_content(&self, path: Option<&str>) -> Result<Value> {
        self.resolve(path)?.get_content()
    }

    pub fn set_content(&self, path: Option<&str>, value: Value) -> Result<()> {
        self.resolve(path)?.set_content(value)
    }

    pub fn get_property(&self, path: Option<&str>, name: &str) -> Result<Value> {
        self.resolve(path)?.get_property(name)
    }

    pub fn set_property(&self, path: Option<&str>, name: &str, value: Value) -> Result<()> {
        self.resolve(path)?.set_property(name, value)
    }

    pub fn clear_property(&self, path: Option<&str>, name: &str) -> Result<()> {
        self.resolve(path)?.clear_property(name)
    }

    /// Resolve then dispatch an arbitrary request, custom kinds included.
    pub fn invoke(&self, path: Option<&str>, request: Request) -> Result<Outcome> {
        dispatch::invoke(&self.resolve(path)?, request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::CapabilityRegistry;

    #[test]
    fn absent_and_empty_paths_both_name_the_root() {
        let drive = Drive::new("d", Node::container("root", CapabilityRegistry::new()));
        assert_eq!(drive.resolve(None).unwrap().name(), "root");
        assert_eq!(drive.resolve(Some("")).unwrap().name(), "root");
        assert_eq!(drive.resolve(Some("\\")).unwrap().name(), "root");
    }

    #[test]
    fn empty_root_lists_nothing() {
        let drive = Drive::new("d", Node::container("root", CapabilityRegistry::new()));
        assert!(drive.list(None).unwrap().is_empty());
        assert!(drive.child_names(None).unwrap().is_empty());
        assert!(!drive.has_children(None).unwrap());
        assert!(drive.walk(None, None).unwrap().is_empty());
    }

    #[test]
    fn copy_without_capability_is_unsupported() {
        let drive = Drive::new("d", Node::container("root", CapabilityRegistry::new()));
        let err = drive.copy_item("a", "b", true).unwrap_err();
        assert!(matches!(
            err,
            Error::UnsupportedOperation { kind: CapabilityKind::CopyItem, .. }
        ));
    }

    #[test]
    fn rename_rejects_names_containing_the_separator() {
        let drive = Drive::new("d", Node::container("root", CapabilityRegistry::new()));
        assert!(matches!(
            drive.rename_item("a", "b\\c"),
            Err(Error::InvalidArgument(_))
        ));
    }
}
