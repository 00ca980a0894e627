//! Arbor Fs - host-directory-backed adapter
//!
//! Directories are containers, files are leaves. Metadata is exposed as
//! read-only properties.

use arbor_core::{
    CapabilityKind, CapabilityRegistry, ChildEntry, Drive, Error, FnCapability, Node, NodeKind,
    Outcome, PathTool, Request, Result,
};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

#[derive(Clone, Debug)]
pub struct DirectoryStore {
    root: Arc<PathBuf>,
}

impl DirectoryStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: Arc::new(root.as_ref().to_path_buf()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Fails if `root` is not an existing directory.
    pub fn root_node(&self, name: &str) -> Result<Node> {
        if !self.root.is_dir() {
            return Err(Error::not_found(self.root.display().to_string()));
        }
        build_node(self.clone(), Vec::new(), name.to_string(), NodeKind::Container)
    }

    pub fn drive(&self, name: &str) -> Result<Drive> {
        self.drive_with(name, PathTool::default())
    }

    pub fn drive_with(&self, name: &str, paths: PathTool) -> Result<Drive> {
        Ok(Drive::with_paths(name, self.root_node(name)?, paths))
    }

    fn host_path(&self, segments: &[String]) -> PathBuf {
        let mut path = PathBuf::clone(&self.root);
        path.extend(segments);
        path
    }

    fn list(&self, segments: &[String]) -> Result<Vec<(String, NodeKind)>> {
        let dir = self.host_path(segments);
        let mut out = Vec::new();
        for entry in fs::read_dir(&dir).map_err(|e| io_error(e, segments))? {
            let entry = entry?;
            let Ok(name) = entry.file_name().into_string() else {
                debug!(dir = %dir.display(), "skipping non-UTF-8 entry");
                continue;
            };
            let kind = if entry.file_type()?.is_dir() {
                NodeKind::Container
            } else {
                NodeKind::Leaf
            };
            out.push((name, kind));
        }
        out.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(out)
    }

    fn new_item(
        &self,
        segments: &[String],
        name: String,
        type_hint: Option<String>,
        value: Option<Value>,
    ) -> Result<Node> {
        validate_name(&name)?;
        let child = child_of(segments, &name);
        let path = self.host_path(&child);
        if fs::symlink_metadata(&path).is_ok() {
            return Err(Error::duplicate_name(name));
        }
        let kind = match type_hint.as_deref().map(str::to_ascii_lowercase).as_deref() {
            Some("directory" | "container" | "folder") => {
                fs::create_dir(&path)?;
                NodeKind::Container
            }
            None | Some("file" | "leaf" | "item") => {
                fs::write(&path, encode(value.unwrap_or(Value::Null))?)?;
                NodeKind::Leaf
            }
            Some(other) => {
                return Err(Error::InvalidArgument(format!("unknown item type '{}'", other)))
            }
        };
        debug!(path = %path.display(), %kind, "created");
        build_node(self.clone(), child, name, kind)
    }

    fn remove_item(&self, segments: &[String], name: &str, recursive: bool) -> Result<()> {
        if !is_child_name(name) {
            return Err(Error::not_found(name));
        }
        let child = child_of(segments, name);
        let path = self.host_path(&child);
        let meta = fs::symlink_metadata(&path).map_err(|e| io_error(e, &child))?;
        if meta.is_dir() {
            if recursive {
                fs::remove_dir_all(&path)?;
            } else if fs::read_dir(&path)?.next().is_some() {
                return Err(Error::not_empty(name));
            } else {
                fs::remove_dir(&path)?;
            }
        } else {
            fs::remove_file(&path)?;
        }
        debug!(path = %path.display(), recursive, "removed");
        Ok(())
    }

    fn rename_item(&self, segments: &[String], old_name: &str, new_name: &str) -> Result<()> {
        if !is_child_name(old_name) {
            return Err(Error::not_found(old_name));
        }
        validate_name(new_name)?;
        let from = self.host_path(&child_of(segments, old_name));
        let to = self.host_path(&child_of(segments, new_name));
        if fs::symlink_metadata(&from).is_err() {
            return Err(Error::not_found(old_name));
        }
        if old_name == new_name {
            return Ok(());
        }
        if fs::symlink_metadata(&to).is_ok() {
            return Err(Error::duplicate_name(new_name));
        }
        fs::rename(&from, &to)?;
        debug!(from = %from.display(), to = %to.display(), "renamed");
        Ok(())
    }

    fn get_content(&self, segments: &[String]) -> Result<Value> {
        let bytes = fs::read(self.host_path(segments)).map_err(|e| io_error(e, segments))?;
        Ok(match String::from_utf8(bytes) {
            Ok(text) => Value::String(text),
            Err(e) => Value::from(e.into_bytes()),
        })
    }

    fn set_content(&self, segments: &[String], value: Value) -> Result<()> {
        let path = self.host_path(segments);
        if !path.is_file() {
            return Err(Error::not_found(segments.join("/")));
        }
        fs::write(&path, encode(value)?)?;
        Ok(())
    }

    fn get_property(&self, segments: &[String], name: &str) -> Result<Value> {
        let meta = fs::metadata(self.host_path(segments)).map_err(|e| io_error(e, segments))?;
        match name {
            "length" => Ok(json!(meta.len())),
            "readonly" => Ok(json!(meta.permissions().readonly())),
            "modified" => {
                let modified: DateTime<Utc> = meta.modified()?.into();
                Ok(json!(modified.to_rfc3339()))
            }
            other => Err(Error::not_found(other)),
        }
    }
}

/// A name that can only denote an entry directly inside its directory.
fn is_child_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(['/', '\\']) && name != "." && name != ".."
}

fn validate_name(name: &str) -> Result<()> {
    if is_child_name(name) {
        Ok(())
    } else {
        Err(Error::InvalidArgument(format!("invalid item name '{}'", name)))
    }
}

fn child_of(segments: &[String], name: &str) -> Vec<String> {
    let mut child = segments.to_vec();
    child.push(name.to_string());
    child
}

/// Strings are written verbatim, everything else as JSON text.
fn encode(value: Value) -> Result<Vec<u8>> {
    match value {
        Value::String(text) => Ok(text.into_bytes()),
        Value::Null => Ok(Vec::new()),
        other => Ok(serde_json::to_vec(&other)?),
    }
}

fn io_error(e: io::Error, segments: &[String]) -> Error {
    if e.kind() == io::ErrorKind::NotFound {
        Error::not_found(segments.join("/"))
    } else {
        Error::Io(e)
    }
}

// ============================================================
// Node construction
// ============================================================

fn build_node(
    store: DirectoryStore,
    segments: Vec<String>,
    name: String,
    kind: NodeKind,
) -> Result<Node> {
    let mut reg = CapabilityRegistry::new();
    let mut add = |cap: CapabilityKind| {
        let store = store.clone();
        let segments = segments.clone();
        reg.register(FnCapability::new(cap, move |req| handle(&store, &segments, req)))
    };

    add(CapabilityKind::GetProperty)?;
    match kind {
        NodeKind::Container => {
            add(CapabilityKind::ListChildren)?;
            add(CapabilityKind::NewItem)?;
            add(CapabilityKind::RemoveItem)?;
            add(CapabilityKind::RenameItem)?;
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

fn handle(store: &DirectoryStore, segments: &[String], request: Request) -> Result<Outcome> {
    match request {
        Request::ListChildren => {
            let listed = store.list(segments)?;
            let store = store.clone();
            let base = segments.to_vec();
            let entries = listed.into_iter().map(move |(name, kind)| {
                let store = store.clone();
                let mut child = base.clone();
                child.push(name.clone());
                let child_name = name.clone();
                Ok::<_, Error>(ChildEntry::new(name, kind, move || {
                    build_node(store, child, child_name, kind)
                }))
            });
            Ok(Outcome::Children(Box::new(entries)))
        }
        Request::NewItem {
            name,
            type_hint,
            value,
        } => store
            .new_item(segments, name, type_hint, value)
            .map(Outcome::Node),
        Request::RemoveItem { name, recursive } => store
            .remove_item(segments, &name, recursive)
            .map(|_| Outcome::Unit),
        Request::RenameItem { old_name, new_name } => store
            .rename_item(segments, &old_name, &new_name)
            .map(|_| Outcome::Unit),
        Request::GetItemContent => store.get_content(segments).map(Outcome::Value),
        Request::SetItemContent { value } => {
            store.set_content(segments, value).map(|_| Outcome::Unit)
        }
        Request::GetProperty { name } => store.get_property(segments, &name).map(Outcome::Value),
        other => Err(Error::unsupported(other.kind(), segments.join("/"))),
    }
}
