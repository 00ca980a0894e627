//! Path resolution
//!
//! Walks segments down from a starting node, one exact name match per step.
//! Nothing here mutates the tree.

use crate::error::{Error, Result};
use crate::node::{ContainerNode, Node};
use crate::path::split_last;
use tracing::debug;

/// Resolve `segments` starting at `root`. No segments resolves to `root`.
pub fn resolve<S: AsRef<str>>(root: &Node, segments: &[S]) -> Result<Node> {
    let mut current = root.clone();
    for (depth, segment) in segments.iter().enumerate() {
        let segment = segment.as_ref();
        let next = match &current {
            Node::Container(container) => container.find_child(segment)?,
            Node::Leaf(_) => None,
        };
        match next {
            Some(child) => {
                debug!(segment, depth, kind = %child.kind(), "resolved segment");
                current = child;
            }
            None => {
                let path = owned(segments);
                debug!(segment, depth, "path not found");
                return Err(Error::path_not_found(&path, &path[..depth]));
            }
        }
    }
    Ok(current)
}

/// Resolve all but the last segment, which must land on a container.
/// Returns that container and the final name.
pub fn resolve_parent<S: AsRef<str>>(
    root: &Node,
    segments: &[S],
) -> Result<(ContainerNode, String)> {
    let (parent, name) = split_last(segments)
        .ok_or_else(|| Error::InvalidArgument("path has no final segment".into()))?;
    let resolved = resolve(root, parent).map_err(|e| match e {
        Error::PathNotFound { consumed, .. } => Error::path_not_found(&owned(segments), &consumed),
        other => other,
    })?;
    match resolved {
        Node::Container(container) => Ok((container, name.to_string())),
        Node::Leaf(_) => {
            // consumed everything up to the leaf, which cannot hold `name`
            let path = owned(segments);
            Err(Error::path_not_found(&path, &path[..parent.len()]))
        }
    }
}

/// Whether `segments` resolve. Only a failed resolution counts as absent.
pub fn exists<S: AsRef<str>>(root: &Node, segments: &[S]) -> Result<bool> {
    match resolve(root, segments) {
        Ok(_) => Ok(true),
        Err(Error::PathNotFound { .. }) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Depth-first, pre-order traversal of everything below `root`.
///
/// Each item is the child's segments relative to `root` and the child itself.
/// `max_depth` of `Some(0)` stops at direct children; `None` is unbounded.
pub fn walk(root: &Node, max_depth: Option<usize>) -> Result<Vec<(Vec<String>, Node)>> {
    let mut out = Vec::new();
    walk_into(root, &mut Vec::new(), 0, max_depth, &mut out)?;
    Ok(out)
}

fn walk_into(
    node: &Node,
    prefix: &mut Vec<String>,
    depth: usize,
    max_depth: Option<usize>,
    out: &mut Vec<(Vec<String>, Node)>,
) -> Result<()> {
    for child in node.children()? {
        let child = child?;
        prefix.push(child.name().to_string());
        out.push((prefix.clone(), child.clone()));
        if child.is_container() && max_depth.map_or(true, |max| depth < max) {
            walk_into(&child, prefix, depth + 1, max_depth, out)?;
        }
        prefix.pop();
    }
    Ok(())
}

fn owned<S: AsRef<str>>(segments: &[S]) -> Vec<String> {
    segments.iter().map(|s| s.as_ref().to_string()).collect()
}
