//! Stored items and path lookup inside the dictionary tree

use arbor_core::{Error, NodeKind, Result};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Item {
    pub properties: BTreeMap<String, Value>,
    pub body: Body,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Body {
    Container(BTreeMap<String, Item>),
    Leaf(Value),
}

impl Item {
    pub fn container() -> Self {
        Self {
            properties: BTreeMap::new(),
            body: Body::Container(BTreeMap::new()),
        }
    }

    pub fn leaf(content: Value) -> Self {
        Self {
            properties: BTreeMap::new(),
            body: Body::Leaf(content),
        }
    }

    /// Objects become containers, anything else a leaf holding the value.
    pub fn from_seed(seed: Value) -> Self {
        match seed {
            Value::Object(map) => Self {
                properties: BTreeMap::new(),
                body: Body::Container(
                    map.into_iter()
                        .map(|(name, v)| (name, Self::from_seed(v)))
                        .collect(),
                ),
            },
            other => Self::leaf(other),
        }
    }

    pub fn to_seed(&self) -> Value {
        match &self.body {
            Body::Container(children) => Value::Object(
                children
                    .iter()
                    .map(|(name, item)| (name.clone(), item.to_seed()))
                    .collect::<Map<_, _>>(),
            ),
            Body::Leaf(content) => content.clone(),
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self.body {
            Body::Container(_) => NodeKind::Container,
            Body::Leaf(_) => NodeKind::Leaf,
        }
    }

    /// Copy of this item; a non-recursive copy of a container drops its children.
    pub fn copy(&self, recursive: bool) -> Self {
        match &self.body {
            Body::Container(_) if !recursive => Self {
                properties: self.properties.clone(),
                body: Body::Container(BTreeMap::new()),
            },
            _ => self.clone(),
        }
    }

    pub fn lookup(&self, path: &[String]) -> Result<&Item> {
        let mut current = self;
        for (depth, segment) in path.iter().enumerate() {
            current = match &current.body {
                Body::Container(children) => children.get(segment),
                Body::Leaf(_) => None,
            }
            .ok_or_else(|| missing(&path[..=depth]))?;
        }
        Ok(current)
    }

    pub fn lookup_mut(&mut self, path: &[String]) -> Result<&mut Item> {
        let mut current = self;
        for (depth, segment) in path.iter().enumerate() {
            current = match &mut current.body {
                Body::Container(children) => children.get_mut(segment),
                Body::Leaf(_) => None,
            }
            .ok_or_else(|| missing(&path[..=depth]))?;
        }
        Ok(current)
    }

    pub fn children(&self) -> Result<&BTreeMap<String, Item>> {
        match &self.body {
            Body::Container(children) => Ok(children),
            Body::Leaf(_) => Err(Error::InvalidArgument("not a container".into())),
        }
    }

    pub fn children_mut(&mut self) -> Result<&mut BTreeMap<String, Item>> {
        match &mut self.body {
            Body::Container(children) => Ok(children),
            Body::Leaf(_) => Err(Error::InvalidArgument("not a container".into())),
        }
    }
}

pub(crate) fn missing(path: &[String]) -> Error {
    Error::not_found(path.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn segs(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn seed_round_trips_through_items() {
        let seed = json!({"a": {"b": 1, "c": "two"}, "d": [1, 2]});
        let item = Item::from_seed(seed.clone());
        assert_eq!(item.kind(), NodeKind::Container);
        assert_eq!(item.to_seed(), seed);
    }

    #[test]
    fn lookup_walks_containers_only() {
        let item = Item::from_seed(json!({"a": {"b": 1}}));
        assert_eq!(item.lookup(&segs(&["a", "b"])).unwrap().kind(), NodeKind::Leaf);
        match item.lookup(&segs(&["a", "b", "c"])) {
            Err(Error::NotFound { name }) => assert_eq!(name, "a/b/c"),
            other => panic!("expected NotFound, got {:?}", other),
        }
        match item.lookup(&segs(&["z"])) {
            Err(Error::NotFound { name }) => assert_eq!(name, "z"),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn shallow_copy_drops_children_but_keeps_properties() {
        let mut item = Item::from_seed(json!({"a": 1}));
        item.properties.insert("p".into(), json!(true));
        let copy = item.copy(false);
        assert!(copy.children().unwrap().is_empty());
        assert_eq!(copy.properties.get("p"), Some(&json!(true)));
        assert_eq!(item.copy(true), item);
    }
}
