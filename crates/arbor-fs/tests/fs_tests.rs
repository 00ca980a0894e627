//! Tests for arbor-fs: the directory adapter against a real temporary tree

use arbor_core::*;
use arbor_fs::DirectoryStore;
use serde_json::json;
use std::fs;

fn workspace() -> (tempfile::TempDir, Drive) {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("docs/notes")).unwrap();
    fs::write(dir.path().join("docs/readme.txt"), "hello").unwrap();
    fs::write(dir.path().join("docs/notes/todo.txt"), "milk").unwrap();
    fs::write(dir.path().join("blob.bin"), [0xff, 0x00, 0xfe]).unwrap();
    let drive = DirectoryStore::new(dir.path()).drive("disk").unwrap();
    (dir, drive)
}

// ===========================================================================
// Enumeration and resolution
// ===========================================================================

#[test]
fn empty_directory_enumerates_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let drive = DirectoryStore::new(dir.path()).drive("disk").unwrap();
    assert!(drive.list(None).unwrap().is_empty());
    assert!(!drive.has_children(None).unwrap());
}

#[test]
fn children_are_sorted_and_typed() {
    let (_dir, drive) = workspace();
    let names: Vec<(String, NodeKind)> = drive
        .list(None)
        .unwrap()
        .into_iter()
        .map(|n| (n.name().to_string(), n.kind()))
        .collect();
    assert_eq!(
        names,
        vec![
            ("blob.bin".to_string(), NodeKind::Leaf),
            ("docs".to_string(), NodeKind::Container),
        ]
    );
}

#[test]
fn resolves_nested_files() {
    let (_dir, drive) = workspace();
    assert_eq!(
        drive.get_content(Some("docs\\notes\\todo.txt")).unwrap(),
        json!("milk")
    );
    assert!(!drive.exists(Some("docs\\missing.txt")).unwrap());
}

// ===========================================================================
// Content and properties
// ===========================================================================

#[test]
fn binary_content_is_a_byte_array() {
    let (_dir, drive) = workspace();
    assert_eq!(drive.get_content(Some("blob.bin")).unwrap(), json!([255, 0, 254]));
}

#[test]
fn set_content_writes_strings_and_json() {
    let (dir, drive) = workspace();
    drive.set_content(Some("docs\\readme.txt"), json!("rewritten")).unwrap();
    assert_eq!(
        fs::read_to_string(dir.path().join("docs/readme.txt")).unwrap(),
        "rewritten"
    );
    drive.set_content(Some("docs\\readme.txt"), json!({"k": [1]})).unwrap();
    assert_eq!(
        fs::read_to_string(dir.path().join("docs/readme.txt")).unwrap(),
        r#"{"k":[1]}"#
    );
}

#[test]
fn metadata_properties_are_read_only() {
    let (_dir, drive) = workspace();
    assert_eq!(drive.get_property(Some("docs\\readme.txt"), "length").unwrap(), json!(5));
    assert_eq!(
        drive.get_property(Some("docs\\readme.txt"), "readonly").unwrap(),
        json!(false)
    );
    let modified = drive.get_property(Some("docs"), "modified").unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(modified.as_str().unwrap()).is_ok());

    assert!(drive.get_property(Some("docs"), "owner").unwrap_err().is_not_found());
    assert!(drive
        .set_property(Some("docs"), "owner", json!("amy"))
        .unwrap_err()
        .is_unsupported());
    assert!(drive.clear_property(Some("docs"), "length").unwrap_err().is_unsupported());
}

#[test]
fn copy_and_move_are_not_offered() {
    let (_dir, drive) = workspace();
    assert!(drive.copy_item("docs", "docs2", true).unwrap_err().is_unsupported());
    assert!(drive.move_item("docs", "docs2").unwrap_err().is_unsupported());
}

// ===========================================================================
// Mutation
// ===========================================================================

#[test]
fn new_files_and_directories() {
    let (dir, drive) = workspace();
    let file = drive.new_item("docs\\new.txt", None, Some(json!("fresh"))).unwrap();
    assert_eq!(file.kind(), NodeKind::Leaf);
    assert_eq!(fs::read_to_string(dir.path().join("docs/new.txt")).unwrap(), "fresh");

    let sub = drive.new_item("docs\\sub", Some("directory"), None).unwrap();
    assert_eq!(sub.kind(), NodeKind::Container);
    assert!(dir.path().join("docs/sub").is_dir());

    assert!(matches!(
        drive.new_item("docs\\readme.txt", None, None),
        Err(Error::DuplicateName { .. })
    ));
    assert!(matches!(
        drive.new_item("docs\\x", Some("socket"), None),
        Err(Error::InvalidArgument(_))
    ));
}

#[test]
fn remove_respects_recursion() {
    let (dir, drive) = workspace();
    assert!(matches!(
        drive.remove_item("docs", false),
        Err(Error::NotEmpty { .. })
    ));
    assert!(matches!(
        drive.remove_item("ghost", false),
        Err(Error::NotFound { .. })
    ));
    drive.remove_item("docs\\readme.txt", false).unwrap();
    assert!(!dir.path().join("docs/readme.txt").exists());
    drive.remove_item("docs", true).unwrap();
    assert!(!dir.path().join("docs").exists());
}

#[test]
fn rename_within_directory() {
    let (dir, drive) = workspace();
    drive.rename_item("docs\\readme.txt", "README.md").unwrap();
    assert!(dir.path().join("docs/README.md").is_file());
    assert!(matches!(
        drive.rename_item("docs\\README.md", "notes"),
        Err(Error::DuplicateName { .. })
    ));
    assert!(matches!(
        drive.rename_item("docs\\ghost", "x"),
        Err(Error::NotFound { .. })
    ));
}

// ===========================================================================
// Containment
// ===========================================================================

/// Mounts `outer/root` so anything escaping the mount lands in `outer`.
fn nested_mount() -> (tempfile::TempDir, std::path::PathBuf, Drive) {
    let dir = tempfile::tempdir().unwrap();
    let outer = dir.path().join("outer");
    let root = outer.join("root");
    fs::create_dir_all(root.join("docs")).unwrap();
    fs::write(outer.join("sibling.txt"), "keep").unwrap();
    fs::write(root.join("a.txt"), "a").unwrap();
    let drive = DirectoryStore::new(&root).drive("disk").unwrap();
    (dir, outer, drive)
}

#[test]
fn remove_of_relative_components_is_not_found() {
    let (_dir, outer, drive) = nested_mount();
    for path in ["..", ".", "docs\\..", "docs\\."] {
        assert!(
            matches!(drive.remove_item(path, true), Err(Error::NotFound { .. })),
            "{}",
            path
        );
    }
    let root_node = drive.root().as_container().unwrap();
    assert!(matches!(
        root_node.remove_child("../sibling.txt", true),
        Err(Error::NotFound { .. })
    ));
    assert!(matches!(root_node.remove_child("", true), Err(Error::NotFound { .. })));

    assert_eq!(fs::read_to_string(outer.join("sibling.txt")).unwrap(), "keep");
    assert!(outer.join("root/a.txt").is_file());
    assert!(outer.join("root/docs").is_dir());
}

#[test]
fn rename_cannot_leave_the_directory() {
    let (_dir, outer, drive) = nested_mount();
    assert!(matches!(
        drive.rename_item("a.txt", "../escaped.txt"),
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        drive.rename_item("a.txt", ".."),
        Err(Error::InvalidArgument(_))
    ));

    let root_node = drive.root().as_container().unwrap();
    assert!(matches!(
        root_node.rename_child("a.txt", "docs/../../escaped.txt"),
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        root_node.rename_child("../sibling.txt", "stolen.txt"),
        Err(Error::NotFound { .. })
    ));
    assert!(matches!(
        root_node.rename_child("..", "renamed"),
        Err(Error::NotFound { .. })
    ));

    assert!(!outer.join("escaped.txt").exists());
    assert!(!outer.join("root/stolen.txt").exists());
    assert!(!outer.join("root/renamed").exists());
    assert_eq!(fs::read_to_string(outer.join("root/a.txt")).unwrap(), "a");
    assert!(outer.join("sibling.txt").is_file());
}

#[test]
fn new_item_rejects_relative_and_separated_names() {
    let (_dir, outer, drive) = nested_mount();
    for path in ["..", "docs\\.."] {
        assert!(
            matches!(drive.new_item(path, Some("directory"), None), Err(Error::InvalidArgument(_))),
            "{}",
            path
        );
    }
    let root_node = drive.root().as_container().unwrap();
    assert!(matches!(
        root_node.create_child("../planted.txt", None, Some(json!("x"))),
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        root_node.create_child("docs/inner.txt", None, None),
        Err(Error::InvalidArgument(_))
    ));
    assert!(!outer.join("planted.txt").exists());
    assert!(!outer.join("root/docs/inner.txt").exists());
}
