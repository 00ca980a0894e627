//! Integration tests: mounting drives from a TOML file and driving both
//! adapters through the same facade.

use arbor::{mount_file, Drive, Error, NodeKind};
use serde_json::json;
use std::fs;
use tempfile::TempDir;

fn write_config(dir: &TempDir, body: &str) -> std::path::PathBuf {
    let path = dir.path().join("arbor.toml");
    fs::write(&path, body).unwrap();
    path
}

fn find<'a>(drives: &'a [Drive], name: &str) -> &'a Drive {
    drives.iter().find(|d| d.name() == name).unwrap()
}

#[test]
fn mount_file_builds_memory_and_directory_drives() {
    arbor::init_logging("arbor=debug");
    let tmp = TempDir::new().unwrap();
    let disk = tmp.path().join("disk");
    fs::create_dir(&disk).unwrap();
    fs::write(disk.join("hello.txt"), "hi").unwrap();

    let config = write_config(
        &tmp,
        &format!(
            r#"
[path]
separator = "/"

[[drives]]
name = "mem"
[drives.backend]
type = "memory"
[drives.backend.seed.docs]
readme = "hello"

[[drives]]
name = "disk"
backend = {{ type = "directory", root = {:?} }}
"#,
            disk.display().to_string()
        ),
    );

    let drives = mount_file(&config).unwrap();
    assert_eq!(drives.len(), 2);

    let mem = find(&drives, "mem");
    assert_eq!(mem.get_content(Some("docs/readme")).unwrap(), json!("hello"));

    let disk_drive = find(&drives, "disk");
    assert_eq!(disk_drive.get_content(Some("hello.txt")).unwrap(), json!("hi"));
    assert_eq!(
        disk_drive.get_property(Some("hello.txt"), "length").unwrap(),
        json!(2)
    );
}

#[test]
fn both_adapters_agree_on_basic_operations() {
    let tmp = TempDir::new().unwrap();
    let disk = tmp.path().join("disk");
    fs::create_dir(&disk).unwrap();
    let config = write_config(
        &tmp,
        &format!(
            r#"
[[drives]]
name = "mem"
backend = {{ type = "memory" }}

[[drives]]
name = "disk"
backend = {{ type = "directory", root = {:?} }}
"#,
            disk.display().to_string()
        ),
    );

    for drive in mount_file(&config).unwrap() {
        assert!(drive.list(None).unwrap().is_empty(), "{}", drive.name());

        drive.new_item("box", Some("container"), None).unwrap();
        drive.new_item("box\\note", None, Some(json!("text"))).unwrap();
        assert_eq!(drive.child_names(Some("box")).unwrap(), vec!["note"]);
        assert_eq!(drive.resolve(Some("box\\note")).unwrap().kind(), NodeKind::Leaf);

        assert!(matches!(
            drive.new_item("box\\note", None, None),
            Err(Error::DuplicateName { .. })
        ));
        assert!(matches!(
            drive.remove_item("box", false),
            Err(Error::NotEmpty { .. })
        ));
        assert!(matches!(
            drive.resolve(Some("box\\note\\deeper")),
            Err(Error::PathNotFound { .. })
        ));

        drive.rename_item("box\\note", "memo").unwrap();
        assert_eq!(drive.get_content(Some("box\\memo")).unwrap(), json!("text"));

        drive.remove_item("box", true).unwrap();
        assert!(!drive.exists(Some("box")).unwrap());
    }
}

#[test]
fn missing_file_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let err = mount_file(&tmp.path().join("absent.toml")).unwrap_err();
    assert!(err.to_string().starts_with("reading"));
}

#[test]
fn missing_directory_root_fails_to_mount() {
    let tmp = TempDir::new().unwrap();
    let config = write_config(
        &tmp,
        &format!(
            "[[drives]]\nname = \"gone\"\nbackend = {{ type = \"directory\", root = {:?} }}\n",
            tmp.path().join("nope").display().to_string()
        ),
    );
    let err = mount_file(&config).unwrap_err();
    assert!(format!("{:#}", err).contains("mounting drive 'gone'"));
}
