//! Tests for the fjall-backed store.

#![cfg(feature = "hive")]

use regkv::{HiveStore, Key, ListStatus, Value, ValueType};
use tempfile::TempDir;

fn init_store() -> Result<(TempDir, HiveStore), anyhow::Error> {
    let temp_dir = TempDir::new()?;
    let store = HiveStore::init(&temp_dir.path().join("hive"))?;
    Ok((temp_dir, store))
}

#[test]
fn test_open_uninitialized_fails() -> Result<(), anyhow::Error> {
    let temp_dir = TempDir::new()?;
    assert!(HiveStore::open(&temp_dir.path().join("nothing")).is_err());
    Ok(())
}

#[test]
fn test_typed_roundtrip() -> Result<(), anyhow::Error> {
    let (_dir, store) = init_store()?;
    let key = Key::new(&store, store.create_key("Software\\Vendor\\App")?);

    key.set_string_value("name", "App")?;
    key.set_strings_value("paths", &["C:\\a", "C:\\b"])?;
    key.set_dword_value("retries", 3)?;
    key.set_qword_value("size", 1 << 40)?;
    key.set_binary_value("blob", &[0xAB; 100])?;

    assert_eq!(key.get_string_value("name")?.0, "App");
    assert_eq!(key.get_strings_value("paths")?.0, ["C:\\a", "C:\\b"]);
    assert_eq!(key.get_integer_value("retries")?, (3, ValueType::DWord));
    assert_eq!(key.get_integer_value("size")?, (1 << 40, ValueType::QWord));
    assert_eq!(key.get_binary_value("blob")?.0, vec![0xAB; 100]);
    Ok(())
}

#[test]
fn test_values_persist_across_reopen() -> Result<(), anyhow::Error> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("hive");
    {
        let store = HiveStore::init(&path)?;
        let key = Key::new(&store, store.create_key("Software\\Persist")?);
        key.set_expand_string_value("home", "%HOME%\\x")?;
    }

    let store = HiveStore::open(&path)?;
    let key = Key::new(&store, store.open_key("Software\\Persist")?);
    assert_eq!(
        key.get("home")?,
        Value::ExpandString("%HOME%\\x".to_string())
    );
    Ok(())
}

#[test]
fn test_create_key_creates_ancestors() -> Result<(), anyhow::Error> {
    let (_dir, store) = init_store()?;
    store.create_key("A\\B\\C")?;

    let parent = Key::new(&store, store.open_key("A\\B")?);
    assert_eq!(parent.stat()?.sub_key_count, 1);
    assert!(store.open_key("A\\Missing").unwrap_err().is_not_found());
    Ok(())
}

#[test]
fn test_names_in_byte_order() -> Result<(), anyhow::Error> {
    let (_dir, store) = init_store()?;
    let key = Key::new(&store, store.create_key("K")?);
    // A sibling key sharing the prefix must not leak into the listing.
    let sibling = Key::new(&store, store.create_key("K2")?);
    sibling.set_dword_value("other", 0)?;

    for name in ["zeta", "alpha", "mid"] {
        key.set_dword_value(name, 1)?;
    }

    let names = key.read_value_names(None)?;
    assert_eq!(names.names(), ["alpha", "mid", "zeta"]);

    let names = key.read_value_names(Some(2))?;
    assert_eq!(names.status(), ListStatus::Truncated);
    Ok(())
}

#[test]
fn test_delete_value() -> Result<(), anyhow::Error> {
    let (_dir, store) = init_store()?;
    let key = Key::new(&store, store.create_key("K")?);

    key.set_dword_value("gone", 1)?;
    key.delete_value("gone")?;

    assert!(key.get_integer_value("gone").unwrap_err().is_not_found());
    assert!(key.delete_value("gone").unwrap_err().is_not_found());
    assert_eq!(key.stat()?.value_count, 0);
    Ok(())
}
