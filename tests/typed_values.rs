//! Typed reads and writes through the in-memory store.

mod common;

use common::{Recorder, Stuck, Write, test_key};
use regkv::{
    Error, Key, KeyHandle, KeyInfo, ListStatus, MemoryStore, RawValue, Value, ValueType,
    expand_string_with,
};

#[test]
fn test_string_roundtrip() -> Result<(), anyhow::Error> {
    let store = MemoryStore::new();
    let key = test_key(&store)?;

    key.set_string_value("greeting", "héllo wörld")?;
    key.set_expand_string_value("home", "%USERPROFILE%\\docs")?;

    assert_eq!(
        key.get_string_value("greeting")?,
        ("héllo wörld".to_string(), ValueType::Sz)
    );
    assert_eq!(
        key.get_string_value("home")?,
        ("%USERPROFILE%\\docs".to_string(), ValueType::ExpandSz)
    );
    Ok(())
}

#[test]
fn test_long_string_grows_once() -> Result<(), anyhow::Error> {
    let store = Recorder::new();
    let key = store.key()?;
    let long = "x".repeat(200);

    key.set_string_value("long", &long)?;
    store.queries.set(0);

    assert_eq!(key.get_string_value("long")?.0, long);
    assert_eq!(store.queries.get(), 2);
    Ok(())
}

#[test]
fn test_short_string_single_query() -> Result<(), anyhow::Error> {
    let store = Recorder::new();
    let key = store.key()?;

    key.set_string_value("short", "abc")?;
    store.queries.set(0);

    assert_eq!(key.get_string_value("short")?.0, "abc");
    assert_eq!(store.queries.get(), 1);
    Ok(())
}

#[test]
fn test_strings_roundtrip() -> Result<(), anyhow::Error> {
    let store = MemoryStore::new();
    let key = test_key(&store)?;

    key.set_strings_value("list", &["one", "two", "", "four"])?;
    let (list, value_type) = key.get_strings_value("list")?;
    assert_eq!(list, ["one", "two", "", "four"]);
    assert_eq!(value_type, ValueType::MultiSz);

    key.set_strings_value::<&str>("empty", &[])?;
    assert!(key.get_strings_value("empty")?.0.is_empty());
    Ok(())
}

#[test]
fn test_strings_drop_unterminated_tail() -> Result<(), anyhow::Error> {
    let store = MemoryStore::new();
    let key = test_key(&store)?;

    // "a\0b\0cd" with no list terminator.
    let data = [b'a', 0, 0, 0, b'b', 0, 0, 0, b'c', 0, b'd', 0];
    key.set_value("ragged", ValueType::MultiSz, &data)?;

    assert_eq!(key.get_strings_value("ragged")?.0, ["a", "b"]);
    Ok(())
}

#[test]
fn test_string_odd_trailing_byte_ignored() -> Result<(), anyhow::Error> {
    let store = MemoryStore::new();
    let key = test_key(&store)?;

    key.set_value("odd", ValueType::Sz, &[b'h', 0, b'i'])?;
    assert_eq!(key.get_string_value("odd")?.0, "h");

    key.set_value("unterminated", ValueType::Sz, &[b'o', 0, b'k', 0])?;
    assert_eq!(key.get_string_value("unterminated")?.0, "ok");
    Ok(())
}

#[test]
fn test_integers() -> Result<(), anyhow::Error> {
    let store = MemoryStore::new();
    let key = test_key(&store)?;

    key.set_dword_value("small", 0xDEAD_BEEF)?;
    key.set_qword_value("big", u64::MAX - 1)?;

    assert_eq!(
        key.get_integer_value("small")?,
        (0xDEAD_BEEF, ValueType::DWord)
    );
    assert_eq!(key.get_integer_value("big")?, (u64::MAX - 1, ValueType::QWord));
    Ok(())
}

#[test]
fn test_malformed_integer() -> Result<(), anyhow::Error> {
    let store = MemoryStore::new();
    let key = test_key(&store)?;

    key.set_value("short", ValueType::DWord, &[1, 2, 3])?;
    let err = key.get_integer_value("short").unwrap_err();
    assert!(matches!(
        err,
        Error::Malformed {
            value_type: ValueType::DWord,
            ..
        }
    ));
    Ok(())
}

#[test]
fn test_type_mismatch_reports_actual_tag() -> Result<(), anyhow::Error> {
    let store = MemoryStore::new();
    let key = test_key(&store)?;

    key.set_binary_value("blob", &[1, 2, 3, 4])?;
    key.set_dword_value("count", 7)?;

    let err = key.get_integer_value("blob").unwrap_err();
    assert_eq!(err.actual_type(), Some(ValueType::Binary));

    let err = key.get_string_value("count").unwrap_err();
    assert_eq!(err.actual_type(), Some(ValueType::DWord));

    let err = key.get_strings_value("count").unwrap_err();
    assert!(err.is_type_mismatch());

    let err = key.get_binary_value("count").unwrap_err();
    assert_eq!(err.actual_type(), Some(ValueType::DWord));
    Ok(())
}

#[test]
fn test_not_found() -> Result<(), anyhow::Error> {
    let store = MemoryStore::new();
    let key = test_key(&store)?;

    let err = key.get_string_value("missing").unwrap_err();
    assert!(err.is_not_found());
    assert!(key.delete_value("missing").unwrap_err().is_not_found());
    Ok(())
}

#[test]
fn test_set_is_idempotent() -> Result<(), anyhow::Error> {
    let store = MemoryStore::new();
    let key = test_key(&store)?;

    key.set_string_value("v", "same")?;
    key.set_string_value("v", "same")?;

    assert_eq!(key.get_string_value("v")?.0, "same");
    assert_eq!(key.read_value_names(None)?.names(), ["v"]);
    Ok(())
}

#[test]
fn test_overwrite_changes_tag() -> Result<(), anyhow::Error> {
    let store = MemoryStore::new();
    let key = test_key(&store)?;

    key.set_string_value("v", "text")?;
    key.set_qword_value("v", 5)?;

    assert_eq!(key.get("v")?, Value::QWord(5));
    Ok(())
}

#[test]
fn test_embedded_nul_rejected_before_store() -> Result<(), anyhow::Error> {
    let store = Recorder::new();
    let key = store.key()?;

    let err = key.set_string_value("bad", "a\0b").unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));

    let err = key.set_strings_value("bad", &["ok", "no\0pe"]).unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));

    assert!(key.set_dword_value("bad\0name", 1).is_err());
    assert_eq!(store.store_calls(), 0);
    Ok(())
}

#[test]
fn test_empty_payload_written_as_none() -> Result<(), anyhow::Error> {
    let store = Recorder::new();
    let key = store.key()?;

    key.set_binary_value("empty", &[])?;
    key.set_binary_value("one", &[9])?;

    assert_eq!(
        *store.writes.borrow(),
        [
            Write {
                name: "empty".to_string(),
                value_type: ValueType::Binary,
                data: None,
            },
            Write {
                name: "one".to_string(),
                value_type: ValueType::Binary,
                data: Some(vec![9]),
            },
        ]
    );
    assert_eq!(key.get_binary_value("empty")?.0, Vec::<u8>::new());
    Ok(())
}

#[test]
fn test_unknown_tag_passes_through() -> Result<(), anyhow::Error> {
    let store = MemoryStore::new();
    let key = test_key(&store)?;

    let raw = RawValue::new(ValueType::Unknown(42), vec![1, 2, 3]);
    key.set("odd", &Value::Raw(raw.clone()))?;

    assert_eq!(key.get_raw_value("odd")?, raw);
    assert_eq!(key.get("odd")?, Value::Raw(raw));
    Ok(())
}

#[test]
fn test_get_value_low_level() -> Result<(), anyhow::Error> {
    let store = MemoryStore::new();
    let key = test_key(&store)?;
    key.set_binary_value("blob", &[7; 16])?;

    let probe = key.get_value("blob", &mut [])?;
    assert_eq!(probe.len, 16);
    assert_eq!(probe.value_type, ValueType::Binary);

    let mut small = [0u8; 4];
    let err = key.get_value("blob", &mut small).unwrap_err();
    assert!(matches!(err, Error::ShortBuffer { required: 16 }));

    let mut exact = [0u8; 16];
    assert_eq!(key.get_value("blob", &mut exact)?.len, 16);
    assert_eq!(exact, [7; 16]);
    Ok(())
}

#[test]
fn test_non_progressing_store_gives_up() {
    let store = Stuck::new(1000);
    let key = Key::new(&store, KeyHandle::new(1));

    let err = key.get_string_value("anything").unwrap_err();
    assert!(matches!(err, Error::ShortBuffer { required: 1000 }));
    assert_eq!(store.calls.get(), 2);
}

#[test]
fn test_store_asking_for_less_gives_up_at_once() {
    let store = Stuck::new(10);
    let key = Key::new(&store, KeyHandle::new(1));

    let err = key.get_raw_value("anything").unwrap_err();
    assert!(matches!(err, Error::ShortBuffer { required: 10 }));
    assert_eq!(store.calls.get(), 1);
}

#[test]
fn test_store_asking_for_current_size_gives_up() {
    let store = Stuck::new(64);
    let key = Key::new(&store, KeyHandle::new(1));

    let err = key.get_string_value("anything").unwrap_err();
    assert!(matches!(err, Error::ShortBuffer { required: 64 }));
    assert_eq!(store.calls.get(), 1);
}

#[test]
fn test_repeated_reads_agree() -> Result<(), anyhow::Error> {
    let store = Recorder::new();
    let key = store.key()?;
    key.set_strings_value("list", &["x".repeat(80), "y".to_string()])?;
    key.set_qword_value("n", 42)?;
    let writes = store.writes.borrow().len();

    let first = key.get_strings_value("list")?;
    let second = key.get_strings_value("list")?;
    assert_eq!(first, second);
    assert_eq!(key.get("n")?, key.get("n")?);
    assert_eq!(store.writes.borrow().len(), writes);
    Ok(())
}

fn three_values(store: &MemoryStore) -> Result<Key<'_, MemoryStore>, anyhow::Error> {
    let key = test_key(store)?;
    key.set_string_value("alpha", "a")?;
    key.set_dword_value("beta", 2)?;
    key.set_binary_value("gamma", &[3])?;
    Ok(key)
}

#[test]
fn test_names_complete() -> Result<(), anyhow::Error> {
    let store = MemoryStore::new();
    let key = three_values(&store)?;

    for limit in [None, Some(0), Some(3)] {
        let names = key.read_value_names(limit)?;
        assert_eq!(names.names(), ["alpha", "beta", "gamma"]);
        assert_eq!(names.status(), ListStatus::Complete);
    }
    Ok(())
}

#[test]
fn test_names_short() -> Result<(), anyhow::Error> {
    let store = MemoryStore::new();
    let key = three_values(&store)?;

    let names = key.read_value_names(Some(5))?;
    assert_eq!(names.len(), 3);
    assert!(names.is_short());
    assert_eq!(names.status(), ListStatus::Short { requested: 5 });
    Ok(())
}

#[test]
fn test_names_truncated() -> Result<(), anyhow::Error> {
    let store = MemoryStore::new();
    let key = three_values(&store)?;

    let names = key.read_value_names(Some(2))?;
    assert!(names.is_truncated());
    assert_eq!(names.into_names(), ["alpha", "beta"]);
    Ok(())
}

#[test]
fn test_names_of_empty_key() -> Result<(), anyhow::Error> {
    let store = MemoryStore::new();
    let key = test_key(&store)?;

    let names = key.read_value_names(None)?;
    assert!(names.is_empty());
    assert_eq!(names.status(), ListStatus::Complete);
    Ok(())
}

#[test]
fn test_names_grow_from_undersized_stats() -> Result<(), anyhow::Error> {
    let store = MemoryStore::new();
    let key = test_key(&store)?;
    let long_name = "n".repeat(300);
    key.set_dword_value(&long_name, 1)?;
    key.set_dword_value("x", 2)?;

    let names = key.read_value_names_with(&KeyInfo::default(), None)?;
    assert_eq!(names.names(), [long_name.as_str(), "x"]);
    Ok(())
}

#[test]
fn test_names_interrupted_keeps_partial() -> Result<(), anyhow::Error> {
    let store = Recorder::failing_enum_at(1);
    let key = store.key()?;
    key.set_dword_value("first", 1)?;
    key.set_dword_value("second", 2)?;

    match key.read_value_names(None) {
        Err(Error::Interrupted { names, source }) => {
            assert_eq!(names, ["first"]);
            assert!(matches!(*source, Error::Other(_)));
        }
        other => panic!("expected interruption, got {:?}", other),
    }
    Ok(())
}

#[test]
fn test_stat_counts_values() -> Result<(), anyhow::Error> {
    let store = MemoryStore::new();
    let key = three_values(&store)?;
    store.create_key(&format!("{}\\Child", common::TEST_KEY))?;

    let info = key.stat()?;
    assert_eq!(info.value_count, 3);
    assert_eq!(info.max_value_name_len, 5);
    assert_eq!(info.sub_key_count, 1);
    Ok(())
}

#[test]
fn test_expand_stored_value() -> Result<(), anyhow::Error> {
    let store = MemoryStore::new();
    let key = test_key(&store)?;
    key.set_expand_string_value("path", "%ROOT%\\bin;%MISSING%")?;

    let (text, value_type) = key.get_string_value("path")?;
    assert_eq!(value_type, ValueType::ExpandSz);

    let env = |name: &str| (name == "ROOT").then(|| "C:\\app".to_string());
    assert_eq!(expand_string_with(&env, &text)?, "C:\\app\\bin;%MISSING%");
    Ok(())
}

#[test]
fn test_names_at_limit_survive_failing_lookahead() -> Result<(), anyhow::Error> {
    let store = Recorder::failing_enum_at(2);
    let key = store.key()?;
    key.set_dword_value("a", 1)?;
    key.set_dword_value("b", 2)?;
    key.set_dword_value("c", 3)?;

    let names = key.read_value_names(Some(2))?;
    assert_eq!(names.names(), ["a", "b"]);
    assert_eq!(names.status(), ListStatus::Truncated);
    Ok(())
}
