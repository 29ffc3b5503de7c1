//! Property-based tests for typed value storage.
//!
//! Each property writes through a key and reads back with the matching
//! accessor, so the codec and the grow loop are exercised together.

mod common;

use proptest::prelude::*;
use regkv::codec::{decode_string, decode_strings, decode_value};
use regkv::{MemoryStore, RawValue, ValueType};

fn text_without_nul() -> impl Strategy<Value = String> {
    any::<String>().prop_map(|s| s.replace('\0', ""))
}

proptest! {
    #[test]
    fn roundtrip_string(s in text_without_nul()) {
        let store = MemoryStore::new();
        let key = common::test_key(&store).unwrap();
        key.set_string_value("v", &s).unwrap();
        prop_assert_eq!(key.get_string_value("v").unwrap(), (s, ValueType::Sz));
    }

    #[test]
    fn roundtrip_strings(list in prop::collection::vec(text_without_nul(), 0..8)) {
        let store = MemoryStore::new();
        let key = common::test_key(&store).unwrap();
        key.set_strings_value("v", &list).unwrap();
        let (read, _) = key.get_strings_value("v").unwrap();
        prop_assert_eq!(read, list);
    }

    #[test]
    fn roundtrip_dword(v in any::<u32>()) {
        let store = MemoryStore::new();
        let key = common::test_key(&store).unwrap();
        key.set_dword_value("v", v).unwrap();
        prop_assert_eq!(key.get_integer_value("v").unwrap(), (u64::from(v), ValueType::DWord));
    }

    #[test]
    fn roundtrip_qword(v in any::<u64>()) {
        let store = MemoryStore::new();
        let key = common::test_key(&store).unwrap();
        key.set_qword_value("v", v).unwrap();
        prop_assert_eq!(key.get_integer_value("v").unwrap(), (v, ValueType::QWord));
    }

    #[test]
    fn roundtrip_binary(data in prop::collection::vec(any::<u8>(), 0..512)) {
        let store = MemoryStore::new();
        let key = common::test_key(&store).unwrap();
        key.set_binary_value("v", &data).unwrap();
        prop_assert_eq!(key.get_binary_value("v").unwrap(), (data, ValueType::Binary));
    }

    #[test]
    fn decoding_arbitrary_bytes_never_panics(
        code in 0u32..16,
        data in prop::collection::vec(any::<u8>(), 0..64),
    ) {
        let _ = decode_string(&data);
        let _ = decode_strings(&data);
        let _ = decode_value(RawValue::new(ValueType::from_raw(code), data));
    }
}
