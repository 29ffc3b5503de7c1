//! Value type tags and decoded values.

use std::fmt;
use std::str::FromStr;

/// Type tag stored alongside every value payload.
///
/// The numeric codes are fixed by the store. Codes outside the known set are
/// kept as [`ValueType::Unknown`] so they can still be reported back to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    None,
    Sz,
    ExpandSz,
    Binary,
    DWord,
    DWordBigEndian,
    Link,
    MultiSz,
    ResourceList,
    FullResourceDescriptor,
    ResourceRequirementsList,
    QWord,
    Unknown(u32),
}

impl ValueType {
    pub const NONE: u32 = 0;
    pub const SZ: u32 = 1;
    pub const EXPAND_SZ: u32 = 2;
    pub const BINARY: u32 = 3;
    pub const DWORD: u32 = 4;
    pub const DWORD_BIG_ENDIAN: u32 = 5;
    pub const LINK: u32 = 6;
    pub const MULTI_SZ: u32 = 7;
    pub const RESOURCE_LIST: u32 = 8;
    pub const FULL_RESOURCE_DESCRIPTOR: u32 = 9;
    pub const RESOURCE_REQUIREMENTS_LIST: u32 = 10;
    pub const QWORD: u32 = 11;

    /// Map a raw code from the store to a tag.
    pub const fn from_raw(code: u32) -> Self {
        match code {
            Self::NONE => Self::None,
            Self::SZ => Self::Sz,
            Self::EXPAND_SZ => Self::ExpandSz,
            Self::BINARY => Self::Binary,
            Self::DWORD => Self::DWord,
            Self::DWORD_BIG_ENDIAN => Self::DWordBigEndian,
            Self::LINK => Self::Link,
            Self::MULTI_SZ => Self::MultiSz,
            Self::RESOURCE_LIST => Self::ResourceList,
            Self::FULL_RESOURCE_DESCRIPTOR => Self::FullResourceDescriptor,
            Self::RESOURCE_REQUIREMENTS_LIST => Self::ResourceRequirementsList,
            Self::QWORD => Self::QWord,
            other => Self::Unknown(other),
        }
    }

    /// The raw code the store uses for this tag.
    pub const fn to_raw(self) -> u32 {
        match self {
            Self::None => Self::NONE,
            Self::Sz => Self::SZ,
            Self::ExpandSz => Self::EXPAND_SZ,
            Self::Binary => Self::BINARY,
            Self::DWord => Self::DWORD,
            Self::DWordBigEndian => Self::DWORD_BIG_ENDIAN,
            Self::Link => Self::LINK,
            Self::MultiSz => Self::MULTI_SZ,
            Self::ResourceList => Self::RESOURCE_LIST,
            Self::FullResourceDescriptor => Self::FULL_RESOURCE_DESCRIPTOR,
            Self::ResourceRequirementsList => Self::RESOURCE_REQUIREMENTS_LIST,
            Self::QWord => Self::QWORD,
            Self::Unknown(code) => code,
        }
    }

    /// Conventional upper-case name (`"SZ"`, `"MULTI_SZ"`, ...).
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Sz => "SZ",
            Self::ExpandSz => "EXPAND_SZ",
            Self::Binary => "BINARY",
            Self::DWord => "DWORD",
            Self::DWordBigEndian => "DWORD_BIG_ENDIAN",
            Self::Link => "LINK",
            Self::MultiSz => "MULTI_SZ",
            Self::ResourceList => "RESOURCE_LIST",
            Self::FullResourceDescriptor => "FULL_RESOURCE_DESCRIPTOR",
            Self::ResourceRequirementsList => "RESOURCE_REQUIREMENTS_LIST",
            Self::QWord => "QWORD",
            Self::Unknown(_) => "UNKNOWN",
        }
    }

    /// Returns `true` for SZ and EXPAND_SZ.
    pub fn is_string(self) -> bool {
        matches!(self, Self::Sz | Self::ExpandSz)
    }

    /// Returns `true` for DWORD and QWORD.
    pub fn is_integer(self) -> bool {
        matches!(self, Self::DWord | Self::QWord)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(code) => write!(f, "UNKNOWN({})", code),
            other => f.write_str(other.name()),
        }
    }
}

impl From<u32> for ValueType {
    fn from(code: u32) -> Self {
        Self::from_raw(code)
    }
}

impl From<ValueType> for u32 {
    fn from(value_type: ValueType) -> Self {
        value_type.to_raw()
    }
}

/// Error returned when parsing a [`ValueType`] from text fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown value type name: {0}")]
pub struct ParseValueTypeError(String);

impl FromStr for ValueType {
    type Err = ParseValueTypeError;

    /// Accepts the conventional names in any case, with `-` or `_`, plus
    /// bare numeric codes.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(code) = s.parse::<u32>() {
            return Ok(Self::from_raw(code));
        }
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        (0..=Self::QWORD)
            .map(Self::from_raw)
            .find(|ty| ty.name() == normalized)
            .ok_or_else(|| ParseValueTypeError(s.to_string()))
    }
}

/// Undecoded payload together with its tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawValue {
    pub value_type: ValueType,
    pub data: Vec<u8>,
}

impl RawValue {
    pub fn new(value_type: ValueType, data: Vec<u8>) -> Self {
        Self { value_type, data }
    }
}

/// A value decoded according to its stored tag.
///
/// Tags without a dedicated decoding rule are carried as [`Value::Raw`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    String(String),
    ExpandString(String),
    MultiString(Vec<String>),
    DWord(u32),
    QWord(u64),
    Binary(Vec<u8>),
    Raw(RawValue),
}

impl Value {
    /// The tag this value is written with.
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::String(_) => ValueType::Sz,
            Self::ExpandString(_) => ValueType::ExpandSz,
            Self::MultiString(_) => ValueType::MultiSz,
            Self::DWord(_) => ValueType::DWord,
            Self::QWord(_) => ValueType::QWord,
            Self::Binary(_) => ValueType::Binary,
            Self::Raw(raw) => raw.value_type,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::ExpandString(s) => Some(s),
            _ => None,
        }
    }

    /// Integer content widened to 64 bits.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::DWord(v) => Some(u64::from(*v)),
            Self::QWord(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<Vec<String>> for Value {
    fn from(list: Vec<String>) -> Self {
        Self::MultiString(list)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::DWord(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Self::QWord(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Binary(bytes)
    }
}
