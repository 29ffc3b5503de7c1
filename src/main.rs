use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use std::path::PathBuf;
use thiserror::Error;

use regkv::config::{Config, ConfigError};
use regkv::subscriber::LoggingError;
use regkv::{HiveStore, Key, ListStatus, StoreError, Value, ValueType};

const DEFAULT_CONFIG: &str = "regkv.toml";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Logging(#[from] LoggingError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("{0}")]
    Value(#[from] regkv::Error),

    #[error("Invalid value type: {0}")]
    ValueType(#[from] regkv::value::ParseValueTypeError),

    #[error("Invalid input: {0}")]
    Input(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// One JSON document per command.
    Json,
}

/// Decoding applied by `get`.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum Kind {
    /// Decode according to the stored tag.
    #[default]
    Auto,
    /// SZ or EXPAND_SZ.
    String,
    /// MULTI_SZ.
    Strings,
    /// DWORD or QWORD.
    Integer,
    /// Raw bytes, any tag.
    Binary,
}

#[derive(Parser)]
#[command(name = "regkv")]
#[command(about = "Read and write typed registry-style values in a local store")]
struct Cli {
    /// Store path (overrides the config file)
    #[arg(long, global = true, env = "REGKV_PATH")]
    path: Option<PathBuf>,

    /// Config file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG, env = "REGKV_CONFIG")]
    config: PathBuf,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new store
    Init,

    /// Create a key (and its missing ancestors)
    CreateKey {
        /// Key path, e.g. `Software\Vendor\App`
        key: String,
    },

    /// Read a value
    Get {
        key: String,
        name: String,

        /// How to decode the payload
        #[arg(long, value_enum, default_value_t = Kind::Auto)]
        kind: Kind,
    },

    /// Write a value
    Set {
        key: String,
        name: String,

        /// Value type: sz, expand-sz, multi-sz, dword, qword, binary or a numeric code
        #[arg(long = "type", short = 't', default_value = "sz")]
        value_type: String,

        /// Value text; several for multi-sz, hex for binary and unknown types
        #[arg(group = "input")]
        values: Vec<String>,

        /// Read a binary payload from a file
        #[arg(long, group = "input")]
        file: Option<PathBuf>,
    },

    /// Delete a value
    Delete { key: String, name: String },

    /// List value names
    List {
        key: String,

        /// Maximum number of names to read
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show key statistics
    Stat { key: String },

    /// Expand %NAME% placeholders from the process environment
    Expand { text: String },
}

fn main() -> Result<(), AppError> {
    let cli = Cli::parse();

    let config = Config::load_or_default(&cli.config)?;
    regkv::subscriber::init(&config.logging)?;
    let path = cli.path.unwrap_or(config.store.path);
    let format = cli.format;

    match cli.command {
        Commands::Init => {
            HiveStore::init(&path)?;
            report(
                format,
                || format!("Initialized store at {}", path.display()),
                || json!({ "initialized": path.display().to_string() }),
            )
        }
        Commands::CreateKey { key } => {
            let store = HiveStore::open(&path)?;
            store.create_key(&key)?;
            report(
                format,
                || format!("Created key '{}'", key),
                || json!({ "created": key }),
            )
        }
        Commands::Get { key, name, kind } => {
            let store = HiveStore::open(&path)?;
            let handle = open_key(&store, &key)?;
            let key = Key::new(&store, handle);
            let value = match kind {
                Kind::Auto => key.get(&name)?,
                Kind::String => match key.get_string_value(&name)? {
                    (s, ValueType::ExpandSz) => Value::ExpandString(s),
                    (s, _) => Value::String(s),
                },
                Kind::Strings => Value::MultiString(key.get_strings_value(&name)?.0),
                Kind::Integer => match key.get_integer_value(&name)? {
                    (v, ValueType::DWord) => Value::DWord(u32::try_from(v).unwrap_or(u32::MAX)),
                    (v, _) => Value::QWord(v),
                },
                Kind::Binary => Value::Binary(key.get_raw_value(&name)?.data),
            };
            report(
                format,
                || value_text(&value),
                || json!({ "name": name, "type": value.value_type().to_string(), "value": value_json(&value) }),
            )
        }
        Commands::Set {
            key,
            name,
            value_type,
            values,
            file,
        } => {
            let value_type: ValueType = value_type.parse()?;
            let store = HiveStore::open(&path)?;
            let handle = open_key(&store, &key)?;
            let key = Key::new(&store, handle);
            let value = parse_value(value_type, &values, file)?;
            key.set(&name, &value)?;
            report(
                format,
                || format!("Set '{}' ({})", name, value_type),
                || json!({ "set": name, "type": value_type.to_string() }),
            )
        }
        Commands::Delete { key, name } => {
            let store = HiveStore::open(&path)?;
            let handle = open_key(&store, &key)?;
            Key::new(&store, handle).delete_value(&name)?;
            report(
                format,
                || format!("Deleted '{}'", name),
                || json!({ "deleted": name }),
            )
        }
        Commands::List { key, limit } => {
            let store = HiveStore::open(&path)?;
            let handle = open_key(&store, &key)?;
            let names = match Key::new(&store, handle).read_value_names(limit) {
                Ok(names) => names,
                Err(regkv::Error::Interrupted { names, source }) => {
                    for name in &names {
                        println!("{}", name);
                    }
                    return Err(AppError::Value(*source));
                }
                Err(e) => return Err(e.into()),
            };
            let status = match names.status() {
                ListStatus::Complete => "complete".to_string(),
                ListStatus::Truncated => "truncated".to_string(),
                ListStatus::Short { requested } => format!("short of {}", requested),
            };
            if format == OutputFormat::Json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&json!({ "names": names.names(), "status": status }))?
                );
                return Ok(());
            }
            if names.is_empty() {
                println!("No values found");
            }
            for name in &names {
                println!("{}", name);
            }
            if names.is_truncated() {
                eprintln!("(more values not listed)");
            }
            Ok(())
        }
        Commands::Stat { key } => {
            let store = HiveStore::open(&path)?;
            let handle = open_key(&store, &key)?;
            let info = Key::new(&store, handle).stat()?;
            report(
                format,
                || {
                    format!(
                        "sub-keys: {}\nvalues: {}\nmax value name: {}\nmax value size: {}\nlast write: {}",
                        info.sub_key_count,
                        info.value_count,
                        info.max_value_name_len,
                        info.max_value_len,
                        info.last_write_time
                    )
                },
                || {
                    json!({
                        "sub_key_count": info.sub_key_count,
                        "max_sub_key_len": info.max_sub_key_len,
                        "value_count": info.value_count,
                        "max_value_name_len": info.max_value_name_len,
                        "max_value_len": info.max_value_len,
                        "last_write_time": info.last_write_time,
                    })
                },
            )
        }
        Commands::Expand { text } => {
            let expanded = regkv::expand_string(&text)?;
            report(
                format,
                || expanded.clone(),
                || json!({ "expanded": expanded }),
            )
        }
    }
}

fn open_key(store: &HiveStore, key: &str) -> Result<regkv::KeyHandle, AppError> {
    store.open_key(key).map_err(|e| match e {
        StoreError::NotFound => AppError::Input(format!("Key '{}' not found", key)),
        other => AppError::Store(other),
    })
}

fn report(
    format: OutputFormat,
    text: impl FnOnce() -> String,
    json: impl FnOnce() -> serde_json::Value,
) -> Result<(), AppError> {
    match format {
        OutputFormat::Text => println!("{}", text()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&json())?),
    }
    Ok(())
}

fn parse_value(
    value_type: ValueType,
    values: &[String],
    file: Option<PathBuf>,
) -> Result<Value, AppError> {
    if let Some(file) = file {
        let data = std::fs::read(file)?;
        return Ok(match value_type {
            ValueType::Binary => Value::Binary(data),
            other => Value::Raw(regkv::RawValue::new(other, data)),
        });
    }

    let single = || match values {
        [one] => Ok(one.as_str()),
        _ => Err(AppError::Input(format!(
            "{} takes exactly one value, got {}",
            value_type,
            values.len()
        ))),
    };
    let integer = |s: &str| -> Result<u64, AppError> {
        let parsed = match s.strip_prefix("0x") {
            Some(hex) => u64::from_str_radix(hex, 16),
            None => s.parse(),
        };
        parsed.map_err(|e| AppError::Input(format!("Invalid integer '{}': {}", s, e)))
    };

    Ok(match value_type {
        ValueType::Sz => Value::String(single()?.to_string()),
        ValueType::ExpandSz => Value::ExpandString(single()?.to_string()),
        ValueType::MultiSz => Value::MultiString(values.to_vec()),
        ValueType::DWord => {
            let v = integer(single()?)?;
            Value::DWord(
                u32::try_from(v)
                    .map_err(|_| AppError::Input(format!("{} does not fit in a DWORD", v)))?,
            )
        }
        ValueType::QWord => Value::QWord(integer(single()?)?),
        ValueType::Binary => Value::Binary(parse_hex(&values.concat())?),
        other => Value::Raw(regkv::RawValue::new(other, parse_hex(&values.concat())?)),
    })
}

fn parse_hex(text: &str) -> Result<Vec<u8>, AppError> {
    let digits: Vec<char> = text.chars().filter(|c| !c.is_whitespace()).collect();
    if digits.len() % 2 != 0 {
        return Err(AppError::Input("Hex input has an odd number of digits".to_string()));
    }
    digits
        .chunks(2)
        .map(|pair| {
            let byte: String = pair.iter().collect();
            u8::from_str_radix(&byte, 16)
                .map_err(|_| AppError::Input(format!("Invalid hex byte '{}'", byte)))
        })
        .collect()
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) | Value::ExpandString(s) => s.clone(),
        Value::MultiString(list) => list.join("\n"),
        Value::DWord(v) => v.to_string(),
        Value::QWord(v) => v.to_string(),
        Value::Binary(data) => hex(data),
        Value::Raw(raw) => format!("{}: {}", raw.value_type, hex(&raw.data)),
    }
}

fn value_json(value: &Value) -> serde_json::Value {
    match value {
        Value::String(s) | Value::ExpandString(s) => json!(s),
        Value::MultiString(list) => json!(list),
        Value::DWord(v) => json!(v),
        Value::QWord(v) => json!(v),
        Value::Binary(data) => json!(hex(data)),
        Value::Raw(raw) => json!(hex(&raw.data)),
    }
}

fn hex(data: &[u8]) -> String {
    data.iter().map(|b| format!("{:02x}", b)).collect()
}
