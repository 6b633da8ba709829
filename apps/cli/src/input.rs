//! Input boundary: holder records and the pool argument.
//!
//! The TEE runtime drops decrypted protected data into the input
//! directory, either as one `protectedData.json` (a record or an array of
//! records) or as one JSON file per holder. Records look like
//! `{ "holder": "0x…", "balance": 1000 }`; the balance may be any JSON
//! integer up to 2^256 - 1 or a decimal string. Anything malformed is
//! skipped with a warning.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use arckana_core::{Address, ArckanaError, U256};

/// File holding every protected record in the iExec bulk format
pub const PROTECTED_DATA_FILE: &str = "protectedData.json";

/// Side-channel file carrying the pool argument
pub const ARGS_FILE: &str = "args.txt";

/// Why a record was skipped
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RecordError {
    #[error("record is not a JSON object")]
    NotAnObject,

    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("{0}")]
    InvalidAddress(ArckanaError),

    #[error("invalid balance: {0}")]
    InvalidBalance(String),
}

/// Holder records that survived validation, in read order.
#[derive(Debug, Default)]
pub struct LoadedRecords {
    pub records: Vec<(Address, U256)>,
    /// Number of raw records discarded
    pub skipped: usize,
}

/// Parse one record into `(holder, balance)`.
pub fn parse_record(value: &Value) -> Result<(Address, U256), RecordError> {
    let obj = value.as_object().ok_or(RecordError::NotAnObject)?;

    let holder = obj
        .get("holder")
        .ok_or(RecordError::MissingField("holder"))?
        .as_str()
        .ok_or_else(|| {
            RecordError::InvalidAddress(ArckanaError::InvalidAddress("holder is not a string".to_string()))
        })?
        .parse::<Address>()
        .map_err(RecordError::InvalidAddress)?;

    let balance = obj.get("balance").ok_or(RecordError::MissingField("balance"))?;
    let balance = parse_balance(balance)?;

    Ok((holder, balance))
}

fn parse_balance(value: &Value) -> Result<U256, RecordError> {
    match value {
        // Numbers keep their literal text, so wide integers parse exactly
        // and negative or fractional ones fail the digit check
        Value::Number(n) => {
            let literal = n.to_string();
            U256::parse_decimal(&literal)
                .map_err(|e| RecordError::InvalidBalance(format!("{literal} ({e})")))
        }
        Value::String(s) => {
            U256::parse_decimal(s).map_err(|e| RecordError::InvalidBalance(format!("{s:?} ({e})")))
        }
        other => Err(RecordError::InvalidBalance(other.to_string())),
    }
}

/// Read raw JSON values from the input directory.
///
/// `protectedData.json` wins when present. Otherwise every `*.json`
/// regular file is read in file-name order. Arrays are flattened into
/// individual records.
pub fn load_raw_records(input_dir: &Path) -> Vec<Value> {
    let protected = input_dir.join(PROTECTED_DATA_FILE);
    let files = if protected.is_file() {
        vec![protected]
    } else {
        list_json_files(input_dir)
    };

    let mut values = Vec::new();
    for path in files {
        match read_json(&path) {
            Ok(Value::Array(items)) => values.extend(items),
            Ok(value) => values.push(value),
            Err(e) => warn!("Could not load {:?}: {}", path, e),
        }
    }
    values
}

fn list_json_files(input_dir: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(input_dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Could not list input directory {:?}: {}", input_dir, e);
            return Vec::new();
        }
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && path.extension().map_or(false, |ext| ext == "json"))
        .collect();
    // Directory listing order is filesystem-defined
    files.sort();
    files
}

fn read_json(path: &Path) -> Result<Value, String> {
    let content = fs::read_to_string(path).map_err(|e| e.to_string())?;
    serde_json::from_str(&content).map_err(|e| e.to_string())
}

/// Load and validate every holder record in the input directory.
pub fn load_holder_records(input_dir: &Path) -> LoadedRecords {
    let raw = load_raw_records(input_dir);
    info!("Loaded {} protected data items", raw.len());

    let mut loaded = LoadedRecords::default();
    for (i, value) in raw.iter().enumerate() {
        match parse_record(value) {
            Ok((holder, balance)) => {
                debug!("Record {}: holder {} balance {}", i, holder, balance);
                loaded.records.push((holder, balance));
            }
            Err(e) => {
                warn!("Skipping record {}: {}", i, e);
                loaded.skipped += 1;
            }
        }
    }
    loaded
}

/// Parse an explicit pool argument.
///
/// Unlike `args.txt`, there is no fallback: anything but a decimal integer
/// that fits 256 bits is an error.
pub fn parse_pool_arg(arg: &str) -> Result<U256, ArckanaError> {
    U256::parse_decimal(arg).map_err(|e| match e {
        ArckanaError::AmountOutOfRange => ArckanaError::PoolOutOfRange(arg.trim().to_string()),
        other => other,
    })
}

/// Read the pool from `args.txt`.
///
/// Missing, empty or non-numeric contents fall back to `default`. A number
/// that does not fit 256 bits is fatal: silently replacing it would pay out
/// a pool nobody asked for.
pub fn read_pool(input_dir: &Path, default: U256) -> Result<U256, ArckanaError> {
    let path = input_dir.join(ARGS_FILE);
    if !path.is_file() {
        debug!("No {} found, using default pool {}", ARGS_FILE, default);
        return Ok(default);
    }

    let args = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) => {
            warn!("Could not read {:?}: {}", path, e);
            return Ok(default);
        }
    };

    let args = args.trim();
    if args.is_empty() {
        return Ok(default);
    }

    match parse_pool_arg(args) {
        Ok(pool) => Ok(pool),
        Err(e @ ArckanaError::PoolOutOfRange(_)) => Err(e),
        Err(e) => {
            warn!("Invalid pool argument {:?} ({}), using default {}", args, e, default);
            Ok(default)
        }
    }
}
