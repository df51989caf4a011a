use std::{fmt, io};

use regex::Error as RegexError;
use serde::{Deserialize, Serialize};
use serde_json::Error as JsonError;
use thiserror::Error;

#[cfg(feature = "wasm")]
use serde_wasm_bindgen::Error as WasmError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
pub enum TocError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("DOM error: {0}")]
    Dom(String),
    #[error("Heading level out of range (expected 1-6): {0}")]
    InvalidLevel(String),
    #[error("File System error: {0}")]
    Io(String),
    #[error("Item Not Found: {0}")]
    NotFound(String),
    #[error("You do not have permission to access this resource")]
    PermissionDenied,
    #[error("(De)Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for TocError {
    fn from(src: toml::de::Error) -> TocError {
        TocError::Config(format!("Toml deserialization error: {src}"))
    }
}

impl From<toml::ser::Error> for TocError {
    fn from(src: toml::ser::Error) -> TocError {
        TocError::Serialization(format!("Toml serialization error: {src}"))
    }
}

impl From<JsonError> for TocError {
    fn from(src: JsonError) -> TocError {
        TocError::Serialization(format!("JSON (de)serialization error: {src}"))
    }
}

impl From<io::Error> for TocError {
    fn from(x: io::Error) -> Self {
        match x.kind() {
            io::ErrorKind::NotFound => TocError::NotFound(format!("{x}")),
            io::ErrorKind::PermissionDenied => TocError::PermissionDenied,
            _ => TocError::Io(format!("IOError: {}", x.kind())),
        }
    }
}

impl From<fmt::Error> for TocError {
    fn from(x: fmt::Error) -> Self {
        TocError::Serialization(format!("{x}"))
    }
}

impl From<RegexError> for TocError {
    fn from(x: RegexError) -> Self {
        TocError::Config(format!("Regex parse failed: {x}"))
    }
}

#[cfg(feature = "wasm")]
impl From<WasmError> for TocError {
    fn from(wasm_error: WasmError) -> Self {
        TocError::Serialization(format!("Serde-wasm-bindgen error: {wasm_error}"))
    }
}

#[cfg(feature = "wasm")]
impl From<TocError> for wasm_bindgen::JsValue {
    fn from(err: TocError) -> Self {
        wasm_bindgen::JsValue::from_str(&err.to_string())
    }
}
