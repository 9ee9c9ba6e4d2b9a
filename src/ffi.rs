//! C-ABI FFI bindings for cross-language integration.
//!
//! This module provides a C-compatible API for using undocx from other
//! languages such as C#, Python, and Node.js.

use std::collections::HashMap;
use std::ffi::{c_char, CStr, CString};
use std::path::Path;
use std::ptr;

use crate::{ChunkingStrategy, Error, Undocx};

/// Result structure returned by FFI functions.
#[repr(C)]
pub struct UndocxFfiResult {
    /// Whether the operation succeeded.
    pub success: bool,
    /// The result data (null if failed). Must be freed with `undocx_free_result`.
    pub data: *mut c_char,
    /// Error message (null if succeeded). Must be freed with `undocx_free_result`.
    pub error: *mut c_char,
}

impl UndocxFfiResult {
    fn success(data: String) -> Self {
        Self {
            success: true,
            data: CString::new(data).unwrap_or_default().into_raw(),
            error: ptr::null_mut(),
        }
    }

    fn error(message: String) -> Self {
        Self {
            success: false,
            data: ptr::null_mut(),
            error: CString::new(message).unwrap_or_default().into_raw(),
        }
    }
}

impl From<crate::Result<String>> for UndocxFfiResult {
    fn from(result: crate::Result<String>) -> Self {
        match result {
            Ok(data) => Self::success(data),
            Err(e) => Self::error(e.to_string()),
        }
    }
}

/// Read an optional C string. Null maps to `Ok(None)`.
unsafe fn optional_str<'a>(ptr: *const c_char, what: &str) -> Result<Option<&'a str>, String> {
    if ptr.is_null() {
        return Ok(None);
    }
    CStr::from_ptr(ptr)
        .to_str()
        .map(Some)
        .map_err(|_| format!("Invalid UTF-8 {}", what))
}

/// Extract plain text from a DOCX file.
///
/// # Safety
///
/// The `path` must be a valid null-terminated UTF-8 string.
/// The returned result must be freed with `undocx_free_result`.
#[no_mangle]
pub unsafe extern "C" fn undocx_extract_text(path: *const c_char) -> UndocxFfiResult {
    let path_str = match optional_str(path, "path") {
        Ok(Some(s)) => s,
        Ok(None) => return UndocxFfiResult::error("Path cannot be null".to_string()),
        Err(message) => return UndocxFfiResult::error(message),
    };

    crate::extract_text(Path::new(path_str)).into()
}

/// Build the graph of a DOCX file as JSON.
///
/// `metadata_json` is a JSON object of string values (null = no metadata).
/// `strategy` uses the textual strategy syntax such as `by-line` or
/// `tokens:256:32` (null = `by-line`).
///
/// # Safety
///
/// The `path` must be a valid null-terminated UTF-8 string.
/// `metadata_json` and `strategy` must be null or valid null-terminated UTF-8 strings.
/// The returned result must be freed with `undocx_free_result`.
#[no_mangle]
pub unsafe extern "C" fn undocx_build_graph(
    path: *const c_char,
    metadata_json: *const c_char,
    strategy: *const c_char,
) -> UndocxFfiResult {
    let path_str = match optional_str(path, "path") {
        Ok(Some(s)) => s,
        Ok(None) => return UndocxFfiResult::error("Path cannot be null".to_string()),
        Err(message) => return UndocxFfiResult::error(message),
    };
    let metadata_str = match optional_str(metadata_json, "metadata") {
        Ok(s) => s,
        Err(message) => return UndocxFfiResult::error(message),
    };
    let strategy_str = match optional_str(strategy, "strategy") {
        Ok(s) => s,
        Err(message) => return UndocxFfiResult::error(message),
    };

    build_graph_internal(Path::new(path_str), metadata_str, strategy_str).into()
}

fn build_graph_internal(
    path: &Path,
    metadata_json: Option<&str>,
    strategy: Option<&str>,
) -> crate::Result<String> {
    let metadata: HashMap<String, String> = match metadata_json {
        Some(json) => serde_json::from_str(json)
            .map_err(|e| Error::Serialization(format!("invalid metadata JSON: {}", e)))?,
        None => HashMap::new(),
    };
    let strategy = match strategy {
        Some(s) => s.parse::<ChunkingStrategy>()?,
        None => ChunkingStrategy::default(),
    };

    Undocx::new()
        .with_strategy(strategy)
        .build_graph(path, &metadata)
}

/// Check if a file is a DOCX package.
///
/// # Safety
///
/// The `path` must be a valid null-terminated UTF-8 string.
#[no_mangle]
pub unsafe extern "C" fn undocx_is_docx(path: *const c_char) -> bool {
    match optional_str(path, "path") {
        Ok(Some(s)) => crate::detect::is_docx(Path::new(s)),
        _ => false,
    }
}

/// Free a result returned by any undocx function.
///
/// # Safety
///
/// The `result` must have been returned by an undocx function.
/// This function should only be called once per result.
#[no_mangle]
pub unsafe extern "C" fn undocx_free_result(result: UndocxFfiResult) {
    if !result.data.is_null() {
        drop(CString::from_raw(result.data));
    }
    if !result.error.is_null() {
        drop(CString::from_raw(result.error));
    }
}

/// Free a string allocated by undocx.
///
/// # Safety
///
/// The `ptr` must have been allocated by undocx.
/// This function should only be called once per pointer.
#[no_mangle]
pub unsafe extern "C" fn undocx_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

/// Get the version of the undocx library.
///
/// The returned string is statically allocated and should not be freed.
#[no_mangle]
pub extern "C" fn undocx_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
