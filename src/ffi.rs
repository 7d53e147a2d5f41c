//! FFI bindings for Neuroscreen
//!
//! This module provides C-compatible functions for calling Neuroscreen from the
//! host application. All functions use C strings (null-terminated) and return
//! allocated memory that must be freed by the caller using `ns_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::fs::File;
use std::io::BufWriter;
use std::os::raw::{c_char, c_int};
use std::path::Path;
use std::ptr;
use std::slice;

use crate::config::RecorderConfig;
use crate::grip::grip_strength;
use crate::pipeline::BrainwaveProcessor;
use crate::recorder::{BiosignalRecorder, DEFAULT_PATIENT_ID, DEFAULT_RECORDING_ID};
use crate::risk::risk_score;
use crate::types::{CognitiveScores, Gender, TestPhase};

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Set the last error message
fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Clear the last error message
fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Borrow a caller-owned sample buffer; NULL is only accepted with length 0
unsafe fn samples_from_raw<'a>(samples: *const f64, len: usize) -> Option<&'a [f64]> {
    if samples.is_null() {
        return if len == 0 { Some(&[][..]) } else { None };
    }
    Some(slice::from_raw_parts(samples, len))
}

/// NaN marks an absent scale score
fn optional_score(value: f64) -> Option<f64> {
    (!value.is_nan()).then_some(value)
}

// ============================================================================
// Analysis API
// ============================================================================

/// Analyze one capture and return the outcome as JSON.
///
/// `phase` is 0 for eyes open and 1 for eyes closed. A failed capture still
/// returns an outcome with `success: false`.
///
/// # Safety
/// - `samples` must point to `len` readable `f64` values (or be NULL with `len == 0`).
/// - Returns a newly allocated string that must be freed with `ns_free_string`.
/// - Returns NULL on error; call `ns_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn ns_process_samples(
    samples: *const f64,
    len: usize,
    phase: c_int,
    keep_diagnostics: bool,
) -> *mut c_char {
    clear_last_error();

    let raw = match samples_from_raw(samples, len) {
        Some(raw) => raw,
        None => {
            set_last_error("Invalid samples pointer");
            return ptr::null_mut();
        }
    };

    let phase = match phase {
        0 => TestPhase::OpenEyes,
        1 => TestPhase::ClosedEyes,
        other => {
            set_last_error(&format!("Unknown test phase: {}", other));
            return ptr::null_mut();
        }
    };

    let outcome = BrainwaveProcessor::new().process(phase, raw, keep_diagnostics);
    match serde_json::to_string(&outcome) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Compute the risk score for a final index. Pass NaN for an absent scale score.
///
/// # Safety
/// - Pure function; always safe to call.
#[no_mangle]
pub unsafe extern "C" fn ns_risk_score(final_index: f64, moca: f64, mmse: f64) -> f64 {
    clear_last_error();
    let scores = CognitiveScores::new(optional_score(moca), optional_score(mmse));
    risk_score(final_index, &scores)
}

/// Look up grip-strength percentile and score, returned as JSON.
///
/// # Safety
/// - `gender` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `ns_free_string`.
/// - Returns NULL on error; call `ns_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn ns_grip_strength(
    gender: *const c_char,
    age: c_int,
    grip_kg: f64,
) -> *mut c_char {
    clear_last_error();

    let gender = match cstr_to_string(gender) {
        Some(s) => s,
        None => {
            set_last_error("Invalid gender string pointer");
            return ptr::null_mut();
        }
    };
    let gender = match gender.parse::<Gender>() {
        Ok(g) => g,
        Err(e) => {
            set_last_error(&e.to_string());
            return ptr::null_mut();
        }
    };
    if age < 0 {
        set_last_error("Age must not be negative");
        return ptr::null_mut();
    }

    let result = grip_strength(gender, age as u32, grip_kg);
    match serde_json::to_string(&result) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Recorder API
// ============================================================================

/// Opaque handle to a file-backed recorder
pub struct RecorderHandle {
    recorder: BiosignalRecorder<BufWriter<File>>,
}

/// Create a recording file. NULL ids fall back to the format defaults.
///
/// # Safety
/// - `path` must be a valid null-terminated C string; the ids may be NULL.
/// - Returns a pointer that must be freed with `ns_recorder_free`.
/// - Returns NULL on error; call `ns_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn ns_recorder_open(
    path: *const c_char,
    patient_id: *const c_char,
    recording_id: *const c_char,
) -> *mut RecorderHandle {
    clear_last_error();

    let path = match cstr_to_string(path) {
        Some(s) => s,
        None => {
            set_last_error("Invalid path string pointer");
            return ptr::null_mut();
        }
    };
    let patient_id = cstr_to_string(patient_id).unwrap_or_else(|| DEFAULT_PATIENT_ID.to_string());
    let recording_id =
        cstr_to_string(recording_id).unwrap_or_else(|| DEFAULT_RECORDING_ID.to_string());

    match BiosignalRecorder::create(
        Path::new(&path),
        &patient_id,
        &recording_id,
        &RecorderConfig::default(),
    ) {
        Ok(recorder) => Box::into_raw(Box::new(RecorderHandle { recorder })),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Append one sample.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `ns_recorder_open`.
/// - Returns 0 on success, -1 on error.
#[no_mangle]
pub unsafe extern "C" fn ns_recorder_add_sample(handle: *mut RecorderHandle, sample: f64) -> c_int {
    clear_last_error();

    if handle.is_null() {
        set_last_error("Null recorder pointer");
        return -1;
    }

    match (*handle).recorder.add_sample(sample) {
        Ok(()) => 0,
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

/// Append a burst of samples.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `ns_recorder_open`.
/// - `samples` must point to `len` readable `f64` values (or be NULL with `len == 0`).
/// - Returns 0 on success, -1 on error.
#[no_mangle]
pub unsafe extern "C" fn ns_recorder_add_samples(
    handle: *mut RecorderHandle,
    samples: *const f64,
    len: usize,
) -> c_int {
    clear_last_error();

    if handle.is_null() {
        set_last_error("Null recorder pointer");
        return -1;
    }
    let burst = match samples_from_raw(samples, len) {
        Some(burst) => burst,
        None => {
            set_last_error("Invalid samples pointer");
            return -1;
        }
    };

    match (*handle).recorder.add_samples(burst) {
        Ok(()) => 0,
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

/// Seal the recording. Safe to call more than once.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `ns_recorder_open`.
/// - Returns 0 on success, -1 on error.
#[no_mangle]
pub unsafe extern "C" fn ns_recorder_finish(handle: *mut RecorderHandle) -> c_int {
    clear_last_error();

    if handle.is_null() {
        set_last_error("Null recorder pointer");
        return -1;
    }

    match (*handle).recorder.finish() {
        Ok(()) => 0,
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

/// Free a recorder, sealing it first if needed.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `ns_recorder_open`, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn ns_recorder_free(handle: *mut RecorderHandle) {
    if !handle.is_null() {
        drop(Box::from_raw(handle));
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by Neuroscreen functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a Neuroscreen function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn ns_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next Neuroscreen function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn ns_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn ns_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
