// File: src/c_api.rs
// C ABI for host applications. Every result crosses as a JSON string owned by
// Rust; callers hand it back to `screen_free_string`.
use crate::core::engine::ScoringEngine;
use crate::persistence::load_effective_config;
use serde::Serialize;
use std::ffi::{c_char, CStr, CString};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;
use std::ptr;
use std::sync::OnceLock;
use tracing::{error, info};

static ENGINE: OnceLock<ScoringEngine> = OnceLock::new();

fn build_engine(config_path: Option<PathBuf>) -> crate::error::Result<ScoringEngine> {
    let config = load_effective_config(config_path.as_deref())?;
    ScoringEngine::from_config(&config)
}

/// Reads a possibly-null C string. Invalid UTF-8 reads as empty.
unsafe fn read_str<'a>(s: *const c_char) -> &'a str {
    if s.is_null() {
        return "";
    }
    CStr::from_ptr(s).to_str().unwrap_or("")
}

/// A JSON array of strings; anything else reads as "nothing seen yet".
unsafe fn read_list(s: *const c_char) -> Vec<String> {
    serde_json::from_str(read_str(s)).unwrap_or_default()
}

fn error_json(message: &str) -> String {
    serde_json::json!({ "error": message }).to_string()
}

fn to_c_string(json: String) -> *mut c_char {
    match CString::new(json) {
        Ok(s) => s.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Runs `score` against the engine, serializing its result or any failure.
fn with_engine<T, F>(name: &str, score: F) -> *mut c_char
where
    T: Serialize,
    F: FnOnce(&ScoringEngine) -> T,
{
    let outcome = catch_unwind(AssertUnwindSafe(|| match ENGINE.get() {
        Some(engine) => serde_json::to_string(&score(engine)).unwrap_or_else(|e| error_json(&e.to_string())),
        None => error_json("engine not initialized"),
    }));
    let json = outcome.unwrap_or_else(|_| {
        error!(call = name, "Panic inside scoring call");
        error_json("internal error")
    });
    to_c_string(json)
}

/// Builds the vocabulary once. `config_path` may be null to use
/// `$SCREEN_VOCABULARY` or the per-user config. Returns 0 on success (or if
/// already initialized), -1 on failure, including a named config that is missing.
///
/// # Safety
/// `config_path` must be null or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn screen_engine_init(config_path: *const c_char) -> i32 {
    if ENGINE.get().is_some() {
        return 0;
    }
    let explicit = read_str(config_path);
    let path = (!explicit.is_empty()).then(|| PathBuf::from(explicit));

    let result = catch_unwind(AssertUnwindSafe(|| build_engine(path)));
    match result {
        Ok(Ok(engine)) => {
            let _ = ENGINE.set(engine);
            info!("Scoring engine initialized");
            0
        }
        Ok(Err(e)) => {
            error!(error = %e, "Scoring engine initialization failed");
            -1
        }
        Err(_) => {
            error!("Panic during scoring engine initialization");
            -1
        }
    }
}

/// # Safety
/// Both arguments must be null or valid NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn screen_score_recall(transcript: *const c_char, already_hit_json: *const c_char) -> *mut c_char {
    let transcript = read_str(transcript);
    let already_hit = read_list(already_hit_json);
    with_engine("recall", |engine| engine.score_recall(transcript, &already_hit))
}

/// # Safety
/// Both arguments must be null or valid NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn screen_score_recognition(
    transcript: *const c_char,
    already_hit_json: *const c_char,
) -> *mut c_char {
    let transcript = read_str(transcript);
    let already_hit = read_list(already_hit_json);
    with_engine("recognition", |engine| engine.score_recognition(transcript, &already_hit))
}

/// # Safety
/// Both arguments must be null or valid NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn screen_score_fluency(
    transcript: *const c_char,
    already_produced_json: *const c_char,
) -> *mut c_char {
    let transcript = read_str(transcript);
    let already_produced = read_list(already_produced_json);
    with_engine("fluency", |engine| engine.score_fluency(transcript, &already_produced))
}

/// # Safety
/// `s` must be null or a pointer returned by one of the scoring calls, freed once.
#[no_mangle]
pub unsafe extern "C" fn screen_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vocabulary::VocabularyConfig;
    use crate::persistence::save_config;

    unsafe fn take_json(ptr: *mut c_char) -> serde_json::Value {
        assert!(!ptr.is_null());
        let value = serde_json::from_str(CStr::from_ptr(ptr).to_str().unwrap()).unwrap();
        screen_free_string(ptr);
        value
    }

    #[test]
    fn missing_config_path_fails_to_build() {
        let dir = tempfile::tempdir().unwrap();
        assert!(build_engine(Some(dir.path().join("absent.json"))).is_err());
    }

    #[test]
    fn scoring_calls_return_json() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("vocabulary.json");
        save_config(&VocabularyConfig::default(), &config_path).unwrap();
        let config_path = CString::new(config_path.to_str().unwrap()).unwrap();

        unsafe {
            assert_eq!(screen_engine_init(config_path.as_ptr()), 0);

            let transcript = CString::new("sapato casa casa").unwrap();
            let seen = CString::new(r#"["sapato"]"#).unwrap();
            let recall = take_json(screen_score_recall(transcript.as_ptr(), seen.as_ptr()));
            assert_eq!(recall["hits"], serde_json::json!(["casa"]));
            assert_eq!(recall["repeats"].as_array().unwrap().len(), 2);

            let garbage = CString::new("not a list").unwrap();
            let recognition = take_json(screen_score_recognition(transcript.as_ptr(), garbage.as_ptr()));
            assert_eq!(recognition["hits"], serde_json::json!(["sapato", "casa"]));

            let animals = CString::new("lobo-guará gato").unwrap();
            let fluency = take_json(screen_score_fluency(animals.as_ptr(), ptr::null()));
            assert_eq!(fluency["animals"], serde_json::json!(["lobo guara", "gato"]));
            assert_eq!(fluency["tokens"][0]["classification"], "target");
        }
    }
}
