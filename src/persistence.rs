// File: src/persistence.rs
use crate::core::vocabulary::{Vocabulary, VocabularyConfig};
use crate::error::{Error, Result};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{info, warn};

/// Environment variable naming a vocabulary config file.
pub const VOCABULARY_ENV: &str = "SCREEN_VOCABULARY";

/// Reads a JSON vocabulary config. Fields it omits keep their built-in defaults.
pub fn load_config(path: &Path) -> Result<VocabularyConfig> {
    let file = File::open(path)?;
    let config: VocabularyConfig = serde_json::from_reader(BufReader::new(file))?;
    if config.targets.is_empty() {
        return Err(Error::Config(format!("{} defines no targets", path.display())));
    }
    Ok(config)
}

/// The config file named by `$SCREEN_VOCABULARY`, if set.
pub fn env_config_path() -> Option<PathBuf> {
    std::env::var_os(VOCABULARY_ENV)
        .filter(|path| !path.is_empty())
        .map(PathBuf::from)
}

/// `<config dir>/brief-screen/vocabulary.json`.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("brief-screen").join("vocabulary.json"))
}

/// Loads the config at `path` if it exists, otherwise the built-in stimulus set.
/// A file that exists but cannot be parsed is an error.
pub fn resolve_config(path: Option<&Path>) -> Result<VocabularyConfig> {
    match path {
        Some(path) if path.exists() => {
            info!(path = %path.display(), "Loading vocabulary config");
            load_config(path)
        }
        Some(path) => {
            warn!(path = %path.display(), "Vocabulary config not found, using built-in defaults");
            Ok(VocabularyConfig::default())
        }
        None => Ok(VocabularyConfig::default()),
    }
}

/// The config a process should run with. A path given by the caller, or else by
/// `$SCREEN_VOCABULARY`, must load; only the per-user location may be absent.
pub fn load_effective_config(explicit: Option<&Path>) -> Result<VocabularyConfig> {
    match explicit.map(Path::to_path_buf).or_else(env_config_path) {
        Some(path) => {
            info!(path = %path.display(), "Loading vocabulary config");
            load_config(&path)
        }
        None => resolve_config(user_config_path().as_deref()),
    }
}

pub fn save_config(config: &VocabularyConfig, path: &Path) -> Result<()> {
    write_atomically(path, |writer| {
        serde_json::to_writer_pretty(&mut *writer, config)?;
        writer.flush()?;
        Ok(())
    })
}

/// Writes a built vocabulary snapshot so later runs can skip the build.
pub fn save_vocabulary(vocabulary: &Vocabulary, path: &Path) -> Result<()> {
    write_atomically(path, |writer| {
        bincode::serialize_into(&mut *writer, vocabulary)?;
        writer.flush()?;
        Ok(())
    })
}

pub fn load_vocabulary(path: &Path) -> Result<Vocabulary> {
    let file = File::open(path)?;
    let vocabulary = bincode::deserialize_from(BufReader::new(file))?;
    Ok(vocabulary)
}

/// Writes through a temp file in the destination directory, then renames it into place.
fn write_atomically<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<&NamedTempFile>) -> Result<()>,
{
    let parent_dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent_dir)?;

    let temp_file = NamedTempFile::new_in(parent_dir)?;
    {
        let mut writer = BufWriter::new(&temp_file);
        write(&mut writer)?;
    }
    temp_file.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}
