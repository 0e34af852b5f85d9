//! Model artifact loading
//!
//! A model is read from its canonical dump JSON when present. Otherwise the
//! legacy text model is converted, the canonical file is written next to it
//! for subsequent runs, and the converted ensemble is returned.

use crate::errors::ModelError;
use crate::gbdt::{extract_trees, DumpModel, Ensemble, TextModel};
use parking_lot::Mutex;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument, warn};

/// Serializes check-canonical / convert sequences across threads
static CONVERSION_LOCK: Mutex<()> = parking_lot::const_mutex(());

/// Load a required ensemble, converting the legacy artifact if needed
#[instrument(skip_all, fields(primary = %primary.display()))]
pub fn load(primary: &Path, legacy: &Path) -> Result<Ensemble, ModelError> {
    let _guard = CONVERSION_LOCK.lock();

    if let Some(ensemble) = try_load_canonical(primary)? {
        return Ok(ensemble);
    }

    match read_optional(legacy)? {
        Some(content) => {
            let dump = convert_text(&content, legacy)?;
            if let Err(err) = persist_canonical(&dump, primary) {
                warn!(error = %err, "could not persist canonical model; using converted copy");
            }
            let ensemble = dump.to_ensemble(legacy)?;
            info!(
                legacy = %legacy.display(),
                trees = ensemble.num_trees(),
                "converted legacy model"
            );
            Ok(ensemble)
        }
        None => Err(ModelError::ModelNotFound {
            primary: primary.to_path_buf(),
            legacy: legacy.to_path_buf(),
        }),
    }
}

/// Like [`load`], but a missing model yields an empty ensemble
pub fn load_optional(primary: &Path, legacy: &Path) -> Result<Ensemble, ModelError> {
    match load(primary, legacy) {
        Err(ModelError::ModelNotFound { .. }) => {
            info!(primary = %primary.display(), "no model artifact found; using empty ensemble");
            Ok(Ensemble::empty())
        }
        other => other,
    }
}

/// Parse a canonical dump JSON file
pub fn load_canonical(path: &Path) -> Result<Ensemble, ModelError> {
    let content = fs::read_to_string(path).map_err(|err| ModelError::io(path, err))?;
    parse_canonical(&content, path)
}

/// Read and convert a legacy text model without touching the filesystem
pub fn convert_legacy(path: &Path) -> Result<DumpModel, ModelError> {
    let content = fs::read_to_string(path).map_err(|err| ModelError::io(path, err))?;
    convert_text(&content, path)
}

/// Atomically write `dump` as canonical JSON at `path`
///
/// The JSON goes to a temporary file in the target directory which is then
/// renamed over `path`, so readers see either the old file or the new one.
pub fn persist_canonical(dump: &DumpModel, path: &Path) -> Result<(), ModelError> {
    let json = dump
        .to_json_string()
        .map_err(|err| ModelError::malformed(path, err.to_string()))?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(|err| ModelError::io(dir, err))?;
    tmp.write_all(json.as_bytes())
        .map_err(|err| ModelError::io(tmp.path(), err))?;
    tmp.persist(path)
        .map_err(|err| ModelError::io(path, err.error))?;

    debug!(path = %path.display(), bytes = json.len(), "wrote canonical model");
    Ok(())
}

fn try_load_canonical(path: &Path) -> Result<Option<Ensemble>, ModelError> {
    match read_optional(path)? {
        Some(content) => {
            let ensemble = parse_canonical(&content, path)?;
            info!(
                path = %path.display(),
                trees = ensemble.num_trees(),
                "loaded canonical model"
            );
            Ok(Some(ensemble))
        }
        None => Ok(None),
    }
}

fn parse_canonical(content: &str, path: &Path) -> Result<Ensemble, ModelError> {
    DumpModel::from_json_str(content, path)?.to_ensemble(path)
}

fn convert_text(content: &str, path: &Path) -> Result<DumpModel, ModelError> {
    let text = TextModel::parse(content, path)?;
    extract_trees(&text, path)
}

fn read_optional(path: &Path) -> Result<Option<String>, ModelError> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(ModelError::io(path, err)),
    }
}
