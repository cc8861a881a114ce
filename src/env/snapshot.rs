//! Immutable view of the ambient environment

use crate::error::{Result, StarterError};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

/// Snapshot of the ambient process environment
///
/// Captured once per invocation and shared read-only by every command
/// built from it. Cloning is cheap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    vars: Arc<BTreeMap<String, String>>,
}

impl EnvSnapshot {
    /// Capture the current process environment
    ///
    /// Variables whose name or value is not valid unicode are skipped.
    pub fn from_process() -> Self {
        std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect()
    }

    /// Add variables from `.env` style files
    ///
    /// Keys already present win, and earlier files win over later ones.
    /// Missing files are skipped; unreadable files and malformed lines are
    /// reported with a warning and skipped.
    pub fn with_env_files<P: AsRef<Path>>(self, paths: &[P]) -> Self {
        let mut vars = (*self.vars).clone();

        for path in paths {
            let path = path.as_ref();
            let Some(loaded) = read_env_file(path) else {
                continue;
            };

            let mut added = 0;
            for (key, value) in loaded {
                if !vars.contains_key(&key) {
                    vars.insert(key, value);
                    added += 1;
                }
            }
            tracing::debug!("Loaded {} variables from {}", added, path.display());
        }

        Self {
            vars: Arc::new(vars),
        }
    }

    /// Look up an ambient variable
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Whether the variable is defined
    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// Number of variables
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Whether the snapshot is empty
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Iterate over all variables
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Collect the values of required variables from the ambient environment
    ///
    /// Task-level overrides never satisfy this check; the first missing
    /// name fails with [`StarterError::MissingEnvVar`].
    pub fn require<S: AsRef<str>>(&self, names: &[S]) -> Result<HashMap<String, String>> {
        let mut resolved = HashMap::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            let value = self
                .get(name)
                .ok_or_else(|| StarterError::MissingEnvVar(name.to_string()))?;
            resolved.insert(name.to_string(), value.to_string());
        }
        Ok(resolved)
    }

    /// Merge task-level overrides on top of the snapshot
    ///
    /// Overrides win on key collision. The snapshot itself is unchanged.
    pub fn merge(&self, overrides: &HashMap<String, String>) -> HashMap<String, String> {
        let mut merged: HashMap<String, String> = self
            .vars
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        for (k, v) in overrides {
            merged.insert(k.clone(), v.clone());
        }
        merged
    }
}

/// Read one env file, or `None` when it cannot be used at all
fn read_env_file(path: &Path) -> Option<Vec<(String, String)>> {
    let iter = match dotenvy::from_path_iter(path) {
        Ok(iter) => iter,
        Err(e) if e.not_found() => {
            tracing::debug!("Env file {} not found, skipping", path.display());
            return None;
        }
        Err(e) => {
            tracing::warn!("Cannot read env file {}: {}", path.display(), e);
            return None;
        }
    };

    let mut loaded = Vec::new();
    for item in iter {
        match item {
            Ok(pair) => loaded.push(pair),
            Err(dotenvy::Error::LineParse(line, pos)) => {
                tracing::warn!(
                    "{}: ignoring malformed line '{}' (at {})",
                    path.display(),
                    line,
                    pos
                );
            }
            Err(e) => {
                tracing::warn!("Cannot read env file {}: {}", path.display(), e);
                return None;
            }
        }
    }
    Some(loaded)
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EnvSnapshot {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: Arc::new(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect()),
        }
    }
}
