//! Service method table and profile key/value map.
//!
//! A backend reads its configuration through the two profile accessors of
//! the [`ServiceMethodTable`] passed to `initialize`. [`ProfileMap`] is the
//! usual source of those accessors: a `sai.profile` style file of
//! `KEY=VALUE` lines.

use crate::error::{SaiError, SaiResult};
use log::warn;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Looks a profile key up.
pub type ProfileGetValue = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Iterates profile entries; `true` restarts the iteration.
pub type ProfileGetNextValue = Arc<dyn Fn(bool) -> Option<(String, String)> + Send + Sync>;

/// Accessors a backend uses to read its profile.
#[derive(Clone, Default)]
pub struct ServiceMethodTable {
    pub profile_get_value: Option<ProfileGetValue>,
    pub profile_get_next_value: Option<ProfileGetNextValue>,
}

impl ServiceMethodTable {
    /// Builds a table serving values from a profile map.
    pub fn from_profile(profile: ProfileMap) -> Self {
        let profile = Arc::new(profile);
        let cursor = Arc::new(AtomicUsize::new(0));

        let values = Arc::clone(&profile);
        let get_value: ProfileGetValue = Arc::new(move |key: &str| values.get(key).map(str::to_string));

        let get_next_value: ProfileGetNextValue = Arc::new(move |reset: bool| {
            if reset {
                cursor.store(0, Ordering::SeqCst);
                return None;
            }
            let index = cursor.fetch_add(1, Ordering::SeqCst);
            profile
                .iter()
                .nth(index)
                .map(|(k, v)| (k.to_string(), v.to_string()))
        });

        Self {
            profile_get_value: Some(get_value),
            profile_get_next_value: Some(get_next_value),
        }
    }

    /// Fails unless both accessors are present.
    pub fn validate(&self) -> SaiResult<()> {
        if self.profile_get_value.is_none() {
            return Err(SaiError::invalid_parameter(
                "service method table lacks profile_get_value",
            ));
        }
        if self.profile_get_next_value.is_none() {
            return Err(SaiError::invalid_parameter(
                "service method table lacks profile_get_next_value",
            ));
        }
        Ok(())
    }

    /// Reads one profile value.
    pub fn get_value(&self, key: &str) -> Option<String> {
        self.profile_get_value.as_ref().and_then(|f| f(key))
    }
}

impl fmt::Debug for ServiceMethodTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceMethodTable")
            .field("profile_get_value", &self.profile_get_value.is_some())
            .field("profile_get_next_value", &self.profile_get_next_value.is_some())
            .finish()
    }
}

/// Ordered profile key/value pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileMap {
    values: BTreeMap<String, String>,
}

impl ProfileMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `KEY=VALUE` lines. Blank lines and `#` comments are ignored;
    /// lines without `=` are logged and skipped.
    pub fn parse(content: &str) -> Self {
        let mut map = Self::new();
        for (lineno, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match line.split_once('=') {
                Some((key, value)) if !key.trim().is_empty() => {
                    map.insert(key.trim(), value.trim());
                }
                _ => warn!("Skipping malformed profile line {}: {}", lineno + 1, line),
            }
        }
        map
    }

    /// Loads a profile file.
    pub fn load(path: impl AsRef<Path>) -> SaiResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            SaiError::failure(format!("failed to read profile {}: {}", path.display(), e))
        })?;
        Ok(Self::parse(&content))
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ProfileMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}
