use std::{collections::HashMap, path::Path};

use anyhow::{Context, Result};

/// Source of configuration values, usually the process environment.
pub struct Env<'a> {
    lookup: Box<dyn Fn(&str) -> Option<String> + 'a>,
}

impl<'a> Env<'a> {
    pub fn system() -> Self {
        Self::from_fn(|key| std::env::var(key).ok())
    }

    pub fn from_fn<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + 'a,
    {
        Self {
            lookup: Box::new(lookup),
        }
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
    }

    /// The value of `key`, or `default` when unset.
    pub fn get(&self, key: &str, default: &str) -> String {
        self.raw(key).unwrap_or_else(|| default.to_string())
    }

    /// `1`, `true`, `yes` and `on` (any case) are true, anything else set is false.
    pub fn bool(&self, key: &str, default: bool) -> bool {
        match self.raw(key) {
            Some(value) => matches!(
                value.trim().to_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            ),
            None => default,
        }
    }
}

impl Env<'static> {
    /// The process environment, falling back to the `KEY=value` lines of the
    /// file at `path`. A missing file is not an error.
    pub fn with_dotenv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Ok(Self::system());
        }
        let file = dotenvy::from_path_iter(path)
            .with_context(|| format!("Failed to read {path:?}"))?
            .collect::<std::result::Result<HashMap<_, _>, _>>()
            .with_context(|| format!("Invalid env file {path:?}"))?;
        essentials::debug!("Loaded environment from {:?}", path);
        Ok(Self::from_fn(move |key| {
            std::env::var(key).ok().or_else(|| file.get(key).cloned())
        }))
    }
}
