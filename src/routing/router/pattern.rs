use std::{collections::HashMap, sync::OnceLock};

use percent_encoding::percent_decode_str;
use regex::Regex;

use crate::{http::normalize_path, Error, Result};

fn placeholder(segment: &str) -> Option<&str> {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER
        .get_or_init(|| Regex::new(r"^\{([A-Za-z_][A-Za-z0-9_]*)\}$").expect("valid placeholder regex"))
        .captures(segment)
        .and_then(|captures| captures.get(1))
        .map(|name| name.as_str())
}

/// Decodes a path segment the way form values are decoded: `+` is a space.
fn decode(segment: &str) -> String {
    percent_decode_str(&segment.replace('+', " "))
        .decode_utf8_lossy()
        .into_owned()
}

/// Named values captured from placeholder segments of a matched path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(HashMap<String, String>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// A compiled route pattern such as `/todos/{id}`.
///
/// Every segment is either a literal compared verbatim or a `{name}`
/// placeholder that captures exactly one non-empty segment.
#[derive(Debug, Clone)]
pub struct PathPattern {
    path: String,
    names: Box<[String]>,
    regex: Regex,
}

impl PathPattern {
    pub fn compile(pattern: &str) -> Result<Self> {
        let path = normalize_path(pattern);
        let mut names: Vec<String> = Vec::new();
        let mut source = String::from("^");
        if path == "/" {
            source.push('/');
        }
        for segment in path.split('/').skip(1).filter(|_| path != "/") {
            source.push('/');
            match placeholder(segment) {
                Some(name) => {
                    if names.iter().any(|known| known == name) {
                        return Err(Error::configuration(format!(
                            "Duplicate parameter `{name}` in route pattern `{path}`"
                        )));
                    }
                    source.push_str(&format!("(?P<{name}>[^/]+)"));
                    names.push(name.to_string());
                }
                None => source.push_str(&regex::escape(segment)),
            }
        }
        source.push('$');
        let regex = Regex::new(&source).map_err(|err| {
            Error::configuration(format!("Failed to compile route pattern `{path}`: {err}"))
        })?;
        Ok(Self {
            path,
            names: names.into_boxed_slice(),
            regex,
        })
    }

    /// The normalized pattern text.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn matches(&self, path: &str) -> Option<Params> {
        let captures = self.regex.captures(path)?;
        Some(
            self.names
                .iter()
                .filter_map(|name| {
                    captures
                        .name(name)
                        .map(|value| (name.clone(), decode(value.as_str())))
                })
                .collect(),
        )
    }
}
