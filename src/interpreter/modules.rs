//! Locating module source for `import`.
//!
//! `eso/<lib>` (or `eso.<lib>`) names one of the standard libraries compiled
//! into the binary. Any other name is a dotted path looked up under each
//! configured search directory, first match wins.

use super::error::EvalError;
use crate::config::Config;
use std::borrow::Cow;
use std::fs;
use std::path::{PathBuf, MAIN_SEPARATOR_STR};

const STDLIB_PREFIX: &str = "eso";

const STDLIB: &[(&str, &str)] = &[
    ("array", include_str!("../../stdlib/array.eso")),
    ("bool", include_str!("../../stdlib/bool.eso")),
    ("string", include_str!("../../stdlib/string.eso")),
    ("set", include_str!("../../stdlib/set.eso")),
    ("math", include_str!("../../stdlib/math.eso")),
];

/// Module source ready to be parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleSource {
    /// The name as written in the `import`.
    pub name: String,
    /// File name used in positions of the module's tokens.
    pub file: String,
    pub source: Cow<'static, str>,
}

/// Library name when `name` is `eso/<lib>` or `eso.<lib>` with no further
/// separators.
pub fn stdlib_name(name: &str) -> Option<&str> {
    for separator in ['/', '.'] {
        if let Some(lib) = name
            .strip_prefix(STDLIB_PREFIX)
            .and_then(|rest| rest.strip_prefix(separator))
        {
            if !lib.is_empty() && !lib.contains(separator) {
                return Some(lib);
            }
        }
    }
    None
}

pub fn stdlib_source(lib: &str) -> Option<&'static str> {
    STDLIB.iter().find(|(name, _)| *name == lib).map(|(_, source)| *source)
}

/// Candidate file paths for a dotted module name, in search order.
pub fn candidate_paths(name: &str, config: &Config) -> Vec<PathBuf> {
    let relative = format!("{}.{}", name.replace('.', MAIN_SEPARATOR_STR), config.extension);
    config
        .search_paths
        .iter()
        .map(|dir| dir.join(&relative))
        .collect()
}

pub fn resolve(name: &str, config: &Config) -> Result<ModuleSource, EvalError> {
    if let Some(lib) = stdlib_name(name) {
        return match stdlib_source(lib) {
            Some(source) => {
                tracing::debug!(module = name, "resolved standard library module");
                Ok(ModuleSource {
                    name: name.to_string(),
                    file: format!("<{}>", name),
                    source: Cow::Borrowed(source),
                })
            }
            None => Err(no_module(name)),
        };
    }

    let path = candidate_paths(name, config)
        .into_iter()
        .find(|path| path.is_file())
        .ok_or_else(|| no_module(name))?;

    tracing::debug!(module = name, path = %path.display(), "resolved module file");
    let source = fs::read_to_string(&path).map_err(|e| {
        EvalError::import(format!("IOError: error reading module '{}': {}", name, e))
    })?;

    Ok(ModuleSource {
        name: name.to_string(),
        file: path.display().to_string(),
        source: Cow::Owned(source),
    })
}

fn no_module(name: &str) -> EvalError {
    EvalError::import(format!("ImportError: no module named '{}'", name))
}
