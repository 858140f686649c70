use std::env;
use std::path::PathBuf;

/// Environment variable holding the module search path list.
pub const SEARCH_PATH_VAR: &str = "ESOPATH";
/// Environment variable overriding the recursion limit.
pub const MAX_DEPTH_VAR: &str = "ESO_MAX_DEPTH";

pub const DEFAULT_MAX_DEPTH: usize = 10_000;
pub const DEFAULT_EXTENSION: &str = "eso";

/// Interpreter settings shared by the parser, evaluator and module resolver.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Directories searched in order for `import`ed modules.
    pub search_paths: Vec<PathBuf>,
    /// Maximum nesting of expression evaluation and parsing.
    pub max_depth: usize,
    /// Script file extension, without the dot.
    pub extension: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            search_paths: vec![env::current_dir().unwrap_or_else(|_| PathBuf::from("."))],
            max_depth: DEFAULT_MAX_DEPTH,
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Builds a config from a variable lookup. Unset or empty variables keep
    /// their defaults; an unparsable depth is ignored.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Config::default();

        if let Some(paths) = lookup(SEARCH_PATH_VAR).filter(|p| !p.is_empty()) {
            config.search_paths = env::split_paths(&paths)
                .filter(|p| !p.as_os_str().is_empty())
                .collect();
        }

        if let Some(depth) = lookup(MAX_DEPTH_VAR).and_then(|d| d.trim().parse().ok()) {
            config.max_depth = depth;
        }

        config
    }

    /// Puts `path` ahead of the existing search paths.
    pub fn with_search_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.search_paths.insert(0, path.into());
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_without_vars() {
        let config = Config::from_vars(vars(&[]));
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.extension, "eso");
        assert_eq!(config.search_paths.len(), 1);
    }

    #[test]
    fn test_search_paths_from_var() {
        let joined = env::join_paths(["/opt/eso/lib", "/home/me/scripts"]).unwrap();
        let config = Config::from_vars(vars(&[(SEARCH_PATH_VAR, joined.to_str().unwrap())]));
        assert_eq!(
            config.search_paths,
            vec![PathBuf::from("/opt/eso/lib"), PathBuf::from("/home/me/scripts")]
        );
    }

    #[test]
    fn test_max_depth_from_var() {
        let config = Config::from_vars(vars(&[(MAX_DEPTH_VAR, "64")]));
        assert_eq!(config.max_depth, 64);

        let config = Config::from_vars(vars(&[(MAX_DEPTH_VAR, "lots")]));
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_builder_prepends_search_path() {
        let config = Config::from_vars(vars(&[(SEARCH_PATH_VAR, "/a")]))
            .with_search_path("/b")
            .with_max_depth(10);
        assert_eq!(config.search_paths, vec![PathBuf::from("/b"), PathBuf::from("/a")]);
        assert_eq!(config.max_depth, 10);
    }
}
