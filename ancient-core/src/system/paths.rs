use std::path::PathBuf;
use std::sync::OnceLock;

// Cache the paths to avoid repeated environment lookups
static ANCIENT_HOME: OnceLock<PathBuf> = OnceLock::new();

/// Get the ancient home directory
/// Checks ANCIENT_HOME environment variable, falls back to ${HOME}/.ancient
pub fn ancient_home() -> PathBuf {
    ANCIENT_HOME
        .get_or_init(|| {
            if let Ok(path) = std::env::var("ANCIENT_HOME") {
                PathBuf::from(path)
            } else {
                let home = std::env::var("HOME").unwrap_or_else(|_| {
                    std::env::var("USERPROFILE").unwrap_or_else(|_| ".".to_string())
                });
                PathBuf::from(home).join(".ancient")
            }
        })
        .clone()
}

/// Locate the configuration file to use when none is given on the command line.
/// ANCIENT_CONFIG wins; otherwise ${ANCIENT_HOME}/config.toml if it exists.
pub fn default_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("ANCIENT_CONFIG") {
        return Some(PathBuf::from(path));
    }
    let candidate = ancient_home().join("config.toml");
    candidate.is_file().then_some(candidate)
}

/// Prefix used to name a sample's outputs: the file name up to its first dot
pub fn file_prefix(path: &std::path::Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.split('.').next().unwrap_or(name).to_string())
        .unwrap_or_else(|| "sample".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_file_prefix_stops_at_first_dot() {
        assert_eq!(file_prefix(Path::new("/data/NA12878.genotypes.txt.gz")), "NA12878");
        assert_eq!(file_prefix(Path::new("sample")), "sample");
        assert_eq!(file_prefix(Path::new("relative/dir/HG00096.txt")), "HG00096");
    }

    #[test]
    fn test_ancient_home_is_stable() {
        assert_eq!(ancient_home(), ancient_home());
    }
}
