//! Small utility helpers shared across the crate.

use std::env;
use std::path::PathBuf;

use directories::BaseDirs;

/// Expand `~` and make a script path absolute.
///
/// The story service resolves relative paths against its own working
/// directory, not ours, so paths are normalised before they cross the bus.
pub fn expand_path(raw: &str) -> PathBuf {
    let raw = raw.trim();

    if let Some(rest) = raw.strip_prefix("~/") {
        if let Some(base) = BaseDirs::new() {
            return base.home_dir().join(rest);
        }
    }

    let path = PathBuf::from(raw);
    if path.is_absolute() {
        path
    } else {
        env::current_dir().map(|cwd| cwd.join(&path)).unwrap_or(path)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::expand_path;

    #[test]
    fn absolute_paths_pass_through() {
        assert_eq!(
            expand_path("/srv/stories/basic.ink"),
            Path::new("/srv/stories/basic.ink")
        );
    }

    #[test]
    fn relative_paths_become_absolute() {
        assert!(expand_path("stories/basic.ink").is_absolute());
    }

    #[test]
    fn tilde_expands_to_home() {
        let expanded = expand_path("~/stories/basic.ink");
        assert!(!expanded.starts_with("~"));
        assert!(expanded.ends_with("stories/basic.ink"));
    }
}
