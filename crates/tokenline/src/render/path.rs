//! Working directory shortening.

use std::path::Path;

const ELLIPSIS: &str = "…";

/// Shortens `path` for display.
///
/// A `home` prefix becomes `~`. When more than `segments` components
/// remain, only the last `segments` are kept behind `…/`.
pub fn shorten_path(path: &str, home: Option<&Path>, segments: usize) -> String {
    let segments = segments.max(1);
    let display = replace_home(path, home);

    let parts: Vec<&str> = display.split('/').filter(|p| !p.is_empty()).collect();
    if parts.len() <= segments {
        return display;
    }

    let tail = &parts[parts.len() - segments..];
    format!("{ELLIPSIS}/{}", tail.join("/"))
}

fn replace_home(path: &str, home: Option<&Path>) -> String {
    let Some(home) = home else {
        return path.to_string();
    };
    if home.as_os_str().is_empty() || home == Path::new("/") {
        return path.to_string();
    }

    match Path::new(path).strip_prefix(home) {
        Ok(rest) if rest.as_os_str().is_empty() => "~".to_string(),
        Ok(rest) => format!("~/{}", rest.display()),
        Err(_) => path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn home() -> Option<&'static Path> {
        Some(Path::new("/home/dev"))
    }

    #[test]
    fn test_home_becomes_tilde() {
        assert_eq!(shorten_path("/home/dev", home(), 3), "~");
        assert_eq!(shorten_path("/home/dev/code", home(), 3), "~/code");
    }

    #[test]
    fn test_home_prefix_must_be_whole_component() {
        assert_eq!(shorten_path("/home/developer", home(), 3), "/home/developer");
    }

    #[test]
    fn test_long_path_keeps_tail() {
        assert_eq!(
            shorten_path("/home/dev/code/tokenline/crates/core", home(), 3),
            "…/tokenline/crates/core"
        );
        assert_eq!(shorten_path("/srv/a/b/c/d", None, 2), "…/c/d");
    }

    #[test]
    fn test_short_path_unchanged() {
        assert_eq!(shorten_path("/usr/local/bin", None, 3), "/usr/local/bin");
        assert_eq!(shorten_path("~/a/b", None, 3), "~/a/b");
    }

    #[test]
    fn test_zero_segments_keeps_one() {
        assert_eq!(shorten_path("/srv/app/logs", None, 0), "…/logs");
    }
}
