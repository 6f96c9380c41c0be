use std::path::{Path, PathBuf};

pub fn detect_version_from_command(binary: &str, args: &[&str]) -> Option<String> {
    std::process::Command::new(binary)
        .args(args)
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
        .map(|s| extract_version(&s))
}

/// Locate `binary` on `PATH`. Commands containing a path separator are
/// checked as given.
pub fn resolve_command_path(binary: &str) -> Option<PathBuf> {
    if binary.contains(std::path::MAIN_SEPARATOR) || binary.contains('/') {
        let path = PathBuf::from(binary);
        return is_executable(&path).then_some(path);
    }

    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(binary))
        .find(|candidate| is_executable(candidate))
}

pub fn is_command_available(binary: &str) -> bool {
    resolve_command_path(binary).is_some()
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

fn extract_version(s: &str) -> String {
    s.split_whitespace()
        .find(|w| w.chars().next().is_some_and(|c| c.is_ascii_digit()))
        .unwrap_or(s)
        .to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_version_with_version_prefix() {
        assert_eq!(extract_version("tool 1.2.3"), "1.2.3");
    }

    #[test]
    fn extract_version_claude_style() {
        assert_eq!(extract_version("2.0.14 (Claude Code)"), "2.0.14");
    }

    #[test]
    fn extract_version_no_digit_word() {
        assert_eq!(extract_version("no version here"), "no version here");
    }

    #[test]
    fn is_command_available_nonexistent() {
        assert!(!is_command_available("__nonexistent_binary_12345__"));
    }

    #[test]
    #[cfg(unix)]
    fn resolve_command_path_finds_sh() {
        let path = resolve_command_path("sh").expect("sh should be on PATH");
        assert!(path.ends_with("sh"));
    }

    #[test]
    fn resolve_command_path_missing_absolute() {
        assert!(resolve_command_path("/nonexistent/dir/claude").is_none());
    }

    #[test]
    fn detect_version_nonexistent_binary() {
        assert!(
            detect_version_from_command("__nonexistent_binary_12345__", &["--version"]).is_none()
        );
    }
}
