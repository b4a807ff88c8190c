//! Target directory derivation
//!
//! Every cache lives at a fixed location under the install prefix. Paths are
//! joined as-is: no normalization, no existence checks.

use std::path::{Path, PathBuf};

/// Relative location of the GSettings schemas
pub const SCHEMAS_SUFFIX: &str = "share/glib-2.0/schemas";
/// Relative location of the shared MIME-info database
pub const MIME_SUFFIX: &str = "share/mime";
/// Relative location of the hicolor icon theme
pub const ICONS_SUFFIX: &str = "share/icons/hicolor";
/// Relative location of the desktop entries
pub const APPLICATIONS_SUFFIX: &str = "share/applications";

/// The four directories the hook refreshes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetDirs {
    pub schemas: PathBuf,
    pub mime: PathBuf,
    pub icons: PathBuf,
    pub applications: PathBuf,
}

impl TargetDirs {
    /// Derive all target directories from the install prefix
    pub fn under(prefix: &Path) -> Self {
        Self {
            schemas: join_suffix(prefix, SCHEMAS_SUFFIX),
            mime: join_suffix(prefix, MIME_SUFFIX),
            icons: join_suffix(prefix, ICONS_SUFFIX),
            applications: join_suffix(prefix, APPLICATIONS_SUFFIX),
        }
    }
}

/// Join a '/'-separated suffix onto a base path, one component at a time
fn join_suffix(base: &Path, suffix: &str) -> PathBuf {
    suffix
        .split('/')
        .fold(base.to_path_buf(), |acc, part| acc.join(part))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirs_under_usr() {
        let dirs = TargetDirs::under(Path::new("/usr"));
        assert_eq!(dirs.schemas, PathBuf::from("/usr/share/glib-2.0/schemas"));
        assert_eq!(dirs.mime, PathBuf::from("/usr/share/mime"));
        assert_eq!(dirs.icons, PathBuf::from("/usr/share/icons/hicolor"));
        assert_eq!(dirs.applications, PathBuf::from("/usr/share/applications"));
    }

    #[test]
    fn test_dirs_keep_prefix_unnormalized() {
        let dirs = TargetDirs::under(Path::new("/opt/app/../local"));
        assert_eq!(
            dirs.mime,
            PathBuf::from("/opt/app/../local/share/mime")
        );
    }

    #[test]
    fn test_dirs_trailing_slash_prefix() {
        let dirs = TargetDirs::under(Path::new("/usr/local/"));
        assert_eq!(
            dirs.applications,
            PathBuf::from("/usr/local/share/applications")
        );
    }

    #[test]
    fn test_dirs_empty_prefix_is_relative() {
        let dirs = TargetDirs::under(Path::new(""));
        assert_eq!(dirs.schemas, PathBuf::from("share/glib-2.0/schemas"));
        assert!(dirs.icons.is_relative());
    }
}
