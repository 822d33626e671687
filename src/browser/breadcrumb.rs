//! Breadcrumb derivation for remote paths
//!
//! Pure functions of the path string. The separator is inferred from the path
//! (`\` present means Windows-style), never from the host platform.

use crate::session::Separator;

/// One navigable segment of a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breadcrumb {
    /// Segment label shown to the user
    pub label: String,
    /// Accumulated path up to and including this segment
    pub path: String,
}

/// Split a path into accumulated, individually navigable prefixes
///
/// `/home/user/projects` yields `/`, `/home`, `/home/user`,
/// `/home/user/projects`. A Windows drive (`C:`) navigates to `C:\`, and a
/// UNC prefix (`\\`) forms the root crumb.
pub fn breadcrumbs(path: &str) -> Vec<Breadcrumb> {
    let sep = Separator::infer(path).as_char();
    let mut crumbs = Vec::new();

    let root: String = path.chars().take_while(|&c| c == sep).collect();
    let mut acc = root.clone();
    if !root.is_empty() {
        crumbs.push(Breadcrumb {
            label: root.clone(),
            path: root,
        });
    }

    for segment in path.split(sep).filter(|s| !s.is_empty()) {
        if acc.is_empty() || acc.ends_with(sep) {
            acc.push_str(segment);
        } else {
            acc.push(sep);
            acc.push_str(segment);
        }

        let mut target = acc.clone();
        if sep == '\\' && crumbs.is_empty() && is_drive(segment) {
            target.push(sep);
        }

        crumbs.push(Breadcrumb {
            label: segment.to_string(),
            path: target,
        });
    }

    crumbs
}

/// Parent of a remote path, or `None` at a root
pub fn parent_path(path: &str) -> Option<String> {
    let crumbs = breadcrumbs(path);
    match crumbs.len() {
        0 | 1 => None,
        n => Some(crumbs[n - 2].path.clone()),
    }
}

fn is_drive(segment: &str) -> bool {
    let bytes = segment.as_bytes();
    bytes.len() == 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn paths(crumbs: &[Breadcrumb]) -> Vec<&str> {
        crumbs.iter().map(|c| c.path.as_str()).collect()
    }

    fn labels(crumbs: &[Breadcrumb]) -> Vec<&str> {
        crumbs.iter().map(|c| c.label.as_str()).collect()
    }

    #[test]
    fn test_unix_breadcrumbs() {
        let crumbs = breadcrumbs("/home/user/projects");
        assert_eq!(labels(&crumbs), vec!["/", "home", "user", "projects"]);
        assert_eq!(
            paths(&crumbs),
            vec!["/", "/home", "/home/user", "/home/user/projects"]
        );
    }

    #[test]
    fn test_root_and_trailing_separator() {
        assert_eq!(paths(&breadcrumbs("/")), vec!["/"]);
        assert_eq!(paths(&breadcrumbs("/srv/")), vec!["/", "/srv"]);
        assert_eq!(paths(&breadcrumbs("//srv//app")), vec!["//", "//srv", "//srv/app"]);
    }

    #[test]
    fn test_windows_breadcrumbs() {
        let crumbs = breadcrumbs("C:\\Users\\me\\code");
        assert_eq!(labels(&crumbs), vec!["C:", "Users", "me", "code"]);
        assert_eq!(
            paths(&crumbs),
            vec!["C:\\", "C:\\Users", "C:\\Users\\me", "C:\\Users\\me\\code"]
        );
    }

    #[test]
    fn test_unc_breadcrumbs() {
        let crumbs = breadcrumbs("\\\\server\\share\\repo");
        assert_eq!(
            paths(&crumbs),
            vec!["\\\\", "\\\\server", "\\\\server\\share", "\\\\server\\share\\repo"]
        );
    }

    #[test]
    fn test_relative_and_empty() {
        assert_eq!(paths(&breadcrumbs("work/app")), vec!["work", "work/app"]);
        assert!(breadcrumbs("").is_empty());
    }

    #[test]
    fn test_parent_path() {
        assert_eq!(parent_path("/home/user").as_deref(), Some("/home"));
        assert_eq!(parent_path("/home").as_deref(), Some("/"));
        assert_eq!(parent_path("/"), None);
        assert_eq!(parent_path("C:\\Users").as_deref(), Some("C:\\"));
        assert_eq!(parent_path("C:\\"), None);
    }
}
