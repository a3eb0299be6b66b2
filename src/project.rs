//! # Project Module
//!
//! Turns the encoded directory names under `projects/` back into project paths.
//!
//! The encoding replaces every `/` with `-`, so `-home-alice-src-my-app` could be
//! `/home/alice/src/my-app` or `/home/alice/src/my/app`. Decoding probes the
//! filesystem and prefers the longest path that exists; when nothing exists the
//! plain all-separators reading is kept. Names that contain `-` in an
//! intermediate directory cannot be recovered.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

pub const DELIMITER: char = '-';

/// Project name used for logs that do not sit inside an encoded project directory.
pub const UNKNOWN_PROJECT: &str = "unknown";

/// Existence check used while decoding. Injected so decoding can be tested
/// without a real directory tree.
pub trait PathProbe {
    fn exists(&self, path: &Path) -> bool;
}

/// Probes the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsProbe;

impl PathProbe for FsProbe {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

impl<F> PathProbe for F
where
    F: Fn(&Path) -> bool,
{
    fn exists(&self, path: &Path) -> bool {
        self(path)
    }
}

/// First real component of the home directory (`home` for `/home/alice`,
/// `Users` for `/Users/alice`).
fn home_marker(home: &Path) -> Option<&str> {
    home.components().find_map(|c| match c {
        Component::Normal(s) => s.to_str(),
        _ => None,
    })
}

fn absolute(tokens: &[&str]) -> String {
    format!("/{}", tokens.join("/"))
}

/// Decode an encoded segment into a best-effort absolute (or, for segments
/// without the leading delimiter, relative) path. Never fails.
pub fn decode_segment<P: PathProbe + ?Sized>(encoded: &str, home: &Path, probe: &P) -> String {
    let Some(rest) = encoded.strip_prefix(DELIMITER) else {
        return encoded.replace(DELIMITER, "/");
    };
    let tokens: Vec<&str> = rest.split(DELIMITER).collect();
    if tokens.len() <= 2 || Some(tokens[0]) != home_marker(home) {
        return absolute(&tokens);
    }

    let maximal = absolute(&tokens);
    if probe.exists(Path::new(&maximal)) || tokens.len() <= 3 {
        return maximal;
    }

    // Directories first, remaining tokens re-joined into one hyphenated leaf.
    // k == len - 1 would reproduce `maximal`, and the leaf never sits above home.
    for k in (2..tokens.len() - 1).rev() {
        let candidate = format!("{}/{}", absolute(&tokens[..k]), tokens[k..].join("-"));
        if probe.exists(Path::new(&candidate)) {
            return candidate;
        }
    }
    maximal
}

/// Express `resolved` relative to `home` when it lies inside it.
pub fn strip_home(resolved: &str, home: &Path) -> String {
    match Path::new(resolved).strip_prefix(home) {
        Ok(rel) if rel.as_os_str().is_empty() => "~".to_string(),
        Ok(rel) => rel.to_string_lossy().into_owned(),
        Err(_) => resolved.to_string(),
    }
}

pub fn resolve_project<P: PathProbe + ?Sized>(encoded: &str, home: &Path, probe: &P) -> String {
    strip_home(&decode_segment(encoded, home, probe), home)
}

/// Memoising resolver used by the scan driver; every session file in a project
/// directory shares one decode.
pub struct ProjectResolver<P = FsProbe> {
    home: PathBuf,
    probe: P,
    cache: HashMap<String, String>,
}

impl ProjectResolver<FsProbe> {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self::with_probe(home, FsProbe)
    }
}

impl<P: PathProbe> ProjectResolver<P> {
    pub fn with_probe(home: impl Into<PathBuf>, probe: P) -> Self {
        Self {
            home: home.into(),
            probe,
            cache: HashMap::new(),
        }
    }

    pub fn resolve(&mut self, encoded: &str) -> String {
        if let Some(hit) = self.cache.get(encoded) {
            return hit.clone();
        }
        let resolved = resolve_project(encoded, &self.home, &self.probe);
        debug!(encoded, project = %resolved, "resolved project directory");
        self.cache.insert(encoded.to_string(), resolved.clone());
        resolved
    }

    /// Project for a log file at `path` below `projects_root`: the first path
    /// component under the root, or [`UNKNOWN_PROJECT`] for files directly in it.
    pub fn project_for_file(&mut self, projects_root: &Path, path: &Path) -> String {
        let rel = match path.strip_prefix(projects_root) {
            Ok(rel) => rel,
            Err(_) => return UNKNOWN_PROJECT.to_string(),
        };
        let mut components = rel.components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(dir)), Some(_)) => self.resolve(&dir.to_string_lossy()),
            _ => UNKNOWN_PROJECT.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashSet;

    fn existing(paths: &[&str]) -> impl Fn(&Path) -> bool {
        let set: HashSet<PathBuf> = paths.iter().map(PathBuf::from).collect();
        move |p: &Path| set.contains(p)
    }

    #[test]
    fn round_trip_for_existing_directory() {
        let probe = existing(&["/home/alice/src/proj"]);
        let home = Path::new("/home/alice");
        assert_eq!(resolve_project("-home-alice-src-proj", home, &probe), "src/proj");
    }

    #[test]
    fn hyphenated_leaf_found_by_split_search() {
        let probe = existing(&["/home/alice/src/my-cool-app"]);
        let home = Path::new("/home/alice");
        assert_eq!(
            resolve_project("-home-alice-src-my-cool-app", home, &probe),
            "src/my-cool-app"
        );
    }

    #[test]
    fn hyphenated_leaf_directly_in_home() {
        let probe = existing(&["/home/alice/my-proj"]);
        assert_eq!(
            resolve_project("-home-alice-my-proj", Path::new("/home/alice"), &probe),
            "my-proj"
        );
    }

    #[test]
    fn longest_directory_prefix_wins() {
        // Both readings exist; the deeper directory split is tried first.
        let probe = existing(&["/home/alice/a/b-c", "/home/alice/a-b-c"]);
        assert_eq!(
            resolve_project("-home-alice-a-b-c", Path::new("/home/alice"), &probe),
            "a/b-c"
        );
    }

    #[test]
    fn nothing_exists_keeps_maximal_reconstruction() {
        let probe = existing(&[]);
        assert_eq!(
            resolve_project("-home-alice-src-my-app", Path::new("/home/alice"), &probe),
            "src/my/app"
        );
    }

    #[test]
    fn maximal_match_skips_split_search() {
        let calls = RefCell::new(Vec::new());
        let probe = |p: &Path| {
            calls.borrow_mut().push(p.to_path_buf());
            true
        };
        decode_segment("-home-alice-x-y-z", Path::new("/home/alice"), &probe);
        assert_eq!(calls.borrow().len(), 1);
    }

    #[test]
    fn segment_without_leading_delimiter_is_naive() {
        let probe = existing(&[]);
        assert_eq!(resolve_project("foo-bar", Path::new("/home/alice"), &probe), "foo/bar");
    }

    #[test]
    fn non_home_absolute_path_is_kept() {
        let probe = existing(&["/srv/data-sets"]);
        assert_eq!(
            resolve_project("-tmp-scratch", Path::new("/home/alice"), &probe),
            "/tmp/scratch"
        );
    }

    #[test]
    fn home_marker_follows_home_layout() {
        let probe = existing(&["/Users/bob/work/site-v2"]);
        assert_eq!(
            resolve_project("-Users-bob-work-site-v2", Path::new("/Users/bob"), &probe),
            "work/site-v2"
        );
    }

    #[test]
    fn home_strip_is_component_wise() {
        assert_eq!(strip_home("/home/alice2/x", Path::new("/home/alice")), "/home/alice2/x");
        assert_eq!(strip_home("/home/alice", Path::new("/home/alice")), "~");
    }

    #[test]
    fn resolver_attributes_files_to_projects() {
        let mut resolver = ProjectResolver::with_probe("/home/alice", existing(&[]));
        let root = Path::new("/data/projects");
        assert_eq!(
            resolver.project_for_file(root, Path::new("/data/projects/-home-alice-web/s1.jsonl")),
            "web"
        );
        assert_eq!(
            resolver.project_for_file(root, Path::new("/data/projects/s2.jsonl")),
            UNKNOWN_PROJECT
        );
        assert_eq!(
            resolver.project_for_file(root, Path::new("/elsewhere/s3.jsonl")),
            UNKNOWN_PROJECT
        );
    }
}
