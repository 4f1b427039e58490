//! Package layout discovery
//!
//! Works purely on a package's directory listing: which directories are
//! public, and which modules represent each of them.

use indexmap::IndexMap;
use regex::Regex;
use std::sync::LazyLock;

use crate::index::meta::PackageMeta;

/// Script extensions, in index-module priority order.
pub const MODULE_EXTENSIONS: &[&str] = &[
    ".ts", ".tsx", ".mts", ".cts", ".js", ".jsx", ".mjs", ".cjs",
];

/// Conventional entry point names, in priority order.
pub const INDEX_NAMES: &[&str] = &["mod", "lib", "main", "index"];

static RE_MODULE_EXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\.(?:js|jsx|mjs|cjs|ts|tsx|mts|cts)$")
        .expect("valid module extension pattern")
});

/// Hidden files and test files, matched against the path below the directory.
static RE_IGNORED_MODULE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:/[_.].|(?:^|[/._])test\.(?:js|jsx|mjs|cjs|ts|tsx|mts|cts)$)")
        .expect("valid ignored module pattern")
});

/// Private path components, matched against the path below the indexed root.
static RE_PRIVATE_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/(?:[_.].|testdata(?:/|$))").expect("valid private path")
});

fn trim_dir(path: &str) -> &str {
    path.strip_suffix('/').unwrap_or(path)
}

fn is_under(path: &str, dir: &str) -> bool {
    matches!(path.strip_prefix(dir), Some(rest) if rest.starts_with('/'))
}

/// The empty root is always a directory; anything else must be listed as one.
pub fn is_dir(path: &str, meta: &PackageMeta) -> bool {
    if path.is_empty() {
        return true;
    }
    meta.directory_listing
        .iter()
        .find(|entry| entry.path == path)
        .is_some_and(|entry| entry.is_dir())
}

/// Public directories at or below `path`, in listing order.
///
/// Returns `None` when `path` is not a directory of the package.
pub fn get_dirs(path: &str, meta: &PackageMeta) -> Option<Vec<String>> {
    let path = trim_dir(path);
    if !is_dir(path, meta) {
        return None;
    }

    let mut dirs: Vec<String> = meta
        .directory_listing
        .iter()
        .filter(|entry| entry.is_dir())
        .filter(|entry| entry.path == path || is_under(&entry.path, path))
        .filter(|entry| !RE_PRIVATE_PATH.is_match(&entry.path[path.len()..]))
        .map(|entry| entry.path.clone())
        .collect();

    if !dirs.iter().any(|dir| dir == path) {
        dirs.insert(0, path.to_string());
    }
    Some(dirs)
}

/// The conventional entry point of `dir`, if it has one.
///
/// Names are compared case-insensitively; the listed path is returned as is.
pub fn get_index_module(dir: &str, meta: &PackageMeta) -> Option<String> {
    let dir = trim_dir(dir);
    let files: Vec<&str> = meta
        .directory_listing
        .iter()
        .filter(|entry| entry.is_file() && is_under(&entry.path, dir))
        .map(|entry| entry.path.as_str())
        .collect();

    let dir_lower = dir.to_lowercase();
    for name in INDEX_NAMES {
        for ext in MODULE_EXTENSIONS {
            let needle = format!("{dir_lower}/{name}{ext}");
            if let Some(file) = files.iter().find(|file| file.to_lowercase() == needle) {
                return Some(file.to_string());
            }
        }
    }
    None
}

/// Every direct module file of `dir`, skipping hidden and test files.
pub fn get_modules(dir: &str, meta: &PackageMeta) -> Option<Vec<String>> {
    let dir = trim_dir(dir);
    if !is_dir(dir, meta) {
        return None;
    }

    let modules: Vec<String> = meta
        .directory_listing
        .iter()
        .filter(|entry| entry.is_file() && is_under(&entry.path, dir))
        .filter(|entry| {
            let rest = &entry.path[dir.len()..];
            rest.rfind('/') == Some(0)
                && RE_MODULE_EXT.is_match(&entry.path)
                && !RE_IGNORED_MODULE.is_match(rest)
        })
        .map(|entry| entry.path.clone())
        .collect();

    (!modules.is_empty()).then_some(modules)
}

/// Map every public directory under `path` to the modules that represent it.
///
/// A directory with an index module is represented by that module alone.
/// Returns `None` when nothing under `path` is indexable.
pub fn index_structure(path: &str, meta: &PackageMeta) -> Option<IndexMap<String, Vec<String>>> {
    let mut structure = IndexMap::new();
    for dir in get_dirs(path, meta)? {
        if let Some(index) = get_index_module(&dir, meta) {
            structure.insert(dir, vec![index]);
        } else if let Some(modules) = get_modules(&dir, meta) {
            structure.insert(dir, modules);
        }
    }
    (!structure.is_empty()).then_some(structure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::meta::ListingEntry;

    fn listing(entries: &[&str]) -> PackageMeta {
        PackageMeta::from_listing(
            entries
                .iter()
                .map(|path| match path.strip_suffix('/') {
                    Some(dir) => ListingEntry::dir(dir),
                    None => ListingEntry::file(*path),
                })
                .collect(),
        )
    }

    #[test]
    fn test_is_dir() {
        let meta = listing(&["/", "/http/", "/http/mod.ts"]);
        assert!(is_dir("", &meta));
        assert!(is_dir("/http", &meta));
        assert!(!is_dir("/http/mod.ts", &meta));
        assert!(!is_dir("/missing", &meta));
    }

    #[test]
    fn test_get_dirs_skips_private_paths() {
        let meta = listing(&[
            "/",
            "/http/",
            "/http/_internal/",
            "/.github/",
            "/fs/",
            "/fs/testdata/",
            "/fs/testdata/nested/",
            "/fs/testdata_utils/",
        ]);

        assert_eq!(
            get_dirs("/", &meta).unwrap(),
            vec!["", "/http", "/fs", "/fs/testdata_utils"]
        );
        assert_eq!(
            get_dirs("/fs", &meta).unwrap(),
            vec!["/fs", "/fs/testdata_utils"]
        );
        assert!(get_dirs("/nope", &meta).is_none());
    }

    #[test]
    fn test_get_dirs_does_not_match_sibling_prefixes() {
        let meta = listing(&["/std/", "/stdlib/"]);
        assert_eq!(get_dirs("/std", &meta).unwrap(), vec!["/std"]);
    }

    #[test]
    fn test_unlisted_root_is_indexed() {
        let meta = listing(&["/mod.ts", "/util/", "/util/mod.ts"]);
        assert_eq!(get_dirs("", &meta).unwrap(), vec!["", "/util"]);
    }

    #[test]
    fn test_index_module_preferred_over_helpers() {
        let meta = listing(&["/", "/mod.ts", "/helper.ts"]);
        let structure = index_structure("/", &meta).unwrap();
        assert_eq!(structure.get(""), Some(&vec!["/mod.ts".to_string()]));
    }

    #[test]
    fn test_index_module_priority_and_case() {
        let meta = listing(&["/a/", "/a/index.js", "/a/Mod.JS", "/a/lib.ts"]);
        assert_eq!(get_index_module("/a", &meta).as_deref(), Some("/a/Mod.JS"));

        let meta = listing(&["/a/", "/a/main.js", "/a/main.ts"]);
        assert_eq!(get_index_module("/a", &meta).as_deref(), Some("/a/main.ts"));

        let meta = listing(&["/a/", "/a/nested/mod.ts"]);
        assert_eq!(get_index_module("/a", &meta), None);
    }

    #[test]
    fn test_fallback_lists_direct_modules() {
        let meta = listing(&[
            "/utils/",
            "/utils/a.ts",
            "/utils/b.mjs",
            "/utils/README.md",
            "/utils/deep/",
            "/utils/deep/c.ts",
            "/utils/latest.ts",
        ]);
        assert_eq!(
            get_modules("/utils", &meta).unwrap(),
            vec!["/utils/a.ts", "/utils/b.mjs", "/utils/latest.ts"]
        );
    }

    #[test]
    fn test_hidden_and_test_files_are_ignored() {
        let meta = listing(&["/", "/foo_test.ts", "/.hidden.ts"]);
        assert_eq!(get_modules("", &meta), None);
        assert_eq!(index_structure("/", &meta), None);

        let meta = listing(&["/x/", "/x/a.test.ts", "/x/test.js", "/x/_private.ts", "/x/keep.tsx"]);
        assert_eq!(get_modules("/x", &meta).unwrap(), vec!["/x/keep.tsx"]);
    }

    #[test]
    fn test_index_structure_preserves_listing_order() {
        let meta = listing(&[
            "/",
            "/mod.ts",
            "/z/",
            "/z/mod.ts",
            "/a/",
            "/a/one.ts",
            "/a/two.ts",
            "/empty/",
            "/empty/data.json",
        ]);

        let structure = index_structure("/", &meta).unwrap();
        let dirs: Vec<&str> = structure.keys().map(String::as_str).collect();
        assert_eq!(dirs, vec!["", "/z", "/a"]);
        assert_eq!(structure["/a"], vec!["/a/one.ts", "/a/two.ts"]);
    }
}
