//! Directory content fingerprints.

use crate::ignore::IgnoreMatcher;
use crate::walk::walk_pruned;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

const CHUNK_SIZE: usize = 4096;

/// A directory digest together with the files whose bytes could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirDigest {
    /// Lowercase hex SHA-256.
    pub hex: String,
    /// Files that were skipped (fully or partially) because reading failed.
    pub skipped: Vec<PathBuf>,
}

impl DirDigest {
    /// True when every file contributed its full content.
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Fingerprint of `dir`'s structure and file contents, or `None` if `dir`
/// does not exist.
///
/// At each level the surviving subdirectory names are folded first, then
/// every file's name followed by its bytes. Unreadable files contribute
/// nothing and do not fail the computation.
pub fn calculate_dir_hash(dir: &Path, matcher: Option<&IgnoreMatcher>) -> Option<String> {
    calculate_dir_hash_detailed(dir, matcher).map(|d| d.hex)
}

/// Same as [`calculate_dir_hash`], also reporting skipped files.
pub fn calculate_dir_hash_detailed(
    dir: &Path,
    matcher: Option<&IgnoreMatcher>,
) -> Option<DirDigest> {
    if !dir.exists() {
        return None;
    }

    let mut hasher = Sha256::new();
    let mut skipped = Vec::new();

    for level in walk_pruned(dir, matcher) {
        for name in &level.dirs {
            hasher.update(name.as_encoded_bytes());
        }
        for name in &level.files {
            hasher.update(name.as_encoded_bytes());
            let path = level.path.join(name);
            if let Err(err) = fold_file(&mut hasher, &path) {
                tracing::debug!(path = %path.display(), error = %err, "unreadable file left out of digest");
                skipped.push(path);
            }
        }
    }

    Some(DirDigest {
        hex: format!("{:x}", hasher.finalize()),
        skipped,
    })
}

fn fold_file(hasher: &mut Sha256, path: &Path) -> std::io::Result<()> {
    let mut file = File::open(path)?;
    let mut buf = [0u8; CHUNK_SIZE];
    loop {
        match file.read(&mut buf) {
            Ok(0) => return Ok(()),
            Ok(n) => hasher.update(&buf[..n]),
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn missing_directory_has_no_digest() {
        let dir = TempDir::new().unwrap();
        assert_eq!(calculate_dir_hash(&dir.path().join("nope"), None), None);
    }

    #[test]
    fn repeated_calls_are_stable() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.txt", "hello");
        write(dir.path(), "b.txt", "world");
        let first = calculate_dir_hash(dir.path(), None);
        assert!(first.is_some());
        assert_eq!(first, calculate_dir_hash(dir.path(), None));
    }

    #[test]
    fn content_change_changes_digest() {
        let a = TempDir::new().unwrap();
        let b = TempDir::new().unwrap();
        for root in [a.path(), b.path()] {
            write(root, "SKILL.md", "desc");
            write(root, "lib/util.py", "x = 1");
        }
        assert_eq!(
            calculate_dir_hash(a.path(), None),
            calculate_dir_hash(b.path(), None)
        );
        write(b.path(), "lib/util.py", "x = 2");
        assert_ne!(
            calculate_dir_hash(a.path(), None),
            calculate_dir_hash(b.path(), None)
        );
    }

    #[test]
    fn empty_subdirectory_counts_as_structure() {
        let a = TempDir::new().unwrap();
        let b = TempDir::new().unwrap();
        write(a.path(), "f.txt", "same");
        write(b.path(), "f.txt", "same");
        fs::create_dir(b.path().join("extra")).unwrap();
        assert_ne!(
            calculate_dir_hash(a.path(), None),
            calculate_dir_hash(b.path(), None)
        );
    }

    #[test]
    fn ignored_entries_do_not_affect_digest() {
        let a = TempDir::new().unwrap();
        let b = TempDir::new().unwrap();
        write(a.path(), "keep.txt", "k");
        write(b.path(), "keep.txt", "k");
        write(b.path(), "ignored.txt", "noise");
        write(b.path(), "nested/ignored_dir/junk.bin", "junk");
        fs::create_dir_all(a.path().join("nested")).unwrap();

        let matcher = IgnoreMatcher::new(["ignored_dir", "ignored.txt"]);
        assert_eq!(
            calculate_dir_hash(a.path(), Some(&matcher)),
            calculate_dir_hash(b.path(), Some(&matcher))
        );
    }

    #[test]
    fn detailed_digest_is_clean_for_readable_tree() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.txt", "a");
        let digest = calculate_dir_hash_detailed(dir.path(), None).unwrap();
        assert!(digest.is_clean());
        assert_eq!(digest.hex.len(), 64);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn creation_order_does_not_matter(
            files in proptest::collection::btree_map("[a-z]{1,8}", "[a-z0-9]{0,16}", 1..6)
        ) {
            let forward = TempDir::new().unwrap();
            let backward = TempDir::new().unwrap();
            for (name, content) in files.iter() {
                write(forward.path(), &format!("{name}.txt"), content);
            }
            for (name, content) in files.iter().rev() {
                write(backward.path(), &format!("{name}.txt"), content);
            }
            prop_assert_eq!(
                calculate_dir_hash(forward.path(), None),
                calculate_dir_hash(backward.path(), None)
            );
        }
    }
}
