/// Reference template lookup.
///
/// Each configured directory is tried in order for the category's file name.
/// Any miss (absent, unreadable, not a file, empty) is logged and skipped; the
/// copy compiled into the binary is the last link, so lookups never fail.
use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::category::Category;

pub const DEFAULT_REFERENCE_DIRS: [&str; 3] = ["references", "public/references", "app/references"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceSource {
    File(PathBuf),
    Embedded,
}

#[derive(Debug, Clone)]
pub struct Reference {
    pub text: String,
    pub source: ReferenceSource,
}

#[derive(Debug, Clone)]
pub struct ReferenceStore {
    dirs: Vec<PathBuf>,
}

impl ReferenceStore {
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }

    /// A store that never touches the filesystem.
    #[cfg(test)]
    pub fn embedded_only() -> Self {
        Self { dirs: Vec::new() }
    }

    pub async fn load(&self, category: Category) -> Reference {
        let rule = category.rule();

        for dir in &self.dirs {
            let path = dir.join(rule.file_name);
            match tokio::fs::read_to_string(&path).await {
                Ok(text) if text.trim().is_empty() => {
                    warn!(path = %path.display(), "reference file is empty, skipping");
                }
                Ok(text) => {
                    debug!(%category, path = %path.display(), "loaded reference from file");
                    return Reference {
                        text,
                        source: ReferenceSource::File(path),
                    };
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    debug!(path = %path.display(), "reference file not present");
                }
                Err(e) => {
                    warn!(error = %e, path = %path.display(), "failed to read reference file");
                }
            }
        }

        info!(%category, "using embedded reference");
        Reference {
            text: rule.embedded.to_string(),
            source: ReferenceSource::Embedded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn embedded_fallback_for_every_category() {
        let store = ReferenceStore::new(vec![PathBuf::from("/nonexistent/visim/references")]);
        for category in Category::ALL {
            let reference = store.load(category).await;
            assert_eq!(reference.source, ReferenceSource::Embedded);
            assert!(!reference.text.trim().is_empty(), "{category} is empty");
        }
    }

    #[tokio::test]
    async fn file_on_disk_wins_over_embedded() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("spring.html"), "<html>custom spring</html>").unwrap();

        let store = ReferenceStore::new(vec![dir.path().to_path_buf()]);
        let reference = store.load(Category::Spring).await;
        assert_eq!(reference.text, "<html>custom spring</html>");
        assert_eq!(
            reference.source,
            ReferenceSource::File(dir.path().join("spring.html"))
        );
    }

    #[tokio::test]
    async fn directories_are_tried_in_order() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        std::fs::write(first.path().join("pendulum.html"), "first").unwrap();
        std::fs::write(second.path().join("pendulum.html"), "second").unwrap();

        let store = ReferenceStore::new(vec![
            first.path().to_path_buf(),
            second.path().to_path_buf(),
        ]);
        assert_eq!(store.load(Category::Pendulum).await.text, "first");
    }

    #[tokio::test]
    async fn empty_and_unreadable_entries_are_skipped() {
        let empty = tempfile::tempdir().unwrap();
        std::fs::write(empty.path().join("collision.html"), "  \n").unwrap();

        // A directory where the file should be fails to read as text.
        let not_a_file = tempfile::tempdir().unwrap();
        std::fs::create_dir(not_a_file.path().join("collision.html")).unwrap();

        let good = tempfile::tempdir().unwrap();
        std::fs::write(good.path().join("collision.html"), "from disk").unwrap();

        let store = ReferenceStore::new(vec![
            empty.path().to_path_buf(),
            not_a_file.path().to_path_buf(),
            good.path().to_path_buf(),
        ]);
        assert_eq!(store.load(Category::Collision).await.text, "from disk");

        let store = ReferenceStore::new(vec![
            empty.path().to_path_buf(),
            not_a_file.path().to_path_buf(),
        ]);
        let reference = store.load(Category::Collision).await;
        assert_eq!(reference.source, ReferenceSource::Embedded);
        assert_eq!(reference.text, Category::Collision.rule().embedded);
    }

    #[tokio::test]
    async fn embedded_only_store_has_no_dirs() {
        let store = ReferenceStore::embedded_only();
        assert!(store.load(Category::DoubleSlit).await.text.contains("<!DOCTYPE html>"));
    }
}
