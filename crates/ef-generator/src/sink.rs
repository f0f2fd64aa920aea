//! Destinations for generated HTML fragments.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use ef_core::ContentKind;
use tracing::debug;

/// Receives each fragment once a run has succeeded.
pub trait ContentSink: Send {
    fn attach(&mut self, kind: ContentKind, html: &str) -> io::Result<()>;

    /// Remove a fragment attached earlier in the same run.
    ///
    /// Used to roll back a partially attached run. Retracting a kind that was
    /// never attached is not an error.
    fn retract(&mut self, kind: ContentKind) -> io::Result<()>;
}

/// Keeps fragments in memory, keyed by kind.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    fragments: BTreeMap<ContentKind, String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: ContentKind) -> Option<&str> {
        self.fragments.get(&kind).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ContentKind, &str)> {
        self.fragments.iter().map(|(k, v)| (*k, v.as_str()))
    }
}

impl ContentSink for MemorySink {
    fn attach(&mut self, kind: ContentKind, html: &str) -> io::Result<()> {
        self.fragments.insert(kind, html.to_string());
        Ok(())
    }

    fn retract(&mut self, kind: ContentKind) -> io::Result<()> {
        self.fragments.remove(&kind);
        Ok(())
    }
}

/// Writes each fragment to `<dir>/<kind>.html`.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl DirectorySink {
    /// Create the directory if needed.
    pub fn create(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            written: Vec::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Files written so far, in attach order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    #[must_use]
    pub fn path_for(&self, kind: ContentKind) -> PathBuf {
        self.dir.join(format!("{}.html", kind.name()))
    }
}

impl ContentSink for DirectorySink {
    fn attach(&mut self, kind: ContentKind, html: &str) -> io::Result<()> {
        let path = self.path_for(kind);
        std::fs::write(&path, html)?;
        debug!(path = %path.display(), "fragment written");
        self.written.push(path);
        Ok(())
    }

    fn retract(&mut self, kind: ContentKind) -> io::Result<()> {
        let path = self.path_for(kind);
        match std::fs::remove_file(&path) {
            Ok(()) => debug!(path = %path.display(), "fragment removed"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
        self.written.retain(|p| p != &path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_overwrites() {
        let mut sink = MemorySink::new();
        assert!(sink.is_empty());
        sink.attach(ContentKind::Quiz, "<p>one</p>").unwrap();
        sink.attach(ContentKind::Quiz, "<p>two</p>").unwrap();
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.get(ContentKind::Quiz), Some("<p>two</p>"));
        assert_eq!(sink.get(ContentKind::Lesson), None);

        sink.retract(ContentKind::Quiz).unwrap();
        assert!(sink.is_empty());
    }

    #[test]
    fn test_directory_sink_writes_files() {
        let tmp = tempfile::tempdir().unwrap();
        let mut sink = DirectorySink::create(tmp.path().join("out")).unwrap();

        sink.attach(ContentKind::Lesson, "<h1>L</h1>").unwrap();
        sink.attach(ContentKind::Activities, "<h1>A</h1>").unwrap();

        let lesson = std::fs::read_to_string(tmp.path().join("out/lesson.html")).unwrap();
        assert_eq!(lesson, "<h1>L</h1>");
        assert!(tmp.path().join("out/activities.html").exists());
        assert!(!tmp.path().join("out/quiz.html").exists());
        assert_eq!(sink.written().len(), 2);

        sink.retract(ContentKind::Lesson).unwrap();
        sink.retract(ContentKind::Quiz).unwrap();
        assert!(!tmp.path().join("out/lesson.html").exists());
        assert_eq!(sink.written(), &[tmp.path().join("out/activities.html")]);
    }
}
