use std::collections::BTreeMap;
use std::fmt;

/// Atlas slot a unit's sprite is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "binary-cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: u32,
    pub y: u32,
}

impl Position {
    /// The slot for the `index`-th unit in an atlas `columns` wide.
    #[must_use]
    pub fn from_index(index: u32, columns: u32) -> Self {
        let columns = columns.max(1);
        Self {
            x: index % columns,
            y: index / columns,
        }
    }
}

/// One generated Lua file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Relative path, e.g. `enhancements/glassy.lua`.
    pub path: String,
    pub source: String,
    pub position: Position,
}

/// Generated files keyed by relative path, in path order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "binary-cache", derive(serde::Serialize, serde::Deserialize))]
pub struct ArtifactSet {
    files: BTreeMap<String, String>,
}

impl ArtifactSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a file, returning the previous source at that path.
    pub fn insert(&mut self, path: impl Into<String>, source: impl Into<String>) -> Option<String> {
        self.files.insert(path.into(), source.into())
    }

    #[must_use]
    pub fn get(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files.iter().map(|(p, s)| (p.as_str(), s.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Write every file below `root`, creating directories as needed.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from creating directories or writing files.
    pub fn write_to(&self, root: impl AsRef<std::path::Path>) -> std::io::Result<()> {
        let root = root.as_ref();
        for (path, source) in &self.files {
            let target = root.join(path);
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&target, source)?;
        }
        Ok(())
    }
}

impl From<Artifact> for ArtifactSet {
    fn from(artifact: Artifact) -> Self {
        let mut set = ArtifactSet::new();
        set.insert(artifact.path, artifact.source);
        set
    }
}

impl fmt::Display for ArtifactSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ArtifactSet({} files)", self.files.len())
    }
}
