use std::path::{Path, PathBuf};

/// Resolves filenames under the configured upload directory. Does not touch
/// the filesystem; the caller decides when to read, write or create.
#[derive(Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// With `None`, the upload root itself; with a name, `root/name`.
    pub fn path(&self, filename: Option<&str>) -> PathBuf {
        match filename {
            Some(name) => self.root.join(name),
            None => self.root.clone(),
        }
    }
}

/// Reduces an uploaded filename to a safe flat name: any path components
/// are stripped, whitespace becomes `_`, and characters outside ASCII
/// alphanumerics, `.`, `-` and `_` are dropped. Returns `None` when no
/// usable name remains.
pub fn sanitize_filename(raw: &str) -> Option<String> {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw);

    let mut name = String::with_capacity(base.len());
    for c in base.chars() {
        if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
            name.push(c);
        } else if c.is_whitespace() {
            name.push('_');
        }
    }

    let name = name.trim_matches(|c| c == '.' || c == '_');
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}
