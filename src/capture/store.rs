//! Backing storage for capture buffers.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Durable destination of a capture buffer.
///
/// `write` must either fully succeed or report failure; callers rely on the
/// data being durable once it returns `Ok`.
pub trait CaptureStore: Send {
    /// Where the buffer lives, for diagnostics.
    fn location(&self) -> &Path;
    fn write(&mut self, text: &str) -> io::Result<()>;
}

/// File-backed store.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read the current contents. A missing file reads as empty.
    pub fn read(&self) -> io::Result<String> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl CaptureStore for FileStore {
    fn location(&self) -> &Path {
        &self.path
    }

    fn write(&mut self, text: &str) -> io::Result<()> {
        // Sibling temp file + rename keeps the old contents intact if the
        // write dies halfway.
        let tmp_path = self.temp_path();
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(text.as_bytes())?;
        file.sync_all()?;
        drop(file);
        if let Err(e) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }
        Ok(())
    }
}
