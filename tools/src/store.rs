use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use tempfile::Builder;

/// Where a finished payload ends up.
pub trait PayloadSink {
    fn write(&mut self, payload: &[u8]) -> io::Result<()>;
}

/// Writes the payload to a file, replacing any previous one.
///
/// The bytes go to a temporary file next to the target first and are renamed into
/// place, so a failed write never leaves a truncated payload behind. On Unix the
/// file is created with mode 0644 and the process umask applies.
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PayloadSink for FileSink {
    fn write(&mut self, payload: &[u8]) -> io::Result<()> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };

        let mut builder = Builder::new();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            builder.permissions(fs::Permissions::from_mode(0o644));
        }

        let mut tmp = builder.tempfile_in(dir)?;
        tmp.write_all(payload)?;
        tmp.as_file().sync_all()?;

        tmp.persist(&self.path).map_err(|e| e.error)?;
        log::debug!("wrote {} bytes to {}", payload.len(), self.path.display());
        Ok(())
    }
}

/// Keeps the payload in memory.
#[derive(Default, Debug)]
pub struct MemorySink {
    pub written: Vec<u8>,
}

impl PayloadSink for MemorySink {
    fn write(&mut self, payload: &[u8]) -> io::Result<()> {
        self.written = payload.to_vec();
        Ok(())
    }
}

/// Reads a payload back, the counterpart of [`FileSink`].
pub fn read_payload(path: &Path) -> io::Result<Vec<u8>> {
    fs::read(path)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_file_sink_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("encrypted.bin");
        fs::write(&path, vec![0xff; 100]).unwrap();

        let mut sink = FileSink::new(&path);
        sink.write(b"0000000000000000payload").unwrap();

        assert_eq!(read_payload(&path).unwrap(), b"0000000000000000payload");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_file_sink_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("encrypted.bin");
        FileSink::new(&path).write(&[0; 32]).unwrap();

        // 0644 narrowed by whatever umask the test runs under
        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode & 0o600, 0o600);
        assert_eq!(mode & !0o644, 0);
    }

    #[test]
    fn test_file_sink_missing_dir() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("encrypted.bin");

        let mut sink = FileSink::new(&path);
        assert!(sink.write(&[0; 32]).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_memory_sink() {
        let mut sink = MemorySink::default();
        sink.write(b"abc").unwrap();
        assert_eq!(sink.written, b"abc");
    }
}
