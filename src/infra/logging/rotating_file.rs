// Size-rotating log file.
//
// Writes go to `{prefix}_{timestamp}.log`. Once a write would push the file
// past `max_bytes` the file is closed, gzipped to `.log.gz` and a fresh file
// is started. Meant to sit behind tracing-appender's non-blocking worker, so
// rotation never happens on a command task.

use chrono::Utc;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Error logs roll over at 5 MB.
pub const DEFAULT_MAX_BYTES: u64 = 5 * 1024 * 1024;

pub struct RotatingFile {
    directory: PathBuf,
    prefix: String,
    max_bytes: u64,
    path: PathBuf,
    file: File,
    written: u64,
}

impl RotatingFile {
    pub fn open(directory: impl AsRef<Path>, prefix: &str, max_bytes: u64) -> io::Result<Self> {
        let directory = directory.as_ref().to_path_buf();
        fs::create_dir_all(&directory)?;

        let (path, file) = create_log_file(&directory, prefix)?;
        Ok(Self {
            directory,
            prefix: prefix.to_string(),
            max_bytes,
            path,
            file,
            written: 0,
        })
    }

    /// File currently being written.
    #[cfg(test)]
    pub fn current_path(&self) -> &Path {
        &self.path
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;

        let (path, file) = create_log_file(&self.directory, &self.prefix)?;
        let finished = std::mem::replace(&mut self.path, path);
        self.file = file;
        self.written = 0;

        compress(&finished)?;
        Ok(())
    }
}

impl Write for RotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written > 0 && self.written + buf.len() as u64 > self.max_bytes {
            self.rotate()?;
        }
        let n = self.file.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

fn create_log_file(directory: &Path, prefix: &str) -> io::Result<(PathBuf, File)> {
    let stamp = Utc::now().format("%Y%m%d-%H%M%S-%6f");
    let mut path = directory.join(format!("{}_{}.log", prefix, stamp));
    let mut attempt = 1;
    // Two rotations inside the same microsecond would otherwise collide.
    while path.exists() {
        path = directory.join(format!("{}_{}-{}.log", prefix, stamp, attempt));
        attempt += 1;
    }

    let file = OpenOptions::new().create_new(true).append(true).open(&path)?;
    Ok((path, file))
}

/// Gzip `path` into `path.gz` and remove the original.
fn compress(path: &Path) -> io::Result<PathBuf> {
    let mut gz_name = path.as_os_str().to_owned();
    gz_name.push(".gz");
    let gz_path = PathBuf::from(gz_name);

    let mut input = File::open(path)?;
    let mut encoder = GzEncoder::new(File::create(&gz_path)?, Compression::default());
    io::copy(&mut input, &mut encoder)?;
    encoder.finish()?;

    fs::remove_file(path)?;
    Ok(gz_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;
    use tempfile::tempdir;

    fn files_with_suffix(dir: &Path, suffix: &str) -> Vec<PathBuf> {
        fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| p.to_string_lossy().ends_with(suffix))
            .collect()
    }

    #[test]
    fn test_stays_in_one_file_under_limit() {
        let dir = tempdir().unwrap();
        let mut file = RotatingFile::open(dir.path(), "errors", 1024).unwrap();

        file.write_all(b"first line\n").unwrap();
        file.write_all(b"second line\n").unwrap();
        file.flush().unwrap();

        assert_eq!(files_with_suffix(dir.path(), ".log").len(), 1);
        assert!(files_with_suffix(dir.path(), ".gz").is_empty());
        let text = fs::read_to_string(file.current_path()).unwrap();
        assert_eq!(text, "first line\nsecond line\n");
    }

    #[test]
    fn test_rotates_and_compresses() {
        let dir = tempdir().unwrap();
        let mut file = RotatingFile::open(dir.path(), "errors", 16).unwrap();

        file.write_all(b"0123456789\n").unwrap();
        file.write_all(b"abcdefghij\n").unwrap();
        file.flush().unwrap();

        let archives = files_with_suffix(dir.path(), ".log.gz");
        assert_eq!(archives.len(), 1);
        assert_eq!(files_with_suffix(dir.path(), ".log").len(), 1);

        let mut decoded = String::new();
        GzDecoder::new(File::open(&archives[0]).unwrap())
            .read_to_string(&mut decoded)
            .unwrap();
        assert_eq!(decoded, "0123456789\n");

        let current = fs::read_to_string(file.current_path()).unwrap();
        assert_eq!(current, "abcdefghij\n");
    }

    #[test]
    fn test_oversized_write_still_lands() {
        let dir = tempdir().unwrap();
        let mut file = RotatingFile::open(dir.path(), "errors", 4).unwrap();

        file.write_all(b"much longer than four bytes").unwrap();
        file.flush().unwrap();

        // Nothing to rotate away yet, so the first write goes in whole.
        assert!(files_with_suffix(dir.path(), ".gz").is_empty());
        let current = fs::read_to_string(file.current_path()).unwrap();
        assert_eq!(current, "much longer than four bytes");
    }
}
