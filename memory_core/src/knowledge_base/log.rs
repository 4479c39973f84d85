//! The durable memory log: one JSON fact per line.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use super::{Fact, StoreError, StoreResult};

/// Facts read back from the log, plus how many lines were unusable.
#[derive(Debug, Clone, Default)]
pub struct LoadedLog {
    pub facts: Vec<Fact>,
    pub skipped_lines: usize,
}

/// Line-delimited JSON file holding the remembered facts in append order.
#[derive(Debug, Clone)]
pub struct FactLog {
    path: PathBuf,
}

impl FactLog {
    /// Point at a log file, creating its parent directory if needed.
    ///
    /// The file itself is created on first write.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every decodable fact in file order.
    ///
    /// A missing file is an empty log. Lines that are blank, torn by a crash mid-append,
    /// or otherwise not a fact are skipped.
    pub fn read_all(&self) -> StoreResult<LoadedLog> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(LoadedLog::default()),
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };

        // A torn multi-byte character must not fail the whole load.
        let content = String::from_utf8_lossy(&bytes);
        let mut loaded = LoadedLog::default();

        for (idx, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<Fact>(line) {
                Ok(fact) => loaded.facts.push(fact),
                Err(e) => {
                    tracing::warn!(
                        path = %self.path.display(),
                        line = idx + 1,
                        error = %e,
                        "skipping unreadable memory line"
                    );
                    loaded.skipped_lines += 1;
                }
            }
        }

        Ok(loaded)
    }

    /// Append one fact as a single line.
    pub fn append(&self, fact: &Fact) -> StoreResult<()> {
        let mut line = serde_json::to_string(fact)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| StoreError::io(&self.path, e))?;

        // Start on a fresh line if a previous append was torn.
        if ends_mid_line(&mut file).map_err(|e| StoreError::io(&self.path, e))? {
            line.insert(0, '\n');
        }

        file.write_all(line.as_bytes())
            .and_then(|_| file.flush())
            .map_err(|e| StoreError::io(&self.path, e))
    }

    /// Replace the whole log with `facts`.
    ///
    /// Written to a sibling temporary file and renamed into place, so the log is never
    /// observed half-rewritten.
    pub fn rewrite(&self, facts: &[Fact]) -> StoreResult<()> {
        let mut body = String::new();
        for fact in facts {
            body.push_str(&serde_json::to_string(fact)?);
            body.push('\n');
        }

        let temp_path = self.temp_path();
        let write = || -> std::io::Result<()> {
            let mut temp = File::create(&temp_path)?;
            temp.write_all(body.as_bytes())?;
            temp.sync_all()?;
            std::fs::rename(&temp_path, &self.path)
        };

        write().map_err(|e| {
            let _ = std::fs::remove_file(&temp_path);
            StoreError::io(&self.path, e)
        })
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

fn ends_mid_line(file: &mut File) -> std::io::Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(false);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let log = FactLog::open(dir.path().join("nested/dir/long_term.jsonl")).unwrap();

        assert!(dir.path().join("nested/dir").is_dir());
        let loaded = log.read_all().unwrap();
        assert!(loaded.facts.is_empty());
        assert_eq!(loaded.skipped_lines, 0);
    }

    #[test]
    fn test_append_and_read() {
        let dir = tempfile::tempdir().unwrap();
        let log = FactLog::open(dir.path().join("long_term.jsonl")).unwrap();

        log.append(&Fact::new("first", 1.0)).unwrap();
        log.append(&Fact::new("second", 2.0)).unwrap();

        let texts: Vec<_> = log
            .read_all()
            .unwrap()
            .facts
            .into_iter()
            .map(|f| f.text)
            .collect();
        assert_eq!(texts, vec!["first", "second"]);
    }

    #[test]
    fn test_skips_garbage_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("long_term.jsonl");
        std::fs::write(
            &path,
            "{\"ts\":1,\"fact\":\"ok\"}\n\nnot json\n{\"ts\":2}\n{\"ts\":3,\"fact\":\"also ok\"}\n",
        )
        .unwrap();

        let loaded = FactLog::open(&path).unwrap().read_all().unwrap();
        assert_eq!(loaded.facts.len(), 2);
        assert_eq!(loaded.skipped_lines, 2);
    }

    #[test]
    fn test_reads_line_with_fact_and_text_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("long_term.jsonl");
        std::fs::write(
            &path,
            "{\"ts\":1.0,\"fact\":\"I like tea\",\"text\":\"I like tea\"}\n{\"ts\":2.0,\"fact\":\"servo\"}\n",
        )
        .unwrap();

        let loaded = FactLog::open(&path).unwrap().read_all().unwrap();
        let texts: Vec<_> = loaded.facts.iter().map(|f| f.text.as_str()).collect();
        assert_eq!(texts, vec!["I like tea", "servo"]);
        assert_eq!(loaded.skipped_lines, 0);
    }

    #[test]
    fn test_append_after_torn_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("long_term.jsonl");
        std::fs::write(&path, "{\"ts\":1,\"fact\":\"kept\"}\n{\"ts\":2,\"fa").unwrap();

        let log = FactLog::open(&path).unwrap();
        log.append(&Fact::new("after crash", 3.0)).unwrap();

        let loaded = log.read_all().unwrap();
        let texts: Vec<_> = loaded.facts.iter().map(|f| f.text.as_str()).collect();
        assert_eq!(texts, vec!["kept", "after crash"]);
        assert_eq!(loaded.skipped_lines, 1);
    }

    #[test]
    fn test_rewrite_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let log = FactLog::open(dir.path().join("long_term.jsonl")).unwrap();

        log.append(&Fact::new("old", 1.0)).unwrap();
        log.rewrite(&[Fact::new("new", 2.0)]).unwrap();

        let loaded = log.read_all().unwrap();
        assert_eq!(loaded.facts, vec![Fact::new("new", 2.0)]);
        assert!(!dir.path().join("long_term.jsonl.tmp").exists());

        log.rewrite(&[]).unwrap();
        assert_eq!(std::fs::read_to_string(log.path()).unwrap(), "");
    }
}
