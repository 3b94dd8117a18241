use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::{EventRecord, EventSource};
use crate::error::{AnalysisError, AnalysisResult};

// Where one non-blank line sits in its file.
#[derive(Debug, Clone, Copy)]
struct LineIndex {
    file: usize,
    offset: u64,
    len: usize,
    line: usize,
}

/// Events of several JSON-lines files, addressed by a single running index.
///
/// Opening only records where each line starts. A record is read and parsed
/// when it is asked for and dropped by the caller after the event, so memory
/// does not grow with the number of events.
#[derive(Debug, Default)]
pub struct EventChain {
    files: Vec<PathBuf>,
    readers: Vec<Mutex<File>>,
    lines: Vec<LineIndex>,
}

impl EventChain {
    pub fn open<P: AsRef<Path>>(urls: &[P]) -> AnalysisResult<Self> {
        let mut chain = EventChain::default();
        for url in urls {
            chain.append_file(url.as_ref())?;
        }
        log::info!(
            "Opened {} events from {} file(s)",
            chain.lines.len(),
            chain.files.len()
        );
        Ok(chain)
    }

    fn append_file(&mut self, path: &Path) -> AnalysisResult<()> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(File::open(path)?);
        let before = self.lines.len();
        let file_index = self.files.len();

        let mut buffer = Vec::new();
        let mut offset = 0u64;
        let mut line = 0;
        loop {
            buffer.clear();
            let read = reader.read_until(b'\n', &mut buffer)?;
            if read == 0 {
                break;
            }
            line += 1;
            if !buffer.iter().all(u8::is_ascii_whitespace) {
                self.lines.push(LineIndex {
                    file: file_index,
                    offset,
                    len: read,
                    line,
                });
            }
            offset += read as u64;
        }

        log::debug!(
            "Indexed {} events in {}",
            self.lines.len() - before,
            path.display()
        );
        self.files.push(path.to_path_buf());
        self.readers.push(Mutex::new(file));
        Ok(())
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    fn read_line(&self, entry: &LineIndex) -> AnalysisResult<Vec<u8>> {
        let mut bytes = vec![0; entry.len];
        let mut file = self.readers[entry.file]
            .lock()
            .map_err(|err| std::io::Error::other(err.to_string()))?;
        file.seek(SeekFrom::Start(entry.offset))?;
        file.read_exact(&mut bytes)?;
        Ok(bytes)
    }
}

impl EventSource for EventChain {
    type Event = EventRecord;

    fn len(&self) -> usize {
        self.lines.len()
    }

    /// A malformed line is an error naming its file and line number.
    fn event(&self, index: usize) -> AnalysisResult<EventRecord> {
        let entry = self
            .lines
            .get(index)
            .ok_or(AnalysisError::EventIndex(index))?;
        let bytes = self.read_line(entry)?;
        serde_json::from_slice(&bytes).map_err(|source| AnalysisError::EventRecord {
            path: self.files[entry.file].clone(),
            line: entry.line,
            source,
        })
    }
}
