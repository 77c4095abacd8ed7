// src/fasta.rs
// FASTA INPUT
// Streaming reader for FASTA files and raw sequence text.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::mem;
use std::path::Path;

use crate::sequence::Sequence;

/// One FASTA entry. `header` is None for raw sequence text that appears before any '>' line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastaRecord {
    pub header: Option<String>,
    pub sequence: String,
}

impl FastaRecord {
    /// The record name is the first word of the header.
    pub fn name(&self) -> &str {
        self.header
            .as_deref()
            .and_then(|h| h.split_whitespace().next())
            .unwrap_or("")
    }

    pub fn into_sequence(self) -> Sequence {
        Sequence::new(self.name(), &self.sequence)
    }
}

/// Streaming FASTA reader.
///
/// - Joins multi-line sequences and ignores blank lines.
/// - Accepts headerless input: leading sequence lines form an unnamed record.
/// - Records with a header but no sequence lines are skipped.
pub struct FastaReader<R> {
    lines: io::Lines<R>,
    pending_header: Option<String>,
    pending_sequence: String,
    exhausted: bool,
}

impl<R: BufRead> FastaReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            pending_header: None,
            pending_sequence: String::new(),
            exhausted: false,
        }
    }

    fn take_pending(&mut self, next_header: Option<String>) -> Option<FastaRecord> {
        let header = mem::replace(&mut self.pending_header, next_header);
        let sequence = mem::take(&mut self.pending_sequence);
        if sequence.is_empty() {
            None
        } else {
            Some(FastaRecord { header, sequence })
        }
    }
}

impl FastaReader<BufReader<File>> {
    pub fn from_path<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        Ok(Self::new(BufReader::new(File::open(path)?)))
    }
}

impl<R: BufRead> Iterator for FastaReader<R> {
    type Item = io::Result<FastaRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }

        loop {
            match self.lines.next() {
                Some(Ok(raw_line)) => {
                    let line = raw_line.trim();
                    if line.is_empty() { continue; }

                    if let Some(header) = line.strip_prefix('>') {
                        let header = header.trim().to_string();
                        if let Some(record) = self.take_pending(Some(header)) {
                            return Some(Ok(record));
                        }
                    } else {
                        self.pending_sequence.push_str(line);
                    }
                }
                Some(Err(e)) => return Some(Err(e)),
                None => {
                    self.exhausted = true;
                    return self.take_pending(None).map(Ok);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn read_all(text: &str) -> Vec<FastaRecord> {
        FastaReader::new(Cursor::new(text))
            .collect::<io::Result<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn multi_line_records() {
        let records = read_all(">seq1 first one\nACGT\nacgt\n\n>seq2\nTTTT\n");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name(), "seq1");
        assert_eq!(records[0].sequence, "ACGTacgt");
        assert_eq!(records[1].name(), "seq2");
        assert_eq!(records[1].sequence, "TTTT");
    }

    #[test]
    fn raw_sequence_without_header() {
        let records = read_all("ACGT\nGGCC\n");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].header, None);
        assert_eq!(records[0].clone().into_sequence().name, "Unnamed");
    }

    #[test]
    fn empty_records_are_skipped() {
        let records = read_all(">empty\n>full\nAC\n>trailing\n");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name(), "full");
    }
}
