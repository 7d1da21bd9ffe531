//! Flat-file import and export.
//!
//! One record per line: the term's bytes, a tab, the decimal frequency,
//! then a newline. There is no header and no escaping, so terms containing
//! a tab or newline cannot be stored faithfully.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use tracing::{debug, error, info, warn};

use crate::error::PersistError;
use crate::topk::TermSink;
use crate::trie::PruningRadixTrie;
use crate::{FIELD_SEPARATOR, RECORD_TERMINATOR};

/// What [`PruningRadixTrie::write_terms_to_file`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportOutcome {
    /// No term was added since the last import or export; nothing written.
    Unchanged,
    /// The file was rewritten with this many records.
    Written(u64),
}

/// Counters from one import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportStats {
    /// Records replayed through `add_term`.
    pub records: u64,
    /// Lines that did not parse and were ignored.
    pub skipped: u64,
}

struct LineWriter<W> {
    out: W,
    written: u64,
}

impl<W: Write> TermSink for LineWriter<W> {
    type Error = io::Error;

    #[inline]
    fn wants(&self, _bound: u64) -> bool {
        true
    }

    fn accept(&mut self, term: &[u8], frequency: u64) -> io::Result<()> {
        self.out.write_all(term)?;
        self.out.write_all(&[FIELD_SEPARATOR])?;
        write!(self.out, "{frequency}")?;
        self.out.write_all(&[RECORD_TERMINATOR])?;
        self.written += 1;
        Ok(())
    }
}

/// Splits a line into `(term, frequency)`. `None` for anything other than
/// exactly one separator followed by an unsigned decimal.
fn parse_record(line: &[u8]) -> Option<(&[u8], u64)> {
    let mut fields = line.split(|&b| b == FIELD_SEPARATOR);
    let term = fields.next()?;
    let frequency = fields.next()?;
    if fields.next().is_some() {
        return None;
    }
    let frequency = std::str::from_utf8(frequency).ok()?.parse().ok()?;
    Some((term, frequency))
}

impl PruningRadixTrie {
    /// Writes every stored term to `out` in tree order. Returns the number
    /// of records written.
    pub fn write_terms<W: Write>(&self, out: W) -> io::Result<u64> {
        let mut sink = LineWriter { out, written: 0 };
        self.visit_prefix(b"", &mut sink, true)?;
        sink.out.flush()?;
        Ok(sink.written)
    }

    /// Replays every well-formed record from `input` through
    /// [`add_term`](Self::add_term). Malformed lines are skipped.
    pub fn read_terms<R: BufRead>(&mut self, input: R) -> io::Result<ImportStats> {
        let mut stats = ImportStats::default();
        for (line_no, line) in input.split(RECORD_TERMINATOR).enumerate() {
            let mut line = line?;
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            match parse_record(&line) {
                Some((term, frequency)) => {
                    self.add_term(term, frequency);
                    stats.records += 1;
                }
                None => {
                    debug!(line = line_no + 1, "skipping malformed term record");
                    stats.skipped += 1;
                }
            }
        }
        Ok(stats)
    }

    /// Saves all terms to `path`, creating or truncating it.
    ///
    /// Does nothing if no term has been added since the last successful
    /// import or export. Frequency merges into already-stored terms do not
    /// count as additions.
    pub fn write_terms_to_file(&mut self, path: impl AsRef<Path>) -> Result<ExportOutcome, PersistError> {
        let path = path.as_ref();
        if self.term_count_at_last_persist == self.len() {
            debug!(path = %path.display(), "term set unchanged, skipping export");
            return Ok(ExportOutcome::Unchanged);
        }

        let written = File::create(path)
            .and_then(|file| self.write_terms(BufWriter::new(file)))
            .map_err(|e| {
                error!(path = %path.display(), error = %e, "failed to write terms");
                PersistError::at(path, e)
            })?;

        self.term_count_at_last_persist = self.len();
        info!(path = %path.display(), terms = written, "terms written");
        Ok(ExportOutcome::Written(written))
    }

    /// Loads terms from `path`, merging them into the trie.
    pub fn read_terms_from_file(&mut self, path: impl AsRef<Path>) -> Result<ImportStats, PersistError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            warn!(path = %path.display(), error = %e, "could not open term file");
            PersistError::at(path, e)
        })?;

        let stats = self
            .read_terms(BufReader::new(file))
            .map_err(|e| PersistError::at(path, e))?;

        self.term_count_at_last_persist = self.len();
        info!(
            path = %path.display(),
            records = stats.records,
            skipped = stats.skipped,
            terms = self.len(),
            "terms loaded"
        );
        Ok(stats)
    }
}
