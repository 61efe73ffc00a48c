//! Update script reader
//!
//! An update script is UTF-8 text describing, per output record, the
//! source record to start from and the changes to apply:
//!
//! ```text
//! >source.gtc outputName sampleName=NA12878,well=A01
//! rs100   AG
//! rs200   --
//! >other.gtc secondOutput
//! rs100   TT
//! ```
//!
//! A `>` line opens a block: source record name, output name, and an
//! optional comma-separated `key=value` metadata assignment list. Every
//! other non-blank line is a SNP edit: a marker name and a 2-character
//! requested allele pair. Blocks are yielded in file order, each complete
//! with its accumulated edits; the final block is yielded at end of input
//! (the format has no explicit terminator).

use std::io::BufRead;

use crate::error::{Result, ScriptError};

/// One requested SNP edit: marker name plus the requested allele pair.
///
/// The pair keeps script order; order does not affect genotype
/// classification but the first allele drives the indel check and the
/// complement retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnpEdit {
    pub marker: String,
    pub alleles: [u8; 2],
}

/// One block of the update script: exactly one output record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Source record name, resolved against the record directory
    pub source: String,
    /// Output name; the `.gtc` extension is appended on write
    pub output: String,
    /// Optional comma-separated `key=value` metadata assignment list
    pub metadata: Option<String>,
    /// SNP edits in script order
    pub edits: Vec<SnpEdit>,
}

/// Lazy, single-pass iterator over the blocks of an update script.
pub struct Blocks<R: BufRead> {
    reader: R,
    line_no: usize,
    pending: Option<Block>,
    done: bool,
}

impl<R: BufRead> Blocks<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_no: 0,
            pending: None,
            done: false,
        }
    }

    fn parse_header(&self, line: &str) -> Result<Block> {
        let parts: Vec<&str> = line[1..].split_whitespace().collect();
        let (source, output, metadata) = match parts.as_slice() {
            [source, output] => (source, output, None),
            [source, output, metadata] => (source, output, Some((*metadata).to_string())),
            _ => {
                return Err(ScriptError::InvalidHeader {
                    line: self.line_no,
                    content: line.to_string(),
                }
                .into())
            }
        };
        Ok(Block {
            source: (*source).to_string(),
            output: (*output).to_string(),
            metadata,
            edits: Vec::new(),
        })
    }

    fn parse_edit(&self, line: &str) -> Result<SnpEdit> {
        let mut parts = line.split_whitespace();
        let (Some(marker), Some(token), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(ScriptError::InvalidEditLine {
                line: self.line_no,
                content: line.to_string(),
            }
            .into());
        };
        let alleles: [u8; 2] =
            token
                .as_bytes()
                .try_into()
                .map_err(|_| ScriptError::InvalidAlleles {
                    line: self.line_no,
                    token: token.to_string(),
                })?;
        Ok(SnpEdit {
            marker: marker.to_string(),
            alleles,
        })
    }
}

impl<R: BufRead> Iterator for Blocks<R> {
    type Item = Result<Block>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let mut line = String::new();
        loop {
            line.clear();
            match self.reader.read_line(&mut line) {
                Ok(0) => {
                    // end of input closes the final open block
                    self.done = true;
                    return self.pending.take().map(Ok);
                }
                Ok(_) => {}
                Err(err) => {
                    self.done = true;
                    return Some(Err(err.into()));
                }
            }
            self.line_no += 1;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if trimmed.starts_with('>') {
                let block = match self.parse_header(trimmed) {
                    Ok(block) => block,
                    Err(err) => {
                        self.done = true;
                        return Some(Err(err));
                    }
                };
                match self.pending.replace(block) {
                    Some(previous) => return Some(Ok(previous)),
                    None => continue,
                }
            }
            if self.pending.is_none() {
                self.done = true;
                return Some(Err(ScriptError::MissingHeader(self.line_no).into()));
            }
            match self.parse_edit(trimmed) {
                Ok(edit) => self
                    .pending
                    .as_mut()
                    .expect("pending checked Some above")
                    .edits
                    .push(edit),
                Err(err) => {
                    self.done = true;
                    return Some(Err(err));
                }
            }
        }
    }
}
