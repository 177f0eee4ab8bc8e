//! Output formatting for match results.
//!
//! Results can be written as tab-separated text lines, a single JSON array,
//! or JSON Lines.

use serde::Serialize;
use std::io::{self, Write};

use crate::types::MatchResult;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One tab-separated line per item
    #[default]
    Text,
    /// Single JSON object or array
    Json,
    /// One JSON object per line (newline-delimited JSON)
    JsonLines,
}

/// Items that have a plain-text line representation.
pub trait TextLine {
    fn text_line(&self) -> String;
}

impl TextLine for MatchResult {
    fn text_line(&self) -> String {
        format!("{}\t{}", self.distance, self.identifier)
    }
}

/// A writer that serializes items as text, JSON or JSONL.
pub struct OutputWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    pretty: bool,
    items_written: usize,
}

impl<W: Write> OutputWriter<W> {
    /// Create a new output writer.
    ///
    /// `pretty` only affects the JSON format.
    pub fn new(writer: W, format: OutputFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
            items_written: 0,
        }
    }

    /// Write a single item on its own line (pretty JSON may span several).
    pub fn write<T: Serialize + TextLine>(&mut self, item: &T) -> io::Result<()> {
        match self.format {
            OutputFormat::Text => {
                writeln!(self.writer, "{}", item.text_line())?;
            }
            OutputFormat::Json => {
                if self.pretty {
                    serde_json::to_writer_pretty(&mut self.writer, item)
                        .map_err(io::Error::other)?;
                } else {
                    serde_json::to_writer(&mut self.writer, item).map_err(io::Error::other)?;
                }
                writeln!(self.writer)?;
            }
            OutputFormat::JsonLines => {
                // JSONL is never pretty-printed (one object per line)
                serde_json::to_writer(&mut self.writer, item).map_err(io::Error::other)?;
                writeln!(self.writer)?;
            }
        }
        self.items_written += 1;
        Ok(())
    }

    /// Write multiple items.
    ///
    /// For JSON format, writes one array (`[]` when empty). Text and JSONL
    /// write one line per item and nothing at all for an empty slice.
    pub fn write_all<T: Serialize + TextLine>(&mut self, items: &[T]) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => {
                if self.pretty {
                    serde_json::to_writer_pretty(&mut self.writer, items)
                        .map_err(io::Error::other)?;
                } else {
                    serde_json::to_writer(&mut self.writer, items).map_err(io::Error::other)?;
                }
                writeln!(self.writer)?;
                self.items_written += items.len();
            }
            OutputFormat::Text | OutputFormat::JsonLines => {
                for item in items {
                    self.write(item)?;
                }
            }
        }
        Ok(())
    }

    /// Get the number of items written.
    pub fn items_written(&self) -> usize {
        self.items_written
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results() -> Vec<MatchResult> {
        vec![
            MatchResult {
                distance: 0.0,
                identifier: "/data/a.png".to_string(),
            },
            MatchResult {
                distance: 1.5,
                identifier: "/data/b.jpg".to_string(),
            },
        ]
    }

    #[test]
    fn test_write_text() {
        let mut buffer = Vec::new();
        let mut writer = OutputWriter::new(&mut buffer, OutputFormat::Text, false);
        writer.write_all(&results()).unwrap();
        assert_eq!(writer.items_written(), 2);

        let output = String::from_utf8(buffer).unwrap();
        assert_eq!(output, "0\t/data/a.png\n1.5\t/data/b.jpg\n");
    }

    #[test]
    fn test_write_json_array() {
        let mut buffer = Vec::new();
        let mut writer = OutputWriter::new(&mut buffer, OutputFormat::Json, false);
        writer.write_all(&results()).unwrap();
        assert_eq!(writer.items_written(), 2);

        let output = String::from_utf8(buffer).unwrap();
        assert!(output.starts_with('['));
        assert!(output.contains("\"path\":\"/data/b.jpg\""));
        assert!(output.contains("\"distance\":1.5"));

        let parsed: Vec<MatchResult> = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed, results());
    }

    #[test]
    fn test_write_jsonl() {
        let mut buffer = Vec::new();
        let mut writer = OutputWriter::new(&mut buffer, OutputFormat::JsonLines, true);
        writer.write_all(&results()).unwrap();

        let output = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = output.trim().split('\n').collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("/data/a.png"));
    }

    #[test]
    fn test_empty_json_is_empty_array() {
        let mut buffer = Vec::new();
        let mut writer = OutputWriter::new(&mut buffer, OutputFormat::Json, false);
        writer.write_all::<MatchResult>(&[]).unwrap();
        assert_eq!(writer.items_written(), 0);
        assert_eq!(String::from_utf8(buffer).unwrap(), "[]\n");
    }
}
