//! Formatting and writing of analysis results

use anyhow::Result;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::str::FromStr;

use crate::core::{BatchReport, ComplexityReport, FileOutcome};

/// Output format for results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(anyhow::anyhow!("Unknown output format: {}", s)),
        }
    }
}

/// Writer for results
pub struct OutputWriter {
    writer: Box<dyn Write>,
    format: OutputFormat,
    pretty: bool,
}

impl OutputWriter {
    pub fn new(writer: Box<dyn Write>, format: OutputFormat) -> Self {
        Self {
            writer,
            format,
            pretty: false,
        }
    }

    pub fn stdout(format: OutputFormat) -> Self {
        Self::new(Box::new(io::stdout()), format)
    }

    pub fn file(path: &Path, format: OutputFormat) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(Box::new(file), format))
    }

    /// Pretty-print JSON
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn write_object<T: Serialize>(&mut self, obj: &T) -> Result<()> {
        let json = if self.pretty {
            serde_json::to_string_pretty(obj)?
        } else {
            serde_json::to_string(obj)?
        };
        writeln!(self.writer, "{}", json)?;
        Ok(())
    }

    pub fn write_header(&mut self, header: &str) -> Result<()> {
        match self.format {
            OutputFormat::Text => {
                writeln!(self.writer, "\n{}", header.bold().blue())?;
                writeln!(self.writer, "{}", "=".repeat(header.len()).blue())?;
            }
            OutputFormat::Json => {
                writeln!(self.writer, "{}", header)?;
            }
        }
        Ok(())
    }

    pub fn write_list_item(&mut self, item: &str) -> Result<()> {
        writeln!(self.writer, "  • {}", item)?;
        Ok(())
    }

    /// Writes a single-snippet report
    pub fn write_report(&mut self, report: &ComplexityReport) -> Result<()> {
        if self.format == OutputFormat::Json {
            return self.write_object(report);
        }

        writeln!(self.writer, "Time Complexity: {}", report.time_notation().bold())?;
        writeln!(self.writer, "Space Complexity: {}", report.space_notation().bold())?;

        if !report.functions.is_empty() {
            self.write_header("Functions")?;
            for function in &report.functions {
                self.write_list_item(&format!("{}: {}", function.name, function.time))?;
            }
        }
        if !report.notes.is_empty() {
            self.write_header("Notes")?;
            for note in &report.notes {
                self.write_list_item(note)?;
            }
        }
        Ok(())
    }

    /// Writes a batch summary
    pub fn write_batch(&mut self, batch: &BatchReport) -> Result<()> {
        if self.format == OutputFormat::Json {
            return self.write_object(batch);
        }

        let rows = batch
            .files
            .iter()
            .map(|file| {
                let path = file.path.display().to_string();
                match &file.outcome {
                    FileOutcome::Report(report) => vec![
                        path,
                        report.grammar.to_string(),
                        report.time_notation(),
                        report.space_notation(),
                    ],
                    FileOutcome::Error { code, .. } => {
                        vec![path, "-".to_string(), code.clone(), String::new()]
                    }
                }
            })
            .collect();
        self.write_table(&["File", "Grammar", "Time", "Space"], rows)?;
        writeln!(
            self.writer,
            "\n{} analyzed, {} failed",
            batch.analyzed(),
            batch.failed()
        )?;
        Ok(())
    }

    pub fn write_table(&mut self, headers: &[&str], rows: Vec<Vec<String>>) -> Result<()> {
        let mut widths = headers.iter().map(|h| h.len()).collect::<Vec<_>>();
        for row in &rows {
            for (i, cell) in row.iter().enumerate() {
                if i < widths.len() {
                    widths[i] = widths[i].max(cell.len());
                }
            }
        }

        for (i, header) in headers.iter().enumerate() {
            if i > 0 {
                write!(self.writer, " │ ")?;
            }
            write!(self.writer, "{:width$}", header, width = widths[i])?;
        }
        writeln!(self.writer)?;

        for (i, width) in widths.iter().enumerate() {
            if i > 0 {
                write!(self.writer, "─┼─")?;
            }
            write!(self.writer, "{}", "─".repeat(*width))?;
        }
        writeln!(self.writer)?;

        for row in rows {
            for (i, cell) in row.iter().enumerate() {
                if i > 0 {
                    write!(self.writer, " │ ")?;
                }
                match widths.get(i) {
                    Some(width) => write!(self.writer, "{:width$}", cell, width = *width)?,
                    None => write!(self.writer, "{}", cell)?,
                }
            }
            writeln!(self.writer)?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Grammar;
    use tempfile::NamedTempFile;

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("TXT".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_json_report_written_to_file() {
        let report = crate::analyze_source("for (i = 0; i < n; i++) { }", Grammar::CLike).unwrap();
        let file = NamedTempFile::new().unwrap();

        let mut writer = OutputWriter::file(file.path(), OutputFormat::Json).unwrap();
        writer.write_report(&report).unwrap();
        writer.flush().unwrap();
        drop(writer);

        let written = std::fs::read_to_string(file.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value["time"], "O(n)");
        assert_eq!(value["space"], "O(1)");
    }

    #[test]
    fn test_text_table() {
        colored::control::set_override(false);
        let file = NamedTempFile::new().unwrap();
        let mut writer = OutputWriter::file(file.path(), OutputFormat::Text).unwrap();
        writer
            .write_table(
                &["File", "Time"],
                vec![vec!["main.c".to_string(), "O(n^2)".to_string()]],
            )
            .unwrap();
        drop(writer);

        let written = std::fs::read_to_string(file.path()).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines[0], "File   │ Time  ");
        assert_eq!(lines[2], "main.c │ O(n^2)");
    }
}
