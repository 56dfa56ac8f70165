//! CSV persistence sink

use crate::config::Escaping;
use crate::entity::{EntityRecord, HEADER};
use crate::output::traits::{OutputError, OutputResult, RecordSink};
use csv::{QuoteStyle, Terminator, Writer, WriterBuilder};
use std::fs::File;
use std::path::{Path, PathBuf};

/// Writes records to a CRLF-terminated, comma-delimited file
pub struct CsvSink {
    path: PathBuf,
    escaping: Escaping,
    writer: Option<Writer<File>>,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>, escaping: Escaping) -> Self {
        Self {
            path: path.into(),
            escaping,
            writer: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn quote_style(&self) -> QuoteStyle {
        match self.escaping {
            Escaping::Quoted => QuoteStyle::Necessary,
            Escaping::Unescaped => QuoteStyle::Never,
        }
    }
}

impl RecordSink for CsvSink {
    fn initialize(&mut self) -> OutputResult<()> {
        let file = File::create(&self.path).map_err(|source| OutputError::Create {
            path: self.path.clone(),
            source,
        })?;

        let mut writer = WriterBuilder::new()
            .terminator(Terminator::CRLF)
            .quote_style(self.quote_style())
            .from_writer(file);

        writer.write_record(HEADER)?;
        writer.flush()?;

        self.writer = Some(writer);
        Ok(())
    }

    fn append(&mut self, record: &EntityRecord) -> OutputResult<()> {
        let writer = self.writer.as_mut().ok_or(OutputError::NotInitialized)?;
        writer.write_record(record.to_row())?;
        writer.flush()?;
        Ok(())
    }
}
