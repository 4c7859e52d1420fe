use std::fs;
use std::path::{Path, PathBuf};

use csv::Writer;
use tracing::info;

use crate::error::Result;
use crate::table::{CrawlResult, PartitionTable};
use crate::LOG_TARGET;

/// Receives finished tables, one per partition.
pub trait TableSink {
    fn write_table(&mut self, name: &str, table: &PartitionTable) -> Result<()>;
}

/// Writes each table to `<dir>/<partition name>.csv`.
pub struct CsvDirectorySink {
    dir: PathBuf,
}

impl CsvDirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        let stem: String = name
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
                c => c,
            })
            .collect();
        self.dir.join(format!("{}.csv", stem))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl TableSink for CsvDirectorySink {
    fn write_table(&mut self, name: &str, table: &PartitionTable) -> Result<()> {
        let path = self.path_for(name);
        let mut writer = Writer::from_path(&path)?;

        // Rows with no columns would come out as `""` lines.
        if !table.columns().is_empty() {
            writer.write_record(table.columns())?;
            for record in table.records() {
                writer.write_record(&record)?;
            }
        }
        writer.flush()?;

        info!(
            target: LOG_TARGET,
            "Wrote {} rows to {}",
            table.len(),
            path.display()
        );
        Ok(())
    }
}

pub fn export_all<T: TableSink + ?Sized>(result: &CrawlResult, sink: &mut T) -> Result<()> {
    for (name, table) in &result.tables {
        sink.write_table(name, table)?;
    }
    Ok(())
}
