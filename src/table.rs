use std::collections::{HashMap, HashSet};

use crate::detail::FieldRecord;

/// Rows of facility records, merged by column name.
///
/// Columns appear in the order their labels were first seen. A row that
/// lacks a column has no cell there.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartitionTable {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<Option<String>>>,
}

impl PartitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Adds one row. A label already taken within `record` becomes
    /// `"Label (2)"`, or the next free `"Label (n)"`.
    pub fn append(&mut self, record: FieldRecord) {
        let mut used: HashSet<String> = HashSet::new();
        let mut row = vec![None; self.columns.len()];

        for (label, value) in record {
            let mut column = label.clone();
            let mut n = 2;
            while used.contains(&column) {
                column = format!("{} ({})", label, n);
                n += 1;
            }
            used.insert(column.clone());

            let position = self.column_position(column);
            if position >= row.len() {
                row.resize(position + 1, None);
            }
            row[position] = Some(value);
        }

        self.rows.push(row);
    }

    fn column_position(&mut self, column: String) -> usize {
        if let Some(&position) = self.index.get(&column) {
            return position;
        }
        let position = self.columns.len();
        self.index.insert(column.clone(), position);
        self.columns.push(column);
        position
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let position = *self.index.get(column)?;
        self.rows.get(row)?.get(position)?.as_deref()
    }

    /// Rows padded to the full column width, missing cells as empty strings.
    pub fn records(&self) -> impl Iterator<Item = Vec<&str>> + '_ {
        self.rows.iter().map(move |row| {
            (0..self.columns.len())
                .map(|i| row.get(i).and_then(|c| c.as_deref()).unwrap_or(""))
                .collect()
        })
    }
}

/// Tables for every partition that finished, in configuration order.
#[derive(Debug, Clone, Default)]
pub struct CrawlResult {
    pub tables: Vec<(String, PartitionTable)>,
    /// Partitions abandoned under `FailurePolicy::AbortPartition`.
    pub failed: Vec<String>,
}

impl CrawlResult {
    pub fn table(&self, partition: &str) -> Option<&PartitionTable> {
        self.tables
            .iter()
            .find(|(name, _)| name == partition)
            .map(|(_, table)| table)
    }
}
