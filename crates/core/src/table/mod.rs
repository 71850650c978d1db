//! In-memory table substrate for the cleaning pipeline.
//!
//! A `Frame` is an ordered set of named columns over rows of optional string
//! cells. Missing values (`None`) are first class: the cleaning components
//! fill, derive, or deliberately leave them missing. All transforms preserve
//! row order.

use std::collections::{HashMap, HashSet};

use crate::errors::{CleaningError, Result};

/// An ordered, missing-aware table of string cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<Option<String>>>,
}

impl Frame {
    /// Build a frame from parsed CSV headers and rows.
    ///
    /// Empty or whitespace-only cells become missing. Rows shorter than the
    /// header are padded with missing cells; longer rows are truncated.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        let mut index = HashMap::with_capacity(headers.len());
        for (i, name) in headers.iter().enumerate() {
            if index.insert(name.clone(), i).is_some() {
                return Err(CleaningError::DuplicateColumn(name.clone()).into());
            }
        }

        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|row| {
                let mut cells: Vec<Option<String>> = row
                    .into_iter()
                    .take(width)
                    .map(|cell| {
                        let trimmed = cell.trim();
                        if trimmed.is_empty() {
                            None
                        } else {
                            Some(trimmed.to_string())
                        }
                    })
                    .collect();
                cells.resize(width, None);
                cells
            })
            .collect();

        Ok(Self {
            columns: headers,
            index,
            rows,
        })
    }

    /// Column names, in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column, or a `MissingColumn` error.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| CleaningError::MissingColumn(name.to_string()).into())
    }

    /// True when the frame has a column with this name.
    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Cell value at (row, column name). Missing cells and absent columns
    /// both read as `None`; use `column_index` first when absence of the
    /// column itself should be an error.
    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let col = *self.index.get(column)?;
        self.rows.get(row)?.get(col)?.as_deref()
    }

    /// Overwrite a cell. Panics on an out-of-range row; returns an error for
    /// an unknown column.
    pub fn set(&mut self, row: usize, column: &str, value: Option<String>) -> Result<()> {
        let col = self.column_index(column)?;
        self.rows[row][col] = value;
        Ok(())
    }

    /// Snapshot of one column, row order preserved.
    pub fn column_values(&self, column: &str) -> Result<Vec<Option<String>>> {
        let col = self.column_index(column)?;
        Ok(self.rows.iter().map(|row| row[col].clone()).collect())
    }

    /// Keep only the first `n` rows.
    pub fn truncate(&mut self, n: usize) {
        self.rows.truncate(n);
    }

    /// Project onto a subset of columns, in the given order.
    pub fn select(&self, columns: &[&str]) -> Result<Frame> {
        let indices: Vec<usize> = columns
            .iter()
            .map(|name| self.column_index(name))
            .collect::<Result<_>>()?;

        let headers: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
        let mut index = HashMap::with_capacity(headers.len());
        for (i, name) in headers.iter().enumerate() {
            index.insert(name.clone(), i);
        }

        let rows = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
            .collect();

        Ok(Frame {
            columns: headers,
            index,
            rows,
        })
    }

    /// Drop a column, keeping the others in order.
    pub fn drop_column(&mut self, column: &str) -> Result<()> {
        let col = self.column_index(column)?;
        self.columns.remove(col);
        for row in &mut self.rows {
            row.remove(col);
        }
        self.rebuild_index();
        Ok(())
    }

    /// Append a column filled from an iterator; the iterator must yield at
    /// least `len()` values.
    pub fn push_column<I>(&mut self, name: &str, values: I) -> Result<()>
    where
        I: IntoIterator<Item = Option<String>>,
    {
        if self.index.contains_key(name) {
            return Err(CleaningError::DuplicateColumn(name.to_string()).into());
        }
        let mut values = values.into_iter();
        for row in &mut self.rows {
            row.push(values.next().flatten());
        }
        self.index.insert(name.to_string(), self.columns.len());
        self.columns.push(name.to_string());
        Ok(())
    }

    /// Rename every column through `f`, erroring when two renamed columns
    /// collide.
    pub fn rename_columns<F>(&mut self, f: F) -> Result<()>
    where
        F: Fn(&str) -> String,
    {
        let renamed: Vec<String> = self.columns.iter().map(|c| f(c)).collect();
        let mut seen = HashSet::with_capacity(renamed.len());
        for name in &renamed {
            if !seen.insert(name.clone()) {
                return Err(CleaningError::DuplicateColumn(name.clone()).into());
            }
        }
        self.columns = renamed;
        self.rebuild_index();
        Ok(())
    }

    /// Drop rows whose key (built by `key`) repeats, keeping the first
    /// occurrence.
    pub fn dedup_by_key<K, F>(&mut self, mut key: F)
    where
        K: std::hash::Hash + Eq,
        F: FnMut(&Frame, usize) -> K,
    {
        let mut seen = HashSet::new();
        let keep: Vec<bool> = (0..self.rows.len())
            .map(|i| seen.insert(key(self, i)))
            .collect();
        let mut it = keep.iter();
        self.rows.retain(|_| *it.next().unwrap());
    }

    fn rebuild_index(&mut self) {
        self.index = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Frame {
        Frame::from_rows(
            vec!["a".into(), "b".into()],
            vec![
                vec!["1".into(), "x".into()],
                vec!["2".into(), "  ".into()],
                vec!["1".into(), "y".into()],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_blank_cells_are_missing() {
        let frame = sample();
        assert_eq!(frame.get(1, "b"), None);
        assert_eq!(frame.get(0, "b"), Some("x"));
    }

    #[test]
    fn test_short_rows_are_padded() {
        let frame = Frame::from_rows(
            vec!["a".into(), "b".into(), "c".into()],
            vec![vec!["1".into()]],
        )
        .unwrap();
        assert_eq!(frame.get(0, "a"), Some("1"));
        assert_eq!(frame.get(0, "b"), None);
        assert_eq!(frame.get(0, "c"), None);
    }

    #[test]
    fn test_duplicate_headers_rejected() {
        let result = Frame::from_rows(vec!["a".into(), "a".into()], vec![]);
        assert!(result.is_err());
    }

    #[test]
    fn test_select_projects_in_order() {
        let frame = sample();
        let projected = frame.select(&["b", "a"]).unwrap();
        assert_eq!(projected.columns(), &["b".to_string(), "a".to_string()]);
        assert_eq!(projected.get(0, "b"), Some("x"));
        assert_eq!(projected.get(0, "a"), Some("1"));
    }

    #[test]
    fn test_dedup_keeps_first() {
        let mut frame = sample();
        frame.dedup_by_key(|f, i| f.get(i, "a").map(str::to_string));
        assert_eq!(frame.len(), 2);
        assert_eq!(frame.get(0, "b"), Some("x"));
        assert_eq!(frame.get(1, "a"), Some("2"));
    }

    #[test]
    fn test_rename_collision_is_error() {
        let mut frame = sample();
        let result = frame.rename_columns(|_| "same".to_string());
        assert!(result.is_err());
    }

    #[test]
    fn test_drop_and_push_column() {
        let mut frame = sample();
        frame.drop_column("b").unwrap();
        assert!(!frame.has_column("b"));
        frame
            .push_column("c", (0..3).map(|i| Some(i.to_string())))
            .unwrap();
        assert_eq!(frame.get(2, "c"), Some("2"));
    }
}
