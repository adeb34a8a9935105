//! CSV dataset loading
//!
//! Reads a CSV file with a header row into named columns of raw cells.
//! Empty fields are treated as missing values. Cells stay untyped here;
//! the preprocessing branches decide how a column is interpreted.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::errors::{Result, TrainerError};

/// A named column of raw cells (`None` marks a missing value)
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Option<String>>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Option<String>>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Build a column from string slices, mapping empty strings to missing
    pub fn from_strs(name: impl Into<String>, values: &[&str]) -> Self {
        let values = values
            .iter()
            .map(|v| {
                if v.is_empty() {
                    None
                } else {
                    Some((*v).to_string())
                }
            })
            .collect();
        Self::new(name, values)
    }

    /// Interpret every present cell as a floating point number.
    ///
    /// `NaN` counts as missing; infinities are rejected.
    pub fn parse_numeric(&self) -> Result<Vec<Option<f64>>> {
        self.values
            .iter()
            .enumerate()
            .map(|(row, cell)| match cell {
                None => Ok(None),
                Some(raw) => match raw.parse::<f64>() {
                    Ok(v) if v.is_nan() => Ok(None),
                    Ok(v) if v.is_finite() => Ok(Some(v)),
                    _ => Err(TrainerError::InvalidNumber {
                        column: self.name.clone(),
                        row: row + 1,
                        value: raw.clone(),
                    }),
                },
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// In-memory table of passenger records
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
    columns: Vec<Column>,
    n_rows: usize,
}

impl Frame {
    /// Assemble a frame from columns of equal length
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let n_rows = columns.first().map(Column::len).unwrap_or(0);
        if let Some(bad) = columns.iter().find(|c| c.len() != n_rows) {
            return Err(TrainerError::ShapeMismatch {
                expected: n_rows,
                actual: bad.len(),
            });
        }
        Ok(Self { columns, n_rows })
    }

    /// Load a frame from a CSV file with a header row
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        debug!("Reading CSV from {}", path.as_ref().display());
        let file = File::open(path.as_ref())?;
        Self::from_reader(file)
    }

    /// Load a frame from any CSV source with a header row
    pub fn from_reader<R: Read>(source: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(source);

        let mut columns: Vec<Column> = reader
            .headers()?
            .iter()
            .map(|name| Column::new(name, Vec::new()))
            .collect();

        for record in reader.records() {
            let record = record?;
            for (column, field) in columns.iter_mut().zip(record.iter()) {
                let cell = if field.is_empty() {
                    None
                } else {
                    Some(field.to_string())
                };
                column.values.push(cell);
            }
        }

        let frame = Self::new(columns)?;
        if frame.is_empty() {
            return Err(TrainerError::EmptyDataset);
        }
        debug!(
            "Parsed {} rows across {} columns",
            frame.len(),
            frame.columns.len()
        );
        Ok(frame)
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.n_rows
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// Look up a column by name
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| TrainerError::MissingColumn(name.to_string()))
    }

    /// Copy of the frame without the named column
    pub fn drop_column(&self, name: &str) -> Result<Frame> {
        self.column(name)?;
        let columns = self
            .columns
            .iter()
            .filter(|c| c.name != name)
            .cloned()
            .collect();
        Ok(Self {
            columns,
            n_rows: self.n_rows,
        })
    }

    /// Copy of the selected rows, in the given order
    pub fn select_rows(&self, rows: &[usize]) -> Frame {
        let columns = self
            .columns
            .iter()
            .map(|c| Column::new(c.name.clone(), rows.iter().map(|&r| c.values[r].clone()).collect()))
            .collect();
        Self {
            columns,
            n_rows: rows.len(),
        }
    }

    /// Parse the named column as integer class labels.
    ///
    /// Integral floats such as `1.0` are accepted; missing or fractional
    /// values are rejected.
    pub fn labels(&self, name: &str) -> Result<Vec<i64>> {
        self.column(name)?
            .values
            .iter()
            .enumerate()
            .map(|(row, cell)| {
                let raw = cell.as_deref().unwrap_or("");
                parse_label(raw).ok_or_else(|| TrainerError::InvalidLabel {
                    row: row + 1,
                    value: raw.to_string(),
                })
            })
            .collect()
    }

    /// Separate the label column from the feature columns
    pub fn split_target(&self, target: &str) -> Result<(Frame, Vec<i64>)> {
        let labels = self.labels(target)?;
        let features = self.drop_column(target)?;
        Ok((features, labels))
    }
}

fn parse_label(raw: &str) -> Option<i64> {
    if let Ok(v) = raw.parse::<i64>() {
        return Some(v);
    }
    let v = raw.parse::<f64>().ok()?;
    if v.is_finite() && v.fract() == 0.0 {
        Some(v as i64)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_csv() -> anyhow::Result<NamedTempFile> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "PassengerId,Survived,Name,Sex,Age,Fare,Embarked")?;
        writeln!(file, "1,0,\"Braund, Mr. Owen Harris\",male,22,7.25,S")?;
        writeln!(file, "2,1,\"Cumings, Mrs. John Bradley\",female,38,71.2833,C")?;
        writeln!(file, "3,1,\"Heikkinen, Miss. Laina\",female,,7.925,")?;
        file.flush()?;
        Ok(file)
    }

    #[test]
    fn test_load_csv() -> anyhow::Result<()> {
        let file = create_test_csv()?;
        let frame = Frame::from_csv(file.path())?;

        assert_eq!(frame.len(), 3);
        assert_eq!(
            frame.column_names(),
            vec!["PassengerId", "Survived", "Name", "Sex", "Age", "Fare", "Embarked"]
        );
        assert_eq!(
            frame.column("Name")?.values[0].as_deref(),
            Some("Braund, Mr. Owen Harris")
        );
        assert_eq!(frame.column("Age")?.values[2], None);
        assert_eq!(frame.column("Embarked")?.values[2], None);

        Ok(())
    }

    #[test]
    fn test_split_target() -> anyhow::Result<()> {
        let file = create_test_csv()?;
        let frame = Frame::from_csv(file.path())?;
        let (features, labels) = frame.split_target("Survived")?;

        assert_eq!(labels, vec![0, 1, 1]);
        assert!(!features.contains("Survived"));
        assert_eq!(features.len(), 3);

        Ok(())
    }

    #[test]
    fn test_missing_column() -> anyhow::Result<()> {
        let file = create_test_csv()?;
        let frame = Frame::from_csv(file.path())?;

        match frame.column("Cabin") {
            Err(TrainerError::MissingColumn(name)) => assert_eq!(name, "Cabin"),
            other => panic!("expected MissingColumn, got {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let data = "a,b\n1,2\n3\n";
        assert!(matches!(
            Frame::from_reader(data.as_bytes()),
            Err(TrainerError::Csv(_))
        ));
    }

    #[test]
    fn test_header_only_is_empty() {
        let data = "Survived,Age\n";
        assert!(matches!(
            Frame::from_reader(data.as_bytes()),
            Err(TrainerError::EmptyDataset)
        ));
    }

    #[test]
    fn test_labels_accept_integral_floats() -> anyhow::Result<()> {
        let frame = Frame::new(vec![Column::from_strs("y", &["1.0", "0", "1"])])?;
        assert_eq!(frame.labels("y")?, vec![1, 0, 1]);

        let frame = Frame::new(vec![Column::from_strs("y", &["1", "0.5"])])?;
        assert!(matches!(
            frame.labels("y"),
            Err(TrainerError::InvalidLabel { row: 2, .. })
        ));
        Ok(())
    }

    #[test]
    fn test_parse_numeric_reports_bad_cell() {
        let column = Column::from_strs("Age", &["22", "", "old"]);
        match column.parse_numeric() {
            Err(TrainerError::InvalidNumber { column, row, value }) => {
                assert_eq!(column, "Age");
                assert_eq!(row, 3);
                assert_eq!(value, "old");
            }
            other => panic!("expected InvalidNumber, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_numeric_rejects_infinity() {
        for raw in ["inf", "-inf", "infinity", "-Infinity"] {
            let column = Column::from_strs("Fare", &["7.25", raw]);
            match column.parse_numeric() {
                Err(TrainerError::InvalidNumber { column, row, value }) => {
                    assert_eq!(column, "Fare");
                    assert_eq!(row, 2);
                    assert_eq!(value, raw);
                }
                other => panic!("expected InvalidNumber for {}, got {:?}", raw, other),
            }
        }
    }

    #[test]
    fn test_parse_numeric_nan_is_missing() {
        let column = Column::from_strs("Age", &["NaN", "3"]);
        assert_eq!(column.parse_numeric().unwrap(), vec![None, Some(3.0)]);
    }

    #[test]
    fn test_cells_are_trimmed() -> anyhow::Result<()> {
        let data = "Sex,Age\n male , 22 \n   ,30\n";
        let frame = Frame::from_reader(data.as_bytes())?;
        assert_eq!(frame.column("Sex")?.values, vec![Some("male".to_string()), None]);
        assert_eq!(frame.column("Age")?.parse_numeric()?, vec![Some(22.0), Some(30.0)]);
        Ok(())
    }

    #[test]
    fn test_select_rows() -> anyhow::Result<()> {
        let frame = Frame::new(vec![Column::from_strs("x", &["a", "b", "c"])])?;
        let picked = frame.select_rows(&[2, 0]);
        assert_eq!(picked.len(), 2);
        assert_eq!(
            picked.column("x")?.values,
            vec![Some("c".to_string()), Some("a".to_string())]
        );
        Ok(())
    }

    #[test]
    fn test_unequal_columns_rejected() {
        let result = Frame::new(vec![
            Column::from_strs("a", &["1", "2"]),
            Column::from_strs("b", &["1"]),
        ]);
        assert!(matches!(
            result,
            Err(TrainerError::ShapeMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }
}
