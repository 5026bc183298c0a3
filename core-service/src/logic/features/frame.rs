//! Feature Frame - column-ordered rows flowing through the pipeline
//!
//! A tiny in-memory table: named columns, rows of [`FeatureValue`].
//! Prediction requests carry a single row; dataset loaders carry thousands.

use chrono::{DateTime, Utc};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use super::FeatureError;

/// One cell of a feature frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FeatureValue {
    Number(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
    /// Text coerced to a categorical code by the pipeline
    Category { level: String, code: u32 },
    Missing,
}

impl FeatureValue {
    /// Numeric value as the model sees it (categories by code, missing as NaN)
    pub fn as_model_input(&self) -> Option<f64> {
        match self {
            FeatureValue::Number(v) => Some(*v),
            FeatureValue::Category { code, .. } => Some(*code as f64),
            FeatureValue::Missing => Some(f64::NAN),
            FeatureValue::Text(_) | FeatureValue::Timestamp(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FeatureValue::Text(s) => Some(s),
            FeatureValue::Category { level, .. } => Some(level),
            _ => None,
        }
    }

    pub fn is_textual(&self) -> bool {
        matches!(self, FeatureValue::Text(_) | FeatureValue::Category { .. })
    }

    /// Short label for charts and logs
    pub fn display(&self) -> String {
        match self {
            FeatureValue::Number(v) => {
                if v.fract() == 0.0 && v.abs() < 1e15 {
                    format!("{}", *v as i64)
                } else {
                    format!("{}", v)
                }
            }
            FeatureValue::Text(s) => s.clone(),
            FeatureValue::Timestamp(ts) => ts.format("%Y-%m-%d %H:%M:%S").to_string(),
            FeatureValue::Category { level, .. } => level.clone(),
            FeatureValue::Missing => "NaN".to_string(),
        }
    }
}

impl From<f64> for FeatureValue {
    fn from(v: f64) -> Self {
        FeatureValue::Number(v)
    }
}

impl From<&str> for FeatureValue {
    fn from(v: &str) -> Self {
        FeatureValue::Text(v.to_string())
    }
}

impl From<String> for FeatureValue {
    fn from(v: String) -> Self {
        FeatureValue::Text(v)
    }
}

/// Named columns with row-major values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureFrame {
    columns: Vec<String>,
    rows: Vec<Vec<FeatureValue>>,
}

impl FeatureFrame {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
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

    pub fn rows(&self) -> &[Vec<FeatureValue>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&[FeatureValue]> {
        self.rows.get(index).map(|r| r.as_slice())
    }

    pub fn push_row(&mut self, row: Vec<FeatureValue>) -> Result<(), FeatureError> {
        if row.len() != self.columns.len() {
            return Err(FeatureError::RowLength {
                expected: self.columns.len(),
                got: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    fn require_column(&self, name: &str) -> Result<usize, FeatureError> {
        self.column_index(name)
            .ok_or_else(|| FeatureError::MissingColumn(name.to_string()))
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&FeatureValue> {
        let col = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Iterate over one column
    pub fn column<'a>(
        &'a self,
        name: &str,
    ) -> Result<impl Iterator<Item = &'a FeatureValue> + 'a, FeatureError> {
        let col = self.require_column(name)?;
        Ok(self.rows.iter().map(move |r| &r[col]))
    }

    /// Replace a column in place, or append it when absent
    pub fn set_column(&mut self, name: &str, values: Vec<FeatureValue>) -> Result<(), FeatureError> {
        if values.len() != self.rows.len() {
            return Err(FeatureError::RowLength {
                expected: self.rows.len(),
                got: values.len(),
            });
        }

        match self.column_index(name) {
            Some(col) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[col] = value;
                }
            }
            None => {
                self.columns.push(name.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
        Ok(())
    }

    pub fn drop_column(&mut self, name: &str) -> Result<Vec<FeatureValue>, FeatureError> {
        let col = self.require_column(name)?;
        self.columns.remove(col);
        Ok(self.rows.iter_mut().map(|r| r.remove(col)).collect())
    }

    /// Apply a fallible conversion to every value of a column
    pub fn try_map_column<E, F>(&mut self, name: &str, mut f: F) -> Result<(), E>
    where
        F: FnMut(&FeatureValue) -> Result<FeatureValue, E>,
        E: From<FeatureError>,
    {
        let col = self.require_column(name)?;
        for row in self.rows.iter_mut() {
            row[col] = f(&row[col])?;
        }
        Ok(())
    }

    /// Rows × columns matrix in the order of `names`
    pub fn to_matrix<S: AsRef<str>>(&self, names: &[S]) -> Result<Array2<f64>, FeatureError> {
        let indices = names
            .iter()
            .map(|n| self.require_column(n.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        let mut matrix = Array2::<f64>::zeros((self.rows.len(), indices.len()));
        for (r, row) in self.rows.iter().enumerate() {
            for (c, &col) in indices.iter().enumerate() {
                matrix[[r, c]] = row[col].as_model_input().ok_or_else(|| FeatureError::NotNumeric {
                    column: self.columns[col].clone(),
                    value: row[col].display(),
                })?;
            }
        }
        Ok(matrix)
    }

    /// Keep only the given rows
    pub fn retain_rows<F: FnMut(usize) -> bool>(&mut self, mut keep: F) {
        let mut index = 0;
        self.rows.retain(|_| {
            let k = keep(index);
            index += 1;
            k
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FeatureFrame {
        let mut frame = FeatureFrame::new(["rarity", "profession"]);
        frame.push_row(vec![2.0.into(), "mining".into()]).unwrap();
        frame.push_row(vec![0.0.into(), "fishing".into()]).unwrap();
        frame
    }

    #[test]
    fn test_push_row_checks_length() {
        let mut frame = sample();
        let err = frame.push_row(vec![1.0.into()]).unwrap_err();
        assert!(matches!(err, FeatureError::RowLength { expected: 2, got: 1 }));
    }

    #[test]
    fn test_set_column_appends_then_replaces() {
        let mut frame = sample();
        frame.set_column("buyHour", vec![13.0.into(), 2.0.into()]).unwrap();
        assert_eq!(frame.columns().len(), 3);
        assert_eq!(frame.get(1, "buyHour"), Some(&FeatureValue::Number(2.0)));

        frame.set_column("buyHour", vec![1.0.into(), 1.0.into()]).unwrap();
        assert_eq!(frame.columns().len(), 3);
        assert_eq!(frame.get(0, "buyHour"), Some(&FeatureValue::Number(1.0)));
    }

    #[test]
    fn test_drop_column() {
        let mut frame = sample();
        let dropped = frame.drop_column("rarity").unwrap();
        assert_eq!(dropped.len(), 2);
        assert_eq!(frame.columns(), &["profession".to_string()]);
        assert!(frame.drop_column("rarity").is_err());
    }

    #[test]
    fn test_to_matrix_rejects_text() {
        let frame = sample();
        let err = frame.to_matrix(&["rarity", "profession"]).unwrap_err();
        assert!(matches!(err, FeatureError::NotNumeric { .. }));

        let m = frame.to_matrix(&["rarity"]).unwrap();
        assert_eq!(m.shape(), &[2, 1]);
        assert_eq!(m[[0, 0]], 2.0);
    }

    #[test]
    fn test_category_is_model_input_by_code() {
        let v = FeatureValue::Category { level: "mining".into(), code: 3 };
        assert_eq!(v.as_model_input(), Some(3.0));
        assert_eq!(v.display(), "mining");
        assert!(FeatureValue::Missing.as_model_input().unwrap().is_nan());
    }

    #[test]
    fn test_retain_rows() {
        let mut frame = sample();
        frame.retain_rows(|i| i == 1);
        assert_eq!(frame.len(), 1);
        assert_eq!(frame.get(0, "profession"), Some(&FeatureValue::Text("fishing".into())));
    }

    #[test]
    fn test_number_display() {
        assert_eq!(FeatureValue::Number(3.0).display(), "3");
        assert_eq!(FeatureValue::Number(2.5).display(), "2.5");
    }
}
