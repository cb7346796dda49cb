//! Categorical frequency tables.
//!
//! Labels keep first-insertion order, which is the order categories are
//! reported and fed to the chi-square tests.

use std::collections::HashMap;

use crate::matrix::Matrix;

/// One-way table: label → frequency.
///
/// # Examples
/// ```
/// use u_inference::tables::FrequencyTable;
/// let mut t = FrequencyTable::new();
/// t.add("red", 3.0);
/// t.add("blue", 1.0);
/// t.add("red", 1.0);
/// assert_eq!(t.frequency("red"), Some(4.0));
/// assert_eq!(t.total(), 5.0);
/// assert_eq!(t.labels(), vec!["red", "blue"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrequencyTable {
    entries: Vec<(String, f64)>,
    index: HashMap<String, usize>,
    total: f64,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `frequency` to `label`, creating the category if needed.
    pub fn add(&mut self, label: impl Into<String>, frequency: f64) {
        let label = label.into();
        match self.index.get(&label) {
            Some(&i) => self.entries[i].1 += frequency,
            None => {
                self.index.insert(label.clone(), self.entries.len());
                self.entries.push((label, frequency));
            }
        }
        self.total += frequency;
    }

    pub fn frequency(&self, label: &str) -> Option<f64> {
        self.index.get(label).map(|&i| self.entries[i].1)
    }

    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|(l, _)| l.as_str()).collect()
    }

    /// Frequencies in label order.
    pub fn frequencies(&self) -> Vec<f64> {
        self.entries.iter().map(|&(_, f)| f).collect()
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Each frequency divided by the total.
    pub fn relative_frequencies(&self) -> Vec<f64> {
        self.entries.iter().map(|&(_, f)| f / self.total).collect()
    }
}

/// Two-way table with row, column and grand totals kept in step with
/// every insertion.
///
/// # Examples
/// ```
/// use u_inference::tables::ContingencyTable;
/// let mut t = ContingencyTable::new();
/// t.add("smoker", "yes", 20.0);
/// t.add("smoker", "no", 30.0);
/// t.add("non-smoker", "yes", 10.0);
/// assert_eq!(t.row_totals(), &[50.0, 10.0]);
/// assert_eq!(t.column_totals(), &[30.0, 30.0]);
/// assert_eq!(t.grand_total(), 60.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContingencyTable {
    row_labels: Vec<String>,
    column_labels: Vec<String>,
    row_index: HashMap<String, usize>,
    column_index: HashMap<String, usize>,
    counts: Matrix,
    row_totals: Vec<f64>,
    column_totals: Vec<f64>,
    grand_total: f64,
}

impl ContingencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from a rectangular count matrix, labelling rows and
    /// columns by position.
    pub fn from_counts(counts: &[Vec<f64>]) -> Self {
        let mut table = Self::new();
        for (i, row) in counts.iter().enumerate() {
            for (j, &f) in row.iter().enumerate() {
                table.add(i.to_string(), j.to_string(), f);
            }
        }
        table
    }

    /// Adds `frequency` to cell `(row, column)`, growing the table for
    /// unseen labels.
    pub fn add(&mut self, row: impl Into<String>, column: impl Into<String>, frequency: f64) {
        let r = self.row_slot(row.into());
        let c = self.column_slot(column.into());
        self.counts[r][c] += frequency;
        self.row_totals[r] += frequency;
        self.column_totals[c] += frequency;
        self.grand_total += frequency;
    }

    fn row_slot(&mut self, label: String) -> usize {
        if let Some(&r) = self.row_index.get(&label) {
            return r;
        }
        let r = self.row_labels.len();
        self.row_index.insert(label.clone(), r);
        self.row_labels.push(label);
        self.counts.push(vec![0.0; self.column_labels.len()]);
        self.row_totals.push(0.0);
        r
    }

    fn column_slot(&mut self, label: String) -> usize {
        if let Some(&c) = self.column_index.get(&label) {
            return c;
        }
        let c = self.column_labels.len();
        self.column_index.insert(label.clone(), c);
        self.column_labels.push(label);
        for row in &mut self.counts {
            row.push(0.0);
        }
        self.column_totals.push(0.0);
        c
    }

    pub fn frequency(&self, row: &str, column: &str) -> Option<f64> {
        let r = *self.row_index.get(row)?;
        let c = *self.column_index.get(column)?;
        Some(self.counts[r][c])
    }

    pub fn counts(&self) -> &Matrix {
        &self.counts
    }

    pub fn row_labels(&self) -> &[String] {
        &self.row_labels
    }

    pub fn column_labels(&self) -> &[String] {
        &self.column_labels
    }

    pub fn row_totals(&self) -> &[f64] {
        &self.row_totals
    }

    pub fn column_totals(&self) -> &[f64] {
        &self.column_totals
    }

    pub fn grand_total(&self) -> f64 {
        self.grand_total
    }

    /// Distribution across columns within one row (each cell over the
    /// row total).
    pub fn row_conditional(&self, row: &str) -> Option<Vec<f64>> {
        let r = *self.row_index.get(row)?;
        let total = self.row_totals[r];
        Some(self.counts[r].iter().map(|&f| f / total).collect())
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn totals_match_matrix(
            cells in proptest::collection::vec((0_u8..5, 0_u8..5, 0_u32..100), 0..60),
        ) {
            let mut t = ContingencyTable::new();
            for (r, c, f) in cells {
                t.add(format!("r{r}"), format!("c{c}"), f as f64);
            }
            let grand: f64 = t.counts().iter().flatten().sum();
            prop_assert_eq!(grand, t.grand_total());
            for (r, row) in t.counts().iter().enumerate() {
                prop_assert_eq!(row.iter().sum::<f64>(), t.row_totals()[r]);
            }
        }
    }
}
