use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum RecordShapeError {
    #[error("A record needs at least one condition and one sample")]
    Empty,

    #[error("Row {row} has {found} samples, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Condition {row} is out of range for a record of {conditions} conditions")]
    RowOutOfRange { row: usize, conditions: usize },
}

/// The simulated decay curves of one grid point: one row of `samples` values per condition.
///
/// Rows that were never filled (because the simulation failed for that condition) stay at
/// their zero-initialized default.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRecord {
    conditions: usize,
    samples: usize,
    data: Vec<f64>,
}

impl ResultRecord {
    pub fn zeroed(conditions: usize, samples: usize) -> Result<Self, RecordShapeError> {
        if conditions == 0 || samples == 0 {
            return Err(RecordShapeError::Empty);
        }
        Ok(Self {
            conditions,
            samples,
            data: vec![0.0; conditions * samples],
        })
    }

    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, RecordShapeError> {
        let samples = rows.first().map(Vec::len).unwrap_or(0);
        let mut record = Self::zeroed(rows.len(), samples)?;
        for (row, values) in rows.iter().enumerate() {
            record.set_row(row, values)?;
        }
        Ok(record)
    }

    /// `(conditions, samples)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.conditions, self.samples)
    }

    pub fn row(&self, condition: usize) -> Option<&[f64]> {
        (condition < self.conditions)
            .then(|| &self.data[condition * self.samples..(condition + 1) * self.samples])
    }

    pub fn set_row(&mut self, condition: usize, values: &[f64]) -> Result<(), RecordShapeError> {
        if condition >= self.conditions {
            return Err(RecordShapeError::RowOutOfRange {
                row: condition,
                conditions: self.conditions,
            });
        }
        if values.len() != self.samples {
            return Err(RecordShapeError::Ragged {
                row: condition,
                expected: self.samples,
                found: values.len(),
            });
        }
        self.data[condition * self.samples..(condition + 1) * self.samples]
            .copy_from_slice(values);
        Ok(())
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks_exact(self.samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zeroed_record_has_requested_shape() {
        let record = ResultRecord::zeroed(5, 500).unwrap();
        assert_eq!(record.shape(), (5, 500));
        assert!(record.rows().all(|row| row.iter().all(|&v| v == 0.0)));
        assert_eq!(record.rows().count(), 5);
    }

    #[test]
    fn set_row_leaves_other_rows_untouched() {
        let mut record = ResultRecord::zeroed(3, 2).unwrap();
        record.set_row(1, &[0.5, 0.25]).unwrap();
        assert_eq!(record.row(0), Some(&[0.0, 0.0][..]));
        assert_eq!(record.row(1), Some(&[0.5, 0.25][..]));
        assert_eq!(record.row(2), Some(&[0.0, 0.0][..]));
        assert_eq!(record.row(3), None);
    }

    #[test]
    fn set_row_rejects_wrong_length_and_index() {
        let mut record = ResultRecord::zeroed(2, 3).unwrap();
        assert_eq!(
            record.set_row(0, &[1.0]),
            Err(RecordShapeError::Ragged {
                row: 0,
                expected: 3,
                found: 1
            })
        );
        assert_eq!(
            record.set_row(2, &[1.0, 2.0, 3.0]),
            Err(RecordShapeError::RowOutOfRange {
                row: 2,
                conditions: 2
            })
        );
    }

    #[test]
    fn from_rows_requires_a_rectangular_shape() {
        let record = ResultRecord::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(record.row(1), Some(&[3.0, 4.0][..]));

        assert!(matches!(
            ResultRecord::from_rows(vec![vec![1.0, 2.0], vec![3.0]]),
            Err(RecordShapeError::Ragged { row: 1, .. })
        ));
        assert_eq!(
            ResultRecord::from_rows(vec![]),
            Err(RecordShapeError::Empty)
        );
    }
}
