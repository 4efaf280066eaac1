use ndarray::Array2;

// ---------------------------------------------------------------------------
// Table – the loaded labelled matrix
// ---------------------------------------------------------------------------

/// A labelled numeric matrix: features as rows, samples as columns.
///
/// Invariant: `values` has shape `(row_labels.len(), column_labels.len())`
/// and every cell is finite. The loader enforces both.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    row_labels: Vec<String>,
    column_labels: Vec<String>,
    values: Array2<f64>,
}

impl Table {
    /// Build a table, returning `None` when the labels disagree with the shape.
    pub fn new(
        row_labels: Vec<String>,
        column_labels: Vec<String>,
        values: Array2<f64>,
    ) -> Option<Self> {
        if values.dim() != (row_labels.len(), column_labels.len()) {
            return None;
        }
        Some(Table {
            row_labels,
            column_labels,
            values,
        })
    }

    pub fn row_labels(&self) -> &[String] {
        &self.row_labels
    }

    pub fn column_labels(&self) -> &[String] {
        &self.column_labels
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn n_rows(&self) -> usize {
        self.row_labels.len()
    }

    pub fn n_cols(&self) -> usize {
        self.column_labels.len()
    }
}

// ---------------------------------------------------------------------------
// CorrelationMatrix – pairwise column correlations
// ---------------------------------------------------------------------------

/// Square matrix of Pearson coefficients between the columns of a [`Table`].
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    /// Shared row/column labels (the source table's column labels).
    pub labels: Vec<String>,
    /// `values[[i, j]] == values[[j, i]]`; NaN wherever a constant column is involved.
    pub values: Array2<f64>,
}

impl CorrelationMatrix {
    pub fn dim(&self) -> usize {
        self.labels.len()
    }

    /// Cells strictly above the diagonal, which carry no extra information.
    pub fn upper_mask(&self) -> Array2<bool> {
        let n = self.dim();
        Array2::from_shape_fn((n, n), |(i, j)| j > i)
    }
}
