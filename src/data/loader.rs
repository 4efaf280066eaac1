use std::fs::File;
use std::path::{Path, PathBuf};

use ndarray::Array2;
use thiserror::Error;

use super::model::Table;

/// Everything that can go wrong turning a file into a [`Table`].
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot open {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),

    #[error("{}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{}: line {line} has {found} fields, header has {expected}", path.display())]
    MalformedRow {
        path: PathBuf,
        line: u64,
        expected: u64,
        found: u64,
    },

    #[error("{}: line {line}, column '{column}': '{value}' is not a number", path.display())]
    NonNumeric {
        path: PathBuf,
        line: u64,
        column: String,
        value: String,
    },

    #[error("{}: table has no data rows or no data columns", path.display())]
    Empty { path: PathBuf },
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a matrix-style table.  Dispatch delimiter by extension.
///
/// Supported formats:
/// * `.csv`          – comma separated
/// * `.tsv` / `.tab` – tab separated
///
/// The header row holds the column labels (its first cell names the index
/// and is dropped); the first field of every record is the row label and
/// the remaining fields must parse as finite `f64`.
pub fn load_table(path: &Path) -> Result<Table, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let delimiter = match ext.as_str() {
        "csv" => b',',
        "tsv" | "tab" => b'\t',
        other => return Err(LoadError::UnsupportedExtension(other.to_string())),
    };
    log::debug!("loading {} with delimiter {:?}", path.display(), delimiter as char);

    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_table(file, delimiter, path)
}

/// Parse a delimited table from any reader. `path` is only used in errors.
pub fn read_table<R: std::io::Read>(
    input: R,
    delimiter: u8,
    path: &Path,
) -> Result<Table, LoadError> {
    let csv_err = |source: csv::Error| {
        if let csv::ErrorKind::UnequalLengths {
            pos,
            expected_len,
            len,
        } = source.kind()
        {
            return LoadError::MalformedRow {
                path: path.to_path_buf(),
                line: pos.as_ref().map_or(0, |p| p.line()),
                expected: *expected_len,
                found: *len,
            };
        }
        LoadError::Csv {
            path: path.to_path_buf(),
            source,
        }
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_reader(input);

    let column_labels: Vec<String> = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .skip(1)
        .map(|h| h.to_string())
        .collect();

    let mut row_labels = Vec::new();
    let mut cells: Vec<f64> = Vec::new();

    for result in reader.records() {
        let record = result.map_err(csv_err)?;
        let line = record.position().map_or(0, |p| p.line());

        row_labels.push(record.get(0).unwrap_or("").to_string());

        for (value, column) in record.iter().skip(1).zip(&column_labels) {
            let parsed = parse_cell(value).ok_or_else(|| LoadError::NonNumeric {
                path: path.to_path_buf(),
                line,
                column: column.clone(),
                value: value.to_string(),
            })?;
            cells.push(parsed);
        }
    }

    let shape = (row_labels.len(), column_labels.len());
    if shape.0 == 0 || shape.1 == 0 {
        return Err(LoadError::Empty {
            path: path.to_path_buf(),
        });
    }

    // Record lengths are checked by the reader, so the cell count always fits.
    let values = Array2::from_shape_vec(shape, cells).map_err(|_| LoadError::Empty {
        path: path.to_path_buf(),
    })?;
    Table::new(row_labels, column_labels, values).ok_or(LoadError::Empty {
        path: path.to_path_buf(),
    })
}

fn parse_cell(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
