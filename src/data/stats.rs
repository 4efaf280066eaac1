use ndarray::{Array2, Axis};

use super::model::{CorrelationMatrix, Table};

/// Rescale every lane along `axis` to `[0, 1]` via `(x - min) / (max - min)`.
///
/// `Axis(1)` scales each column (the lanes run down the rows), `Axis(0)`
/// scales each row. A constant lane becomes NaN.
pub fn standard_scale(values: &Array2<f64>, axis: Axis) -> Array2<f64> {
    let mut scaled = values.clone();
    let lane_axis = match axis.index() {
        1 => Axis(0),
        _ => Axis(1),
    };
    for mut lane in scaled.lanes_mut(lane_axis) {
        let min = lane.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = lane.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let range = max - min;
        lane.mapv_inplace(|v| (v - min) / range);
    }
    scaled
}

/// Pearson correlation between every pair of columns of `table`.
pub fn correlation(table: &Table) -> CorrelationMatrix {
    let values = table.values();
    let n = table.n_cols();

    let means = values.mean_axis(Axis(0)).unwrap_or_else(|| ndarray::Array1::zeros(n));
    let centered = values - &means;

    let mut corr = Array2::from_elem((n, n), f64::NAN);
    for i in 0..n {
        let ci = centered.column(i);
        let ss_i = ci.dot(&ci);
        for j in i..n {
            let cj = centered.column(j);
            let ss_j = cj.dot(&cj);
            let r = if ss_i == 0.0 || ss_j == 0.0 {
                f64::NAN
            } else if i == j {
                1.0
            } else {
                (ci.dot(&cj) / (ss_i * ss_j).sqrt()).clamp(-1.0, 1.0)
            };
            corr[[i, j]] = r;
            corr[[j, i]] = r;
        }
    }

    CorrelationMatrix {
        labels: table.column_labels().to_vec(),
        values: corr,
    }
}
