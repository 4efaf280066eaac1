//! Hierarchical clustering of table rows and columns for the clustermap.
//!
//! The matrix is standard-scaled per column, turned into a condensed
//! dissimilarity matrix for each axis (Dice on presence), and agglomerated
//! with complete linkage by [`kodama`]. The resulting merge tree gives a deterministic
//! leaf order used to permute the heatmap.

use std::fmt;

use kodama::{linkage, Method};
use ndarray::{Array2, ArrayView1, ArrayView2, Axis};
use thiserror::Error;

use crate::data::stats::standard_scale;

/// Which side of the matrix is being clustered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Rows,
    Columns,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Rows => write!(f, "rows"),
            Side::Columns => write!(f, "columns"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ClusterError {
    /// Presence data must be finite and non-negative.
    #[error("{metric} metric: value {value} at row {row}, column {column} is negative or not finite")]
    OutOfDomain {
        metric: Metric,
        row: usize,
        column: usize,
        value: f64,
    },

    /// Both observations are all-absent, giving 0/0.
    #[error("{metric} metric on {side}: distance between {a} and {b} is undefined (no presences)")]
    UndefinedDistance {
        metric: Metric,
        side: Side,
        a: usize,
        b: usize,
    },
}

// ---------------------------------------------------------------------------
// Dissimilarity
// ---------------------------------------------------------------------------

/// Dissimilarity between two observations of presence data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Dice,
}

impl Metric {
    /// `None` when the pair has no defined distance.
    pub fn distance(self, u: ArrayView1<f64>, v: ArrayView1<f64>) -> Option<f64> {
        match self {
            Metric::Dice => dice(u, v),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Dice => write!(f, "dice"),
        }
    }
}

/// Dice dissimilarity between two presence vectors.
///
/// A cell is present when it is non-zero, so NaN counts as present.
/// Returns `None` when neither vector has any presence.
pub fn dice(u: ArrayView1<f64>, v: ArrayView1<f64>) -> Option<f64> {
    let (mut ntt, mut ndiff) = (0usize, 0usize);
    for (&a, &b) in u.iter().zip(v.iter()) {
        match (a != 0.0, b != 0.0) {
            (true, true) => ntt += 1,
            (true, false) | (false, true) => ndiff += 1,
            (false, false) => {}
        }
    }
    let denom = 2 * ntt + ndiff;
    if denom == 0 {
        return None;
    }
    Some(ndiff as f64 / denom as f64)
}

/// Reject table values outside the metric's domain, in table coordinates.
pub fn check_domain(values: &Array2<f64>, metric: Metric) -> Result<(), ClusterError> {
    match values
        .indexed_iter()
        .find(|(_, v)| !v.is_finite() || **v < 0.0)
    {
        Some(((row, column), &value)) => Err(ClusterError::OutOfDomain {
            metric,
            row,
            column,
            value,
        }),
        None => Ok(()),
    }
}

/// Condensed (row-major upper triangle) distance matrix between the rows of `data`.
pub fn condensed(
    data: ArrayView2<f64>,
    metric: Metric,
    side: Side,
) -> Result<Vec<f64>, ClusterError> {
    let n = data.nrows();
    let mut condensed = Vec::with_capacity(n * n.saturating_sub(1) / 2);
    for a in 0..n {
        for b in (a + 1)..n {
            let d = metric.distance(data.row(a), data.row(b)).ok_or(
                ClusterError::UndefinedDistance {
                    metric,
                    side,
                    a,
                    b,
                },
            )?;
            condensed.push(d);
        }
    }
    Ok(condensed)
}

// ---------------------------------------------------------------------------
// Dendrogram
// ---------------------------------------------------------------------------

/// One merge: two clusters joined at `height`.
///
/// Cluster ids follow the usual convention: `0..n` are observations and the
/// cluster created by merge `i` has id `n + i`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Merge {
    pub left: usize,
    pub right: usize,
    pub height: f64,
}

/// Merge tree over `n` observations plus the leaf order it induces.
#[derive(Debug, Clone, PartialEq)]
pub struct Dendrogram {
    n: usize,
    merges: Vec<Merge>,
    leaves: Vec<usize>,
}

/// A U-shaped link in (leaf position, height) coordinates:
/// left foot, left shoulder, right shoulder, right foot.
pub type LinkSegment = [(f64, f64); 4];

impl Dendrogram {
    /// Agglomerate a condensed dissimilarity matrix over `n` observations.
    pub fn from_condensed(mut condensed: Vec<f64>, n: usize, method: Method) -> Self {
        if n < 2 {
            return Dendrogram {
                n,
                merges: Vec::new(),
                leaves: (0..n).collect(),
            };
        }

        let result = linkage(&mut condensed, n, method);
        let merges: Vec<Merge> = result
            .steps()
            .iter()
            .map(|step| Merge {
                left: step.cluster1.min(step.cluster2),
                right: step.cluster1.max(step.cluster2),
                height: step.dissimilarity,
            })
            .collect();

        let leaves = leaf_order(n, &merges);
        Dendrogram { n, merges, leaves }
    }

    pub fn merges(&self) -> &[Merge] {
        &self.merges
    }

    /// Observations in dendrogram order.
    pub fn leaves(&self) -> &[usize] {
        &self.leaves
    }

    /// Height of the root merge, 0 for a single observation.
    pub fn max_height(&self) -> f64 {
        self.merges.iter().map(|m| m.height).fold(0.0, f64::max)
    }

    /// Drawing segments. Leaf `k` of [`Self::leaves`] sits at position `k + 0.5`.
    pub fn segments(&self) -> Vec<LinkSegment> {
        // (position, height) of every cluster id
        let mut anchor = vec![(0.0, 0.0); self.n + self.merges.len()];
        for (k, &leaf) in self.leaves.iter().enumerate() {
            anchor[leaf] = (k as f64 + 0.5, 0.0);
        }

        let mut segments = Vec::with_capacity(self.merges.len());
        for (i, merge) in self.merges.iter().enumerate() {
            let (x1, h1) = anchor[merge.left];
            let (x2, h2) = anchor[merge.right];
            segments.push([(x1, h1), (x1, merge.height), (x2, merge.height), (x2, h2)]);
            anchor[self.n + i] = ((x1 + x2) / 2.0, merge.height);
        }
        segments
    }
}

/// Depth-first leaf order from the root, smaller cluster id first.
fn leaf_order(n: usize, merges: &[Merge]) -> Vec<usize> {
    let Some(root) = (n + merges.len()).checked_sub(1) else {
        return Vec::new();
    };

    let mut order = Vec::with_capacity(n);
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        if id < n {
            order.push(id);
        } else {
            let merge = &merges[id - n];
            stack.push(merge.right);
            stack.push(merge.left);
        }
    }
    order
}

// ---------------------------------------------------------------------------
// Clustermap clustering
// ---------------------------------------------------------------------------

/// Scaled matrix plus one dendrogram per axis.
#[derive(Debug, Clone)]
pub struct Clustering {
    /// Column-wise standard-scaled values, in input order.
    pub scaled: Array2<f64>,
    pub rows: Dendrogram,
    pub columns: Dendrogram,
}

/// Standard-scale the columns, then cluster rows and columns independently.
///
/// Constant columns scale to NaN and count as present everywhere.
pub fn cluster(
    values: &Array2<f64>,
    metric: Metric,
    method: Method,
) -> Result<Clustering, ClusterError> {
    check_domain(values, metric)?;
    let scaled = standard_scale(values, Axis(1));

    let row_dist = condensed(scaled.view(), metric, Side::Rows)?;
    let rows = Dendrogram::from_condensed(row_dist, scaled.nrows(), method);

    let col_dist = condensed(scaled.t(), metric, Side::Columns)?;
    let columns = Dendrogram::from_condensed(col_dist, scaled.ncols(), method);

    log::debug!(
        "{metric} leaf order: rows {:?}, columns {:?}",
        rows.leaves(),
        columns.leaves()
    );

    Ok(Clustering {
        scaled,
        rows,
        columns,
    })
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    use super::*;

    #[test]
    fn dice_on_presence() {
        let u = array![1.0, 0.0, 0.3, 0.0];
        let v = array![0.5, 0.2, 0.0, 0.0];
        // ntt = 1, ndiff = 2
        assert_abs_diff_eq!(dice(u.view(), v.view()).unwrap(), 0.5);
        assert_eq!(dice(u.view(), u.view()), Some(0.0));
        let z = array![0.0, 0.0, 0.0, 0.0];
        assert_eq!(dice(z.view(), z.view()), None);
        assert_eq!(dice(u.view(), z.view()), Some(1.0));
        assert_eq!(Metric::Dice.distance(u.view(), v.view()), dice(u.view(), v.view()));
    }

    #[test]
    fn nan_counts_as_present() {
        let u = array![f64::NAN, 0.0];
        let v = array![f64::NAN, 1.0];
        // ntt = 1, ndiff = 1
        assert_abs_diff_eq!(dice(u.view(), v.view()).unwrap(), 1.0 / 3.0);
        let z = array![0.0, 0.0];
        assert_eq!(dice(u.view(), z.view()), Some(1.0));
    }

    #[test]
    fn negative_or_non_finite_input_is_out_of_domain() {
        let values = array![[0.0, 1.0], [0.5, -2.0]];
        let err = check_domain(&values, Metric::Dice).unwrap_err();
        assert!(matches!(
            err,
            ClusterError::OutOfDomain { row: 1, column: 1, value, .. } if value == -2.0
        ));

        let values = array![[0.0, f64::INFINITY], [0.5, 2.0]];
        assert!(matches!(
            check_domain(&values, Metric::Dice),
            Err(ClusterError::OutOfDomain { row: 0, column: 1, .. })
        ));
        assert!(check_domain(&array![[0.0, 3.0], [7.5, 0.0]], Metric::Dice).is_ok());
    }

    #[test]
    fn all_absent_pair_is_undefined() {
        let data = array![[0.0, 0.0], [0.0, 0.0], [1.0, 1.0]];
        let err = condensed(data.view(), Metric::Dice, Side::Rows).unwrap_err();
        assert!(matches!(
            err,
            ClusterError::UndefinedDistance { side: Side::Rows, a: 0, b: 1, .. }
        ));
    }

    #[test]
    fn leaf_order_follows_merge_tree() {
        // ((0, 2), (1, 3)) with merge ids 4, 5, 6
        let merges = [
            Merge { left: 0, right: 2, height: 0.1 },
            Merge { left: 1, right: 3, height: 0.2 },
            Merge { left: 4, right: 5, height: 0.9 },
        ];
        assert_eq!(leaf_order(4, &merges), vec![0, 2, 1, 3]);
    }

    #[test]
    fn groups_similar_observations() {
        // rows 0/2 and 1/3 share presence patterns
        let condensed = {
            let data = array![
                [1.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 1.0],
                [1.0, 1.0, 1.0, 0.0],
                [0.0, 0.0, 1.0, 1.0]
            ];
            condensed(data.view(), Metric::Dice, Side::Rows).unwrap()
        };
        let tree = Dendrogram::from_condensed(condensed, 4, Method::Complete);
        let leaves = tree.leaves();

        let mut sorted = leaves.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![0, 1, 2, 3]);

        let pos = |i: usize| leaves.iter().position(|&l| l == i).unwrap();
        assert_eq!(pos(0).abs_diff(pos(2)), 1);
        assert_eq!(pos(1).abs_diff(pos(3)), 1);
        assert_eq!(tree.merges().len(), 3);
    }

    #[test]
    fn single_observation_has_trivial_tree() {
        let tree = Dendrogram::from_condensed(Vec::new(), 1, Method::Complete);
        assert_eq!(tree.leaves(), [0]);
        assert!(tree.segments().is_empty());
        assert_eq!(tree.max_height(), 0.0);
    }

    #[test]
    fn segments_sit_on_leaf_positions() {
        let condensed = vec![0.2, 0.8, 0.6];
        let tree = Dendrogram::from_condensed(condensed, 3, Method::Complete);
        let segments = tree.segments();
        assert_eq!(segments.len(), 2);
        // the first link joins two leaves from the ground
        let first = segments[0];
        assert_eq!(first[0].1, 0.0);
        assert_eq!(first[3].1, 0.0);
        assert_abs_diff_eq!(first[1].1, 0.2);
        // root reaches the maximum height
        let root = segments[1];
        assert_abs_diff_eq!(root[1].1, tree.max_height());
        for seg in &segments {
            for &(x, _) in seg {
                assert!(x > 0.0 && x < 3.0);
            }
        }
    }

    #[test]
    fn clustering_is_deterministic() {
        let values = array![
            [3.0, 0.0, 5.0, 1.0],
            [0.0, 2.0, 1.0, 4.0],
            [6.0, 1.0, 0.0, 2.0],
            [1.0, 5.0, 3.0, 0.0]
        ];
        let a = cluster(&values, Metric::Dice, Method::Complete).unwrap();
        let b = cluster(&values, Metric::Dice, Method::Complete).unwrap();
        assert_eq!(a.rows.leaves(), b.rows.leaves());
        assert_eq!(a.columns.leaves(), b.columns.leaves());
        assert_eq!(a.columns.leaves().len(), 4);
    }

    #[test]
    fn constant_column_is_present_everywhere() {
        // 3,0,5 / 0,0,2 / 4,0,0: the middle column scales to NaN
        let values = array![[3.0, 0.0, 5.0], [0.0, 0.0, 2.0], [4.0, 0.0, 0.0]];
        let clustering = cluster(&values, Metric::Dice, Method::Complete).unwrap();
        assert!(clustering.scaled.column(1).iter().all(|v| v.is_nan()));

        let mut rows = clustering.rows.leaves().to_vec();
        rows.sort_unstable();
        assert_eq!(rows, vec![0, 1, 2]);
        assert_eq!(clustering.columns.leaves().len(), 3);
        // the all-NaN column is present in every row, like the all-present one
        assert!(clustering.columns.max_height() > 0.0);
    }

    #[test]
    fn negative_value_fails_clustering() {
        let values = array![[1.0, 2.0], [-1.0, 3.0]];
        assert!(matches!(
            cluster(&values, Metric::Dice, Method::Complete),
            Err(ClusterError::OutOfDomain { row: 1, column: 0, .. })
        ));
    }
}
