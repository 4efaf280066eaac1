//! Hardcoded run parameters. There is no runtime configuration; edit and rebuild.

use crate::cluster::Metric;
use crate::color::ColorMap;

/// Matrix-style table: features as rows, samples as columns, row labels first.
pub const INPUT_FILE: &str = "input_data_table.csv";

pub const HEATMAP_FILE: &str = "heatmap.png";
pub const CLUSTERMAP_FILE: &str = "clustermap.png";
pub const CORRELATION_FILE: &str = "correlation_heatmap.png";

/// Raster resolution of every saved figure.
pub const DPI: u32 = 300;

/// Padding kept around the content when trimming, in inches.
pub const TRIM_PAD_INCHES: f64 = 0.1;

/// Sequential colour scale used by all three figures.
pub const COLOR_MAP: ColorMap = ColorMap::YlGnBu;

/// Clustermap dissimilarity and agglomeration rule.
pub const CLUSTER_METRIC: Metric = Metric::Dice;
pub const CLUSTER_LINKAGE: kodama::Method = kodama::Method::Complete;

// Canvas sizes (width, height) in inches. Cells shrink to fit inside them.

// -- heatmap --
pub const HEATMAP_FIGSIZE: (f64, f64) = (60.0, 10.0);
pub const HEATMAP_CELL_INCHES: f64 = 0.5;
pub const HEATMAP_ANNOT_PT: f64 = 8.0;
pub const HEATMAP_TICK_PT: f64 = 10.0;
pub const HEATMAP_LINE_PT: f64 = 1.0;

// -- clustermap --
pub const CLUSTERMAP_FIGSIZE: (f64, f64) = (20.0, 20.0);
pub const CLUSTERMAP_MIN_INCHES: f64 = 8.0;
pub const CLUSTERMAP_CELL_INCHES: f64 = 0.5;
pub const CLUSTERMAP_TICK_PT: f64 = 18.0;
pub const CLUSTERMAP_CBAR_TICK_PT: f64 = 16.0;
pub const CLUSTERMAP_LINE_PT: f64 = 1.0;

// -- correlation heatmap --
pub const CORRELATION_FIGSIZE: (f64, f64) = (80.0, 20.0);
pub const CORRELATION_CELL_INCHES: f64 = 0.6;
pub const CORRELATION_ANNOT_PT: f64 = 10.0;
pub const CORRELATION_TICK_PT: f64 = 14.0;
pub const CORRELATION_LINE_PT: f64 = 1.0;
