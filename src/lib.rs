//! Exploratory figures for a feature-by-sample matrix.
//!
//! Loads one delimited table (row labels in the first column) and writes an
//! annotated heatmap, a Dice/complete-linkage clustermap and a lower-triangle
//! correlation heatmap as 300 DPI PNGs.

pub mod cluster;
pub mod color;
pub mod config;
pub mod data;
pub mod pipeline;
pub mod render;

pub use pipeline::run;
