use plotters::prelude::*;

use super::heatmap::{paint_flat, Look};
use super::{Figure, HeatGrid, Result};
use crate::config::{
    CORRELATION_ANNOT_PT, CORRELATION_CELL_INCHES, CORRELATION_FIGSIZE, CORRELATION_LINE_PT,
    CORRELATION_TICK_PT,
};
use crate::data::model::CorrelationMatrix;

pub const CORRELATION_LOOK: Look = Look {
    figsize: CORRELATION_FIGSIZE,
    cell_inches: CORRELATION_CELL_INCHES,
    tick_pt: CORRELATION_TICK_PT,
    annot_pt: Some(CORRELATION_ANNOT_PT),
    line_pt: CORRELATION_LINE_PT,
    line_color: WHITE,
    cbar_aspect: 20,
};

/// Lower triangle and diagonal of the correlation matrix; the rest is masked.
pub fn correlation_grid(corr: &CorrelationMatrix) -> HeatGrid {
    HeatGrid {
        row_labels: corr.labels.clone(),
        col_labels: corr.labels.clone(),
        values: corr.values.clone(),
        mask: Some(corr.upper_mask()),
    }
}

/// Annotated lower-triangle heatmap of pairwise column correlations.
pub fn render_correlation(corr: &CorrelationMatrix) -> Result<Figure> {
    paint_flat(
        &correlation_grid(corr),
        &CORRELATION_LOOK,
        "correlation matrix has no finite cells",
    )
}
