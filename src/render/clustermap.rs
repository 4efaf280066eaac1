use ndarray::Axis;
use plotters::prelude::*;
use plotters::style::text_anchor::HPos;

use super::{
    colorbar_labels, draw_cells, draw_col_labels, draw_colorbar, draw_err, draw_row_labels,
    label_extent, pt, px, Canvas, Figure, GridStyle, HeatGrid, RenderError, Result,
};
use crate::cluster::{cluster, Clustering, Dendrogram};
use crate::config::{
    CLUSTERMAP_CBAR_TICK_PT, CLUSTERMAP_CELL_INCHES, CLUSTERMAP_FIGSIZE, CLUSTERMAP_LINE_PT,
    CLUSTERMAP_MIN_INCHES, CLUSTERMAP_TICK_PT, CLUSTER_LINKAGE, CLUSTER_METRIC,
};
use crate::data::model::Table;

/// Share of the figure side taken by the heatmap.
const HEAT_SHARE: f64 = 0.6;
/// Share of the figure side taken by each dendrogram.
const DENDRO_SHARE: f64 = 0.15;

/// The standard-scaled table permuted into dendrogram order on both axes.
pub fn clustermap_grid(table: &Table, clustering: &Clustering) -> HeatGrid {
    let rows = clustering.rows.leaves();
    let cols = clustering.columns.leaves();
    HeatGrid {
        row_labels: rows.iter().map(|&i| table.row_labels()[i].clone()).collect(),
        col_labels: cols.iter().map(|&j| table.column_labels()[j].clone()).collect(),
        values: clustering
            .scaled
            .select(Axis(0), rows)
            .select(Axis(1), cols),
        mask: None,
    }
}

/// Pixel placement of every clustermap element.
#[derive(Debug, Clone, Copy)]
pub struct ClustermapLayout {
    pub side: u32,
    pub grid: GridStyle,
    /// Column dendrogram band above the grid.
    pub top: [(i32, i32); 2],
    /// Row dendrogram band left of the grid.
    pub left: [(i32, i32); 2],
    pub colorbar: [(i32, i32); 2],
    pub tick_px: u32,
    pub cbar_tick_px: u32,
    pub label_pad: i32,
}

/// Square canvas between [`CLUSTERMAP_MIN_INCHES`] and the configured figure
/// size; the heatmap and dendrograms share what labels and margins leave.
pub fn clustermap_layout(grid: &HeatGrid) -> ClustermapLayout {
    let n = grid.n_rows().max(grid.n_cols()) as f64;
    let max_side = px(CLUSTERMAP_FIGSIZE.0.min(CLUSTERMAP_FIGSIZE.1));
    let side = px(n * CLUSTERMAP_CELL_INCHES / HEAT_SHARE)
        .clamp(px(CLUSTERMAP_MIN_INCHES).min(max_side), max_side);

    let margin = px(0.2);
    let gap = px(0.05);
    let pad = px(0.1);
    let tick_px = pt(CLUSTERMAP_TICK_PT);
    let cbar_tick_px = pt(CLUSTERMAP_CBAR_TICK_PT);

    let row_label_w = label_extent(&grid.row_labels, tick_px);
    let col_label_h = label_extent(&grid.col_labels, tick_px);
    let fixed = 2 * margin + gap + pad + row_label_w.max(col_label_h);
    let shared = side.saturating_sub(fixed) as f64 / (HEAT_SHARE + DENDRO_SHARE);
    let heat = (shared * HEAT_SHARE) as u32;
    let dendro = (shared * DENDRO_SHARE) as u32;

    let style = GridStyle {
        origin: ((margin + dendro + gap) as i32, (margin + dendro + gap) as i32),
        cell_w: (heat / grid.n_cols().max(1) as u32).max(1),
        cell_h: (heat / grid.n_rows().max(1) as u32).max(1),
        line_px: pt(CLUSTERMAP_LINE_PT).max(1),
        line_color: BLACK,
        annot_px: None,
    };
    let (x0, y0) = style.origin;
    let grid_w = style.width(grid) as i32;
    let grid_h = style.height(grid) as i32;
    let band_start = margin as i32;
    let band_end = (margin + dendro) as i32;

    let cbar_w = (dendro / 8) as i32;
    ClustermapLayout {
        side,
        grid: style,
        top: [(x0, band_start), (x0 + grid_w, band_end)],
        left: [(band_start, y0), (band_end, y0 + grid_h)],
        colorbar: [(band_start, band_start), (band_start + cbar_w, band_end - gap as i32)],
        tick_px,
        cbar_tick_px,
        label_pad: pad as i32,
    }
}

/// Which way a dendrogram grows from its leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Growth {
    /// Leaves along the bottom edge, root towards the top.
    Up,
    /// Leaves along the right edge, root towards the left.
    Left,
}

fn draw_dendrogram(
    area: &Canvas<'_>,
    tree: &Dendrogram,
    band: [(i32, i32); 2],
    leaf_px: u32,
    growth: Growth,
) -> Result<()> {
    let [(x0, y0), (x1, y1)] = band;
    let max_height = tree.max_height();
    let reach = match growth {
        Growth::Up => (y1 - y0) as f64,
        Growth::Left => (x1 - x0) as f64,
    } * 0.95;
    let lift = |h: f64| {
        if max_height > 0.0 {
            (h / max_height * reach).round() as i32
        } else {
            0
        }
    };

    let stroke = pt(1.0).max(1);
    for segment in tree.segments() {
        let points: Vec<(i32, i32)> = segment
            .iter()
            .map(|&(pos, h)| {
                let along = (pos * leaf_px as f64).round() as i32;
                match growth {
                    Growth::Up => (x0 + along, y1 - lift(h)),
                    Growth::Left => (x1 - lift(h), y0 + along),
                }
            })
            .collect();
        area.draw(&PathElement::new(points, BLACK.stroke_width(stroke)))
            .map_err(draw_err)?;
    }
    Ok(())
}

/// Scale, cluster and draw the table with dendrograms on both axes.
///
/// Clustering errors (values outside the metric's domain, undefined
/// distances) surface as [`RenderError::Cluster`].
pub fn render_clustermap(table: &Table) -> Result<Figure> {
    let clustering = cluster(table.values(), CLUSTER_METRIC, CLUSTER_LINKAGE)?;
    let grid = clustermap_grid(table, &clustering);
    let scale = grid
        .color_scale()
        .ok_or(RenderError::NoData("clustermap has no finite cells"))?;
    let layout = clustermap_layout(&grid);
    let style = &layout.grid;

    Figure::draw(layout.side, layout.side, |area| {
        draw_cells(area, &grid, style, &scale)?;
        draw_dendrogram(area, &clustering.columns, layout.top, style.cell_w, Growth::Up)?;
        draw_dendrogram(area, &clustering.rows, layout.left, style.cell_h, Growth::Left)?;

        let right = style.origin.0 + style.width(&grid) as i32 + layout.label_pad;
        draw_row_labels(area, &grid.row_labels, right, style, layout.tick_px, HPos::Left)?;
        let below = style.origin.1 + style.height(&grid) as i32 + layout.label_pad;
        draw_col_labels(area, &grid.col_labels, below, style, layout.tick_px)?;

        log::debug!("clustermap colour bar ticks: {:?}", colorbar_labels(&scale));
        draw_colorbar(area, &scale, layout.colorbar, layout.cbar_tick_px)
    })
}
