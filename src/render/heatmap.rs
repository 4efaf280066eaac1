use plotters::prelude::*;
use plotters::style::text_anchor::HPos;

use super::{
    colorbar_labels, draw_cells, draw_col_labels, draw_colorbar, draw_row_labels, label_extent,
    pt, px, Figure, GridStyle, HeatGrid, RenderError, Result,
};
use crate::color::ColorScale;
use crate::config::{
    HEATMAP_ANNOT_PT, HEATMAP_CELL_INCHES, HEATMAP_FIGSIZE, HEATMAP_LINE_PT, HEATMAP_TICK_PT,
};
use crate::data::model::Table;

/// Colour bar height relative to the grid.
const CBAR_SHRINK: u32 = 2;

/// Fixed styling of a flat (unclustered) heatmap figure.
#[derive(Debug, Clone, Copy)]
pub struct Look {
    /// Largest canvas (width, height) in inches; also sets the wide aspect.
    pub figsize: (f64, f64),
    /// Preferred cell side; cells shrink below it to fit `figsize`.
    pub cell_inches: f64,
    pub tick_pt: f64,
    /// Annotation size; `None` leaves cells unlabelled.
    pub annot_pt: Option<f64>,
    pub line_pt: f64,
    pub line_color: RGBColor,
    /// Colour bar height / width.
    pub cbar_aspect: u32,
}

pub const HEATMAP_LOOK: Look = Look {
    figsize: HEATMAP_FIGSIZE,
    cell_inches: HEATMAP_CELL_INCHES,
    tick_pt: HEATMAP_TICK_PT,
    annot_pt: Some(HEATMAP_ANNOT_PT),
    line_pt: HEATMAP_LINE_PT,
    line_color: BLACK,
    cbar_aspect: 50,
};

/// The full table in input order, nothing masked.
pub fn heatmap_grid(table: &Table) -> HeatGrid {
    HeatGrid {
        row_labels: table.row_labels().to_vec(),
        col_labels: table.column_labels().to_vec(),
        values: table.values().clone(),
        mask: None,
    }
}

/// Pixel placement of every heatmap element.
#[derive(Debug, Clone, Copy)]
pub struct HeatmapLayout {
    pub width: u32,
    pub height: u32,
    pub grid: GridStyle,
    pub colorbar: [(i32, i32); 2],
    pub tick_px: u32,
    pub label_pad: i32,
}

/// Square cells inside a canvas no larger than `look.figsize`.
///
/// The canvas is at least as wide as the figure-size aspect makes it, with
/// the colour bar pinned to its right edge.
pub fn heatmap_layout(grid: &HeatGrid, scale: &ColorScale, look: &Look) -> HeatmapLayout {
    let (max_w, max_h) = (px(look.figsize.0), px(look.figsize.1));
    let aspect = look.figsize.0 / look.figsize.1;
    let tick_px = pt(look.tick_pt);
    let margin = px(0.2);
    let pad = px(0.1);
    let cbar_gap = px(0.3);
    let cbar_min_w = px(0.12);

    let row_label_w = label_extent(&grid.row_labels, tick_px);
    let col_label_h = label_extent(&grid.col_labels, tick_px);
    let cbar_label_w = label_extent(&colorbar_labels(scale), tick_px);

    // widest the colour bar block can get, reserved before sizing cells
    let cbar_w_max = (max_h / CBAR_SHRINK / look.cbar_aspect.max(1)).max(cbar_min_w);
    let left = margin + row_label_w + pad;
    let avail_w =
        max_w.saturating_sub(left + cbar_gap + cbar_w_max * 3 / 2 + cbar_label_w + margin);
    let avail_h = max_h.saturating_sub(2 * margin + pad + col_label_h);
    let cell = px(look.cell_inches)
        .min(avail_w / grid.n_cols().max(1) as u32)
        .min(avail_h / grid.n_rows().max(1) as u32)
        .max(1);

    let style = GridStyle {
        origin: (left as i32, margin as i32),
        cell_w: cell,
        cell_h: cell,
        line_px: pt(look.line_pt).max(1).min(cell / 4),
        line_color: look.line_color,
        annot_px: look.annot_pt.map(pt),
    };
    let grid_w = style.width(grid);
    let grid_h = style.height(grid);

    let cbar_h = (grid_h / CBAR_SHRINK).max(cell);
    let cbar_w = (cbar_h / look.cbar_aspect.max(1)).max(cbar_min_w);
    let cbar_block = cbar_w + cbar_w / 2 + cbar_label_w + margin;

    let height = (margin + grid_h + pad + col_label_h + margin).min(max_h);
    let natural_w = left + grid_w + cbar_gap + cbar_block;
    let width = natural_w
        .max((height as f64 * aspect).round() as u32)
        .min(max_w);

    let cbar_x = width.saturating_sub(cbar_block) as i32;
    let cbar_y = style.origin.1 + ((grid_h - cbar_h.min(grid_h)) / 2) as i32;

    HeatmapLayout {
        width,
        height,
        grid: style,
        colorbar: [
            (cbar_x, cbar_y),
            (cbar_x + cbar_w as i32, cbar_y + cbar_h as i32),
        ],
        tick_px,
        label_pad: pad as i32,
    }
}

/// Draw `grid` with row labels on the left, column labels below and a colour bar.
pub fn paint_flat(grid: &HeatGrid, look: &Look, what: &'static str) -> Result<Figure> {
    let scale = grid.color_scale().ok_or(RenderError::NoData(what))?;
    let layout = heatmap_layout(grid, &scale, look);
    let style = &layout.grid;

    Figure::draw(layout.width, layout.height, |area| {
        draw_cells(area, grid, style, &scale)?;
        draw_row_labels(
            area,
            &grid.row_labels,
            style.origin.0 - layout.label_pad,
            style,
            layout.tick_px,
            HPos::Right,
        )?;
        let below = style.origin.1 + style.height(grid) as i32 + layout.label_pad;
        draw_col_labels(area, &grid.col_labels, below, style, layout.tick_px)?;
        draw_colorbar(area, &scale, layout.colorbar, layout.tick_px)
    })
}

/// Annotated heatmap of the whole table with black cell borders.
pub fn render_heatmap(table: &Table) -> Result<Figure> {
    paint_flat(&heatmap_grid(table), &HEATMAP_LOOK, "heatmap has no finite cells")
}
