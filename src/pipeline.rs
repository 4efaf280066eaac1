use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::{
    CLUSTERMAP_FILE, CLUSTER_METRIC, COLOR_MAP, CORRELATION_FILE, DPI, HEATMAP_FILE,
};
use crate::data::loader::load_table;
use crate::data::stats::correlation;
use crate::render::{render_clustermap, render_correlation, render_heatmap, save_figure};

/// Load `input`, then render and save the three figures into `out_dir`, in order.
///
/// Progress lines go to `console`. The first error aborts the run; figures
/// already saved stay on disk.
pub fn run<W: Write>(input: &Path, out_dir: &Path, console: &mut W) -> Result<Vec<PathBuf>> {
    let table = load_table(input).with_context(|| format!("loading {}", input.display()))?;
    writeln!(
        console,
        "Data shape: {} rows x {} columns",
        table.n_rows(),
        table.n_cols()
    )?;

    let mut written = Vec::with_capacity(3);

    writeln!(console, "\n1. Generating Heatmap...")?;
    let path = out_dir.join(HEATMAP_FILE);
    let figure = render_heatmap(&table).context("rendering heatmap")?;
    save_figure(figure, &path).context("saving heatmap")?;
    written.push(path);

    writeln!(console, "\n2. Generating Clustermap...")?;
    log::info!("clustering with metric={CLUSTER_METRIC}, cmap={COLOR_MAP}, dpi={DPI}");
    let path = out_dir.join(CLUSTERMAP_FILE);
    let figure = render_clustermap(&table).context("rendering clustermap")?;
    save_figure(figure, &path).context("saving clustermap")?;
    written.push(path);

    writeln!(console, "\n3. Generating Correlation Matrix Heatmap...")?;
    let path = out_dir.join(CORRELATION_FILE);
    let corr = correlation(&table);
    let figure = render_correlation(&corr).context("rendering correlation heatmap")?;
    drop(corr);
    save_figure(figure, &path).context("saving correlation heatmap")?;
    written.push(path);

    writeln!(console, "\nAnalysis complete. Three figures saved:")?;
    for (i, path) in written.iter().enumerate() {
        let name = path.file_name().unwrap_or(path.as_os_str());
        writeln!(console, "  {}. {}", i + 1, name.to_string_lossy())?;
    }
    Ok(written)
}
