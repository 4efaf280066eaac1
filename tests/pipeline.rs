use std::fs;
use std::path::{Path, PathBuf};

use protein_eda::cluster::ClusterError;
use protein_eda::config::{CLUSTERMAP_FILE, CORRELATION_FILE, HEATMAP_FILE};
use protein_eda::data::loader::LoadError;
use protein_eda::render::RenderError;

const SMALL_TABLE: &str = "\
protein,S1,S2,S3,S4
P1,1,8,3,12
P2,5,2,9,4
P3,7,6,1,10
";

fn write_input(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, text).unwrap();
    path
}

fn pngs_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|n| n.ends_with(".png"))
        .collect();
    names.sort();
    names
}

#[test]
fn small_table_produces_three_images() {
    let input_dir = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    let input = write_input(input_dir.path(), "input.csv", SMALL_TABLE);

    let mut console = Vec::<u8>::new();
    let written = protein_eda::run(&input, out_dir.path(), &mut console).unwrap();

    let console = String::from_utf8(console).unwrap();
    assert!(console.contains("3 rows x 4 columns"), "{console}");
    assert!(console.contains("1. Generating Heatmap..."));
    assert!(console.contains("2. Generating Clustermap..."));
    assert!(console.contains("3. Generating Correlation Matrix Heatmap..."));

    assert_eq!(
        written,
        vec![
            out_dir.path().join(HEATMAP_FILE),
            out_dir.path().join(CLUSTERMAP_FILE),
            out_dir.path().join(CORRELATION_FILE),
        ]
    );
    assert_eq!(pngs_in(out_dir.path()).len(), 3);
    for path in &written {
        let size = fs::metadata(path).unwrap().len();
        assert!(size > 0, "{} is empty", path.display());
        let image = image::open(path).unwrap();
        assert!(image.width() > 0 && image.height() > 0);
    }
}

#[test]
fn heatmap_is_wider_than_tall_and_clustermap_is_roughly_square() {
    let input_dir = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    let input = write_input(input_dir.path(), "input.csv", SMALL_TABLE);
    protein_eda::run(&input, out_dir.path(), &mut std::io::sink()).unwrap();

    let heatmap = image::open(out_dir.path().join(HEATMAP_FILE)).unwrap();
    assert!(heatmap.width() > heatmap.height());

    let clustermap = image::open(out_dir.path().join(CLUSTERMAP_FILE)).unwrap();
    let ratio = clustermap.width() as f64 / clustermap.height() as f64;
    assert!((0.5..2.0).contains(&ratio), "aspect {ratio}");
}

#[test]
fn missing_input_fails_before_any_image() {
    let out_dir = tempfile::tempdir().unwrap();
    let input = out_dir.path().join("does_not_exist.csv");

    let mut console = Vec::<u8>::new();
    let err = protein_eda::run(&input, out_dir.path(), &mut console).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<LoadError>(),
        Some(LoadError::Io { .. })
    ));
    assert!(pngs_in(out_dir.path()).is_empty());
    assert!(console.is_empty());
}

#[test]
fn non_numeric_cell_fails_before_rendering() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(
        dir.path(),
        "input.csv",
        "protein,S1,S2\nP1,1,2\nP2,3,n/a\n",
    );

    let mut console = Vec::<u8>::new();
    let err = protein_eda::run(&input, dir.path(), &mut console).unwrap_err();

    match err.downcast_ref::<LoadError>() {
        Some(LoadError::NonNumeric { line, column, value, .. }) => {
            assert_eq!(*line, 3);
            assert_eq!(column, "S2");
            assert_eq!(value, "n/a");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(pngs_in(dir.path()).is_empty());
    assert!(!String::from_utf8(console).unwrap().contains("Generating"));
}

#[test]
fn clustermap_is_identical_across_runs() {
    let input_dir = tempfile::tempdir().unwrap();
    let input = write_input(input_dir.path(), "input.csv", SMALL_TABLE);

    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    protein_eda::run(&input, first.path(), &mut std::io::sink()).unwrap();
    protein_eda::run(&input, second.path(), &mut std::io::sink()).unwrap();

    for name in [CLUSTERMAP_FILE, CORRELATION_FILE] {
        let a = fs::read(first.path().join(name)).unwrap();
        let b = fs::read(second.path().join(name)).unwrap();
        assert!(a == b, "{name} differs between runs");
    }
}

#[test]
fn tall_table_still_gives_wide_figures() {
    let input_dir = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    let input = write_input(
        input_dir.path(),
        "input.csv",
        "protein,S1,S2,S3\nP1,1,8,3\nP2,5,2,9\nP3,7,6,1\nP4,2,9,4\nP5,8,1,6\nP6,4,5,7\n",
    );
    protein_eda::run(&input, out_dir.path(), &mut std::io::sink()).unwrap();

    for name in [HEATMAP_FILE, CORRELATION_FILE] {
        let image = image::open(out_dir.path().join(name)).unwrap();
        assert!(
            image.width() > image.height(),
            "{name} is {}x{}",
            image.width(),
            image.height()
        );
    }
}

#[test]
fn images_are_tagged_300_dpi() {
    let input_dir = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    let input = write_input(input_dir.path(), "input.csv", SMALL_TABLE);
    let written = protein_eda::run(&input, out_dir.path(), &mut std::io::sink()).unwrap();

    for path in &written {
        let reader = png::Decoder::new(fs::File::open(path).unwrap())
            .read_info()
            .unwrap();
        let dims = reader.info().pixel_dims.unwrap();
        assert_eq!(dims.unit, png::Unit::Meter);
        let dpi = (dims.xppu as f64 * 0.0254).round();
        assert_eq!(dpi, 300.0, "{}", path.display());
        assert_eq!(dims.xppu, dims.yppu);
    }
}

#[test]
fn constant_column_is_clustered() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(
        dir.path(),
        "input.csv",
        "protein,S1,S2,S3\nP1,3,0,5\nP2,0,0,2\nP3,4,0,0\n",
    );

    protein_eda::run(&input, dir.path(), &mut std::io::sink()).unwrap();
    assert_eq!(
        pngs_in(dir.path()),
        vec![
            CLUSTERMAP_FILE.to_string(),
            CORRELATION_FILE.to_string(),
            HEATMAP_FILE.to_string(),
        ]
    );
}

#[test]
fn undefined_distance_stops_at_the_clustermap() {
    let dir = tempfile::tempdir().unwrap();
    // P1 and P2 hold every column minimum, so neither has a presence
    let input = write_input(
        dir.path(),
        "input.tsv",
        "protein\tS1\tS2\nP1\t0\t0\nP2\t0\t0\nP3\t4\t2\n",
    );

    let err = protein_eda::run(&input, dir.path(), &mut std::io::sink()).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<RenderError>(),
        Some(RenderError::Cluster(ClusterError::UndefinedDistance { a: 0, b: 1, .. }))
    ));
    // fail fast: the heatmap made it to disk, nothing after the failure did
    assert_eq!(pngs_in(dir.path()), vec![HEATMAP_FILE.to_string()]);
}
