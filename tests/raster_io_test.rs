//! Integration tests for raster input and model output files.
//!
//! These tests verify:
//! - ESRI ASCII DEMs load with south-first node order and centred origin
//! - A loaded DEM runs end to end and its outputs read back
//! - NODATA nodes are closed before the run

use approx::assert_relative_eq;
use lem_rs::io::{DEFAULT_NODATA, read_esri_ascii, write_esri_ascii, write_pvd, write_vti};
use lem_rs::{CrossSection, ModelParameters, NodeStatus, TimeStepDriver};
use tempfile::tempdir;

/// 7 rows × 5 columns, ridge along the middle row, north row first.
const RIDGE_ASC: &str = "\
ncols 5
nrows 7
xllcorner 1000.0
yllcorner 2000.0
cellsize 3.0
NODATA_value -9999
0 0 0 0 0
4 4.1 4 4.2 4
8 8 8.1 8 8
12 12 12 12 12
8 8.2 8 8 8
4 4 4.1 4 4
0 0 0 0 0
";

#[test]
fn test_ascii_dem_layout() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ridge.asc");
    std::fs::write(&path, RIDGE_ASC).unwrap();

    let (grid, z) = read_esri_ascii(&path).unwrap().into_grid();
    assert_eq!(grid.nrows(), 7);
    assert_eq!(grid.ncols(), 5);
    assert_eq!(grid.origin(), (1001.5, 2001.5));

    // Last file row is the southern edge
    assert_eq!(z[grid.node_at(0, 2)], 0.0);
    assert_eq!(z[grid.node_at(1, 2)], 4.1);
    assert_eq!(z[grid.node_at(5, 1)], 4.1);
    assert_eq!(z[grid.node_at(3, 4)], 12.0);
}

#[test]
fn test_loaded_dem_runs_and_writes_outputs() {
    let dir = tempdir().unwrap();
    let dem = dir.path().join("ridge.asc");
    std::fs::write(&dem, RIDGE_ASC).unwrap();

    let (grid, z) = read_esri_ascii(&dem).unwrap().into_grid();
    let params = ModelParameters::default()
        .with_stream_power(1e-4, 0.5, 1.0)
        .with_time(200.0, 10.0)
        .with_window_steps(10);
    let mut driver = TimeStepDriver::from_parameters(grid, z, params).unwrap();
    driver.run().unwrap();

    let grid = driver.grid();
    let final_asc = dir.path().join("final.asc");
    write_esri_ascii(&final_asc, grid, driver.elevation(), DEFAULT_NODATA).unwrap();
    let (reloaded_grid, reloaded) = read_esri_ascii(&final_asc).unwrap().into_grid();
    assert_eq!(reloaded_grid.origin(), grid.origin());
    for (a, b) in reloaded.iter().zip(driver.elevation()) {
        assert_relative_eq!(*a, *b);
    }

    let area = driver.drainage_area().unwrap();
    let vti = dir.path().join("final.vti");
    write_vti(
        &vti,
        grid,
        &[
            ("topographic__elevation", driver.elevation()),
            ("drainage_area", area),
            ("erosion_rate", driver.erosion_rate()),
        ],
    )
    .unwrap();
    write_pvd(dir.path().join("run.pvd"), &[(200.0, vti.clone())]).unwrap();
    let pvd = std::fs::read_to_string(dir.path().join("run.pvd")).unwrap();
    assert!(pvd.contains(r#"file="final.vti""#));

    let profile = CrossSection::middle(grid, "elevation", driver.elevation()).unwrap();
    let csv = dir.path().join("profile.csv");
    profile.write_csv(&csv).unwrap();
    let content = std::fs::read_to_string(&csv).unwrap();
    assert_eq!(content.lines().count(), 8);
    let (crest_y, _) = profile.crest().unwrap();
    assert_eq!(crest_y, grid.node_y(grid.node_at(3, 2)));
}

#[test]
fn test_nodata_nodes_are_closed_and_untouched() {
    let content = RIDGE_ASC.replace("12 12 12 12 12", "12 12 -9999 12 12");
    let raster = lem_rs::io::parse_esri_ascii(&content).unwrap();
    let nodata = raster.header.nodata;
    let (mut grid, z) = raster.into_grid();

    let params = ModelParameters::default().with_time(100.0, 10.0);
    params.boundary.apply(&mut grid);
    assert_eq!(grid.set_nodata_nodes_to_closed(&z, nodata), 1);

    let hole = grid.node_at(3, 2);
    assert_eq!(grid.status(hole), NodeStatus::Closed);

    let mut driver = TimeStepDriver::new(grid, z, params).unwrap();
    driver.run().unwrap();
    assert_eq!(driver.elevation()[hole], DEFAULT_NODATA);
    assert!(
        driver
            .elevation()
            .iter()
            .enumerate()
            .filter(|&(node, _)| node != hole)
            .all(|(_, &v)| v > -1.0)
    );
}
