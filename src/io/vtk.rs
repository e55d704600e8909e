//! VTK output for raster node fields.
//!
//! Writes VTI (XML ImageData) files for ParaView and other VTK-compatible
//! tools, plus a PVD collection tying a sequence of snapshots to their
//! simulated times.
//!
//! # Example
//!
//! ```ignore
//! use lem_rs::io::write_vti;
//!
//! write_vti(
//!     "ridge_final.vti",
//!     &grid,
//!     &[("topographic__elevation", &elevation), ("drainage_area", &area)],
//! )?;
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::grid::RasterGrid;

/// Error type for VTK operations.
#[derive(Debug, Error)]
pub enum VtkError {
    /// I/O error during file operations.
    #[error("VTK I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A field does not have one value per grid node.
    #[error("Field '{name}' has {found} values, grid has {expected} nodes")]
    FieldLength {
        name: String,
        expected: usize,
        found: usize,
    },
}

/// Write node fields on a raster grid as a VTI file.
///
/// Node status is always included as an integer `node_status` array
/// (0 = core, 1 = fixed value, 2 = closed).
pub fn write_vti<P: AsRef<Path>>(
    path: P,
    grid: &RasterGrid,
    fields: &[(&str, &[f64])],
) -> Result<(), VtkError> {
    let n_nodes = grid.n_nodes();
    for (name, values) in fields {
        if values.len() != n_nodes {
            return Err(VtkError::FieldLength {
                name: (*name).to_string(),
                expected: n_nodes,
                found: values.len(),
            });
        }
    }

    let file = File::create(path)?;
    let mut w = BufWriter::new(file);

    let (x0, y0) = grid.origin();
    let dx = grid.spacing();
    let extent = format!("0 {} 0 {} 0 0", grid.ncols() - 1, grid.nrows() - 1);

    writeln!(w, r#"<?xml version="1.0"?>"#)?;
    writeln!(
        w,
        r#"<VTKFile type="ImageData" version="1.0" byte_order="LittleEndian">"#
    )?;
    writeln!(
        w,
        r#"  <ImageData WholeExtent="{}" Origin="{} {} 0" Spacing="{} {} 1">"#,
        extent, x0, y0, dx, dx
    )?;
    writeln!(w, r#"    <Piece Extent="{}">"#, extent)?;

    let scalars = fields.first().map(|(name, _)| *name).unwrap_or("node_status");
    writeln!(w, r#"      <PointData Scalars="{}">"#, scalars)?;

    for (name, values) in fields {
        writeln!(
            w,
            r#"        <DataArray type="Float64" Name="{}" format="ascii">"#,
            name
        )?;
        // VTK point order is x fastest, then y: identical to node order
        for chunk in values.chunks(grid.ncols()) {
            let line: Vec<String> = chunk.iter().map(|v| v.to_string()).collect();
            writeln!(w, "          {}", line.join(" "))?;
        }
        writeln!(w, "        </DataArray>")?;
    }

    writeln!(
        w,
        r#"        <DataArray type="Int32" Name="node_status" format="ascii">"#
    )?;
    for chunk in grid.status_at_node().chunks(grid.ncols()) {
        let line: Vec<String> = chunk
            .iter()
            .map(|s| (*s as i32).to_string())
            .collect();
        writeln!(w, "          {}", line.join(" "))?;
    }
    writeln!(w, "        </DataArray>")?;

    writeln!(w, "      </PointData>")?;
    writeln!(w, "    </Piece>")?;
    writeln!(w, "  </ImageData>")?;
    writeln!(w, "</VTKFile>")?;

    w.flush()?;
    Ok(())
}

/// Write a PVD collection referencing VTI snapshots.
///
/// `entries` pairs each simulated time (years) with the snapshot path.
/// Paths are written relative to the PVD file's directory when possible.
pub fn write_pvd<P: AsRef<Path>>(path: P, entries: &[(f64, PathBuf)]) -> Result<(), VtkError> {
    let path = path.as_ref();
    let base = path.parent().unwrap_or_else(|| Path::new(""));

    let file = File::create(path)?;
    let mut w = BufWriter::new(file);

    writeln!(w, r#"<?xml version="1.0"?>"#)?;
    writeln!(w, r#"<VTKFile type="Collection" version="1.0">"#)?;
    writeln!(w, "  <Collection>")?;
    for (time, snapshot) in entries {
        let rel = snapshot.strip_prefix(base).unwrap_or(snapshot);
        writeln!(
            w,
            r#"    <DataSet timestep="{}" group="" part="0" file="{}"/>"#,
            time,
            rel.display()
        )?;
    }
    writeln!(w, "  </Collection>")?;
    writeln!(w, "</VTKFile>")?;

    w.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::NodeStatus;
    use crate::types::GridShape;
    use tempfile::tempdir;

    #[test]
    fn test_write_vti_contains_fields_and_status() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("grid.vti");

        let mut grid = RasterGrid::new(GridShape::new(3, 4), 3.0);
        grid.set_status(0, NodeStatus::Closed);
        let z: Vec<f64> = (0..12).map(|i| i as f64).collect();

        write_vti(&path, &grid, &[("topographic__elevation", z.as_slice())]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains(r#"WholeExtent="0 3 0 2 0 0""#));
        assert!(content.contains(r#"Name="topographic__elevation""#));
        assert!(content.contains(r#"Name="node_status""#));
        // first row of the status array: closed, then fixed-value nodes
        assert!(content.contains("          2 1 1 1"));
    }

    #[test]
    fn test_write_vti_rejects_wrong_length() {
        let dir = tempdir().unwrap();
        let grid = RasterGrid::new(GridShape::new(3, 3), 1.0);
        let short = [1.0, 2.0];
        let err = write_vti(dir.path().join("bad.vti"), &grid, &[("z", &short[..])]).unwrap_err();
        assert!(matches!(err, VtkError::FieldLength { expected: 9, found: 2, .. }));
    }

    #[test]
    fn test_write_pvd_uses_relative_paths() {
        let dir = tempdir().unwrap();
        let entries = vec![
            (0.0, dir.path().join("step_0000.vti")),
            (2000.0, dir.path().join("step_0200.vti")),
        ];
        let pvd = dir.path().join("run.pvd");
        write_pvd(&pvd, &entries).unwrap();

        let content = std::fs::read_to_string(&pvd).unwrap();
        assert!(content.contains(r#"timestep="2000" group="" part="0" file="step_0200.vti""#));
    }
}
