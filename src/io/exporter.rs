// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! STL exporter

use crate::geometry::Mesh;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;
use stl_io::{Normal, Triangle as StlTriangle, Vertex as StlVertex};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StlEncoding {
    #[default]
    Binary,
    Ascii,
}

impl FromStr for StlEncoding {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "binary" => Ok(Self::Binary),
            "ascii" => Ok(Self::Ascii),
            other => Err(format!("unknown STL encoding '{}'", other)),
        }
    }
}

impl fmt::Display for StlEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Binary => f.write_str("binary"),
            Self::Ascii => f.write_str("ascii"),
        }
    }
}

/// Export mesh to an STL file
pub fn export_stl(mesh: &Mesh, path: impl AsRef<Path>, encoding: StlEncoding) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)
        .with_context(|| format!("Failed to create STL file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write_stl(mesh, &mut writer, encoding)
        .with_context(|| format!("Failed to write STL file: {}", path.display()))?;
    writer.flush().context("Failed to flush STL file")?;
    log::info!(
        "wrote {} triangles to {} ({})",
        mesh.triangle_count(),
        path.display(),
        encoding
    );
    Ok(())
}

/// Serialize `mesh` as STL into any writer
pub fn write_stl<W: Write>(mesh: &Mesh, writer: &mut W, encoding: StlEncoding) -> Result<()> {
    let facets = facets(mesh);
    match encoding {
        StlEncoding::Binary => {
            stl_io::write_stl(writer, facets.iter()).context("Failed to encode binary STL")?
        }
        StlEncoding::Ascii => write_ascii(writer, &facets)?,
    }
    Ok(())
}

/// Facets with unit normals from the face winding; degenerate faces get a zero normal
fn facets(mesh: &Mesh) -> Vec<StlTriangle> {
    mesh.triangles()
        .iter()
        .map(|tri| {
            let n = mesh
                .triangle_normal(tri)
                .try_normalize(f64::EPSILON)
                .unwrap_or_else(nalgebra::Vector3::zeros);
            let [v0, v1, v2] = mesh.triangle_positions(tri);
            StlTriangle {
                normal: Normal::new([n.x as f32, n.y as f32, n.z as f32]),
                vertices: [v0, v1, v2]
                    .map(|v| StlVertex::new([v.x as f32, v.y as f32, v.z as f32])),
            }
        })
        .collect()
}

fn write_ascii<W: Write>(writer: &mut W, facets: &[StlTriangle]) -> Result<()> {
    writeln!(writer, "solid solidgraph")?;
    for facet in facets {
        let n = &facet.normal;
        writeln!(writer, "  facet normal {:e} {:e} {:e}", n[0], n[1], n[2])?;
        writeln!(writer, "    outer loop")?;
        for v in &facet.vertices {
            writeln!(writer, "      vertex {:e} {:e} {:e}", v[0], v[1], v[2])?;
        }
        writeln!(writer, "    endloop")?;
        writeln!(writer, "  endfacet")?;
    }
    writeln!(writer, "endsolid solidgraph")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Primitive, Vec3};
    use std::io::Cursor;

    fn cube() -> Mesh {
        Primitive::cuboid(Vec3::repeat(2.0), Vec3::zeros(), 1.0, 0)
            .to_mesh("box")
            .unwrap()
    }

    #[test]
    fn test_binary_size() {
        let mut buffer = Vec::new();
        write_stl(&cube(), &mut buffer, StlEncoding::Binary).unwrap();
        // 80-byte header, u32 count, 50 bytes per facet
        assert_eq!(buffer.len(), 84 + 50 * 12);
    }

    #[test]
    fn test_ascii_reads_back() {
        let mut buffer = Vec::new();
        write_stl(&cube(), &mut buffer, StlEncoding::Ascii).unwrap();
        let text = String::from_utf8(buffer.clone()).unwrap();
        assert!(text.starts_with("solid solidgraph"));
        assert_eq!(text.matches("endfacet").count(), 12);

        let indexed = stl_io::read_stl(&mut Cursor::new(buffer)).unwrap();
        assert_eq!(indexed.faces.len(), 12);
    }

    #[test]
    fn test_normals_point_outwards() {
        let mesh = cube();
        for facet in facets(&mesh) {
            let centroid: [f32; 3] = std::array::from_fn(|k| {
                facet.vertices.iter().map(|v| v[k]).sum::<f32>() / 3.0
            });
            let dot: f32 = (0..3).map(|k| facet.normal[k] * centroid[k]).sum();
            assert!(dot > 0.0);
        }
    }

    #[test]
    fn test_export_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cube.stl");
        export_stl(&cube(), &path, StlEncoding::Binary).unwrap();
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 84 + 50 * 12);
    }

    #[test]
    fn test_encoding_names() {
        assert_eq!("ASCII".parse::<StlEncoding>(), Ok(StlEncoding::Ascii));
        assert!("obj".parse::<StlEncoding>().is_err());
    }
}
