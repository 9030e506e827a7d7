use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::vertex::{NORMAL, POSITION, TEXCOORD};
use super::{MeshError, PolygonMesh, VertexData};

/// Writes position, normal and texture coordinate data as OBJ. Other
/// attributes are ignored. Faces index positions only.
///
/// The text is assembled before anything is written, so a vertex with a
/// short normal or texcoord leaves `writer` untouched.
pub fn export_obj<V, W>(mesh: &PolygonMesh<V>, mut writer: W) -> Result<(), MeshError>
where
    V: VertexData,
    W: Write,
{
    let vertices = mesh.vertices();
    if vertices.is_empty() {
        return Ok(());
    }

    let mut out = String::new();

    for v in vertices.iter().filter(|v| v.has_data(POSITION)) {
        out.push_str("v ");
        for x in v.get_data(POSITION)? {
            out.push_str(&format!("{:?} ", x));
        }
        out.push('\n');
    }

    write_vectors(&mut out, vertices, "vn", NORMAL)?;
    write_vectors(&mut out, vertices, "vt", TEXCOORD)?;

    for polygon in mesh.polygons() {
        out.push_str("f ");
        for i in polygon {
            out.push_str(&format!("{} ", i + 1));
        }
        out.push('\n');
    }

    writer.write_all(out.as_bytes())?;
    writer.flush()?;
    Ok(())
}

pub fn save_obj<V, P>(mesh: &PolygonMesh<V>, path: P) -> Result<(), MeshError>
where
    V: VertexData,
    P: AsRef<Path>,
{
    let file = File::create(path.as_ref())?;
    log::debug!("Writing OBJ mesh to {}", path.as_ref().display());
    export_obj(mesh, BufWriter::new(file))
}

fn write_vectors<V: VertexData>(
    out: &mut String,
    vertices: &[V],
    tag: &str,
    name: &'static str,
) -> Result<(), MeshError> {
    for v in vertices.iter().filter(|v| v.has_data(name)) {
        let data = v.get_data(name)?;
        if data.len() < 3 {
            return Err(MeshError::TooFewComponents {
                name,
                len: data.len(),
            });
        }
        out.push_str(tag);
        out.push(' ');
        for x in &data[..3] {
            out.push_str(&format!("{:?} ", x));
        }
        out.push('\n');
    }
    Ok(())
}
