use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use glam::{Mat4, Vec3, Vec4};

use super::vertex::{NORMAL, POSITION, TEXCOORD};
use super::{MeshError, PolygonMesh, PrimitiveType, VertexData};

#[derive(Debug, Default)]
struct ObjData {
    positions: Vec<Vec4>,
    tex_coords: Vec<Vec4>,
    normals: Vec<Vec4>,
    triangles: Vec<u32>,
    // Per-corner indices are checked and fanned like the positions, but the
    // mesh is built from position-indexed attributes only.
    triangle_tex_coords: Vec<u32>,
    triangle_normals: Vec<u32>,
}

impl ObjData {
    fn parse_line(&mut self, line_no: usize, line: &str) -> Result<(), MeshError> {
        if line.starts_with('#') {
            return Ok(());
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some(&tag) = tokens.first() else {
            return Ok(());
        };

        match tag {
            "v" => {
                if tokens.len() < 4 || tokens.len() > 7 {
                    return Err(MeshError::format(
                        line_no,
                        "Vertex coordinate has an invalid number of values",
                    ));
                }
                let mut p = Vec3::new(
                    parse_float(line_no, tokens[1])?,
                    parse_float(line_no, tokens[2])?,
                    parse_float(line_no, tokens[3])?,
                );
                // Legacy homogeneous form: v x y z w
                if tokens.len() == 5 {
                    let w = parse_float(line_no, tokens[4])?;
                    if w != 0.0 {
                        p /= w;
                    }
                }
                self.positions.push(p.extend(1.0));
            }
            "vt" => {
                if tokens.len() < 3 || tokens.len() > 4 {
                    return Err(MeshError::format(
                        line_no,
                        "Texture coordinate has an invalid number of values",
                    ));
                }
                let mut t = Vec4::new(
                    parse_float(line_no, tokens[1])?,
                    parse_float(line_no, tokens[2])?,
                    0.0,
                    1.0,
                );
                if tokens.len() > 3 {
                    t.z = parse_float(line_no, tokens[3])?;
                }
                self.tex_coords.push(t);
            }
            "vn" => {
                if tokens.len() != 4 {
                    return Err(MeshError::format(
                        line_no,
                        "Normal has an invalid number of values",
                    ));
                }
                let n = Vec3::new(
                    parse_float(line_no, tokens[1])?,
                    parse_float(line_no, tokens[2])?,
                    parse_float(line_no, tokens[3])?,
                );
                self.normals.push(n.normalize_or_zero().extend(0.0));
            }
            "f" => {
                if tokens.len() < 4 {
                    return Err(MeshError::format(
                        line_no,
                        "Face has too few vertices, must be at least 3",
                    ));
                }
                self.process_face(line_no, &tokens[1..])?;
            }
            _ => {}
        }
        Ok(())
    }

    fn process_face(&mut self, line_no: usize, face_tokens: &[&str]) -> Result<(), MeshError> {
        let mut verts = Vec::with_capacity(face_tokens.len());
        let mut tex = Vec::new();
        let mut norms = Vec::new();

        for vertex_str in face_tokens {
            let fields: Vec<&str> = vertex_str.split('/').collect();
            if fields.len() > 3 {
                return Err(MeshError::format(
                    line_no,
                    "Face corner has an incorrect number of values",
                ));
            }

            verts.push(resolve_index(line_no, fields[0], self.positions.len(), "vertex")?);
            if let Some(t) = fields.get(1).filter(|t| !t.is_empty()) {
                tex.push(resolve_index(line_no, t, self.tex_coords.len(), "texture")?);
            }
            if let Some(n) = fields.get(2).filter(|n| !n.is_empty()) {
                norms.push(resolve_index(line_no, n, self.normals.len(), "normal")?);
            }
        }

        if verts.len() < 3 {
            return Err(MeshError::format(line_no, "Fewer than 3 vertices for a polygon"));
        }
        if (!tex.is_empty() && tex.len() != verts.len())
            || (!norms.is_empty() && norms.len() != verts.len())
        {
            return Err(MeshError::format(
                line_no,
                "Face mixes vertices with and without texture or normal indices",
            ));
        }

        // Anything past a triangle becomes a fan around the first vertex
        for i in 2..verts.len() {
            self.triangles.extend([verts[0], verts[i - 1], verts[i]]);
            if !tex.is_empty() {
                self.triangle_tex_coords.extend([tex[0], tex[i - 1], tex[i]]);
            }
            if !norms.is_empty() {
                self.triangle_normals.extend([norms[0], norms[i - 1], norms[i]]);
            }
        }

        Ok(())
    }

    fn into_mesh<V, F>(self, producer: &mut F) -> Result<PolygonMesh<V>, MeshError>
    where
        V: VertexData,
        F: FnMut() -> V,
    {
        let attach_tex = self.tex_coords.len() == self.positions.len();
        let attach_normals = self.normals.len() == self.positions.len();

        let mut vertices = Vec::with_capacity(self.positions.len());
        for (i, position) in self.positions.iter().enumerate() {
            let mut v = producer();
            v.set_data(POSITION, &position.to_array())?;
            if attach_tex && v.has_data(TEXCOORD) {
                v.set_data(TEXCOORD, &self.tex_coords[i].to_array())?;
            }
            if attach_normals && v.has_data(NORMAL) {
                v.set_data(NORMAL, &self.normals[i].to_array())?;
            }
            vertices.push(v);
        }

        let mut mesh = PolygonMesh::new();
        mesh.set_vertex_data(vertices)?;
        mesh.set_primitives(self.triangles, PrimitiveType::Triangles, 3)?;

        if self.normals.is_empty() || !attach_normals {
            mesh.compute_normals()?;
        }

        log::debug!(
            "Imported OBJ mesh: {} vertices, {} triangles, {} texcoords, {} normals \
             ({} corner texcoord and {} corner normal references folded into positions)",
            mesh.vertex_count(),
            mesh.primitive_count(),
            self.tex_coords.len(),
            self.normals.len(),
            self.triangle_tex_coords.len(),
            self.triangle_normals.len(),
        );
        Ok(mesh)
    }
}

/// Reads an OBJ mesh. Each vertex is created with `producer` and filled with
/// whatever of position, texcoord and normal it supports.
///
/// Nothing is returned until the whole input has been read, so a malformed
/// line anywhere fails the import as a whole.
pub fn import_obj<V, R, F>(
    reader: R,
    mut producer: F,
    scale_and_center: bool,
) -> Result<PolygonMesh<V>, MeshError>
where
    V: VertexData,
    R: BufRead,
    F: FnMut() -> V,
{
    let mut obj_data = ObjData::default();

    for (i, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| match e.kind() {
            io::ErrorKind::InvalidData => MeshError::format(i + 1, "Line is not valid UTF-8"),
            _ => MeshError::Io(e),
        })?;
        obj_data.parse_line(i + 1, &line)?;
    }

    if scale_and_center {
        center_and_scale(&mut obj_data.positions);
    }

    obj_data.into_mesh(&mut producer)
}

pub fn load_obj<V, P, F>(path: P, producer: F, scale_and_center: bool) -> Result<PolygonMesh<V>, MeshError>
where
    V: VertexData,
    P: AsRef<Path>,
    F: FnMut() -> V,
{
    let file = File::open(path.as_ref())?;
    log::debug!("Loading OBJ mesh from {}", path.as_ref().display());
    import_obj(BufReader::new(file), producer, scale_and_center)
}

/// Matrix that moves the center of the points' bounding box to the origin
/// and then shrinks the longest side to length 1.
pub fn scale_and_center_matrix(positions: &[Vec4]) -> Option<Mat4> {
    let first = positions.first()?.truncate();
    let (min, max) = positions
        .iter()
        .fold((first, first), |(min, max), p| (min.min(p.truncate()), max.max(p.truncate())));

    let center = (min + max) * 0.5;
    let longest = (max - min).max_element();

    let translate = Mat4::from_translation(-center);
    if longest > 0.0 {
        Some(Mat4::from_scale(Vec3::splat(1.0 / longest)) * translate)
    } else {
        Some(translate)
    }
}

pub fn center_and_scale(positions: &mut [Vec4]) {
    if let Some(transform) = scale_and_center_matrix(positions) {
        for p in positions.iter_mut() {
            *p = transform * *p;
        }
    }
}

fn parse_float(line_no: usize, token: &str) -> Result<f32, MeshError> {
    token
        .parse::<f32>()
        .map_err(|_| MeshError::format(line_no, format!("Invalid number '{}'", token)))
}

// OBJ indices start at 1; negative ones count back from the latest element
fn resolve_index(line_no: usize, token: &str, count: usize, what: &str) -> Result<u32, MeshError> {
    let i = token
        .parse::<i64>()
        .map_err(|_| MeshError::format(line_no, format!("Invalid {} index '{}'", what, token)))?;

    let resolved = match i {
        i if i > 0 => i - 1,
        i if i < 0 => count as i64 + i,
        _ => -1,
    };

    if resolved < 0 || resolved >= count as i64 {
        return Err(MeshError::format(
            line_no,
            format!("{} index {} is out of range ({} defined)", what, i, count),
        ));
    }
    Ok(resolved as u32)
}
