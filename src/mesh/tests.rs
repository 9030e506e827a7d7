use super::*;
use approx::assert_relative_eq;
use assert_fs::prelude::*;
use glam::{Vec3, Vec4};
use std::collections::HashMap;

fn vertex_at(x: f32, y: f32, z: f32) -> Vertex {
    let mut v = Vertex::default();
    v.set_data("position", &[x, y, z]).unwrap();
    v
}

fn triangle_mesh(points: &[[f32; 3]], indices: Vec<u32>) -> PolygonMesh<Vertex> {
    let vertices = points.iter().map(|p| vertex_at(p[0], p[1], p[2])).collect();
    PolygonMesh::from_parts(vertices, indices, PrimitiveType::Triangles, 3).unwrap()
}

fn normal_of(v: &Vertex) -> Vec3 {
    v.normal.truncate()
}

// Vertex that stores whatever it is given, for checking the mesh code
// against attribute widths the built-in vertices never produce.
#[derive(Debug, Clone, Default)]
struct LooseVertex {
    data: HashMap<String, Vec<f32>>,
}

impl VertexData for LooseVertex {
    fn has_data(&self, name: &str) -> bool {
        self.data.contains_key(name)
    }

    fn get_data(&self, name: &str) -> Result<Vec<f32>, MeshError> {
        self.data
            .get(name)
            .cloned()
            .ok_or_else(|| MeshError::UnknownAttribute(name.to_string()))
    }

    fn set_data(&mut self, name: &str, data: &[f32]) -> Result<(), MeshError> {
        self.data.insert(name.to_string(), data.to_vec());
        Ok(())
    }

    fn attribute_names(&self) -> &'static [&'static str] {
        &["position", "normal", "texcoord"]
    }
}

#[test]
fn test_vertex_unknown_attribute() {
    let mut v = Vertex::default();
    assert!(!v.has_data("color"));
    assert!(matches!(v.get_data("color"), Err(MeshError::UnknownAttribute(name)) if name == "color"));
    assert!(v.set_data("color", &[1.0, 0.0, 0.0]).is_err());

    let c = ColorVertex::default();
    assert!(!c.has_data("normal"));
    assert!(c.get_data("normal").is_err());
}

#[test]
fn test_vertex_set_pads_with_defaults() {
    let mut v = Vertex::default();
    v.set_data("position", &[2.0, 3.0]).unwrap();
    assert_eq!(v.get_data("position").unwrap(), vec![2.0, 3.0, 0.0, 1.0]);

    v.set_data("normal", &[0.0, 1.0, 0.0]).unwrap();
    assert_eq!(v.get_data("normal").unwrap(), vec![0.0, 1.0, 0.0, 0.0]);

    // Overwriting replaces the whole value
    v.set_data("position", &[5.0]).unwrap();
    assert_eq!(v.position, Vec4::new(5.0, 0.0, 0.0, 1.0));
}

#[test]
fn test_vertex_rejects_bad_lengths() {
    let mut v = ColorVertex::default();
    assert!(matches!(
        v.set_data("color", &[0.0; 5]),
        Err(MeshError::AttributeLength { len: 5, .. })
    ));
    assert!(matches!(
        v.set_data("position", &[]),
        Err(MeshError::AttributeLength { len: 0, .. })
    ));
    assert_eq!(v, ColorVertex::default(), "failed set must not modify the vertex");
}

#[test]
fn test_bounding_box() {
    let mesh = triangle_mesh(&[[-1.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 2.0, 0.0]], vec![0, 1, 2]);

    let min = mesh.min_bounds();
    let max = mesh.max_bounds();
    assert_eq!(min.truncate(), Vec3::new(-1.0, 0.0, 0.0));
    assert_eq!(max.truncate(), Vec3::new(1.0, 2.0, 0.0));
    assert_eq!(mesh.bounding_box().extent(), Vec3::new(2.0, 2.0, 0.0));
}

#[test]
fn test_bounding_box_follows_vertex_data() {
    let mut mesh = triangle_mesh(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]], vec![0, 1, 2]);
    mesh.set_vertex_data(vec![
        vertex_at(-3.0, -3.0, -3.0),
        vertex_at(3.0, 0.0, 1.0),
        vertex_at(0.0, 4.0, 0.0),
    ])
    .unwrap();

    assert_eq!(mesh.min_bounds().truncate(), Vec3::new(-3.0, -3.0, -3.0));
    assert_eq!(mesh.max_bounds().truncate(), Vec3::new(3.0, 4.0, 1.0));
}

#[test]
fn test_empty_mesh() {
    let mut mesh: PolygonMesh<Vertex> = PolygonMesh::new();
    mesh.compute_bounding_box();
    mesh.compute_normals().unwrap();
    assert_eq!(mesh.vertex_count(), 0);
    assert_eq!(mesh.primitive_count(), 0);
    assert_eq!(mesh.bounding_box(), BoundingBox::default());
}

#[test]
fn test_compute_normals_triangle() {
    let mut mesh = triangle_mesh(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]], vec![0, 1, 2]);
    mesh.compute_normals().unwrap();

    for v in mesh.vertices() {
        let n = normal_of(v);
        assert_relative_eq!(n.x, 0.0);
        assert_relative_eq!(n.y, 0.0);
        assert_relative_eq!(n.z, 1.0);
        assert_eq!(v.normal.w, 0.0);
    }
}

#[test]
fn test_compute_normals_quad_primitive() {
    let vertices = vec![
        vertex_at(0.0, 0.0, 0.0),
        vertex_at(0.0, 0.0, 1.0),
        vertex_at(1.0, 0.0, 1.0),
        vertex_at(1.0, 0.0, 0.0),
    ];
    let mut mesh =
        PolygonMesh::from_parts(vertices, vec![0, 1, 2, 3], PrimitiveType::Triangles, 4).unwrap();
    mesh.compute_normals().unwrap();

    for v in mesh.vertices() {
        assert!(normal_of(v).abs_diff_eq(Vec3::Y, 1e-6), "got {:?}", v.normal);
    }
}

#[test]
fn test_compute_normals_sums_unit_face_normals() {
    // Two faces of a unit cube sharing an edge: +Z face and +X face
    let vertices = vec![
        vertex_at(1.0, 0.0, 1.0),
        vertex_at(1.0, 1.0, 1.0),
        vertex_at(0.0, 0.0, 1.0),
        vertex_at(1.0, 0.0, 0.0),
    ];
    let mut mesh = PolygonMesh::from_parts(
        vertices,
        vec![2, 0, 1, 0, 3, 1],
        PrimitiveType::Triangles,
        3,
    )
    .unwrap();
    mesh.compute_normals().unwrap();

    let shared = normal_of(&mesh.vertices()[0]);
    let expected = Vec3::new(1.0, 0.0, 1.0).normalize();
    assert!(shared.abs_diff_eq(expected, 1e-6), "got {:?}", shared);
    assert!(normal_of(&mesh.vertices()[2]).abs_diff_eq(Vec3::Z, 1e-6));
    assert!(normal_of(&mesh.vertices()[3]).abs_diff_eq(Vec3::X, 1e-6));
}

#[test]
fn test_degenerate_triangle_gives_zero_normal() {
    let mut mesh = triangle_mesh(&[[0.0, 0.0, 0.0], [1.0, 1.0, 1.0], [2.0, 2.0, 2.0]], vec![0, 1, 2]);
    mesh.compute_normals().unwrap();

    for v in mesh.vertices() {
        assert_eq!(v.normal, Vec4::ZERO);
        assert!(!v.normal.is_nan());
    }
}

#[test]
fn test_compute_normals_without_normal_slot_is_noop() {
    let vertices = vec![
        ColorVertex::new(Vec4::new(0.0, 0.0, 0.0, 1.0), Vec4::ONE),
        ColorVertex::new(Vec4::new(1.0, 0.0, 0.0, 1.0), Vec4::ONE),
        ColorVertex::new(Vec4::new(0.0, 1.0, 0.0, 1.0), Vec4::ONE),
    ];
    let mut mesh =
        PolygonMesh::from_parts(vertices.clone(), vec![0, 1, 2], PrimitiveType::Triangles, 3).unwrap();
    mesh.compute_normals().unwrap();
    assert_eq!(mesh.vertices(), vertices.as_slice());
}

#[test]
fn test_set_primitives_rejects_partial_primitive() {
    let mut mesh = triangle_mesh(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]], vec![0, 1, 2]);
    let result = mesh.set_primitives(vec![0, 1, 2, 0], PrimitiveType::Triangles, 3);
    assert!(matches!(result, Err(MeshError::PartialPrimitive { len: 4, size: 3 })));
    assert_eq!(mesh.primitives(), &[0, 1, 2], "failed set must keep the old indices");

    assert!(matches!(
        mesh.set_primitives(vec![], PrimitiveType::Triangles, 0),
        Err(MeshError::ZeroPrimitiveSize)
    ));
}

#[test]
fn test_set_primitives_rejects_out_of_range_index() {
    let mut mesh = triangle_mesh(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]], vec![0, 1, 2]);
    let result = mesh.set_primitives(vec![0, 1, 3], PrimitiveType::Triangles, 3);
    assert!(matches!(
        result,
        Err(MeshError::IndexOutOfRange { index: 3, vertex_count: 3 })
    ));
}

#[test]
fn test_set_vertex_data_keeps_indices_valid() {
    let mut mesh = triangle_mesh(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]], vec![0, 1, 2]);
    let result = mesh.set_vertex_data(vec![vertex_at(0.0, 0.0, 0.0)]);
    assert!(result.is_err());
    assert_eq!(mesh.vertex_count(), 3);
}

#[test]
fn test_fan_and_strip_polygons() {
    let vertices: Vec<Vertex> = (0..5).map(|i| vertex_at(i as f32, 0.0, 0.0)).collect();

    // Fans may hold any number of indices
    let fan = PolygonMesh::from_parts(vertices.clone(), vec![0, 1, 2, 3, 4], PrimitiveType::TriangleFan, 3)
        .unwrap();
    assert_eq!(fan.polygons(), vec![vec![0, 1, 2], vec![0, 2, 3], vec![0, 3, 4]]);
    assert_eq!(fan.primitive_count(), 3);
    assert_eq!(fan.index_count(), 5);

    let strip = PolygonMesh::from_parts(vertices, vec![0, 1, 2, 3], PrimitiveType::TriangleStrip, 3)
        .unwrap();
    assert_eq!(strip.polygons(), vec![vec![0, 1, 2], vec![2, 1, 3]]);
}

#[test]
fn test_fan_normals() {
    let vertices = vec![
        vertex_at(0.0, 0.0, 0.0),
        vertex_at(1.0, 0.0, 0.0),
        vertex_at(0.0, 1.0, 0.0),
        vertex_at(-1.0, 0.0, 0.0),
    ];
    let mut mesh =
        PolygonMesh::from_parts(vertices, vec![0, 1, 2, 3], PrimitiveType::TriangleFan, 3).unwrap();
    mesh.compute_normals().unwrap();
    for v in mesh.vertices() {
        assert!(normal_of(v).abs_diff_eq(Vec3::Z, 1e-6));
    }
}

#[test]
fn test_import_quad_as_fan() {
    let src = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 1
vn 0 0 1
vn 0 0 1
vn 0 0 1
f 1/1/1 2/2/2 3/3/3 4/4/4
";
    let mesh = import_obj(src.as_bytes(), Vertex::default, false).unwrap();

    assert_eq!(mesh.primitives(), &[0, 1, 2, 0, 2, 3]);
    assert_eq!(mesh.primitive_type(), PrimitiveType::Triangles);
    assert_eq!(mesh.primitive_size(), 3);
    assert_eq!(mesh.vertices()[2].tex_coords, Vec4::new(1.0, 1.0, 0.0, 1.0));
    assert_eq!(mesh.vertices()[3].normal, Vec4::new(0.0, 0.0, 1.0, 0.0));
}

#[test]
fn test_import_reports_line_number() {
    let src = "# a comment\n\nv 1.0 2.0\n";
    let err = import_obj(src.as_bytes(), Vertex::default, false).unwrap_err();
    match err {
        MeshError::Format { line, .. } => assert_eq!(line, 3),
        other => panic!("expected a format error, got {:?}", other),
    }
    assert!(err_message(src).starts_with("Line 3:"));
}

fn err_message(src: &str) -> String {
    import_obj(src.as_bytes(), Vertex::default, false)
        .unwrap_err()
        .to_string()
}

#[test]
fn test_import_format_errors() {
    let cases = [
        ("v 1 2 3 4 5 6 7\n", 1),
        ("v 1 2 3\nvt 0\n", 2),
        ("v 1 2 3\nvn 0 1\n", 2),
        ("v 1 2 3\nv 2 3 4\nf 1 2\n", 3),
        ("v 1 2 3\nv x 3 4\n", 2),
        ("v 1 2 3\nv 2 3 4\nv 3 4 5\nf 1 2 4\n", 4),
        ("v 1 2 3\nv 2 3 4\nv 3 4 5\nf 0 1 2\n", 4),
        ("v 1 2 3\nv 2 3 4\nv 3 4 5\nf 1/1/1/1 2 3\n", 4),
        ("v 1 2 3\nv 2 3 4\nv 3 4 5\nvt 0 0\nf 1/1 2 3\n", 5),
    ];
    for (src, expected_line) in cases {
        match import_obj(src.as_bytes(), Vertex::default, false) {
            Err(MeshError::Format { line, .. }) => {
                assert_eq!(line, expected_line, "wrong line for {:?}", src)
            }
            other => panic!("expected a format error for {:?}, got {:?}", src, other),
        }
    }
}

#[test]
fn test_import_invalid_utf8_reports_line() {
    let src: &[u8] = b"v 0 0 0\nv 1 0 0\n# caf\xe9\nv 0 1 0\nf 1 2 3\n";
    match import_obj(src, Vertex::default, false) {
        Err(MeshError::Format { line, .. }) => assert_eq!(line, 3),
        other => panic!("expected a format error on line 3, got {:?}", other),
    }
}

#[test]
fn test_import_homogeneous_vertex() {
    let src = "v 2 4 6 2\nv 1 1 1 0\nv 0 0 0\nf 1 2 3\n";
    let mesh = import_obj(src.as_bytes(), Vertex::default, false).unwrap();
    assert_eq!(mesh.vertices()[0].position, Vec4::new(1.0, 2.0, 3.0, 1.0));
    // A zero w is left alone
    assert_eq!(mesh.vertices()[1].position, Vec4::new(1.0, 1.0, 1.0, 1.0));
}

#[test]
fn test_import_negative_indices_and_ignored_records() {
    let src = "\
mtllib scene.mtl
o square
v 0 0 0
v 1 0 0
v 1 1 0
usemtl red
s off
f -3 -2 -1
";
    let mesh = import_obj(src.as_bytes(), Vertex::default, false).unwrap();
    assert_eq!(mesh.primitives(), &[0, 1, 2]);
}

#[test]
fn test_import_computes_missing_normals() {
    let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 1 0 0\nf 1//1 2//1 3//1\n";
    let mesh = import_obj(src.as_bytes(), Vertex::default, false).unwrap();

    // One normal for three vertices is not enough, so they are recomputed
    for v in mesh.vertices() {
        assert!(normal_of(v).abs_diff_eq(Vec3::Z, 1e-6), "got {:?}", v.normal);
    }
}

#[test]
fn test_import_normalizes_normals() {
    let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 5\nvn 0 3 0\nvn 2 0 0\nf 1 2 3\n";
    let mesh = import_obj(src.as_bytes(), Vertex::default, false).unwrap();
    assert_eq!(mesh.vertices()[0].normal, Vec4::new(0.0, 0.0, 1.0, 0.0));
    assert_eq!(mesh.vertices()[1].normal, Vec4::new(0.0, 1.0, 0.0, 0.0));
    assert_eq!(mesh.vertices()[2].normal, Vec4::new(1.0, 0.0, 0.0, 0.0));
}

#[test]
fn test_import_into_color_vertices() {
    let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nvt 1 0\nvt 0 1\nf 1 2 3\n";
    let mesh = import_obj(src.as_bytes(), || ColorVertex::new(Vec4::W, Vec4::ONE), false).unwrap();
    assert_eq!(mesh.vertices()[1].position, Vec4::new(1.0, 0.0, 0.0, 1.0));
    assert_eq!(mesh.vertices()[1].color, Vec4::ONE);
}

#[test]
fn test_import_scale_and_center() {
    let src = "v 0 0 0\nv 2 0 0\nv 2 4 0\nv 0 4 0\nf 1 2 3 4\n";
    let mesh = import_obj(src.as_bytes(), Vertex::default, true).unwrap();

    let bounds = mesh.bounding_box();
    assert_relative_eq!(bounds.min.x, -0.25);
    assert_relative_eq!(bounds.min.y, -0.5);
    assert_relative_eq!(bounds.min.z, 0.0);
    assert_relative_eq!(bounds.max.x, 0.25);
    assert_relative_eq!(bounds.max.y, 0.5);
    assert_relative_eq!(bounds.max.z, 0.0);
    assert_eq!(bounds.min.w, 1.0);
}

#[test]
fn test_scale_and_center_matrix_translates_first() {
    let positions = [Vec4::new(10.0, 10.0, 10.0, 1.0), Vec4::new(12.0, 11.0, 10.0, 1.0)];
    let m = scale_and_center_matrix(&positions).unwrap();

    // Center (11, 10.5, 10) goes to the origin, longest side 2 becomes 1
    let moved = m * positions[1];
    assert_relative_eq!(moved.x, 0.5);
    assert_relative_eq!(moved.y, 0.25);
    assert_relative_eq!(moved.z, 0.0);

    // A single point is only moved
    let mut single = [Vec4::new(3.0, 3.0, 3.0, 1.0)];
    center_and_scale(&mut single);
    assert_eq!(single[0], Vec4::W);
    assert!(scale_and_center_matrix(&[]).is_none());
}

#[test]
fn test_export_format() {
    let vertices = vec![
        ColorVertex::new(Vec4::new(0.0, 0.0, 0.0, 1.0), Vec4::ONE),
        ColorVertex::new(Vec4::new(1.5, 0.0, 0.0, 1.0), Vec4::ONE),
        ColorVertex::new(Vec4::new(0.0, -2.0, 0.0, 1.0), Vec4::ONE),
    ];
    let mesh = PolygonMesh::from_parts(vertices, vec![0, 1, 2], PrimitiveType::Triangles, 3).unwrap();

    let mut out = Vec::new();
    export_obj(&mesh, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert_eq!(
        text,
        "v 0.0 0.0 0.0 1.0 \nv 1.5 0.0 0.0 1.0 \nv 0.0 -2.0 0.0 1.0 \nf 1 2 3 \n"
    );
}

#[test]
fn test_export_writes_normals_and_texcoords() {
    let mut mesh = triangle_mesh(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]], vec![0, 1, 2]);
    mesh.compute_normals().unwrap();

    let mut out = Vec::new();
    export_obj(&mesh, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();

    assert_eq!(text.lines().filter(|l| l.starts_with("v ")).count(), 3);
    assert_eq!(text.lines().filter(|l| l.starts_with("vn ")).count(), 3);
    assert_eq!(text.lines().filter(|l| l.starts_with("vt ")).count(), 3);
    assert!(text.contains("vn 0.0 0.0 1.0 \n"));
}

#[test]
fn test_export_empty_mesh() {
    let mesh: PolygonMesh<Vertex> = PolygonMesh::new();
    let mut out = Vec::new();
    export_obj(&mesh, &mut out).unwrap();
    assert!(out.is_empty());
}

#[test]
fn test_export_rejects_short_normal() {
    let mut v = LooseVertex::default();
    v.set_data("position", &[0.0, 0.0, 0.0]).unwrap();
    v.set_data("normal", &[0.0, 1.0]).unwrap();
    let mesh = PolygonMesh::from_parts(vec![v], vec![], PrimitiveType::Triangles, 3).unwrap();

    let mut out = Vec::new();
    let result = export_obj(&mesh, &mut out);
    assert!(matches!(result, Err(MeshError::TooFewComponents { name: "normal", len: 2 })));
    assert!(out.is_empty());
}

#[test]
fn test_bounding_box_of_short_positions() {
    let mut a = LooseVertex::default();
    a.set_data("position", &[-2.0, 5.0]).unwrap();
    let mut b = LooseVertex::default();
    b.set_data("position", &[4.0]).unwrap();

    let mut mesh = PolygonMesh::new();
    mesh.set_vertex_data(vec![a, b]).unwrap();
    assert_eq!(mesh.min_bounds(), Vec4::new(-2.0, 0.0, 0.0, 1.0));
    assert_eq!(mesh.max_bounds(), Vec4::new(4.0, 5.0, 0.0, 1.0));
}

#[test]
fn test_obj_file_round_trip() {
    let mesh = triangle_mesh(
        &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.25], [0.0, 1.0, -0.125]],
        vec![0, 1, 2, 0, 2, 3],
    );

    let temp = assert_fs::TempDir::new().unwrap();
    let file = temp.child("quad.obj");
    save_obj(&mesh, file.path()).unwrap();
    let text = std::fs::read_to_string(file.path()).unwrap();
    assert!(text.starts_with("v 0.0 0.0 0.0 1.0 \n"), "unexpected output: {}", text);
    assert!(text.contains("f 1 3 4 \n"));

    let loaded: PolygonMesh<Vertex> = load_obj(file.path(), Vertex::default, false).unwrap();
    assert_eq!(loaded.primitives(), mesh.primitives());
    assert_eq!(loaded.vertex_count(), mesh.vertex_count());
    for (a, b) in loaded.vertices().iter().zip(mesh.vertices()) {
        assert_relative_eq!(a.position.x, b.position.x);
        assert_relative_eq!(a.position.y, b.position.y);
        assert_relative_eq!(a.position.z, b.position.z);
        assert_relative_eq!(a.position.w, b.position.w);
    }
}

#[test]
fn test_load_missing_file() {
    let temp = assert_fs::TempDir::new().unwrap();
    let result = load_obj(temp.path().join("missing.obj"), Vertex::default, false);
    assert!(matches!(result, Err(MeshError::Io(_))));
}
