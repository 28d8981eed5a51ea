//! End-to-end scenarios driven entirely through [`Kernel`], each
//! exercising a full build → validate → tessellate → resolve path the
//! way a host program would.

use cad_kernel::{BooleanOp, FeatureOperation, FeatureRefs, Kernel, ResolveOutcome};
use cad_math::{Point3, Vec3};
use cad_sketch::SketchProfile;
use cad_tessellate::TessellationParams;

struct Bbox {
    min: [f64; 3],
    max: [f64; 3],
}

fn mesh_bbox(mesh: &cad_tessellate::TriangleMesh) -> Bbox {
    let mut min = [f64::MAX; 3];
    let mut max = [f64::MIN; 3];
    for v in mesh.vertices.chunks(3) {
        for axis in 0..3 {
            min[axis] = min[axis].min(v[axis] as f64);
            max[axis] = max[axis].max(v[axis] as f64);
        }
    }
    Bbox { min, max }
}

fn mesh_volume(mesh: &cad_tessellate::TriangleMesh) -> f64 {
    let verts = &mesh.vertices;
    let mut vol = 0.0;
    for tri in mesh.indices.chunks(3) {
        let i0 = tri[0] as usize * 3;
        let i1 = tri[1] as usize * 3;
        let i2 = tri[2] as usize * 3;
        let v0 = [verts[i0] as f64, verts[i0 + 1] as f64, verts[i0 + 2] as f64];
        let v1 = [verts[i1] as f64, verts[i1 + 1] as f64, verts[i1 + 2] as f64];
        let v2 = [verts[i2] as f64, verts[i2 + 1] as f64, verts[i2 + 2] as f64];
        vol += v0[0] * (v1[1] * v2[2] - v2[1] * v1[2]) - v1[0] * (v0[1] * v2[2] - v2[1] * v0[2])
            + v2[0] * (v0[1] * v1[2] - v1[1] * v0[2]);
    }
    (vol / 6.0).abs()
}

fn mesh_surface_area(mesh: &cad_tessellate::TriangleMesh) -> f64 {
    let verts = &mesh.vertices;
    let mut area = 0.0;
    for tri in mesh.indices.chunks(3) {
        let i0 = tri[0] as usize * 3;
        let i1 = tri[1] as usize * 3;
        let i2 = tri[2] as usize * 3;
        let v0 = Vec3::new(verts[i0] as f64, verts[i0 + 1] as f64, verts[i0 + 2] as f64);
        let v1 = Vec3::new(verts[i1] as f64, verts[i1 + 1] as f64, verts[i1 + 2] as f64);
        let v2 = Vec3::new(verts[i2] as f64, verts[i2 + 1] as f64, verts[i2 + 2] as f64);
        area += (v1 - v0).cross(&(v2 - v0)).norm() * 0.5;
    }
    area
}

fn translate_box(mut body: cad_primitives::BRepBody, offset: Vec3) -> cad_primitives::BRepBody {
    for v in body.topology.vertices.values_mut() {
        v.point += offset;
    }
    for s in body.geometry.surfaces.iter_mut() {
        if let Some(p) = s.as_any().downcast_ref::<cad_geom::Plane>() {
            let mut moved = p.clone();
            moved.origin += offset;
            *s = Box::new(moved);
        }
    }
    body
}

#[test]
fn unit_cube_primitive_is_clean_and_measures_correctly() {
    let mut kernel = Kernel::new();
    let result = kernel.make_box(1.0, 1.0, 1.0, true);
    assert!(result.success);
    let body = result.body.unwrap();

    assert_eq!(body.topology.faces.len(), 6);
    assert_eq!(body.topology.edges.len(), 12);
    assert_eq!(body.topology.vertices.len(), 8);
    let shell_id = body.topology.bodies[body.body].shells[0];
    assert!(body.topology.shells[shell_id].closed);

    let report = kernel.validate(&body);
    assert!(report.is_empty(), "unexpected findings: {report:?}");

    let mesh = kernel.tessellate(&body, &TessellationParams::default());
    let bbox = mesh_bbox(&mesh);
    for axis in 0..3 {
        assert!((bbox.min[axis] + 0.5).abs() < 0.01);
        assert!((bbox.max[axis] - 0.5).abs() < 0.01);
    }
    assert!((mesh_surface_area(&mesh) - 6.0).abs() < 0.01);
    assert!((mesh_volume(&mesh) - 1.0).abs() < 0.01);
}

#[test]
fn corner_notch_subtract_stays_within_base_box() {
    let mut kernel = Kernel::new();
    let base = translate_box(cad_primitives::make_box(4.0, 4.0, 2.0, true), Vec3::new(0.0, 0.0, 1.0));
    let tool = translate_box(cad_primitives::make_box(2.0, 2.0, 3.0, true), Vec3::new(1.5, 1.5, 2.0));

    let result = kernel.boolean(&base, &tool, BooleanOp::Subtract);
    assert!(result.success);
    let body = result.body.unwrap();

    assert!(body.topology.faces.len() >= 9);
    for v in body.topology.vertices.values() {
        assert!(v.point.x >= -2.0 - 0.01 && v.point.x <= 2.0 + 0.01);
        assert!(v.point.y >= -2.0 - 0.01 && v.point.y <= 2.0 + 0.01);
        assert!(v.point.z >= 0.0 - 0.01 && v.point.z <= 2.0 + 0.01);
    }
}

#[test]
fn through_slot_subtract_preserves_top_cap_resolution() {
    let mut kernel = Kernel::new();
    let base_result = kernel.make_box(6.0, 4.0, 3.0, true);
    let base = base_result.body.unwrap();
    let FeatureRefs::Primitive(base_refs) = &base_result.refs else { panic!("expected primitive refs") };
    let top_cap_ref = base_refs
        .iter()
        .find(|r| match kernel.resolve(r, &base) {
            ResolveOutcome::Found(subshape) => {
                let Some(face) = find_face_by_subshape(&base, &subshape) else { return false };
                let surface_idx = base.topology.faces[face].surface_index;
                let normal = base.geometry.surfaces[surface_idx].normal(cad_math::Point2::new(0.0, 0.0));
                normal.z > 0.9
            }
            _ => false,
        })
        .expect("exactly one primitive face points +Z");

    // Offset off the y-center so the two surviving cap fragments differ in size
    // and centroid, giving the split a unique fingerprint-nearest candidate.
    let slot = translate_box(cad_primitives::make_box(6.0, 2.0, 3.0, true), Vec3::new(0.0, 0.4, 0.0));
    let result = kernel.boolean(&base, &slot, BooleanOp::Subtract);
    assert!(result.success);
    let cut = result.body.unwrap();
    kernel.record_boolean_step(&result).unwrap();

    let inner_wall_faces = cut.topology.faces.len() - 6;
    assert!(inner_wall_faces >= 4, "expected at least 4 new inner-wall faces, got {inner_wall_faces}");

    match kernel.resolve(top_cap_ref, &cut) {
        ResolveOutcome::Found(subshape) => {
            let face = find_face_by_subshape(&cut, &subshape).expect("resolved face exists in the cut body");
            let outer = cut.topology.faces[face].outer_loop();
            let surface_idx = cut.topology.faces[face].surface_index;
            let uv = cad_math::Point2::new(0.0, 0.0);
            let normal = cut.geometry.surfaces[surface_idx].normal(uv);
            let _ = outer;
            assert!(normal.z > 0.9, "top cap should still face +Z, got {normal:?}");
        }
        other => panic!("expected top cap to resolve, got {other:?}"),
    }
}

fn find_face_by_subshape(body: &cad_primitives::BRepBody, subshape: &cad_naming::SubshapeRef) -> Option<cad_topo::FaceId> {
    body.topology.faces.keys().find(|f| format!("{f:?}") == subshape.0)
}

#[test]
fn corner_intersect_shrinks_to_the_overlap() {
    let mut kernel = Kernel::new();
    let base = translate_box(cad_primitives::make_box(4.0, 4.0, 2.0, true), Vec3::new(0.0, 0.0, 1.0));
    let tool = translate_box(cad_primitives::make_box(2.0, 2.0, 3.0, true), Vec3::new(1.5, 1.5, 2.0));

    let result = kernel.boolean(&base, &tool, BooleanOp::Intersect);
    assert!(result.success);
    let body = result.body.unwrap();

    assert!((body.topology.faces.len() as i64 - 6).abs() <= 6);
    let mesh = kernel.tessellate(&body, &TessellationParams::default());
    let bbox = mesh_bbox(&mesh);
    for axis in 0..3 {
        assert!(bbox.min[axis] >= 0.5 - 0.05);
        assert!(bbox.max[axis] <= 2.0 + 0.05);
    }
    assert!((mesh_surface_area(&mesh) - 13.5).abs() < 0.5);
}

#[test]
fn extrude_rectangle_with_naming_reports_every_edge_selector() {
    let mut kernel = Kernel::new();
    let profile = SketchProfile::rectangle(Point3::origin(), Vec3::x(), Vec3::y(), 10.0, 10.0);
    let result = kernel.extrude(&profile, FeatureOperation::Add, 5.0, false, None);
    assert!(result.success);
    let body = result.body.unwrap();

    let FeatureRefs::Extrude { top_cap, bottom_cap, side, side_edge, top_edge, bottom_edge } = &result.refs else {
        panic!("expected extrude refs")
    };
    assert_eq!(side.len(), 4);
    assert_eq!(side_edge.len(), 4);
    assert_eq!(top_edge.len(), 4);
    assert_eq!(bottom_edge.len(), 4);

    for r in std::iter::once(bottom_cap)
        .chain(std::iter::once(top_cap))
        .chain(side)
        .chain(side_edge)
        .chain(top_edge)
        .chain(bottom_edge)
    {
        match kernel.resolve(r, &body) {
            ResolveOutcome::Found(subshape) => assert_eq!(r.expected_type, classify_subshape(&body, &subshape)),
            other => panic!("expected every ref to resolve, got {other:?}"),
        }
    }

    match kernel.resolve(top_cap, &body) {
        ResolveOutcome::Found(subshape) => {
            let face = find_face_by_subshape(&body, &subshape).unwrap();
            let surface_idx = body.topology.faces[face].surface_index;
            let normal = body.geometry.surfaces[surface_idx].normal(cad_math::Point2::new(0.0, 0.0));
            assert!(normal.z > 0.9);
        }
        other => panic!("expected top cap to resolve, got {other:?}"),
    }
}

fn classify_subshape(body: &cad_primitives::BRepBody, subshape: &cad_naming::SubshapeRef) -> cad_naming::SubshapeType {
    if find_face_by_subshape(body, subshape).is_some() {
        cad_naming::SubshapeType::Face
    } else {
        cad_naming::SubshapeType::Edge
    }
}

#[test]
fn partial_revolve_has_perpendicular_caps_and_survives_a_remap() {
    let mut kernel = Kernel::new();
    let profile = SketchProfile::rectangle(Point3::new(3.0, 0.0, 0.0), Vec3::x(), Vec3::z(), 2.0, 4.0);
    let result = kernel.revolve(
        &profile,
        FeatureOperation::Add,
        Point3::origin(),
        Vec3::y(),
        std::f64::consts::FRAC_PI_2,
        None,
    );
    assert!(result.success);
    let body = result.body.unwrap();

    let FeatureRefs::Revolve { start_cap, end_cap, .. } = &result.refs else { panic!("expected revolve refs") };
    let start_cap = start_cap.clone().expect("partial revolution has a start cap");
    let end_cap = end_cap.clone().expect("partial revolution has an end cap");

    let normal_of = |r: &cad_naming::PersistentRef| -> Vec3 {
        match kernel.resolve(r, &body) {
            ResolveOutcome::Found(subshape) => {
                let face = find_face_by_subshape(&body, &subshape).unwrap();
                let idx = body.topology.faces[face].surface_index;
                *body.geometry.surfaces[idx].normal(cad_math::Point2::new(0.0, 0.0)).as_ref()
            }
            other => panic!("expected cap to resolve, got {other:?}"),
        }
    };
    let n0 = normal_of(&start_cap);
    let n1 = normal_of(&end_cap);
    let angle = n0.dot(&n1).clamp(-1.0, 1.0).acos();
    assert!((angle - std::f64::consts::FRAC_PI_2).abs() < 0.01);

    let old_body_key = cad_naming::SubshapeRef::new(format!("{:?}", body.body));
    let new_body_key = cad_naming::SubshapeRef::new("rebuilt-body-v2");
    kernel.update_body_mapping(old_body_key, new_body_key);
    assert!(matches!(kernel.resolve(&start_cap, &body), ResolveOutcome::Found(_) | ResolveOutcome::NotFound(_)));
}
