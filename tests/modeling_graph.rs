// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! End-to-end properties of the modeling graph

use approx::assert_relative_eq;
use solidgraph::geometry::analytics::signed_volume;
use solidgraph::geometry::primitives::{geodesic_radius, GOLDEN_RATIO};
use solidgraph::geometry::transform::{rotate, translate};
use solidgraph::geometry::{Axis, Vec3};
use solidgraph::{CsgError, Declaration, Kernel, Params, ReferencePolicy, RenderConfig, Value};

fn vector(x: f64, y: f64, z: f64) -> Value {
    Value::Vector(vec![x, y, z])
}

fn unit_cuboid(name: &str) -> Declaration {
    Declaration::solid(
        name,
        "cuboid",
        Params::new()
            .with("size", vector(2.0, 2.0, 2.0))
            .with("center", vector(0.0, 0.0, 0.0))
            .with("scale", Value::Scalar(1.0))
            .with("refining", Value::Scalar(0.0)),
    )
}

fn kernel_with(decls: &[Declaration]) -> Kernel {
    let mut kernel = Kernel::default();
    for decl in decls {
        kernel.declare(decl).unwrap();
    }
    kernel
}

#[test]
fn test_unit_cuboid() {
    let mut kernel = kernel_with(&[unit_cuboid("A")]);
    let mesh = kernel.render().unwrap();
    assert_eq!(mesh.vertex_count(), 8);
    assert_eq!(mesh.triangle_count(), 12);
    for v in mesh.vertices() {
        assert!(v.iter().all(|c| *c == 1.0 || *c == -1.0));
    }
}

#[test]
fn test_refinement_growth() {
    for r in 0..5u32 {
        let decl = Declaration::solid(
            "box",
            "cuboid",
            Params::new()
                .with("size", vector(1.0, 1.0, 1.0))
                .with("refining", Value::Scalar(r as f64)),
        );
        let mesh = kernel_with(&[decl]).render().unwrap();
        assert_eq!(mesh.triangle_count(), 12 * 4usize.pow(r));
    }
}

#[test]
fn test_geodesic_sphere_radius() {
    let center = Vec3::new(-1.0, 0.5, 3.0);
    let scale = 2.0;
    let expected = scale * (GOLDEN_RATIO * GOLDEN_RATIO + 1.0).sqrt();
    assert_relative_eq!(geodesic_radius(scale), expected);

    for refining in 0..5 {
        let decl = Declaration::solid(
            "ball",
            "sphere",
            Params::new()
                .with("center", vector(center.x, center.y, center.z))
                .with("scale", Value::Scalar(scale))
                .with("refining", Value::Scalar(refining as f64)),
        );
        let mesh = kernel_with(&[decl]).render().unwrap();
        for v in mesh.vertices() {
            assert_relative_eq!((v.coords - center).norm(), expected, epsilon = 1e-9);
        }
    }
}

#[test]
fn test_rotation_round_trip() {
    let mesh = kernel_with(&[unit_cuboid("A")]).render().unwrap();
    for theta in [-720.0, -90.0, -33.3, 0.0, 1e-3, 45.0, 180.0, 359.0] {
        let back = rotate(&rotate(&mesh, Axis::X, theta), Axis::X, -theta);
        for (a, b) in back.vertices().iter().zip(mesh.vertices()) {
            assert_relative_eq!(a, b, epsilon = 1e-9);
        }
    }
}

#[test]
fn test_translate_inverse_is_exact() {
    let mesh = kernel_with(&[unit_cuboid("A")]).render().unwrap();
    let d = Vec3::new(0.5, -4.0, 12.25);
    let back = translate(&translate(&mesh, &d), &-d);
    assert_eq!(back.vertices(), mesh.vertices());
}

#[test]
fn test_reference_reuse() {
    let mut kernel = kernel_with(&[
        unit_cuboid("A"),
        Declaration::unary(
            "B",
            "translate",
            "A",
            Params::new().with("distance", vector(1.0, 0.0, 0.0)),
        ),
    ]);

    let b = kernel.render_node("B").unwrap();
    assert_eq!(kernel.computed_count(), 2);

    let a = kernel.render_node("A").unwrap();
    // A came from the memo table
    assert_eq!(kernel.computed_count(), 2);

    assert_eq!(b.vertex_count(), 8);
    for (moved, original) in b.vertices().iter().zip(a.vertices()) {
        assert_eq!(moved.coords, original.coords + Vec3::new(1.0, 0.0, 0.0));
    }
}

#[test]
fn test_undefined_reference_computes_nothing() {
    let mut kernel = kernel_with(&[unit_cuboid("A")]);
    let err = kernel
        .declare(&Declaration::unary(
            "B",
            "translate",
            "missing",
            Params::new().with("distance", vector(1.0, 0.0, 0.0)),
        ))
        .unwrap_err();
    assert_eq!(
        err,
        CsgError::UndefinedReference {
            node: "B".into(),
            operand: "missing".into()
        }
    );
    assert_eq!(kernel.computed_count(), 0);
    assert!(kernel.graph().get("B").is_none());
}

#[test]
fn test_prism_straight_angle_is_degenerate() {
    let mut kernel = Kernel::default();
    let err = kernel
        .declare(&Declaration::solid(
            "wedge",
            "prism",
            Params::new().with("angle", Value::Scalar(180.0)),
        ))
        .unwrap_err();
    assert!(matches!(err, CsgError::DegenerateGeometry { ref node, .. } if node == "wedge"));
}

#[test]
fn test_duplicate_name() {
    let mut kernel = kernel_with(&[unit_cuboid("A")]);
    assert_eq!(
        kernel.declare(&unit_cuboid("A")),
        Err(CsgError::DuplicateName("A".into()))
    );
}

#[test]
fn test_wrong_vector_length() {
    let mut kernel = Kernel::default();
    let err = kernel
        .declare(&Declaration::solid(
            "box",
            "cuboid",
            Params::new().with("size", Value::Vector(vec![1.0, 2.0])),
        ))
        .unwrap_err();
    assert!(matches!(err, CsgError::Dimension { found: 2, .. }));
}

#[test]
fn test_scale_rectangle_on_refined_cuboid_is_incompatible() {
    let mut kernel = kernel_with(&[
        Declaration::solid(
            "box",
            "cuboid",
            Params::new()
                .with("size", vector(1.0, 1.0, 1.0))
                .with("refining", Value::Scalar(1.0)),
        ),
        Declaration::unary(
            "taper",
            "scaleRectangleXZ",
            "box",
            Params::new().with("scale", Value::Scalar(0.5)),
        ),
    ]);
    assert!(matches!(
        kernel.render(),
        Err(CsgError::IncompatibleOperand { ref operand, .. }) if operand == "box"
    ));
}

#[test]
fn test_boolean_chain_volume() {
    // 2x2x2 block minus a unit cube filling one of its octants
    let mut kernel = kernel_with(&[
        unit_cuboid("block"),
        Declaration::solid(
            "corner",
            "cuboid",
            Params::new()
                .with("size", vector(1.0, 1.0, 1.0))
                .with("center", vector(0.5, 0.5, 0.5)),
        ),
        Declaration::binary("notched", "difference", "block", "corner"),
    ]);
    let mesh = kernel.render().unwrap();
    assert_relative_eq!(signed_volume(&mesh), 7.0, epsilon = 1e-6);
}

#[test]
fn test_deferred_forward_reference() {
    let config = RenderConfig {
        reference_policy: ReferencePolicy::Deferred,
        ..RenderConfig::default()
    };
    let mut kernel = Kernel::with_config(&config);
    kernel
        .declare(&Declaration::unary(
            "B",
            "rotateY",
            "A",
            Params::new().with("rotation", Value::Scalar(90.0)),
        ))
        .unwrap();
    kernel.declare(&unit_cuboid("A")).unwrap();
    kernel.designate_output("B").unwrap();

    let mesh = kernel.render().unwrap();
    assert_relative_eq!(signed_volume(&mesh), 8.0, epsilon = 1e-9);
}

#[test]
fn test_long_deferred_chain_renders() {
    const LENGTH: usize = 100_000;
    let config = RenderConfig {
        reference_policy: ReferencePolicy::Deferred,
        ..RenderConfig::default()
    };
    let mut kernel = Kernel::with_config(&config);
    let step = Params::new().with("distance", vector(0.0, 0.0, 1.0));
    for i in 0..LENGTH {
        let name = format!("n{}", i);
        let operand = format!("n{}", i + 1);
        kernel
            .declare(&Declaration::unary(name, "translate", operand, step.clone()))
            .unwrap();
    }
    kernel.declare(&unit_cuboid(&format!("n{}", LENGTH))).unwrap();
    kernel.designate_output("n0").unwrap();

    let mesh = kernel.render().unwrap();
    assert_eq!(kernel.computed_count(), LENGTH + 1);
    assert_relative_eq!(mesh.centroid().z, LENGTH as f64, epsilon = 1e-6);
}
