// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

use approx::assert_relative_eq;
use solidgraph::geometry::analytics::{analyze, signed_volume};
use solidgraph::{
    export_stl, parse_description, render, render_file, CsgError, Description, Kernel,
    ReferencePolicy, RenderConfig, StlEncoding,
};
use std::io::Write;
use tempfile::{tempdir, NamedTempFile};

const DRILLED: &str = r#"<?xml version="1.0"?>
<csg>
  <solid name="block" shape="cuboid">
    <size>[4, 2, 2]</size>
    <center>[0, 0, 0]</center>
  </solid>
  <solid name="bolt" shape="cylinder">
    <start>[0, -2, 0]</start>
    <end>[0, 2, 0]</end>
    <radius>0.5</radius>
    <resolution>12</resolution>
  </solid>
  <binary_op name="drilled" type="difference">
    <operand>block</operand>
    <operand>bolt</operand>
  </binary_op>
</csg>
"#;

#[test]
fn test_render_drilled_block() {
    let mesh = render(DRILLED).unwrap();
    let stats = analyze(&mesh);
    assert!(stats.volume > 0.0 && stats.volume < 16.0);
    assert_relative_eq!(stats.bbox[0], -2.0, epsilon = 1e-9);
    assert_relative_eq!(stats.bbox[3], 2.0, epsilon = 1e-9);
}

#[test]
fn test_render_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(DRILLED.as_bytes()).unwrap();

    let from_file = render_file(file.path()).unwrap();
    let from_source = render(DRILLED).unwrap();
    assert_eq!(from_file.triangle_count(), from_source.triangle_count());
}

#[test]
fn test_output_attribute_selects_node() {
    let source = r#"
        <csg output="base">
          <solid name="base" shape="cuboid"><size>[2, 2, 2]</size></solid>
          <unary_op name="big" type="scale">
            <operand>base</operand><scale>3</scale>
          </unary_op>
        </csg>"#;
    let mesh = render(source).unwrap();
    assert_relative_eq!(signed_volume(&mesh), 8.0, epsilon = 1e-9);

    // Without the attribute the last declaration wins
    let mesh = render(&source.replace(r#" output="base""#, "")).unwrap();
    assert_relative_eq!(signed_volume(&mesh), 216.0, epsilon = 1e-6);
}

#[test]
fn test_export_binary_stl() {
    let mesh = render(DRILLED).unwrap();
    let dir = tempdir().unwrap();
    let path = dir.path().join("drilled.stl");

    export_stl(&mesh, &path, StlEncoding::Binary).unwrap();

    let size = std::fs::metadata(&path).unwrap().len() as usize;
    assert_eq!(size, 84 + 50 * mesh.triangle_count());
}

#[test]
fn test_export_ascii_stl() {
    let mesh = render(DRILLED).unwrap();
    let dir = tempdir().unwrap();
    let path = dir.path().join("drilled.stl");

    export_stl(&mesh, &path, StlEncoding::Ascii).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("solid "));
    assert_eq!(text.matches("endfacet").count(), mesh.triangle_count());
}

#[test]
fn test_description_json() {
    let description = parse_description(DRILLED).unwrap();
    let json = serde_json::to_value(&description).unwrap();

    assert!(json.get("output").is_none());
    assert_eq!(json["declarations"][0]["declaration"], "solid");
    assert_eq!(json["declarations"][0]["params"]["size"][0], 4.0);
    assert_eq!(json["declarations"][1]["params"]["radius"], 0.5);
    assert_eq!(json["declarations"][2]["lhs"], "block");

    let back: Description = serde_json::from_value(json).unwrap();
    assert_eq!(back, description);
}

#[test]
fn test_deferred_cycle_from_description() {
    let source = r#"
        <csg>
          <unary_op name="a" type="translate">
            <operand>b</operand><distance>[1, 0, 0]</distance>
          </unary_op>
          <unary_op name="b" type="rotateZ">
            <operand>a</operand><rotation>90</rotation>
          </unary_op>
        </csg>"#;
    let description = parse_description(source).unwrap();

    // Strict graphs reject the forward reference outright
    assert!(matches!(
        Kernel::from_description(&description, &RenderConfig::default()),
        Err(CsgError::UndefinedReference { .. })
    ));

    let config = RenderConfig {
        reference_policy: ReferencePolicy::Deferred,
        ..RenderConfig::default()
    };
    let mut kernel = Kernel::from_description(&description, &config).unwrap();
    match kernel.render() {
        Err(CsgError::CycleDetected(path)) => {
            assert_eq!(path.first(), path.last());
            assert_eq!(path.len(), 3);
        }
        other => panic!("expected a cycle, got {:?}", other),
    }
    assert_eq!(kernel.computed_count(), 0);
}

#[test]
fn test_undefined_shape_is_reported() {
    let source = r#"<csg><solid name="t" shape="torus"/></csg>"#;
    let err = render(source).unwrap_err();
    assert_eq!(
        err.downcast_ref::<CsgError>(),
        Some(&CsgError::UnsupportedShape {
            node: "t".into(),
            shape: "torus".into()
        })
    );
}
