// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Performance benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use nalgebra::Point3;
use solidgraph::geometry::{BooleanKernel, BooleanOp, BspKernel, Grid, Primitive, Sdf, Vec3};
use solidgraph::{parse_description, render};

const BRACKET: &str = r#"
<csg>
  <solid name="plate" shape="cuboid"><size>[4, 0.5, 2]</size></solid>
  <solid name="post" shape="cuboid"><size>[0.5, 3, 2]</size></solid>
  <unary_op name="post_left" type="translate">
    <operand>post</operand><distance>[-1.75, 1.25, 0]</distance>
  </unary_op>
  <binary_op name="bracket" type="union">
    <operand>plate</operand><operand>post_left</operand>
  </binary_op>
  <solid name="hole" shape="cylinder">
    <start>[1, -1, 0]</start><end>[1, 1, 0]</end><radius>0.4</radius><resolution>16</resolution>
  </solid>
  <binary_op name="drilled" type="difference">
    <operand>bracket</operand><operand>hole</operand>
  </binary_op>
</csg>
"#;

fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse/bracket", |b| {
        b.iter(|| parse_description(black_box(BRACKET)).unwrap())
    });
}

fn bench_primitives(c: &mut Criterion) {
    let mut group = c.benchmark_group("primitives");

    for refining in [0u32, 2, 4] {
        group.bench_with_input(BenchmarkId::new("sphere", refining), &refining, |b, &r| {
            b.iter(|| Primitive::sphere(Vec3::zeros(), 1.0, black_box(r)).to_mesh("ball").unwrap())
        });
        group.bench_with_input(BenchmarkId::new("cuboid", refining), &refining, |b, &r| {
            b.iter(|| {
                Primitive::cuboid(Vec3::repeat(2.0), Vec3::zeros(), 1.0, black_box(r))
                    .to_mesh("box")
                    .unwrap()
            })
        });
    }

    group.bench_function("cylinder_64", |b| {
        b.iter(|| {
            Primitive::cylinder(Vec3::zeros(), Vec3::new(0.0, 0.0, 4.0), 1.0, black_box(64))
                .to_mesh("rod")
                .unwrap()
        })
    });

    group.finish();
}

fn bench_boolean_ops(c: &mut Criterion) {
    let mut group = c.benchmark_group("boolean_ops");
    let kernel = BspKernel::default();

    let a = Primitive::cuboid(Vec3::repeat(2.0), Vec3::zeros(), 1.0, 0)
        .to_mesh("a")
        .unwrap();
    let b_mesh = Primitive::sphere(Vec3::new(1.0, 1.0, 1.0), 0.6, 2)
        .to_mesh("b")
        .unwrap();

    for op in [BooleanOp::Union, BooleanOp::Difference, BooleanOp::Intersection] {
        group.bench_function(op.to_string(), |b| {
            b.iter(|| kernel.apply(black_box(op), &a, &b_mesh).unwrap())
        });
    }

    group.finish();
}

fn bench_sdf_grid(c: &mut Criterion) {
    let field = Sdf::cuboid(Vec3::repeat(2.0)).difference(Sdf::sphere(2.5));
    let min = Point3::new(-4.0, -4.0, -4.0);
    let max = Point3::new(4.0, 4.0, 4.0);
    c.bench_function("sdf/grid_33", |b| {
        b.iter(|| Grid::sample(min, max, [33, 33, 33], black_box(&field)).unwrap())
    });
}

fn bench_render(c: &mut Criterion) {
    c.bench_function("render/bracket", |b| {
        b.iter(|| render(black_box(BRACKET)).unwrap())
    });
}

criterion_group!(
    benches,
    bench_parse,
    bench_primitives,
    bench_boolean_ops,
    bench_sdf_grid,
    bench_render
);
criterion_main!(benches);
