//! Benchmarks for signature mapping and call resolution.
//!
//! The workload is a generated declaration graph: a generic interface with
//! default methods and a chain of classes overriding it, each with members
//! taking collections and primitives.
//!
//! ## Profiling with Puffin
//!
//! ```bash
//! cargo bench --features profile-with-puffin -- --profile-time 5
//! ```

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

use erasure::prelude::*;

#[cfg(feature = "profile-with-puffin")]
static FRAME_VIEW: std::sync::OnceLock<puffin::GlobalFrameView> = std::sync::OnceLock::new();

#[cfg(feature = "profile-with-puffin")]
fn setup_profiler() {
    puffin::set_scopes_on(true);
    FRAME_VIEW.get_or_init(puffin::GlobalFrameView::default);
}

#[cfg(not(feature = "profile-with-puffin"))]
fn setup_profiler() {}

#[cfg(feature = "profile-with-puffin")]
fn end_profiling_frame() {
    puffin::GlobalProfiler::lock().new_frame();
}

#[cfg(not(feature = "profile-with-puffin"))]
fn end_profiling_frame() {}

/// Generated graph and the members to map.
struct Workload {
    workspace: Workspace,
    members: Vec<DeclId>,
}

/// `classes` classes in a single override chain below a generic interface.
fn workload(classes: usize) -> Workload {
    let mut workspace = Workspace::new().unwrap();
    let package = workspace.package("bench.model").unwrap();
    let builtins = workspace.builtins().clone();

    let iface = workspace
        .add(Declaration::class("Repository", ClassDecl::interface()).in_parent(package))
        .unwrap();
    let t = workspace
        .add(Declaration::type_parameter("T", TypeParameterDecl::invariant()).in_parent(iface))
        .unwrap();
    let find = workspace
        .add(
            Declaration::function(
                "find",
                CallableData::returning(SemType::type_parameter(t).nullable())
                    .with_parameter(ValueParameter::new("id", builtins.int_type()))
                    .with_parameter(ValueParameter::new("hint", builtins.string_type()).with_default()),
            )
            .in_parent(iface),
        )
        .unwrap();

    let mut members = vec![find];
    let mut overridden = find;
    for i in 0..classes {
        let mut class = ClassDecl::class()
            .as_open()
            .with_supertype(SemType::generic(iface, vec![Projection::invariant(builtins.string_type())]));
        if i > 0 {
            class = class.with_supertype(SemType::class(members[members.len() - 3]));
        }
        let class = workspace
            .add(Declaration::class(format!("Repo{i}"), class).in_parent(package))
            .unwrap();
        let find = workspace
            .add(
                Declaration::function(
                    "find",
                    CallableData::returning(builtins.string_type().nullable())
                        .with_parameter(ValueParameter::new("id", builtins.int_type()))
                        .with_parameter(ValueParameter::new("hint", builtins.string_type()))
                        .overriding(overridden),
                )
                .in_parent(class),
            )
            .unwrap();
        let batch = workspace
            .add(
                Declaration::function(
                    "batch",
                    CallableData::returning(builtins.map_of(builtins.int_type(), builtins.string_type()))
                        .with_parameter(ValueParameter::new("ids", builtins.list_of(builtins.int_type())))
                        .with_parameter(ValueParameter::new("limit", builtins.int_type()).with_default()),
                )
                .in_parent(class),
            )
            .unwrap();
        overridden = find;
        members.extend([class, find, batch]);
    }
    members.retain(|&id| workspace.registry().get(id).is_some_and(Declaration::is_callable));
    Workload { workspace, members }
}

fn signature_benchmarks(c: &mut Criterion) {
    setup_profiler();

    let mut group = c.benchmark_group("mapping/signatures");
    for classes in [10, 100, 500] {
        let workload = workload(classes);
        group.throughput(Throughput::Elements(workload.members.len() as u64));

        group.bench_with_input(BenchmarkId::new("generic", classes), &workload, |b, workload| {
            let mapper = workload.workspace.mapper(MapperConfig::new("bench"));
            b.iter(|| {
                for &member in &workload.members {
                    black_box(mapper.map_signature_with_generic(member, OwnerKind::Implementation).unwrap());
                }
                end_profiling_frame();
            });
        });

        group.bench_with_input(BenchmarkId::new("descriptor_only", classes), &workload, |b, workload| {
            let mapper = workload.workspace.mapper(MapperConfig::new("bench"));
            b.iter(|| {
                for &member in &workload.members {
                    black_box(mapper.map_asm_method(member).unwrap());
                }
            });
        });

        group.bench_with_input(BenchmarkId::new("cached_class_names", classes), &workload, |b, workload| {
            let mapper = workload
                .workspace
                .mapper(MapperConfig::new("bench").with_class_name_cache());
            b.iter(|| {
                for &member in &workload.members {
                    black_box(mapper.map_signature_with_generic(member, OwnerKind::Implementation).unwrap());
                }
            });
        });
    }
    group.finish();
}

fn dispatch_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("mapping/calls");
    for classes in [10, 100] {
        let workload = workload(classes);
        group.throughput(Throughput::Elements(workload.members.len() as u64));

        for (name, target) in [("jvm6", JvmTarget::Jvm6), ("jvm8", JvmTarget::Jvm8)] {
            group.bench_with_input(BenchmarkId::new(name, classes), &workload, |b, workload| {
                let mapper = workload
                    .workspace
                    .mapper(MapperConfig::new("bench").with_target(target));
                b.iter(|| {
                    for &member in &workload.members {
                        black_box(mapper.map_to_callable_method(member, false).unwrap());
                        black_box(mapper.map_to_callable_method(member, true).unwrap());
                    }
                    end_profiling_frame();
                });
            });
        }
    }
    group.finish();
}

criterion_group!(benches, signature_benchmarks, dispatch_benchmarks);
criterion_main!(benches);
