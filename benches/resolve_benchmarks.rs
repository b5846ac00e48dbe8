//! Registry build benchmarks.
//!
//! Class chains are declared in reverse order so every pass of the resolver
//! can only resolve one more class, which is the worst case for the
//! fixed-point loop. Flat namespaces measure plain declaration cost.
//!
//! ## Profiling with Puffin
//!
//! ```bash
//! cargo bench --features profile-with-puffin -- --profile-time 5
//! ```

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use girbind::prelude::*;
use girbind::registry::types::Class;
use std::hint::black_box;

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

fn config() -> Config {
    Config::default().with_namespace(
        "GObject-2",
        NamespaceConfig::new().with_manual_type(Type::Class(Class::new("Object", "GObject"))),
    )
}

/// `Class{n-1}` derives from `Class{n-2}` and so on down to `Object`,
/// declared leaf first.
fn reversed_chain(n: usize) -> IdlRepository {
    let mut ns = IdlNamespace::new("GObject", "2.0").with_prefixes("G", "g");
    for i in (0..n).rev() {
        let parent = if i == 0 {
            "Object".to_string()
        } else {
            format!("Class{}", i - 1)
        };
        let name = format!("Class{i}");
        let method = IdlCallable::new("get_size", format!("g_class{i}_get_size"))
            .with_instance(IdlParameter::new("self", IdlType::new(&name, format!("G{name}*"))))
            .with_param(IdlParameter::new("label", IdlType::new("utf8", "const gchar*")))
            .with_return(IdlReturnValue::new(IdlType::new("gint", "gint")));
        ns = ns.with_class(
            IdlClass::new(&name, format!("G{name}"))
                .with_parent(parent)
                .with_method(method),
        );
    }
    IdlRepository::new(ns)
}

fn flat_functions(n: usize) -> IdlRepository {
    let mut ns = IdlNamespace::new("Demo", "1.0").with_prefixes("Demo", "demo");
    for i in 0..n {
        ns = ns.with_function(
            IdlCallable::new(format!("op{i}"), format!("demo_op{i}"))
                .with_param(IdlParameter::new("value", IdlType::new("gdouble", "gdouble")))
                .with_param(IdlParameter::new("enabled", IdlType::new("gboolean", "gboolean")))
                .with_return(IdlReturnValue::new(IdlType::new("utf8", "gchar*"))),
        );
    }
    IdlRepository::new(ns)
}

fn bench_class_chain(c: &mut Criterion) {
    setup_profiler();
    let mut group = c.benchmark_group("class_chain");
    for n in [10, 100, 400] {
        let repo = reversed_chain(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &repo, |b, repo| {
            b.iter(|| {
                let built = RegistryBuilder::new(config()).with_repository(repo.clone()).build();
                end_profiling_frame();
                black_box(built)
            });
        });
    }
    group.finish();
}

fn bench_flat_namespace(c: &mut Criterion) {
    let mut group = c.benchmark_group("flat_functions");
    for n in [100, 1000] {
        let repo = flat_functions(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &repo, |b, repo| {
            b.iter(|| black_box(RegistryBuilder::default().with_repository(repo.clone()).build()));
        });
    }
    group.finish();
}

fn bench_conversion_selection(c: &mut Criterion) {
    let (registry, _) = match RegistryBuilder::default().with_repository(flat_functions(200)).build() {
        Ok(built) => built,
        Err(e) => panic!("build failed: {e}"),
    };
    let Some(ns) = registry.namespace("Demo-1") else {
        panic!("Demo-1 missing");
    };

    c.bench_function("select_converters_200", |b| {
        b.iter(|| {
            for f in &ns.functions {
                let converters = CallableConverters::new(&registry, &f.signature, ParameterMode::Callable);
                black_box(converters.is_complete());
            }
        });
    });
}

criterion_group!(
    benches,
    bench_class_chain,
    bench_flat_namespace,
    bench_conversion_selection
);
criterion_main!(benches);
