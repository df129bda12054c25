//! Classification Benchmarks
//!
//! Route resolution and correlation-store throughput.
//!
//! Run with: `cargo bench --bench classify_ops`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use probar_netwait::{
    classify, Call, CapturedRequest, Category, CorrelationStore, HttpMethod, MockResponse,
    Registry,
};

fn registry_with(routes: usize) -> Registry {
    let mut registry = Registry::new();
    for i in 0..routes {
        registry
            .register_route(HttpMethod::Get, &format!("/api/v1/resource{i}/:id"))
            .unwrap_or_default();
    }
    registry
}

fn bench_route_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("route_resolution");

    for routes in [1, 10, 100] {
        let registry = registry_with(routes);
        let request = CapturedRequest::get(&format!(
            "https://api.test/api/v1/resource{}/42?expand=true",
            routes - 1
        ));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{routes}_routes")),
            &request,
            |bench, request| {
                bench.iter(|| black_box(classify(black_box(request), &registry)));
            },
        );
    }

    group.finish();
}

fn bench_graphql_classification(c: &mut Criterion) {
    let registry = Registry::new();
    let request = CapturedRequest::graphql(
        "https://api.test/graphql",
        "UpdateCourse",
        "mutation UpdateCourse($id: ID!) { updateCourse(id: $id) { id title } }",
    );
    c.bench_function("graphql_classification", |bench| {
        bench.iter(|| black_box(classify(black_box(&request), &registry)));
    });
}

fn bench_store_register_complete(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_register_complete");
    let decoded = MockResponse::text("OK").decode();

    for calls in [10, 100, 1000] {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{calls}_calls")),
            &calls,
            |bench, &n| {
                bench.iter(|| {
                    let mut store = CorrelationStore::new();
                    for i in 0..n {
                        let id = format!("req-{i}");
                        let request = CapturedRequest::get("/todos/1").with_id(id.as_str());
                        store.register_call(Category::Request, "GET:/todos/:id", Call::pending(request));
                        store.complete_call(Category::Request, "GET:/todos/:id", &id, decoded.clone());
                    }
                    black_box(store);
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_route_resolution,
    bench_graphql_classification,
    bench_store_register_complete,
);
criterion_main!(benches);
