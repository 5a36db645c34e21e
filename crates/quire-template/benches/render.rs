//! Benchmarks for nested template rendering.

#![allow(clippy::cast_precision_loss)] // Synthetic amounts only

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use quire_template::{RenderMode, Renderer, TemplateDefinition, payload_from_json};
use serde_json::{Value, json};

fn order_template() -> TemplateDefinition {
    TemplateDefinition::new(
        "Order",
        "order",
        "<h1>{{customer}}</h1><table>{{rows}}</table><p>{{grandTotal}}</p>",
        "order-{{number}}",
    )
    .with_embedded_fragment(
        "rows",
        "<tr><td>{{rows.name}}</td><td>{{rows.amount}}</td><td>{{rows.parts}}</td></tr>",
    )
    .with_embedded_fragment("rows.parts", "<span>{{rows.parts.code}}</span>")
    .with_variable_fragment("grandTotal", "<strong>{{grandTotal}}</strong>")
}

/// Generate a payload with `rows` rows of three parts each.
fn order_payload(rows: usize) -> Value {
    let rows: Vec<Value> = (0..rows)
        .map(|i| {
            json!({
                "name": format!("Item {i}"),
                "amount": i as f64 * 1.5,
                "parts": [{"code": "A"}, {"code": "B"}, {"code": "C"}],
            })
        })
        .collect();
    json!({"customer": "Acme", "number": "42", "grandTotal": 100, "rows": rows})
}

fn bench_render_simple(c: &mut Criterion) {
    let template = TemplateDefinition::new("Note", "note", "<p>{{name}}</p>", "note");
    let payload = payload_from_json(json!({"name": "Acme"}));
    let renderer = Renderer::new(&template);

    c.bench_function("render_simple", |b| {
        b.iter(|| renderer.render(&payload, RenderMode::Print));
    });
}

fn bench_render_nested_rows(c: &mut Criterion) {
    let template = order_template();
    let renderer = Renderer::new(&template);

    let mut group = c.benchmark_group("render_nested_rows");
    for rows in [10, 100, 1000] {
        let payload = payload_from_json(order_payload(rows));
        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &payload, |b, payload| {
            b.iter(|| renderer.render(payload, RenderMode::Print));
        });
    }
    group.finish();
}

fn bench_preview_vs_print(c: &mut Criterion) {
    let template = order_template();
    let renderer = Renderer::new(&template);
    let payload = payload_from_json(order_payload(50));

    let mut group = c.benchmark_group("render_mode");
    group.bench_function("preview", |b| {
        b.iter(|| renderer.preview(&payload));
    });
    group.bench_function("print", |b| {
        b.iter(|| renderer.print(&payload));
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_render_simple,
    bench_render_nested_rows,
    bench_preview_vs_print
);
criterion_main!(benches);
