//! Benchmarks for building and updating tag trees

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use sprig_dom::Document;
use sprig_ui::{Attributes, Counter, HtmlBuilder, IdGenerator, Widget, render};

fn bench_build_flat(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_flat");

    for count in [10, 50, 100, 500] {
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter(|| {
                let doc = Document::new();
                let html = HtmlBuilder::new(&doc, doc.body()).unwrap();
                html.ul(render(|html| {
                    for i in 0..count {
                        html.li((Attributes::new().set("class", "item"), format!("Item {}", i)))?;
                    }
                    Ok(())
                }))
                .unwrap();
                black_box(doc)
            });
        });
    }

    group.finish();
}

fn bench_build_nested(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_nested");

    fn nest(html: &HtmlBuilder, depth: usize) -> sprig_ui::UiResult<()> {
        if depth == 0 {
            html.span("leaf")?;
            return Ok(());
        }
        html.div(render(move |html| nest(html, depth - 1)))?;
        Ok(())
    }

    for depth in [2, 5, 10, 20] {
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, &depth| {
            b.iter(|| {
                let doc = Document::new();
                let html = HtmlBuilder::new(&doc, doc.body()).unwrap();
                nest(&html, depth).unwrap();
                black_box(doc)
            });
        });
    }

    group.finish();
}

fn bench_widget_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("widget_update");

    for rows in [10, 100] {
        group.bench_with_input(BenchmarkId::from_parameter(rows), &rows, |b, &rows| {
            let doc = Document::new();
            let widget = Widget::new(&doc, "table", move |html| {
                html.table(render(|html| {
                    for row in 0..rows {
                        html.tr(render(|html| {
                            html.td(row.to_string())?;
                            html.td("value")?;
                            Ok(())
                        }))?;
                    }
                    Ok(())
                }))?;
                Ok(())
            });
            widget.append_to(doc.body()).unwrap();

            b.iter(|| {
                widget.update().unwrap();
                black_box(doc.mutation_count())
            });
        });
    }

    group.finish();
}

fn bench_counter_clicks(c: &mut Criterion) {
    c.bench_function("counter_click", |b| {
        let doc = Document::new();
        let ids = IdGenerator::default();
        let counter = Counter::new(&doc, &ids);
        counter.append_to(doc.body()).unwrap();

        b.iter(|| {
            let plus = doc.query_selector(doc.root(), "#widget1 button").unwrap().unwrap();
            doc.click(plus).unwrap();
            black_box(counter.count())
        });
    });
}

fn bench_query_selector(c: &mut Criterion) {
    let doc = Document::new();
    let html = HtmlBuilder::new(&doc, doc.body()).unwrap();
    for i in 0..200 {
        html.div((
            Attributes::new().set("class", if i % 2 == 0 { "even" } else { "odd" }),
            render(|html| html.span(i.to_string()).map(|_| ())),
        ))
        .unwrap();
    }

    c.bench_function("query_selector_all_descendant", |b| {
        b.iter(|| black_box(doc.query_selector_all(doc.root(), "body div.even > span").unwrap()))
    });
}

criterion_group!(
    benches,
    bench_build_flat,
    bench_build_nested,
    bench_widget_update,
    bench_counter_clicks,
    bench_query_selector,
);
criterion_main!(benches);
