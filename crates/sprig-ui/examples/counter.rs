//! Counter example - attaches both counter widgets to a headless document,
//! simulates clicks and prints the resulting markup.
//!
//! Run with `RUST_LOG=debug` to see the widget lifecycle logs.

use sprig_dom::Document;
use sprig_ui::{Attributes, Counter, HtmlBuilder, IdGenerator, SimpleCounter, UiResult};

/// Click the last element matching `selector`.
fn click_last(doc: &Document, selector: &str) -> UiResult<()> {
    if let Some(button) = doc.query_selector_all(doc.root(), selector)?.pop() {
        doc.click(button)?;
        sprig_core::profiling::new_frame();
    }
    Ok(())
}

fn main() -> UiResult<()> {
    sprig_core::logging::init();

    let doc = Document::new();
    let ids = IdGenerator::default();
    let html = HtmlBuilder::new(&doc, doc.body())?;

    html.h1("Counters")?;
    let section = html.section(Attributes::new().set("class", "counters"))?;

    let simple = SimpleCounter::new(&doc);
    simple.append_to(&section)?;

    let counter = Counter::new(&doc, &ids);
    counter.append_to(&section)?;

    println!("initial:\n{}\n", doc.inner_html(doc.body())?);

    // `-` is the last button of each counter. The widget counter re-renders
    // on every click, so its buttons are looked up again each time.
    let widget_buttons = format!("#{} button", counter.widget().id());
    click_last(&doc, "#counter button")?;
    click_last(&doc, &widget_buttons)?;
    click_last(&doc, &widget_buttons)?;

    println!("simple counter: {}", simple.count());
    println!("widget counter: {}", counter.count());
    println!("\nafter clicks:\n{}", doc.inner_html(doc.body())?);
    Ok(())
}
