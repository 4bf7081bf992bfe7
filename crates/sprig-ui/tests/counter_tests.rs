//! End-to-end tests for the counter widgets.

use sprig_test_utils::{TestPage, assert_html};
use sprig_ui::{Counter, IdGenerator, SimpleCounter};

#[test]
fn test_simple_counter_end_to_end() {
    let page = TestPage::new();
    let counter = SimpleCounter::new(page.document());
    counter.append_to(page.body()).unwrap();
    assert_eq!(page.text_of("#counter span"), "0");

    page.click_button("+");
    assert_eq!(page.text_of("#counter span"), "1");

    page.click_button("-");
    page.click_button("-");
    assert_eq!(page.text_of("#counter span"), "-1");
    assert_eq!(counter.count(), -1);
}

#[test]
fn test_counter_end_to_end() {
    let page = TestPage::new();
    let ids = IdGenerator::default();
    let counter = Counter::new(page.document(), &ids);
    counter.append_to(page.body()).unwrap();
    assert_html!(
        &page,
        r#"<widget id="widget1"><span>0</span><button>+</button><button>-</button></widget>"#
    );

    page.click_button("+");
    assert_eq!(page.text_of("#widget1 span"), "1");

    page.click_button("-");
    page.click_button("-");
    assert_eq!(page.text_of("#widget1 span"), "-1");
    assert_eq!(counter.count(), -1);
}

#[test]
fn test_counters_are_independent() {
    let page = TestPage::new();
    let ids = IdGenerator::default();
    let first = Counter::new(page.document(), &ids);
    let second = Counter::new(page.document(), &ids);
    page.html().div((&first, &second)).unwrap();

    let plus = page.find("#widget2 button");
    page.document().click(plus).unwrap();

    assert_eq!(first.count(), 0);
    assert_eq!(second.count(), 1);
    assert_eq!(page.text_of("#widget1 span"), "0");
    assert_eq!(page.text_of("#widget2 span"), "1");
}

#[test]
fn test_simple_counter_update_without_element() {
    let page = TestPage::new();
    let counter = SimpleCounter::new(page.document());
    counter.update().unwrap();
    assert_eq!(page.body_html(), "");
}

#[test]
fn test_counter_update_is_idempotent() {
    let page = TestPage::new();
    let ids = IdGenerator::new("c");
    let counter = Counter::new(page.document(), &ids);
    counter.append_to(page.body()).unwrap();
    let before = page.body_html();

    counter.update().unwrap();
    assert_eq!(page.body_html(), before);
    assert!(before.starts_with(r#"<widget id="c1">"#));
}

#[test]
fn test_simple_counters_share_first_counter_element() {
    let page = TestPage::new();
    let first = SimpleCounter::new(page.document());
    let second = SimpleCounter::new(page.document());
    first.append_to(page.body()).unwrap();
    second.append_to(page.body()).unwrap();

    let buttons = page
        .document()
        .query_selector_all(page.document().root(), "button")
        .unwrap();
    // The second counter's `+` redraws the first `#counter` with its own count.
    page.document().click(buttons[2]).unwrap();

    assert_eq!(second.count(), 1);
    assert_eq!(first.count(), 0);
    let spans = page
        .document()
        .query_selector_all(page.document().root(), "#counter span")
        .unwrap();
    assert_eq!(page.document().text_content(spans[0]).unwrap(), "1");
    assert_eq!(page.document().text_content(spans[1]).unwrap(), "0");
}
