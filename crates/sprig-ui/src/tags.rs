//! One builder factory per known tag name.

use crate::builder::HtmlBuilder;
use crate::child::Child;
use crate::error::UiResult;
use crate::tag::Tag;

macro_rules! tag_factories {
    ($($name:ident),* $(,)?) => {
        /// Tag names with a factory method on [`HtmlBuilder`].
        pub const TAG_NAMES: &[&str] = &[$(stringify!($name)),*];

        impl HtmlBuilder {
            $(
                #[doc = concat!("Append a `<", stringify!($name), ">` element to the root.")]
                pub fn $name<'a>(&self, children: impl Into<Child<'a>>) -> UiResult<Tag> {
                    self.tag(stringify!($name), children)
                }
            )*
        }
    };
}

tag_factories!(
    a, abbr, acronym, address, area, article, aside, audio, b, bdi, bdo, big, blockquote, body,
    br, button, canvas, caption, cite, code, col, colgroup, command, datalist, dd, del, details,
    dfn, div, dl, dt, em, embed, fieldset, figcaption, figure, footer, form, frame, frameset, h1,
    h2, h3, h4, h5, h6, hr, head, header, hgroup, html, i, iframe, img, input, ins, kbd, keygen,
    label, legend, li, link, map, mark, meta, meter, nav, noscript, object, ol, optgroup, option,
    output, p, param, pre, progress, q, rp, rt, ruby, samp, script, section, select, small,
    source, span, strong, style, sub, summary, sup, table, tbody, td, textarea, tfoot, th, thead,
    time, title, tr, track, tt, ul, var, video, wbr,
);
