// src/collect/render.rs
use once_cell::sync::OnceCell;
use regex::Regex;

/// Turn a text web part's inner HTML into one line of plain text:
/// tags dropped, entities decoded, whitespace collapsed.
pub fn render_inner_html(html: &str) -> String {
    // 1) Block-level boundaries become spaces so words don't glue together
    static RE_BREAKS: OnceCell<Regex> = OnceCell::new();
    let re_breaks = RE_BREAKS.get_or_init(|| {
        Regex::new(r"(?i)<br\s*/?>|</(p|div|li|h[1-6]|tr|td|th|blockquote)>").unwrap()
    });
    let out = re_breaks.replace_all(html, " ");

    // 2) Strip remaining tags (before decoding, so &lt;b&gt; stays literal)
    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| Regex::new(r"(?s)</?[A-Za-z!][^>]*>").unwrap());
    let out = re_tags.replace_all(&out, "");

    // 3) HTML entity decode
    let out = html_escape::decode_html_entities(&out);

    // 4) Collapse whitespace (incl. nbsp)
    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"[\s\u{00A0}]+").unwrap());
    re_ws.replace_all(&out, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tags_and_decodes_entities() {
        let html = "<div><h2>Escalation</h2><p>Call&nbsp;the <strong>on-call</strong> lead &amp; log it.</p></div>";
        assert_eq!(
            render_inner_html(html),
            "Escalation Call the on-call lead & log it."
        );
    }

    #[test]
    fn encoded_markup_stays_literal() {
        assert_eq!(render_inner_html("<p>use &lt;b&gt; tags</p>"), "use <b> tags");
    }

    #[test]
    fn empty_and_whitespace_only() {
        assert_eq!(render_inner_html(""), "");
        assert_eq!(render_inner_html("<p>  </p><br/>"), "");
    }

    #[test]
    fn list_items_are_separated() {
        assert_eq!(render_inner_html("<ul><li>one</li><li>two</li></ul>"), "one two");
    }
}
