use listing_dom::parse;
use listing_sanitizer::{sanitize, RESPONSIVE_BASE_ID};

const HOSTILE: &[&str] = &[
    "<html><head><script src=\"x.js\"></script></head><body onload=\"init()\"><p>hi</p></body></html>",
    "<div><iframe srcdoc=\"<b>x</b>\"></iframe><form action=\"/buy\"><input name=\"q\"></form></div>",
    "<style>@keyframes spin{from{a:b}to{c:d}} .x{color:red}</style><img src=\"a.png\" onError=\"x()\">",
    "<object data=\"f.swf\"><embed src=\"f.swf\"></object><video autoplay src=\"v.mp4\"></video>",
    "<p>unclosed <b>bold <i>italic</p><style>@-moz-keyframes a{",
    "<SCRIPT>alert(1)</SCRIPT><Img SRC=x OnMouseOver=y>",
    "<xmp><p title=\"</xmp><img src=x onerror=alert(1)>\">",
    "<noscript><p title=\"</noscript><img src=x onerror=alert(1)>\"></noscript>",
    "<!-- x --!><img src=x onerror=alert(1)> -->",
    "<!--><img src=x onerror=alert(1)>-->",
    "<style/><p title=\"</style><img src=x onerror=alert(1)>\">",
    "",
];

fn sanitized(source: &str) -> String {
    let mut doc = parse(source);
    sanitize(&mut doc);
    doc.serialize()
}

#[test]
fn sanitize_is_idempotent() {
    for source in HOSTILE {
        let once = sanitized(source);

        let mut doc = parse(&once);
        sanitize(&mut doc);
        let twice = doc.serialize();

        assert_eq!(once, twice, "not idempotent for {source:?}");
    }
}

#[test]
fn sanitize_leaves_no_active_content() {
    for source in HOSTILE {
        let out = sanitized(source);
        let doc = parse(&out);

        assert!(
            doc.elements_by_tags(&["script", "iframe", "form", "object", "embed"])
                .is_empty(),
            "active element left in {out}"
        );
        for id in doc.elements() {
            let el = doc.element(id).unwrap();
            for attr in &el.attributes {
                let name = attr.name.to_ascii_lowercase();
                assert!(!name.starts_with("on"), "handler {name} left in {out}");
                assert!(name != "autoplay" && name != "srcdoc");
            }
        }
        assert!(!out.to_ascii_lowercase().contains("keyframes"), "keyframes left in {out}");
    }
}

#[test]
fn sanitize_output_text_has_no_handlers() {
    // Checked on the serialized text, the way a browser receives it
    for source in HOSTILE {
        let out = sanitized(source).to_ascii_lowercase();
        assert!(!out.contains("onerror="), "handler left in {out}");
        assert!(!out.contains("onmouseover="), "handler left in {out}");
        assert!(!out.contains("<script"), "script left in {out}");
    }
}

#[test]
fn sanitize_keeps_single_responsive_base() {
    let mut doc = parse(HOSTILE[0]);
    sanitize(&mut doc);
    sanitize(&mut doc);

    let bases: Vec<_> = doc
        .elements_by_tag("style")
        .into_iter()
        .filter(|id| doc.attribute(*id, "id") == Some(RESPONSIVE_BASE_ID))
        .collect();
    assert_eq!(bases.len(), 1);
    assert!(doc.serialize().starts_with("<!DOCTYPE html>"));
}

#[test]
fn sanitize_preserves_listing_content() {
    let out = sanitized(
        "<body><h1>Camera</h1><img src=\"cam.jpg\" alt=\"Camera\" onclick=\"zoom()\"><p>Great &amp; cheap</p></body>",
    );

    assert!(out.contains("<h1>Camera</h1>"));
    assert!(out.contains("<img src=\"cam.jpg\" alt=\"Camera\">"));
    assert!(out.contains("Great &amp; cheap"));
}
