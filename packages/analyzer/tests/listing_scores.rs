use listing_analyzer::{analyze, analyze_with, AnalyzeOptions};
use listing_dom::{parse, ImageGeometry, StaticLayout};

fn copy(chars: usize) -> String {
    "Lightweight trail runner. ".chars().cycle().take(chars).collect()
}

#[test]
fn missing_title_and_meta_scores_sixty_five() {
    let text = copy(200 - "Trail Runner".len());
    let doc = parse(&format!("<body><h1>Trail Runner</h1><p>{text}</p></body>"));
    let analysis = analyze(&doc);

    assert_eq!(analysis.seo.score, 65);
    assert_eq!(
        analysis.seo.tips,
        vec!["Add a <title> tag.", "Add a meta description (≤155 chars)."]
    );
    assert_eq!(analysis.performance.score, 100);
    assert_eq!(analysis.tips.len(), 2);
}

#[test]
fn well_formed_listing_scores_full() {
    let doc = parse(&format!(
        "<html><head><title>Trail Runner</title><meta name=\"description\" content=\"Light shoe\"></head>\
         <body><h1>Trail Runner</h1><img src=\"shoe.jpg\" alt=\"Shoe\"><a href=\"/specs\">Specs</a><p>{}</p></body></html>",
        copy(180)
    ));
    let analysis = analyze(&doc);

    assert_eq!(analysis.seo.score, 100);
    assert_eq!(analysis.performance.score, 100);
    assert!(analysis.tips.is_empty());
    assert!(analysis.findings.is_empty());
}

#[test]
fn performance_deductions_stack() {
    let images = "<img alt=\"x\" data-natural-width=\"2400\">".repeat(13);
    let css = "p{margin:0}".repeat(2000);
    let doc = parse(&format!("<style>{css}</style><body>{images}</body>"));
    let analysis = analyze(&doc);

    assert_eq!(analysis.performance.score, 100 - 15 - 10 - 10 - 5);
    assert_eq!(
        analysis.performance.tips,
        vec![
            "Resize large images (>1600px).",
            "Too many images; consider fewer or optimize.",
            "Stylesheet is very large.",
            "Add headings for readability.",
        ]
    );
}

#[test]
fn layout_geometry_feeds_performance_score() {
    let doc = parse("<h2>Gallery</h2><img src=\"hero.jpg\" alt=\"Hero\">");
    let img = doc.first_by_tag("img").unwrap();
    let layout = StaticLayout::new().with(img, ImageGeometry::new(600.0, 400.0, 3000, 2000));

    let analysis = analyze_with(&doc, &layout, AnalyzeOptions::default());
    assert_eq!(analysis.performance.score, 85);
}

#[test]
fn analysis_serializes_for_reports() {
    let analysis = analyze(&parse("<title>T</title>"));
    let json = serde_json::to_value(&analysis).unwrap();

    assert_eq!(json["seo"]["score"], analysis.seo.score);
    assert_eq!(json["findings"][0]["category"], "seo");
}
