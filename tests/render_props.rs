use proptest::prelude::*;

use marklive::document::Document;
use marklive::render::{RenderedView, render};

fn markdownish() -> impl Strategy<Value = String> {
    let piece = prop_oneof![
        Just("# ".to_string()),
        Just("## ".to_string()),
        Just("- ".to_string()),
        Just("1. ".to_string()),
        Just("> ".to_string()),
        Just("* ".to_string()),
        Just("**".to_string()),
        Just("`".to_string()),
        Just("```".to_string()),
        Just("~~".to_string()),
        Just("[x] ".to_string()),
        Just("| a | b |\n|---|---|\n".to_string()),
        Just("![alt](img.png)".to_string()),
        Just("[^1]".to_string()),
        Just("<div>".to_string()),
        Just("\n".to_string()),
        Just("\n\n".to_string()),
        "[a-zA-Z0-9 ]{0,12}",
        "\\PC{0,4}",
    ];
    proptest::collection::vec(piece, 0..40).prop_map(|pieces| pieces.concat())
}

proptest! {
    #[test]
    fn prop_render_never_panics_on_arbitrary_text(source in "\\PC*") {
        let tree = render(&source);
        let html = tree.to_html();
        prop_assert!(!html.contains("<script"));
    }

    #[test]
    fn prop_render_never_panics_on_markdown_fragments(source in markdownish()) {
        let _ = render(&source).to_html();
    }

    #[test]
    fn prop_layout_lines_fit_width(source in markdownish(), width in 10u16..120) {
        let view = RenderedView::new(&source, width, 0);
        prop_assert_eq!(view.width(), width);
        for line in view.document().lines() {
            prop_assert!(!line.content().contains('\n'));
        }
    }

    #[test]
    fn prop_view_matches_standalone_layout(source in markdownish(), width in 10u16..120) {
        let view = RenderedView::new(&source, width, 7);
        prop_assert_eq!(view.revision(), 7);
        prop_assert_eq!(view.document(), &Document::parse(&source, width));
    }
}
