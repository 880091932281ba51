//! End-to-end behavior of extraction followed by reinjection.

use pretty_assertions::assert_eq;
use sctext_shortcode::{
    CONTENT_KEY, Catalog, EditableText, Extraction, Extractor, FallbackExtractor, FieldAddress,
    Grammar, TagPolicy, TextEdit, TextKind, Tokenizer, reinject,
};

const PAGE: &str = r#"<!-- wp:divi/placeholder -->
[et_pb_section fb_built="1" _builder_version="4.16"][et_pb_row][et_pb_column type="4_4"]
[et_pb_text admin_label="Intro" _builder_version="4.16"]
<h1>Welcome to our site</h1>
<p>We build things.</p>
[/et_pb_text]
[et_pb_blurb title="Fast" image="/img/a.png" content="Quick delivery"][/et_pb_blurb]
[et_pb_tabs][et_pb_tab title="First"][et_pb_text]Nested text[/et_pb_text][/et_pb_tab][et_pb_tab title='Second']Plain tab body[/et_pb_tab][/et_pb_tabs]
[et_pb_button button_text="Contact us" button_url="/contact" /]
[dipi_typing_text title="Typed title"][/dipi_typing_text]
[et_pb_divider][et_pb_text]   [/et_pb_text]
[/et_pb_column][/et_pb_row][/et_pb_section]
<!-- /wp:divi/placeholder -->"#;

fn extract(document: &str) -> Extraction {
    let catalog = Catalog::builtin();
    let grammar = Grammar::permissive();
    Extractor::new(&catalog, &grammar).extract(document)
}

fn addresses(texts: &[EditableText]) -> Vec<FieldAddress> {
    texts.iter().map(EditableText::address).collect()
}

#[test]
fn test_round_trip_identity() {
    let extraction = extract(PAGE);
    let edits = extraction.identity_edits();

    let result = reinject(PAGE, &extraction, &edits);

    assert!(!edits.is_empty());
    assert_eq!(result.document, PAGE);
    assert_eq!(result.unchanged.len(), edits.len());
    assert!(result.skipped.is_empty());
}

#[test]
fn test_round_trip_identity_fallback() {
    let extraction = FallbackExtractor::new().extract(PAGE);
    let edits = extraction.identity_edits();

    let result = reinject(PAGE, &extraction, &edits);

    assert!(!edits.is_empty());
    assert_eq!(result.document, PAGE);
}

#[test]
fn test_targeted_replacement() {
    let document = "[tag]Hello[/tag]";
    let extraction = extract(document);
    assert_eq!(extraction.texts.len(), 1);

    let edit = extraction.texts[0].edit("World");
    let result = reinject(document, &extraction, &[edit]);

    assert_eq!(result.document, "[tag]World[/tag]");
}

#[test]
fn test_targeted_replacement_leaves_rest_of_page() {
    let extraction = extract(PAGE);
    let field = extraction
        .texts
        .iter()
        .find(|t| t.value == "Nested text")
        .unwrap();

    let result = reinject(PAGE, &extraction, &[field.edit("Edited")]);

    assert_eq!(result.document, PAGE.replace("Nested text", "Edited"));
}

#[test]
fn test_nested_balance() {
    let grammar = Grammar::permissive();
    let tokens = Tokenizer::new(&grammar).tokenize("[x][x]inner[/x]outer[/x]");

    assert_eq!(tokens.occurrences().len(), 1);
    assert_eq!(tokens.occurrences()[0].inner_body, "[x]inner[/x]outer");
}

#[test]
fn test_attribute_preservation_on_partial_edit() {
    let catalog = Catalog::empty().with_tag("tag", TagPolicy::attributes(["a", "b"]));
    let grammar = Grammar::permissive();
    let document = r#"[tag a="1" b="2"][/tag]"#;
    let extraction = Extractor::new(&catalog, &grammar).extract(document);

    let edit = TextEdit::new(0, TextKind::Attribute, "b", "9");
    let result = reinject(document, &extraction, &[edit]);

    assert_eq!(result.document, r#"[tag a="1" b="9"][/tag]"#);
}

#[test]
fn test_unknown_tag_heuristic() {
    let empty_body = extract(r#"[mystery title="Welcome"][/mystery]"#);
    let with_body = extract(r#"[mystery title="Welcome"]Body text[/mystery]"#);

    assert_eq!(empty_body.texts.len(), 1);
    assert_eq!(empty_body.texts[0].kind, TextKind::Attribute);
    assert_eq!(empty_body.texts[0].key, "title");

    assert_eq!(with_body.texts.len(), 1);
    assert_eq!(with_body.texts[0].kind, TextKind::InnerContent);
    assert_eq!(with_body.texts[0].key, CONTENT_KEY);
}

#[test]
fn test_structural_container_excluded() {
    let extraction = extract("[et_pb_section]\n  [et_pb_text]Only[/et_pb_text]\n[/et_pb_section]");

    assert_eq!(extraction.texts.len(), 1);
    assert_eq!(extraction.texts[0].tag, "et_pb_text");
    assert_eq!(extraction.texts[0].value, "Only");
    assert!(extraction.texts.iter().all(|t| t.tag != "et_pb_section"));
}

#[test]
fn test_stable_addressing() {
    let first = extract(PAGE);
    let second = extract(PAGE);

    assert_eq!(addresses(&first.texts), addresses(&second.texts));
    assert_eq!(first.texts, second.texts);
}

#[test]
fn test_addresses_are_unique() {
    let extraction = extract(PAGE);
    let mut seen = addresses(&extraction.texts);
    let total = seen.len();
    seen.sort();
    seen.dedup();

    assert_eq!(seen.len(), total);
}

#[test]
fn test_page_fields() {
    let extraction = extract(PAGE);
    let values: Vec<_> = extraction
        .texts
        .iter()
        .map(|t| (t.tag.as_str(), t.key.as_str(), t.value.as_str()))
        .collect();

    assert_eq!(
        values,
        vec![
            (
                "et_pb_text",
                "content",
                "<h1>Welcome to our site</h1>\n<p>We build things.</p>"
            ),
            ("et_pb_blurb", "title", "Fast"),
            ("et_pb_blurb", "content", "Quick delivery"),
            ("et_pb_tab", "title", "First"),
            ("et_pb_text", "content", "Nested text"),
            ("et_pb_tab", "title", "Second"),
            ("et_pb_tab", "content", "Plain tab body"),
            ("et_pb_button", "button_text", "Contact us"),
            ("dipi_typing_text", "title", "Typed title"),
        ]
    );
}

#[test]
fn test_edit_after_reextract_of_changed_document() {
    let extraction = extract(PAGE);
    let button = extraction
        .texts
        .iter()
        .find(|t| t.key == "button_text")
        .unwrap();
    let first = reinject(PAGE, &extraction, &[button.edit("Write to us")]);

    let again = extract(&first.document);
    let same_field = again
        .texts
        .iter()
        .find(|t| t.address() == button.address())
        .unwrap();

    assert_eq!(same_field.value, "Write to us");
}
