// crates/tagforge_core/tests/tag_payload_scenarios.rs
//
// Field data written to a tag must come back unchanged (as strings) when the
// tag is scanned, and the written URL must be byte-for-byte stable.

use serde_json::json;
use tagforge_core::{standard_validator, FieldDefinition, FieldType, FormData, Schema, SchemaContext};

const BASE_URL: &str = "https://example.com";

fn inspection_context() -> SchemaContext {
    SchemaContext::load(Schema::new(vec![
        FieldDefinition::new("HK-Nr", FieldType::Text).with_short_key("HK"),
        FieldDefinition::new("Leistung", FieldType::Number).with_short_key("P"),
        FieldDefinition::new("Spannung", FieldType::Number).with_short_key("U"),
        FieldDefinition::new("geprüft von", FieldType::Text).with_short_key("Chk"),
        FieldDefinition::new("Bemerkung", FieldType::Text),
        FieldDefinition::new("Dokumentation", FieldType::Url).with_short_key("Doc"),
    ]))
}

struct RoundTripCase {
    name: &'static str,
    data: FormData,
    context: &'static str,
}

fn round_trips() -> Vec<RoundTripCase> {
    vec![
        RoundTripCase {
            name: "Plain_Values",
            data: FormData::new().with("HK-Nr", "HC123").with("Leistung", "100").with("Spannung", "230"),
            context: "Typical heater tag",
        },
        RoundTripCase {
            name: "Numbers_And_Zero",
            data: FormData::new().with("Leistung", json!(2.75)).with("Spannung", 0),
            context: "Numeric values come back as strings",
        },
        RoundTripCase {
            name: "Umlauts_And_Reserved",
            data: FormData::new().with("geprüft von", "Jürgen Weiß").with("Bemerkung", "a=b & c+d #1 50%"),
            context: "Reserved characters in values and names",
        },
        RoundTripCase {
            name: "Document_Link",
            data: FormData::new().with("Dokumentation", "https://docs.example.com/a b.pdf?v=2#p3"),
            context: "URL inside the fragment",
        },
        RoundTripCase {
            name: "Blank_Values_Dropped",
            data: FormData::new().with("HK-Nr", "HC9").with("Bemerkung", "   ").with("Leistung", json!(null)),
            context: "Blanks never reach the tag",
        },
    ]
}

#[test]
fn test_end_to_end_scenario() {
    let ctx = SchemaContext::load(Schema::new(vec![
        FieldDefinition::new("HK-Nr", FieldType::Text).with_short_key("HK"),
        FieldDefinition::new("Leistung", FieldType::Number).with_short_key("P"),
        FieldDefinition::new("Spannung", FieldType::Number).with_short_key("U"),
    ]));
    let data = FormData::new()
        .with("HK-Nr", "HC123")
        .with("Leistung", "100")
        .with("Spannung", "230");

    let url = ctx.encode(&data, BASE_URL);
    assert_eq!(url, "https://example.com#HK=HC123&P=100&U=230");
    assert_eq!(ctx.decode_url(&url), data);
}

#[test]
fn test_round_trip_table() {
    let ctx = inspection_context();
    let mut failures = Vec::new();

    for case in round_trips() {
        let url = ctx.encode(&case.data, BASE_URL);
        let decoded = ctx.decode_url(&url);

        if decoded != case.data.stringified() {
            failures.push(format!("{} ({}): {} -> {:?}", case.name, case.context, url, decoded));
        }
        assert!(!url.contains('?'), "{}: query form in {}", case.name, url);
    }

    assert!(failures.is_empty(), "Round trip failures:\n{}", failures.join("\n"));
}

#[test]
fn test_json_import_feeds_codec_and_validator() {
    let ctx = inspection_context();
    let imported = FormData::from_json(
        r#"{
  "HK-Nr": "HC123",
  "Spannung": 230,
  "Dokumentation": "https://example.com/doc.pdf",
  "Unbekannt": "wird ignoriert"
}"#,
    )
    .expect("valid export file");

    let engine = standard_validator(BASE_URL, 880);
    assert!(engine.messages(&ctx, &imported).is_empty());

    let url = ctx.encode(&imported, BASE_URL);
    assert_eq!(
        url,
        "https://example.com#HK=HC123&U=230&Doc=https%3A%2F%2Fexample.com%2Fdoc.pdf"
    );
    assert_eq!(ctx.document_links(&ctx.decode_url(&url)), vec!["https://example.com/doc.pdf"]);
}
