//! End-to-end tests over the file-backed stores.

use fieldkit_fields::{
    ContextPolicy, FieldsContext, FieldsError, FileMetaStore, FileStore, ResolutionContext,
    SchemaScope, SchemaValidator,
};
use serde_json::json;
use std::path::Path;
use tempfile::TempDir;

const PRODUCT_SCHEMA: &str = r#"
fields:
  - info: Prices are shown including tax.
  - name: title
    type: string
  - name: price
    type: number
    default: 0
  - name: tags
    type: taxonomy
    taxonomy: product_tag
    multiple: true
  - name: sections
    type: block
    list: true
    blocks:
      - name: hero
        fields:
          - name: title
            type: string
      - name: quote
        fields:
          - name: text
            type: rich-text
  - name: tracking
    type: code
    language: javascript
"#;

const SHARED_SCHEMA: &str = r#"
fields:
  - name: price
    type: number
  - name: support_email
    type: string
"#;

fn open_product_site(root: &Path) -> FieldsContext<FileStore, FileMetaStore> {
    let mut ctx = FieldsContext::open(root).unwrap().build();
    let result = ctx
        .save_schema(&SchemaScope::template("single-product.php"), PRODUCT_SCHEMA, None)
        .unwrap();
    assert!(result.valid, "{}", result.message);
    let result = ctx
        .save_schema(&SchemaScope::shared_group("single-product.php"), SHARED_SCHEMA, None)
        .unwrap();
    assert!(result.valid, "{}", result.message);
    ctx.bind_document("101", "single-product.php").unwrap();
    ctx
}

#[test_log::test]
fn submitted_document_is_cleaned_and_resolved() {
    let temp = TempDir::new().unwrap();
    let mut ctx = open_product_site(temp.path());

    let raw = json!({
        "title": "<script>steal()</script>Kettle",
        "price": 10,
        "tags": ["", "3", "7", ""],
        "sections": [
            {"type": "quote", "text": "<b>ok</b><script>x</script>"},
            {"type": "hero", "title": "<b>Big</b>"}
        ],
        "tracking": "<script>track()</script>"
    });
    let cleaned = ctx.save_document("101", &raw, Vec::<String>::new(), false).unwrap();

    assert_eq!(cleaned["title"], "Kettle");
    assert_eq!(cleaned["tags"], json!(["3", "7"]));
    assert_eq!(cleaned["sections"][0]["text"], "<b>ok</b>");
    assert_eq!(cleaned["sections"][1]["title"], "Big");
    assert_eq!(cleaned["tracking"], "");

    let doc = ResolutionContext::document("101");
    assert_eq!(ctx.resolve("price", &doc).unwrap(), Some(json!(10)));

    let sections = ctx.resolve("sections", &doc).unwrap().unwrap();
    let quote = &sections[0];
    assert_eq!(
        ctx.resolve("text", &ResolutionContext::document("101").within(quote))
            .unwrap(),
        Some(json!("<b>ok</b>"))
    );
}

#[test_log::test]
fn trusted_author_keeps_custom_code() {
    let temp = TempDir::new().unwrap();
    let mut ctx = open_product_site(temp.path());
    let cleaned = ctx
        .save_document("101", &json!({"tracking": "track('<b>')"}), Vec::<String>::new(), || true)
        .unwrap();
    assert_eq!(cleaned["tracking"], "track('<b>')");
}

#[test_log::test]
fn shared_opt_in_masks_document_value() {
    let temp = TempDir::new().unwrap();
    let mut ctx = open_product_site(temp.path());
    ctx.save_group_values(
        "single-product.php",
        &json!({"price": 20, "support_email": "help@example.com"}),
        false,
    )
    .unwrap();

    let doc = ResolutionContext::document("101");
    ctx.save_document("101", &json!({"price": 10}), ["price"], false)
        .unwrap();
    assert_eq!(ctx.resolve("price", &doc).unwrap(), Some(json!(20)));

    ctx.save_document("101", &json!({"price": 10}), Vec::<String>::new(), false)
        .unwrap();
    assert_eq!(ctx.resolve("price", &doc).unwrap(), Some(json!(10)));

    // Declared only in the shared schema.
    assert_eq!(
        ctx.resolve("support_email", &doc).unwrap(),
        Some(json!("help@example.com"))
    );
}

#[test_log::test]
fn info_fields_rejected_for_partials() {
    let temp = TempDir::new().unwrap();
    let mut ctx = FieldsContext::open(temp.path()).unwrap().build();
    let result = ctx
        .save_schema(
            &SchemaScope::template("single.php"),
            PRODUCT_SCHEMA,
            Some("template-parts/header.php"),
        )
        .unwrap();
    assert!(!result.valid);
    assert_eq!(
        result.message,
        "Info fields are not allowed for template partials and archives. Current template: template-parts/header.php"
    );
    assert!(ctx
        .schema_source(&SchemaScope::template("single.php"))
        .unwrap()
        .is_none());
    assert!(matches!(
        result.into_result(),
        Err(FieldsError::SchemaRejected { .. })
    ));
}

#[test]
fn custom_policy_changes_classification() {
    let validator = SchemaValidator::new(ContextPolicy::new(["landing-*.php"]));
    let schema = "fields:\n  - info: hello\n";
    assert!(!validator.validate(schema, Some("landing-summer.php")).valid);
    assert!(validator.validate(schema, Some("header.php")).valid);
}

#[test]
fn validator_accepted_schemas_have_named_typed_fields() {
    let validator: SchemaValidator = SchemaValidator::default();
    assert!(validator.validate(PRODUCT_SCHEMA, Some("single-product.php")).valid);
    let tree: serde_json::Value = serde_yaml_ng::from_str(PRODUCT_SCHEMA).unwrap();
    let normalized = fieldkit_fields::normalize(&tree);
    let fields = normalized["fields"].as_array().unwrap();
    assert!(!fields.is_empty());
    for field in fields {
        assert!(field["name"].is_string());
        assert!(field["type"].is_string());
    }
}
