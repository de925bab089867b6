//! JSON Schema validation of document subtrees
//!
//! The schema is parsed and compiled independently of the document being
//! checked. Schema text that does not parse or compile is a caller error
//! ([`JsonError::InvalidSchema`]), kept apart from a document that does not
//! satisfy a valid schema ([`JsonError::SchemaViolation`]).

use jsonschema::error::ValidationErrorKind;
use jsonschema::{Draft, JSONSchema, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{JsonError, Result};
use crate::loader::locate_error;
use crate::view::NodeView;

/// Local `$ref` chains longer than this are not followed when locating a keyword
const MAX_REF_HOPS: usize = 32;

/// JSON Schema draft to compile schemas against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaDraft {
    Draft4,
    Draft6,
    Draft7,
}

impl From<SchemaDraft> for Draft {
    fn from(draft: SchemaDraft) -> Self {
        match draft {
            SchemaDraft::Draft4 => Draft::Draft4,
            SchemaDraft::Draft6 => Draft::Draft6,
            SchemaDraft::Draft7 => Draft::Draft7,
        }
    }
}

/// Schema validation settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationOptions {
    /// Force a draft; when unset the schema's `$schema` decides (Draft 7 otherwise)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draft: Option<SchemaDraft>,
}

impl NodeView<'_> {
    /// Validate this subtree against `schema` (JSON Schema text)
    pub fn validate_schema(&self, schema: &str) -> Result<()> {
        self.validate_schema_with(schema, &ValidationOptions::default())
    }

    pub fn validate_schema_with(&self, schema: &str, options: &ValidationOptions) -> Result<()> {
        let schema_doc: Value = serde_json::from_str(schema).map_err(|err| {
            let (offset, message) = locate_error(schema, &err);
            JsonError::InvalidSchema {
                offset: Some(offset),
                message,
            }
        })?;

        let mut compile = JSONSchema::options();
        if let Some(draft) = options.draft {
            compile.with_draft(draft.into());
        }
        let compiled = compile
            .compile(&schema_doc)
            .map_err(|err| JsonError::InvalidSchema {
                offset: None,
                message: err.to_string(),
            })?;

        let instance = self.subtree().to_value();
        let violation = match compiled.validate(&instance) {
            Ok(()) => None,
            Err(mut errors) => errors.next().map(|err| to_violation(&schema_doc, &err)),
        };

        match violation {
            Some(err) => {
                debug!(node = self.name(), error = %err, "schema validation failed");
                Err(err)
            }
            None => Ok(()),
        }
    }
}

/// Map the engine's first error to schema location, keyword and document location
fn to_violation(schema: &Value, err: &ValidationError<'_>) -> JsonError {
    let mut segments = split_pointer(&err.schema_path.to_string());
    let keyword = match err.kind {
        ValidationErrorKind::FalseSchema => "false".to_string(),
        _ => segments.pop().unwrap_or_default(),
    };

    JsonError::SchemaViolation {
        schema_pointer: locate_keyword(schema, &segments, &keyword),
        keyword,
        document_pointer: format!("#{}", err.instance_path),
        message: err.to_string(),
    }
}

/// "/a/b~1c" -> ["a", "b/c"]
fn split_pointer(pointer: &str) -> Vec<String> {
    pointer
        .split('/')
        .skip(1)
        .map(|segment| segment.replace("~1", "/").replace("~0", "~"))
        .collect()
}

fn escape_segment(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

fn child<'v>(value: &'v Value, segment: &str) -> Option<&'v Value> {
    match value {
        Value::Object(members) => members.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

/// Target of a local `$ref` held by `value`, with its pointer
fn follow_ref<'v>(root: &'v Value, value: &Value) -> Option<(&'v Value, String)> {
    let fragment = value.get("$ref")?.as_str()?.strip_prefix('#')?;
    root.pointer(fragment).map(|target| (target, fragment.to_string()))
}

/// URI fragment of the schema object holding `keyword`, reached by walking
/// `segments` from the root and following local `$ref`s where the walk
/// cannot continue in place.
fn locate_keyword(root: &Value, segments: &[String], keyword: &str) -> String {
    let mut current = root;
    let mut pointer = String::new();

    for segment in segments {
        if segment == "$ref" {
            if let Some((target, target_pointer)) = follow_ref(root, current) {
                current = target;
                pointer = target_pointer;
                continue;
            }
        }

        let mut hops = 0;
        loop {
            if let Some(next) = child(current, segment) {
                current = next;
                pointer.push('/');
                pointer.push_str(&escape_segment(segment));
                break;
            }
            match follow_ref(root, current) {
                Some((target, target_pointer)) if hops < MAX_REF_HOPS => {
                    current = target;
                    pointer = target_pointer;
                    hops += 1;
                }
                _ => return format!("#{pointer}"),
            }
        }
    }

    let mut hops = 0;
    while hops < MAX_REF_HOPS {
        let holds_keyword = if keyword == "false" {
            current.is_boolean()
        } else {
            child(current, keyword).is_some()
        };
        if holds_keyword {
            break;
        }
        let Some((target, target_pointer)) = follow_ref(root, current) else {
            break;
        };
        current = target;
        pointer = target_pointer;
        hops += 1;
    }

    format!("#{pointer}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::loader::load_from_str;
    use rstest::rstest;

    const REQUIRE_X: &str = r#"{"type": "object", "required": ["x"]}"#;

    #[test]
    fn test_required_member_missing() {
        let doc = load_from_str("{}").unwrap();
        let err = doc.root().validate_schema(REQUIRE_X).unwrap_err();
        match err {
            JsonError::SchemaViolation {
                ref schema_pointer,
                ref keyword,
                ref document_pointer,
                ref message,
            } => {
                assert_eq!(schema_pointer, "#");
                assert_eq!(keyword, "required");
                assert_eq!(document_pointer, "#");
                assert!(message.contains("\"x\""), "{message}");
            }
            other => panic!("expected schema violation, got {other:?}"),
        }
    }

    #[test]
    fn test_required_member_present() {
        let doc = load_from_str(r#"{"x": 1}"#).unwrap();
        assert!(doc.root().validate_schema(REQUIRE_X).is_ok());
    }

    #[test]
    fn test_nested_violation_pointers() {
        let schema = r#"{
            "type": "object",
            "properties": {"port": {"type": "integer"}}
        }"#;
        let doc = load_from_str(r#"{"port": "eighty"}"#).unwrap();
        let err = doc.root().validate_schema(schema).unwrap_err();
        let JsonError::SchemaViolation {
            schema_pointer,
            keyword,
            document_pointer,
            ..
        } = err
        else {
            panic!("expected schema violation");
        };
        assert_eq!(schema_pointer, "#/properties/port");
        assert_eq!(keyword, "type");
        assert_eq!(document_pointer, "#/port");
    }

    #[rstest]
    #[case::required(REQUIRE_X, "{}", "#", "required", "#")]
    #[case::type_under_properties(
        r#"{"properties": {"port": {"type": "integer"}}}"#,
        r#"{"port": "eighty"}"#,
        "#/properties/port",
        "type",
        "#/port"
    )]
    #[case::ref_to_definition(
        r##"{"definitions": {"s": {"type": "string"}}, "properties": {"a": {"$ref": "#/definitions/s"}}}"##,
        r#"{"a": 1}"#,
        "#/definitions/s",
        "type",
        "#/a"
    )]
    #[case::ref_chain(
        r##"{
            "definitions": {
                "port": {"$ref": "#/definitions/positive"},
                "positive": {"type": "integer", "minimum": 1}
            },
            "properties": {"p": {"$ref": "#/definitions/port"}}
        }"##,
        r#"{"p": 0}"#,
        "#/definitions/positive",
        "minimum",
        "#/p"
    )]
    #[case::false_subschema(r#"{"properties": {"a": false}}"#, r#"{"a": 1}"#, "#/properties/a", "false", "#/a")]
    #[case::root_false("false", "{}", "#", "false", "#")]
    #[case::additional_properties(
        r#"{"properties": {"a": {}}, "additionalProperties": false}"#,
        r#"{"a": 1, "b": 2}"#,
        "#",
        "additionalProperties",
        "#"
    )]
    #[case::items_by_index(
        r#"{"items": [{"type": "string"}, {"type": "integer"}]}"#,
        r#"["a", "b"]"#,
        "#/items/1",
        "type",
        "#/1"
    )]
    #[case::enumeration(r#"{"enum": [1, 2]}"#, "3", "#", "enum", "#")]
    fn test_violation_location(
        #[case] schema: &str,
        #[case] document: &str,
        #[case] expected_schema_pointer: &str,
        #[case] expected_keyword: &str,
        #[case] expected_document_pointer: &str,
    ) {
        let doc = load_from_str(document).unwrap();
        match doc.root().validate_schema(schema).unwrap_err() {
            JsonError::SchemaViolation {
                schema_pointer,
                keyword,
                document_pointer,
                ..
            } => {
                assert_eq!(schema_pointer, expected_schema_pointer);
                assert_eq!(keyword, expected_keyword);
                assert_eq!(document_pointer, expected_document_pointer);
            }
            other => panic!("expected schema violation, got {other:?}"),
        }
    }

    #[test]
    fn test_locate_keyword_follows_refs() {
        let schema = serde_json::json!({
            "definitions": {"s": {"type": "string"}, "f": false},
            "properties": {
                "a": {"$ref": "#/definitions/s"},
                "b": {"$ref": "#/definitions/f"}
            }
        });
        let path = |p: &str| split_pointer(p);
        assert_eq!(locate_keyword(&schema, &path("/properties/a"), "type"), "#/definitions/s");
        assert_eq!(locate_keyword(&schema, &path("/properties/a/$ref"), "type"), "#/definitions/s");
        assert_eq!(locate_keyword(&schema, &path("/properties/b"), "false"), "#/definitions/f");
        assert_eq!(locate_keyword(&schema, &path(""), "required"), "#");
    }

    #[test]
    fn test_locate_keyword_stops_on_ref_cycle() {
        let schema = serde_json::json!({
            "definitions": {"a": {"$ref": "#/definitions/b"}, "b": {"$ref": "#/definitions/a"}}
        });
        let pointer = locate_keyword(&schema, &split_pointer("/definitions/a"), "type");
        assert!(pointer.starts_with("#/definitions/"), "{pointer}");
    }

    #[test]
    fn test_pointer_segments_unescaped() {
        assert_eq!(split_pointer("/a~1b/c~0d"), vec!["a/b", "c~d"]);
        assert!(split_pointer("").is_empty());
        assert_eq!(escape_segment("a/b~"), "a~1b~0");
    }

    #[test]
    fn test_validates_child_view() {
        let doc = load_from_str(r#"{"inner": {"x": true}, "other": {}}"#).unwrap();
        let root = doc.root();
        assert!(root.get_object("inner", false).unwrap().validate_schema(REQUIRE_X).is_ok());
        assert!(root.get_object("other", false).unwrap().validate_schema(REQUIRE_X).is_err());
        assert!(root.get_object("absent", true).unwrap().validate_schema(REQUIRE_X).is_err());
    }

    #[test]
    fn test_malformed_schema_text() {
        let doc = load_from_str("{}").unwrap();
        let err = doc.root().validate_schema(r#"{"type": }"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSchema);
        assert!(matches!(err, JsonError::InvalidSchema { offset: Some(9), .. }));
    }

    #[test]
    fn test_uncompilable_schema() {
        let doc = load_from_str("{}").unwrap();
        let err = doc.root().validate_schema(r#"{"type": 12}"#).unwrap_err();
        assert!(matches!(err, JsonError::InvalidSchema { offset: None, .. }));
    }

    #[test]
    fn test_explicit_draft() {
        let options = ValidationOptions {
            draft: Some(SchemaDraft::Draft4),
        };
        let doc = load_from_str(r#"{"x": 1}"#).unwrap();
        assert!(doc.root().validate_schema_with(REQUIRE_X, &options).is_ok());
    }
}
