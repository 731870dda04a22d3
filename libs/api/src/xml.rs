//! XML API documents.
//!
//! The device's operational surface speaks XML. Responses are kept in two
//! forms: the raw text (returned to callers verbatim as `stdout_xml`) and a
//! structured [`serde_json::Value`] rendering used for field access and the
//! JSON `stdout` rendering.
//!
//! The structured form follows the usual XML-to-map conventions: attributes
//! become `"@attr"` keys, text-only elements become strings, repeated
//! sibling elements become arrays, and an element carrying both attributes
//! and text stores the text under `"#text"`. A consequence is that a
//! single-element list is indistinguishable from a scalar; consumers that
//! care about list shape must normalize (see fwsync-reconcile).

use serde_json::{Map, Value};

use crate::error::ApiError;

/// A parsed XML API response.
#[derive(Debug, Clone)]
pub struct ResponseDocument {
    raw: String,
    value: Value,
}

impl ResponseDocument {
    /// Parse a response from its raw XML text.
    pub fn parse(raw: impl Into<String>) -> Result<Self, ApiError> {
        let raw = raw.into();
        let doc = roxmltree::Document::parse(&raw)?;
        let root = doc.root_element();

        let mut top = Map::new();
        top.insert(root.tag_name().name().to_string(), element_to_value(root));

        Ok(Self {
            raw,
            value: Value::Object(top),
        })
    }

    /// The raw XML text.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The structured form of the whole document.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// The document rendered as a JSON string.
    pub fn to_json(&self) -> String {
        self.value.to_string()
    }

    /// Walk the structured form along `path`.
    pub fn get(&self, path: &[&str]) -> Option<&Value> {
        let mut current = &self.value;
        for key in path {
            current = current.as_object()?.get(*key)?;
        }
        Some(current)
    }

    /// Element text at `path`, if the element exists and has text.
    pub fn text(&self, path: &[&str]) -> Option<&str> {
        match self.get(path)? {
            Value::String(s) => Some(s),
            Value::Object(map) => map.get("#text").and_then(Value::as_str),
            _ => None,
        }
    }

    /// The `status` attribute of the response element.
    pub fn status(&self) -> Option<&str> {
        self.text(&["response", "@status"])
    }
}

fn element_to_value(node: roxmltree::Node<'_, '_>) -> Value {
    let mut map = Map::new();

    for attr in node.attributes() {
        map.insert(
            format!("@{}", attr.name()),
            Value::String(attr.value().to_string()),
        );
    }

    let children: Vec<_> = node.children().filter(|c| c.is_element()).collect();

    if children.is_empty() {
        let text = node
            .text()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        if map.is_empty() {
            return match text {
                Some(t) => Value::String(t),
                None => Value::Null,
            };
        }
        if let Some(t) = text {
            map.insert("#text".to_string(), Value::String(t));
        }
        return Value::Object(map);
    }

    for child in children {
        let name = child.tag_name().name().to_string();
        let value = element_to_value(child);

        match map.get_mut(&name) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                map.insert(name, value);
            }
        }
    }

    Value::Object(map)
}

/// Convert a CLI-style operational command into its XML form.
///
/// Each word becomes a nested element; the innermost word becomes an empty
/// element. A double-quoted word becomes the text of the element before it:
///
/// - `show jobs all` → `<show><jobs><all/></jobs></show>`
/// - `show jobs id "3"` → `<show><jobs><id>3</id></jobs></show>`
pub fn command_to_xml(cmd: &str) -> String {
    let args: Vec<&str> = cmd.split_whitespace().collect();
    let mut out = String::new();
    build_cmd(&args, &mut out);
    out
}

fn build_cmd(args: &[&str], out: &mut String) {
    let Some((arg, rest)) = args.split_first() else {
        return;
    };

    if let Some(quoted) = rest
        .first()
        .and_then(|next| next.strip_prefix('"'))
        .and_then(|next| next.strip_suffix('"'))
    {
        out.push_str(&format!("<{arg}>{quoted}</{arg}>"));
        build_cmd(&rest[1..], out);
    } else if rest.is_empty() {
        out.push_str(&format!("<{arg}/>"));
    } else {
        out.push_str(&format!("<{arg}>"));
        build_cmd(rest, out);
        out.push_str(&format!("</{arg}>"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const JOB_XML: &str = r#"
<response status="success">
    <result>
        <job>
            <id>1</id>
            <type>AutoCom</type>
            <status>FIN</status>
            <result>OK</result>
            <details>
                <line>Configuration committed successfully</line>
                <line>Successfully committed last configuration</line>
            </details>
        </job>
    </result>
</response>
"#;

    #[test]
    fn parses_nested_text() {
        let doc = ResponseDocument::parse(JOB_XML).unwrap();
        assert_eq!(doc.status(), Some("success"));
        assert_eq!(doc.text(&["response", "result", "job", "result"]), Some("OK"));
        assert_eq!(doc.text(&["response", "result", "job", "id"]), Some("1"));
    }

    #[test]
    fn repeated_siblings_become_arrays() {
        let doc = ResponseDocument::parse(JOB_XML).unwrap();
        assert_eq!(
            doc.get(&["response", "result", "job", "details", "line"]),
            Some(&json!([
                "Configuration committed successfully",
                "Successfully committed last configuration"
            ]))
        );
    }

    #[test]
    fn single_child_collapses_to_scalar() {
        let doc =
            ResponseDocument::parse("<response><result><job>5</job></result></response>").unwrap();
        assert_eq!(
            doc.get(&["response", "result", "job"]),
            Some(&json!("5"))
        );
    }

    #[test]
    fn empty_element_is_null() {
        let doc = ResponseDocument::parse("<response><result/></response>").unwrap();
        assert_eq!(doc.get(&["response", "result"]), Some(&Value::Null));
        assert_eq!(doc.text(&["response", "result"]), None);
    }

    #[test]
    fn attribute_with_text_uses_text_key() {
        let doc = ResponseDocument::parse(r#"<response code="19">yes</response>"#).unwrap();
        assert_eq!(doc.text(&["response"]), Some("yes"));
        assert_eq!(doc.get(&["response", "@code"]), Some(&json!("19")));
    }

    #[test]
    fn json_rendering_round_trips_structure() {
        let doc = ResponseDocument::parse(r#"<response status="success"><result>no</result></response>"#)
            .unwrap();
        let rendered: Value = serde_json::from_str(&doc.to_json()).unwrap();
        assert_eq!(
            rendered,
            json!({"response": {"@status": "success", "result": "no"}})
        );
    }

    #[test]
    fn rejects_malformed_xml() {
        assert!(ResponseDocument::parse("<response><result></response>").is_err());
    }

    #[rstest::rstest]
    #[case("show jobs all", "<show><jobs><all/></jobs></show>")]
    #[case("check pending-changes", "<check><pending-changes/></check>")]
    #[case(r#"show jobs id "3""#, "<show><jobs><id>3</id></jobs></show>")]
    #[case(
        r#"request license fetch auth-code "XY-123""#,
        "<request><license><fetch><auth-code>XY-123</auth-code></fetch></license></request>"
    )]
    #[case("diff", "<diff/>")]
    fn command_conversion(#[case] cmd: &str, #[case] expected: &str) {
        assert_eq!(command_to_xml(cmd), expected);
    }
}
