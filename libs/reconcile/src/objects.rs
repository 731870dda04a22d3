//! Schema descriptors and entry builders for common object kinds.
//!
//! Deliberately not a full catalog; callers with other object kinds build
//! their own [`ObjectSchema`].

use serde_json::{json, Map, Value};

use crate::schema::{FieldSpec, ObjectSchema};

/// Service group: an ordered member list plus tags.
pub fn service_group() -> ObjectSchema {
    ObjectSchema::new(
        "service-group",
        "/restapi/v10.0/Objects/ServiceGroups",
        vec![
            FieldSpec::wrapped_sequence("members", "member").required(),
            FieldSpec::sequence("tag"),
        ],
    )
}

/// Service object: protocol/port definition.
pub fn service() -> ObjectSchema {
    ObjectSchema::new(
        "service",
        "/restapi/v10.0/Objects/Services",
        vec![
            FieldSpec::block("protocol").required(),
            FieldSpec::scalar("description"),
            FieldSpec::sequence("tag"),
        ],
    )
}

/// Administrative tag.
pub fn tag_object() -> ObjectSchema {
    ObjectSchema::new(
        "tag",
        "/restapi/v10.0/Objects/Tags",
        vec![FieldSpec::scalar("color"), FieldSpec::scalar("comments")],
    )
}

/// Entry document for a service group.
pub fn service_group_entry(name: &str, members: &[&str], tags: &[&str]) -> Value {
    json!({
        "@name": name,
        "members": { "member": members },
        "tag": tags,
    })
}

/// Transport protocol of a service object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Tcp,
    Udp,
}

impl Protocol {
    fn key(self) -> &'static str {
        match self {
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
        }
    }
}

/// Entry document for a service object.
pub fn service_entry(
    name: &str,
    protocol: Protocol,
    destination_port: &str,
    source_port: Option<&str>,
    description: Option<&str>,
    tags: &[&str],
) -> Value {
    let mut ports = Map::new();
    ports.insert("port".to_string(), json!(destination_port));
    if let Some(source_port) = source_port {
        ports.insert("source-port".to_string(), json!(source_port));
    }

    let mut protocol_block = Map::new();
    protocol_block.insert(protocol.key().to_string(), Value::Object(ports));

    json!({
        "@name": name,
        "description": description,
        "protocol": protocol_block,
        "tag": tags,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::DesiredState;

    #[test]
    fn service_group_entry_shape() {
        let entry = service_group_entry(
            "Test-Group",
            &["service-http", "service-https"],
            &["Tag-One"],
        );

        assert_eq!(
            entry,
            json!({
                "@name": "Test-Group",
                "members": {"member": ["service-http", "service-https"]},
                "tag": ["Tag-One"],
            })
        );
    }

    #[test]
    fn service_entry_prunes_unset_options() {
        let desired = DesiredState::present(service_entry(
            "ssh-tcp-22",
            Protocol::Tcp,
            "22",
            None,
            Some("SSH on tcp/22"),
            &["Prod"],
        ));

        assert_eq!(
            desired.entry(),
            &json!({
                "@name": "ssh-tcp-22",
                "description": "SSH on tcp/22",
                "protocol": {"tcp": {"port": "22"}},
                "tag": ["Prod"],
            })
        );
    }

    #[test]
    fn udp_service_entry() {
        let entry = service_entry("dns-udp-53", Protocol::Udp, "53", None, None, &[]);
        assert_eq!(entry["protocol"], json!({"udp": {"port": "53"}}));
    }
}
