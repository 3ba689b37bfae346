//! Wire envelopes and the export document model
//!
//! The remote API wraps every response in an envelope: list endpoints
//! return `{"data": [...], "next_page": {"offset": ...} | null}` and
//! single-record endpoints return `{"data": {...}}`. Records themselves are
//! treated as opaque mappings; only the identifier and display name are
//! typed, everything else is carried through untouched.

use serde::{Deserialize, Serialize};

/// Any record returned by the remote API.
///
/// Only the identifier and display name are typed; the flattened `extra`
/// map preserves every other field untouched (null stays null, absent
/// stays absent), so a record survives the round-trip into an export
/// document with its content intact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub gid: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Resource {
    /// Access an uninterpreted field as a string, if present.
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(|value| value.as_str())
    }

    /// The gid of the record's team handle, when the record carries one.
    pub fn team_gid(&self) -> Option<&str> {
        self.extra
            .get("team")
            .and_then(|team| team.get("gid"))
            .and_then(|gid| gid.as_str())
    }
}

/// One page of a list endpoint. `next_page` is absent on the final page;
/// its `offset` is an opaque server-issued cursor and is carried verbatim.
#[derive(Debug, Clone, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub data: Vec<Resource>,
    #[serde(default)]
    pub next_page: Option<NextPage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NextPage {
    #[serde(default)]
    pub offset: Option<String>,
}

/// Envelope of a single-record endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    pub data: Resource,
}

/// The full fetched hierarchy of one project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectExport {
    pub project: Resource,
    pub tasks: Vec<TaskExport>,
}

/// One task with its sub-resources, each in remote endpoint order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskExport {
    pub task: Resource,
    pub subtasks: Vec<Resource>,
    pub stories: Vec<Resource>,
    pub attachments: Vec<AttachmentExport>,
}

/// Attachment detail record plus, when a download was requested and
/// succeeded, the file's path relative to the project's export root.
/// Never a broken path: a failed or skipped download leaves it absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttachmentExport {
    #[serde(flatten)]
    pub attachment: Resource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub downloaded_path: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resource_round_trips_opaque_fields() {
        // Arrange: a record with fields the core does not interpret
        let wire = json!({
            "gid": "1201",
            "name": "Launch Plan",
            "completed": false,
            "due_on": null,
            "custom": {"points": 5, "tags": ["a", "b"]}
        });

        // Act: deserialize and serialize back
        let resource: Resource = serde_json::from_value(wire.clone()).unwrap();
        let back = serde_json::to_value(&resource).unwrap();

        // Assert: nothing gained, nothing lost; null stays null
        assert_eq!(back, wire);
        assert_eq!(resource.gid, "1201");
        assert_eq!(resource.str_field("due_on"), None);
        assert_eq!(
            resource.extra.get("due_on"),
            Some(&serde_json::Value::Null)
        );
    }

    #[test]
    fn test_resource_without_name_stays_without_name() {
        // Story records carry text, not a name.
        let wire = json!({"gid": "9", "text": "marked complete"});

        let resource: Resource = serde_json::from_value(wire.clone()).unwrap();
        let back = serde_json::to_value(&resource).unwrap();

        assert_eq!(back, wire);
        assert!(back.get("name").is_none());
    }

    #[test]
    fn test_page_with_cursor() {
        let page: Page = serde_json::from_value(json!({
            "data": [{"gid": "1", "name": "A"}, {"gid": "2", "name": "B"}],
            "next_page": {"offset": "abc123", "path": "/p?offset=abc123"}
        }))
        .unwrap();

        assert_eq!(page.data.len(), 2);
        assert_eq!(page.data[0].gid, "1");
        assert_eq!(page.next_page.unwrap().offset.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_page_final_page_has_no_cursor() {
        let explicit_null: Page =
            serde_json::from_value(json!({"data": [], "next_page": null})).unwrap();
        let absent: Page = serde_json::from_value(json!({"data": []})).unwrap();

        assert!(explicit_null.next_page.is_none());
        assert!(absent.next_page.is_none());
    }

    #[test]
    fn test_project_record_carries_team_handle() {
        let resource: Resource = serde_json::from_value(json!({
            "gid": "1201",
            "name": "Launch Plan",
            "team": {"gid": "77", "name": "Marketing"}
        }))
        .unwrap();

        assert_eq!(resource.team_gid(), Some("77"));
    }

    #[test]
    fn test_null_team_survives_round_trip() {
        let wire = json!({"gid": "1201", "name": "Personal", "team": null});

        let resource: Resource = serde_json::from_value(wire.clone()).unwrap();
        let back = serde_json::to_value(&resource).unwrap();

        assert_eq!(resource.team_gid(), None);
        assert_eq!(back, wire);
    }

    #[test]
    fn test_attachment_export_omits_downloaded_path_when_absent() {
        let export = AttachmentExport {
            attachment: serde_json::from_value(json!({"gid": "5", "name": "spec.pdf"})).unwrap(),
            downloaded_path: None,
        };

        let value = serde_json::to_value(&export).unwrap();

        assert!(value.get("downloaded_path").is_none());
        assert_eq!(value["name"], "spec.pdf");
    }

    #[test]
    fn test_attachment_export_records_relative_path() {
        let export = AttachmentExport {
            attachment: serde_json::from_value(json!({"gid": "5", "name": "spec.pdf"})).unwrap(),
            downloaded_path: Some("attachments/task_1_spec.pdf".to_string()),
        };

        let value = serde_json::to_value(&export).unwrap();

        assert_eq!(value["downloaded_path"], "attachments/task_1_spec.pdf");
    }

    #[test]
    fn test_export_document_shape() {
        let document = ProjectExport {
            project: serde_json::from_value(json!({"gid": "1", "name": "P"})).unwrap(),
            tasks: vec![TaskExport {
                task: serde_json::from_value(json!({"gid": "10", "name": "T"})).unwrap(),
                subtasks: vec![],
                stories: vec![],
                attachments: vec![],
            }],
        };

        let value = serde_json::to_value(&document).unwrap();

        assert_eq!(value["project"]["gid"], "1");
        assert_eq!(value["tasks"][0]["task"]["gid"], "10");
        assert!(value["tasks"][0]["subtasks"].as_array().unwrap().is_empty());
    }
}
