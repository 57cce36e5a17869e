use contacts_core::people::{self, DeleteConfirmation, Person};
use contacts_core::{ApiRequest, Error, FieldInput, FieldSpec, InputSchema, Query, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::{present, resource_path, Tool, ToolAnnotations, ToolContext, ToolResult};

const EMAIL_TYPES: &[&str] = &["home", "work", "other"];
const PHONE_TYPES: &[&str] = &["home", "work", "mobile", "other"];

/// An email address or phone number as sent by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypedValue {
    pub value: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

fn typed_value_items(value_description: &str, types: &[&str], type_description: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "value": {"type": "string", "description": value_description},
            "type": {"type": "string", "enum": types, "description": type_description}
        },
        "required": ["value"],
        "additionalProperties": false
    })
}

/// Person fields shared by create and update.
fn contact_fields(emails: &'static str, phones: &'static str) -> Vec<FieldSpec> {
    vec![
        FieldSpec::string("givenName", "First name")
            .aliases(&["given_name", "firstName", "first_name"]),
        FieldSpec::string("familyName", "Last name")
            .aliases(&["family_name", "lastName", "last_name"]),
        FieldSpec::array(
            "emailAddresses",
            typed_value_items("Email address", EMAIL_TYPES, "Type of email"),
            emails,
        )
        .aliases(&["email_addresses", "emails"]),
        FieldSpec::array(
            "phoneNumbers",
            typed_value_items("Phone number", PHONE_TYPES, "Type of phone"),
            phones,
        )
        .aliases(&["phone_numbers", "phones"]),
        FieldSpec::string("organization", "Company/organization name").aliases(&["company"]),
        FieldSpec::string("jobTitle", "Job title").aliases(&["job_title"]),
        FieldSpec::string("notes", "Notes about the contact").aliases(&["biography"]),
    ]
}

pub fn definitions() -> Result<Vec<Tool>> {
    let mut update_fields = vec![
        FieldSpec::string(
            "resourceName",
            "The resource name of the contact to update (e.g., \"people/c12345\")",
        )
        .required()
        .aliases(&["resource_name", "resourceId", "id"]),
        FieldSpec::string(
            "etag",
            "The etag from the contact (required to prevent conflicts)",
        )
        .required(),
    ];
    update_fields.extend(contact_fields(
        "Email addresses (replaces existing)",
        "Phone numbers (replaces existing)",
    ));

    Ok(vec![
        Tool::new(
            "contact_create",
            "Create contact",
            "Create a new contact in Google Contacts.",
            InputSchema::new(contact_fields("Email addresses", "Phone numbers"))?,
            people::person_schema(false),
            ToolAnnotations::default(),
            contact_create,
        ),
        Tool::new(
            "contact_update",
            "Update contact",
            "Update an existing contact. Use contact_get first to retrieve the current etag.",
            InputSchema::new(update_fields)?,
            people::person_schema(false),
            ToolAnnotations::default(),
            contact_update,
        ),
        Tool::new(
            "contact_delete",
            "Delete contact",
            "Permanently delete a contact from Google Contacts.",
            InputSchema::new(vec![FieldSpec::string(
                "resourceName",
                "The resource name of the contact to delete (e.g., \"people/c12345\")",
            )
            .required()
            .aliases(&["resource_name", "resourceId", "id"])])?,
            people::delete_schema(),
            ToolAnnotations::destructive(),
            contact_delete,
        ),
    ])
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContactFields {
    #[serde(default)]
    given_name: FieldInput<String>,
    #[serde(default)]
    family_name: FieldInput<String>,
    #[serde(default)]
    email_addresses: FieldInput<Vec<TypedValue>>,
    #[serde(default)]
    phone_numbers: FieldInput<Vec<TypedValue>>,
    #[serde(default)]
    organization: FieldInput<String>,
    #[serde(default)]
    job_title: FieldInput<String>,
    #[serde(default)]
    notes: FieldInput<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContactUpdateArgs {
    resource_name: String,
    etag: String,
    #[serde(flatten)]
    fields: ContactFields,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContactDeleteArgs {
    resource_name: String,
}

fn name_entry(given: Option<String>, family: Option<String>) -> Value {
    let mut name = Map::new();
    if let Some(given) = given {
        name.insert("givenName".into(), Value::String(given));
    }
    if let Some(family) = family {
        name.insert("familyName".into(), Value::String(family));
    }
    json!([name])
}

fn organization_entry(name: Option<String>, title: Option<String>) -> Value {
    let mut org = Map::new();
    if let Some(name) = name {
        org.insert("name".into(), Value::String(name));
    }
    if let Some(title) = title {
        org.insert("title".into(), Value::String(title));
    }
    json!([org])
}

fn biography_entry(notes: String) -> Value {
    json!([{"value": notes, "contentType": "TEXT_PLAIN"}])
}

impl ContactFields {
    /// Body for `people:createContact`. A group is included only when one of
    /// its values is non-empty.
    fn create_body(&self) -> Value {
        let mut person = Map::new();

        if self.given_name.is_given() || self.family_name.is_given() {
            person.insert(
                "names".into(),
                name_entry(self.given_name.provided(), self.family_name.provided()),
            );
        }
        if let Some(emails) = self.email_addresses.given() {
            person.insert("emailAddresses".into(), json!(emails));
        }
        if let Some(phones) = self.phone_numbers.given() {
            person.insert("phoneNumbers".into(), json!(phones));
        }
        if self.organization.is_given() || self.job_title.is_given() {
            person.insert(
                "organizations".into(),
                organization_entry(self.organization.provided(), self.job_title.provided()),
            );
        }
        if let Some(notes) = self.notes.given() {
            person.insert("biographies".into(), biography_entry(notes.clone()));
        }

        Value::Object(person)
    }

    /// Body and field mask for `updateContact`. A group is included whenever
    /// one of its keys was sent, even with an empty value.
    fn update_body(&self, etag: &str) -> (Value, Vec<&'static str>) {
        let mut person = Map::new();
        let mut mask = Vec::new();
        person.insert("etag".into(), Value::String(etag.to_string()));

        if self.given_name.is_provided() || self.family_name.is_provided() {
            person.insert(
                "names".into(),
                name_entry(self.given_name.provided(), self.family_name.provided()),
            );
            mask.push("names");
        }
        if let Some(emails) = self.email_addresses.provided() {
            person.insert("emailAddresses".into(), json!(emails));
            mask.push("emailAddresses");
        }
        if let Some(phones) = self.phone_numbers.provided() {
            person.insert("phoneNumbers".into(), json!(phones));
            mask.push("phoneNumbers");
        }
        if self.organization.is_provided() || self.job_title.is_provided() {
            person.insert(
                "organizations".into(),
                organization_entry(self.organization.provided(), self.job_title.provided()),
            );
            mask.push("organizations");
        }
        if let Some(notes) = self.notes.provided() {
            person.insert("biographies".into(), biography_entry(notes));
            mask.push("biographies");
        }

        (Value::Object(person), mask)
    }
}

fn contact_create(ctx: &ToolContext, args: ContactFields) -> Result<ToolResult> {
    let raw = ctx.call(&ApiRequest::post("/people:createContact", args.create_body()))?;
    Ok(present(people::reshape::<Person>(raw)?))
}

fn contact_update(ctx: &ToolContext, args: ContactUpdateArgs) -> Result<ToolResult> {
    let (body, mask) = args.fields.update_body(&args.etag);
    let query = Query::new().set("updatePersonFields", mask.join(","));
    let path = format!("{}:updateContact", resource_path(&args.resource_name));

    let raw = ctx.call(&ApiRequest::patch(path, body).with_query(&query))?;
    Ok(present(people::reshape::<Person>(raw)?))
}

fn contact_delete(ctx: &ToolContext, args: ContactDeleteArgs) -> Result<ToolResult> {
    let path = format!("{}:deleteContact", resource_path(&args.resource_name));
    ctx.call(&ApiRequest::delete(path))?;

    let confirmation = DeleteConfirmation::deleted(&args.resource_name);
    let value =
        serde_json::to_value(confirmation).map_err(|e| Error::OutputShape(e.to_string()))?;
    Ok(present(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use contacts_core::testing::MockTransport;
    use contacts_core::{Credential, Method};
    use std::sync::Arc;

    fn run(name: &str, args: Value, transport: Arc<MockTransport>) -> Result<ToolResult> {
        let ctx = ToolContext::new(Credential::new("t"), transport);
        let tools = definitions().unwrap();
        let tool = tools.iter().find(|t| t.name == name).unwrap();
        tool.invoke(&ctx, &args)
    }

    fn created() -> Arc<MockTransport> {
        Arc::new(MockTransport::replying(json!({"resourceName": "people/c9", "etag": "e1"})))
    }

    #[test]
    fn create_with_no_fields_sends_empty_person() {
        let transport = created();
        run("contact_create", json!({}), transport.clone()).unwrap();

        let requests = transport.requests();
        assert_eq!(requests[0].method, Method::POST);
        assert_eq!(requests[0].path, "/people:createContact");
        assert_eq!(requests[0].body, Some(json!({})));
    }

    #[test]
    fn create_builds_minimal_body_from_aliases() {
        let remote = json!({
            "resourceName": "people/c9",
            "etag": "e1",
            "names": [{"givenName": "Ada", "metadata": {"primary": true}}],
            "metadata": {"sources": [{"type": "CONTACT", "id": "c9"}]}
        });
        let transport = Arc::new(MockTransport::replying(remote.clone()));
        let result = run(
            "contact_create",
            json!({"first_name": "Ada", "emails": [{"value": "ada@example.com"}]}),
            transport.clone(),
        )
        .unwrap();

        assert_eq!(
            transport.requests()[0].body,
            Some(json!({
                "names": [{"givenName": "Ada"}],
                "emailAddresses": [{"value": "ada@example.com"}]
            }))
        );
        assert_eq!(result.structured_content, Some(remote));
    }

    #[test]
    fn create_skips_empty_values() {
        let transport = created();
        run(
            "contact_create",
            json!({"givenName": "", "phoneNumbers": [], "notes": "", "jobTitle": "Engineer"}),
            transport.clone(),
        )
        .unwrap();

        assert_eq!(
            transport.requests()[0].body,
            Some(json!({"organizations": [{"title": "Engineer"}]}))
        );
    }

    #[test]
    fn create_rejects_extra_keys_in_email_items() {
        let transport = created();
        let err = run(
            "contact_create",
            json!({"emailAddresses": [{"value": "a@b.c", "label": "x"}]}),
            transport.clone(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn update_with_empty_notes_clears_biography() {
        let transport = created();
        run(
            "contact_update",
            json!({"resourceName": "people/c9", "etag": "e1", "notes": ""}),
            transport.clone(),
        )
        .unwrap();

        let request = &transport.requests()[0];
        assert_eq!(request.method, Method::PATCH);
        assert_eq!(
            request.path,
            "/people/c9:updateContact?updatePersonFields=biographies"
        );
        assert_eq!(
            request.body,
            Some(json!({
                "etag": "e1",
                "biographies": [{"value": "", "contentType": "TEXT_PLAIN"}]
            }))
        );
    }

    #[test]
    fn update_leaves_omitted_fields_alone() {
        let transport = created();
        run(
            "contact_update",
            json!({"id": "people/c9", "etag": "e1", "familyName": "Lovelace"}),
            transport.clone(),
        )
        .unwrap();

        let request = &transport.requests()[0];
        assert_eq!(
            request.path,
            "/people/c9:updateContact?updatePersonFields=names"
        );
        assert_eq!(
            request.body,
            Some(json!({"etag": "e1", "names": [{"familyName": "Lovelace"}]}))
        );
    }

    #[test]
    fn update_with_empty_list_replaces_phones() {
        let transport = created();
        run(
            "contact_update",
            json!({"resourceName": "people/c9", "etag": "e1", "phones": [], "company": "Acme"}),
            transport.clone(),
        )
        .unwrap();

        let request = &transport.requests()[0];
        assert_eq!(
            request.path,
            "/people/c9:updateContact?updatePersonFields=phoneNumbers%2Corganizations"
        );
        assert_eq!(
            request.body,
            Some(json!({
                "etag": "e1",
                "phoneNumbers": [],
                "organizations": [{"name": "Acme"}]
            }))
        );
    }

    #[test]
    fn update_requires_etag() {
        let transport = created();
        let err = run(
            "contact_update",
            json!({"resourceName": "people/c9", "notes": "x"}),
            transport.clone(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn update_with_no_fields_sends_empty_mask() {
        let (body, mask) = ContactFields::default().update_body("e1");
        assert_eq!(body, json!({"etag": "e1"}));
        assert!(mask.is_empty());
    }

    #[test]
    fn delete_confirms_without_reading_response() {
        let transport = Arc::new(MockTransport::replying(json!({})));
        let result = run(
            "contact_delete",
            json!({"resourceName": "people/c123"}),
            transport.clone(),
        )
        .unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, Method::DELETE);
        assert_eq!(requests[0].path, "/people/c123:deleteContact");
        assert_eq!(
            result.structured_content,
            Some(json!({
                "success": true,
                "message": "Contact people/c123 deleted successfully"
            }))
        );
    }

    #[test]
    fn delete_surfaces_remote_errors() {
        let transport = Arc::new(MockTransport::failing(404, json!({"error": {"code": 404}})));
        let err = run("contact_delete", json!({"resourceName": "people/c0"}), transport).unwrap_err();
        assert!(matches!(err, Error::RemoteApi { status: 404, .. }));
    }
}
