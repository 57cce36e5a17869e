//! People API response shapes.
//!
//! Known fields are typed so a malformed response is caught, and every level
//! keeps an `extra` map so fields we do not model are returned untouched.
//! Optional known fields may be absent but never `null`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Map, Value};

use crate::error::{Error, Result};

/// Fields requested by `contacts_list`.
pub const LIST_PERSON_FIELDS: &str = "names,emailAddresses,phoneNumbers,organizations,photos";

/// Fields requested by `contact_get`.
pub const DETAIL_PERSON_FIELDS: &str = "names,emailAddresses,phoneNumbers,addresses,organizations,biographies,birthdays,urls,photos,memberships";

/// Read mask for contact and directory searches.
pub const SEARCH_READ_MASK: &str = "names,emailAddresses,phoneNumbers,organizations,photos";

pub const DIRECTORY_SOURCE: &str = "DIRECTORY_SOURCE_TYPE_DOMAIN_PROFILE";

/// Used with `#[serde(default)]`: absence gives `None`, an explicit `null` is an error.
fn present<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub resource_name: String,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub names: Option<Vec<Name>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub email_addresses: Option<Vec<EmailAddress>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub phone_numbers: Option<Vec<PhoneNumber>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub addresses: Option<Vec<Address>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub organizations: Option<Vec<Organization>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub biographies: Option<Vec<Biography>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub birthdays: Option<Vec<Birthday>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub urls: Option<Vec<Url>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub photos: Option<Vec<Photo>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub memberships: Option<Vec<Membership>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Name {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailAddress {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(
        rename = "type",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub kind: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhoneNumber {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(
        rename = "type",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub kind: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub formatted_value: Option<String>,
    #[serde(
        rename = "type",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub street_address: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Biography {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Birthday {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub date: Option<Date>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Date {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub month: Option<u8>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub day: Option<u8>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Url {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(
        rename = "type",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub kind: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub contact_group_membership: Option<ContactGroupMembership>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactGroupMembership {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub contact_group_resource_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Page of `people/me/connections`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionsPage {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub connections: Option<Vec<Person>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub total_people: Option<u64>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub total_items: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<SearchResult>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub person: Option<Person>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryPage {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub people: Option<Vec<Person>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub total_size: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteConfirmation {
    pub success: bool,
    pub message: String,
}

impl DeleteConfirmation {
    pub fn deleted(resource_name: &str) -> Self {
        Self {
            success: true,
            message: format!("Contact {} deleted successfully", resource_name),
        }
    }
}

/// Checks a raw response against an output shape.
pub fn validate<T: DeserializeOwned>(raw: Value) -> Result<T> {
    serde_json::from_value(raw).map_err(|e| Error::OutputShape(e.to_string()))
}

/// Validates `raw` as `T` and returns it re-serialized, extras included.
pub fn reshape<T: DeserializeOwned + Serialize>(raw: Value) -> Result<Value> {
    let typed: T = validate(raw)?;
    serde_json::to_value(&typed).map_err(|e| Error::OutputShape(e.to_string()))
}

fn string_list(props: &[&str]) -> Value {
    let properties: Map<String, Value> = props
        .iter()
        .map(|p| (p.to_string(), json!({ "type": "string" })))
        .collect();
    json!({
        "type": "array",
        "items": { "type": "object", "properties": properties }
    })
}

/// Output schema for a person; `detailed` adds the fields only `contact_get` requests.
pub fn person_schema(detailed: bool) -> Value {
    let mut properties = json!({
        "resourceName": { "type": "string" },
        "etag": { "type": "string" },
        "names": string_list(&["displayName", "givenName", "familyName", "middleName"]),
        "emailAddresses": string_list(&["value", "type"]),
        "phoneNumbers": string_list(&["value", "type"]),
        "organizations": string_list(&["name", "title", "department"]),
        "photos": string_list(&["url"])
    });

    if detailed {
        properties["addresses"] = string_list(&[
            "formattedValue",
            "type",
            "streetAddress",
            "city",
            "region",
            "postalCode",
            "country",
        ]);
        properties["biographies"] = string_list(&["value", "contentType"]);
        properties["birthdays"] = json!({
            "type": "array",
            "items": {
                "type": "object",
                "properties": {
                    "date": {
                        "type": "object",
                        "properties": {
                            "year": { "type": "integer" },
                            "month": { "type": "integer" },
                            "day": { "type": "integer" }
                        }
                    }
                }
            }
        });
        properties["urls"] = string_list(&["value", "type"]);
        properties["memberships"] = json!({
            "type": "array",
            "items": {
                "type": "object",
                "properties": {
                    "contactGroupMembership": {
                        "type": "object",
                        "properties": {
                            "contactGroupResourceName": { "type": "string" }
                        }
                    }
                }
            }
        });
    }

    json!({
        "type": "object",
        "properties": properties,
        "required": ["resourceName"]
    })
}

pub fn connections_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "connections": { "type": "array", "items": person_schema(false) },
            "nextPageToken": { "type": "string" },
            "totalPeople": { "type": "integer" },
            "totalItems": { "type": "integer" }
        }
    })
}

pub fn search_results_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "results": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": { "person": person_schema(false) }
                }
            }
        }
    })
}

pub fn directory_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "people": { "type": "array", "items": person_schema(false) },
            "nextPageToken": { "type": "string" },
            "totalSize": { "type": "integer" }
        }
    })
}

pub fn delete_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "success": { "type": "boolean" },
            "message": { "type": "string" }
        },
        "required": ["success", "message"]
    })
}
