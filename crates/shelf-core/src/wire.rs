//! Wire schema for the catalog and library backend
//!
//! Every request and response body is declared here. Raw book entries are
//! decoded one at a time so a single odd entry is dropped instead of
//! failing the whole response.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::models::{Language, Year};

/// Login and register request body
#[derive(Debug, Serialize)]
pub struct AuthRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Login and register response body
#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, alias = "userId")]
    pub userid: Option<UserId>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Backend user id, sent as either a string or a number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserId(pub String);

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Number(i64),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Text(id) => UserId(id),
            Repr::Number(id) => UserId(id.to_string()),
        })
    }
}

/// Public catalog response (`search.json`)
#[derive(Debug, Deserialize)]
pub struct CatalogResponse {
    #[serde(default)]
    pub docs: Vec<Value>,
}

/// Personal library search request body
#[derive(Debug, Serialize)]
pub struct LibraryRequest<'a> {
    pub userid: &'a str,
    pub password: &'a str,
    pub query: &'a str,
}

/// Personal library search response body
#[derive(Debug, Deserialize)]
pub struct LibraryResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub books: Vec<Value>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Add-book request body
#[derive(Debug, Serialize)]
pub struct AddBookRequest<'a> {
    pub userid: &'a str,
    pub password: &'a str,
    pub cover_i: i64,
    pub first_year_publish: Year,
    pub key: &'a str,
    pub language: &'a Language,
    pub title: &'a str,
}

/// Remove-book request body
#[derive(Debug, Serialize)]
pub struct RemoveBookRequest<'a> {
    pub userid: &'a str,
    pub password: &'a str,
    pub key: &'a str,
}

/// Add/remove response body
#[derive(Debug, Deserialize)]
pub struct MutationResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Author field of a catalog document
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum AuthorField {
    One(String),
    Many(Vec<String>),
}

/// Raw entry from the public catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CatalogDoc {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author_name: Option<AuthorField>,
    #[serde(default)]
    pub first_publish_year: Option<Year>,
    #[serde(default)]
    pub cover_i: Option<i64>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub language: Option<Language>,
}

/// Raw entry from the user's personal library
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LibraryBook {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default, alias = "first_year_publish")]
    pub year: Option<Year>,
    #[serde(default)]
    pub cover_i: Option<i64>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub language: Option<Language>,
}

/// A raw search result tagged by the endpoint it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawBook {
    Catalog(CatalogDoc),
    Library(LibraryBook),
}

/// Decode each entry, dropping the ones that do not match the schema
pub fn decode_entries<T: DeserializeOwned>(values: Vec<Value>) -> Vec<T> {
    values
        .into_iter()
        .filter_map(|value| match serde_json::from_value(value) {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!("Dropping malformed book entry: {}", e);
                None
            }
        })
        .collect()
}
