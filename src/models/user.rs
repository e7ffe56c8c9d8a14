//! User records: validation, normalization and persistence rules

use crate::error::{Error, Result};
use crate::store::{Document, DocumentId, DocumentStore, FieldValue, Fields, Filter};
use serde::Serialize;
use std::sync::Arc;

pub const ID_FIELD: &str = "_id";
pub const NAME_FIELD: &str = "name";
pub const EMAIL_FIELD: &str = "email";

pub const REQUIRED_FIELDS_MESSAGE: &str = "Name and email are required";
pub const EMAIL_TAKEN_MESSAGE: &str = "Email already exists";
pub const USER_NOT_FOUND_MESSAGE: &str = "User not found";

/// A stored user
///
/// `name` and `email` are typed; anything else the client sent rides along
/// in `extra`. Serializes flat, with the id under `_id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    pub name: String,
    pub email: String,
    #[serde(flatten)]
    pub extra: Fields,
}

impl TryFrom<Document> for User {
    type Error = Error;

    fn try_from(doc: Document) -> Result<Self> {
        let Document { id, mut fields } = doc;
        let mut take = |key: &str| match fields.shift_remove(key) {
            Some(FieldValue::Text(value)) => Ok(value),
            _ => Err(Error::store(format!(
                "Document {} has no string `{}` field",
                id, key
            ))),
        };

        let name = take(NAME_FIELD)?;
        let email = take(EMAIL_FIELD)?;

        Ok(User {
            id,
            name,
            email,
            extra: fields,
        })
    }
}

/// A validated, normalized record ready to be written
#[derive(Debug, Clone, PartialEq)]
pub struct UserInput {
    pub name: String,
    pub email: String,
    pub extra: Fields,
}

impl UserInput {
    pub fn into_fields(self) -> Fields {
        let mut fields = Fields::with_capacity(self.extra.len() + 2);
        fields.insert(NAME_FIELD.to_string(), FieldValue::Text(self.name));
        fields.insert(EMAIL_FIELD.to_string(), FieldValue::Text(self.email));
        fields.extend(self.extra);
        fields
    }
}

/// Validate and normalize an incoming record.
///
/// Text values are trimmed. `name` and `email` must be non-empty strings after
/// trimming. A client-supplied `_id` is dropped.
pub fn validate(fields: Fields) -> Result<UserInput> {
    let mut normalized: Fields = fields
        .into_iter()
        .filter(|(key, _)| key != ID_FIELD)
        .map(|(key, value)| (key, value.trimmed()))
        .collect();

    let name = take_required(&mut normalized, NAME_FIELD)?;
    let email = take_required(&mut normalized, EMAIL_FIELD)?;

    Ok(UserInput {
        name,
        email,
        extra: normalized,
    })
}

fn take_required(fields: &mut Fields, key: &str) -> Result<String> {
    match fields.shift_remove(key) {
        Some(FieldValue::Text(value)) if !value.is_empty() => Ok(value),
        _ => Err(Error::validation(REQUIRED_FIELDS_MESSAGE)),
    }
}

fn parse_id(id: &str) -> Result<DocumentId> {
    id.parse().map_err(|_| Error::invalid_id(id))
}

/// User operations on top of a document store
///
/// Email uniqueness is checked before writing. The check and the write are
/// separate store calls, so two concurrent writers can still both claim the
/// same email.
#[derive(Clone)]
pub struct UserRepository {
    store: Arc<dyn DocumentStore>,
}

impl UserRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<User>> {
        self.store
            .find_all()
            .await?
            .into_iter()
            .map(User::try_from)
            .collect()
    }

    pub async fn create(&self, fields: Fields) -> Result<User> {
        let input = validate(fields)?;

        if self
            .store
            .find_one(&Filter::eq(EMAIL_FIELD, input.email.as_str()))
            .await?
            .is_some()
        {
            log::debug!("Rejected create: email {} already taken", input.email);
            return Err(Error::conflict(EMAIL_TAKEN_MESSAGE));
        }

        let id = self.store.insert_one(input.into_fields()).await?;
        log::info!("Created user {}", id);

        self.fetch(&id).await
    }

    pub async fn get(&self, id: &str) -> Result<User> {
        let id = parse_id(id)?;
        self.fetch(&id).await
    }

    pub async fn update(&self, id: &str, fields: Fields) -> Result<User> {
        let id = parse_id(id)?;
        let input = validate(fields)?;

        let taken = Filter::eq(EMAIL_FIELD, input.email.as_str()).excluding(id);
        if self.store.find_one(&taken).await?.is_some() {
            log::debug!("Rejected update of {}: email {} already taken", id, input.email);
            return Err(Error::conflict(EMAIL_TAKEN_MESSAGE));
        }

        if !self.store.replace_by_id(&id, input.into_fields()).await? {
            return Err(Error::not_found(USER_NOT_FOUND_MESSAGE));
        }
        log::info!("Updated user {}", id);

        self.fetch(&id).await
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let id = parse_id(id)?;

        if !self.store.delete_by_id(&id).await? {
            return Err(Error::not_found(USER_NOT_FOUND_MESSAGE));
        }
        log::info!("Deleted user {}", id);

        Ok(true)
    }

    async fn fetch(&self, id: &DocumentId) -> Result<User> {
        match self.store.find_by_id(id).await? {
            Some(doc) => User::try_from(doc),
            None => Err(Error::not_found(USER_NOT_FOUND_MESSAGE)),
        }
    }
}
