use serde::{Deserialize, Serialize};

use crate::model::{DictionaryEntry, Id};

/// A person with both dictionary references resolved to their names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: Id,
    pub name: String,
    pub surname: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patronymic: Option<String>,
    pub age: i32,
    pub gender: DictionaryEntry,
    pub nationality: DictionaryEntry,
}

/// Column values for an insert or a full replace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPerson {
    pub name: String,
    #[serde(default)]
    pub surname: String,
    #[serde(default)]
    pub patronymic: Option<String>,
    #[serde(default)]
    pub age: i32,
    #[serde(default)]
    pub gender_id: Option<Id>,
    #[serde(default)]
    pub nationality_id: Option<Id>,
}

/// Partial update: `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PersonPatch {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub patronymic: Option<String>,
    pub age: Option<i32>,
    pub gender_id: Option<Id>,
    pub nationality_id: Option<Id>,
}

impl PersonPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.surname.is_none()
            && self.patronymic.is_none()
            && self.age.is_none()
            && self.gender_id.is_none()
            && self.nationality_id.is_none()
    }
}

/// Inbound body of `POST /persons`; everything else is looked up.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatePersonRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub surname: String,
    #[serde(default)]
    pub patronymic: Option<String>,
}

/// What `DELETE /persons/{id}` hands back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedPerson {
    pub id: Id,
    pub name: String,
    pub surname: String,
}
