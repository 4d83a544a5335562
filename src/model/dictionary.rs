use serde::{Deserialize, Serialize};

use crate::model::Id;

/// The two reference tables a person points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dictionary {
    Gender,
    Nationality,
}

impl Dictionary {
    pub fn table(&self) -> &'static str {
        match self {
            Dictionary::Gender => "genders",
            Dictionary::Nationality => "nationalities",
        }
    }

    pub fn entity(&self) -> &'static str {
        match self {
            Dictionary::Gender => "gender",
            Dictionary::Nationality => "nationality",
        }
    }
}

impl std::fmt::Display for Dictionary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.entity())
    }
}

/// A row of either dictionary table. A person whose reference is unset
/// embeds the default (id 0, empty name).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct DictionaryEntry {
    pub id: Id,
    pub name: String,
}

pub type Gender = DictionaryEntry;
pub type Nationality = DictionaryEntry;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DictionaryPatch {
    pub name: Option<String>,
}

impl DictionaryPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewDictionaryEntry {
    #[serde(default)]
    pub name: Option<String>,
}
