//! In-process store with the same semantics as the PostgreSQL schema:
//! case-insensitive unique dictionary names, checked references, and
//! `ON DELETE SET NULL` when a dictionary row goes away.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::error::{StoreError, StoreResult};
use crate::model::{
    DeletedPerson, Dictionary, DictionaryEntry, DictionaryFilter, DictionaryPatch, Id, NewPerson, Person,
    PersonFilter, PersonPatch,
};
use crate::store::query::{matches_all, Column, Filterable};
use crate::store::traits::{DictionaryStore, EnrichmentTx, PersonStore};

#[derive(Debug, Clone, PartialEq, Eq)]
struct PersonRecord {
    name: String,
    surname: String,
    patronymic: Option<String>,
    age: i32,
    gender_id: Option<Id>,
    nationality_id: Option<Id>,
}

#[derive(Debug, Clone, Default)]
struct Tables {
    genders: BTreeMap<Id, String>,
    nationalities: BTreeMap<Id, String>,
    persons: BTreeMap<Id, PersonRecord>,
    next_id: Id,
}

impl Tables {
    fn next_id(&mut self) -> Id {
        self.next_id += 1;
        self.next_id
    }

    fn dictionary(&self, dictionary: Dictionary) -> &BTreeMap<Id, String> {
        match dictionary {
            Dictionary::Gender => &self.genders,
            Dictionary::Nationality => &self.nationalities,
        }
    }

    fn dictionary_mut(&mut self, dictionary: Dictionary) -> &mut BTreeMap<Id, String> {
        match dictionary {
            Dictionary::Gender => &mut self.genders,
            Dictionary::Nationality => &mut self.nationalities,
        }
    }

    fn find_by_name(&self, dictionary: Dictionary, name: &str) -> Option<DictionaryEntry> {
        let needle = name.to_lowercase();
        self.dictionary(dictionary)
            .iter()
            .find(|(_, existing)| existing.to_lowercase() == needle)
            .map(|(id, existing)| DictionaryEntry {
                id: *id,
                name: existing.clone(),
            })
    }

    fn ensure_unique_name(&self, dictionary: Dictionary, name: &str, except: Option<Id>) -> StoreResult<()> {
        match self.find_by_name(dictionary, name) {
            Some(existing) if Some(existing.id) != except => Err(StoreError::ConstraintViolation(format!(
                "{} '{}' already exists",
                dictionary.entity(),
                name
            ))),
            _ => Ok(()),
        }
    }

    fn insert_dictionary(&mut self, dictionary: Dictionary, name: &str) -> StoreResult<DictionaryEntry> {
        self.ensure_unique_name(dictionary, name, None)?;
        let id = self.next_id();
        self.dictionary_mut(dictionary).insert(id, name.to_string());
        Ok(DictionaryEntry {
            id,
            name: name.to_string(),
        })
    }

    fn check_reference(&self, dictionary: Dictionary, id: Option<Id>) -> StoreResult<()> {
        match id {
            Some(id) if !self.dictionary(dictionary).contains_key(&id) => Err(StoreError::ConstraintViolation(
                format!("{} with id={} does not exist", dictionary.entity(), id),
            )),
            _ => Ok(()),
        }
    }

    fn check_references(&self, gender_id: Option<Id>, nationality_id: Option<Id>) -> StoreResult<()> {
        self.check_reference(Dictionary::Gender, gender_id)?;
        self.check_reference(Dictionary::Nationality, nationality_id)
    }

    fn insert_person(&mut self, person: &NewPerson) -> StoreResult<Id> {
        self.check_references(person.gender_id, person.nationality_id)?;
        let id = self.next_id();
        self.persons.insert(id, PersonRecord::from(person));
        Ok(id)
    }

    fn entry(&self, dictionary: Dictionary, id: Option<Id>) -> DictionaryEntry {
        id.and_then(|id| {
            self.dictionary(dictionary).get(&id).map(|name| DictionaryEntry {
                id,
                name: name.clone(),
            })
        })
        .unwrap_or_default()
    }

    fn joined(&self, id: Id, record: &PersonRecord) -> Person {
        Person {
            id,
            name: record.name.clone(),
            surname: record.surname.clone(),
            patronymic: record.patronymic.clone(),
            age: record.age,
            gender: self.entry(Dictionary::Gender, record.gender_id),
            nationality: self.entry(Dictionary::Nationality, record.nationality_id),
        }
    }

    fn person(&self, id: Id) -> StoreResult<Person> {
        self.persons
            .get(&id)
            .map(|record| self.joined(id, record))
            .ok_or_else(|| StoreError::not_found("person", id))
    }
}

impl From<&NewPerson> for PersonRecord {
    fn from(person: &NewPerson) -> Self {
        Self {
            name: person.name.clone(),
            surname: person.surname.clone(),
            patronymic: person.patronymic.clone(),
            age: person.age,
            gender_id: person.gender_id,
            nationality_id: person.nationality_id,
        }
    }
}

impl Filterable for DictionaryEntry {
    fn int(&self, column: Column) -> Option<i64> {
        match column {
            Column::Id => Some(self.id),
            _ => None,
        }
    }

    fn text(&self, column: Column) -> Option<&str> {
        match column {
            Column::Name => Some(&self.name),
            _ => None,
        }
    }
}

impl Filterable for Person {
    fn int(&self, column: Column) -> Option<i64> {
        match column {
            Column::Id => Some(self.id),
            Column::Age => Some(i64::from(self.age)),
            Column::GenderId => Some(self.gender.id).filter(|id| *id > 0),
            Column::NationalityId => Some(self.nationality.id).filter(|id| *id > 0),
            Column::Name | Column::Surname => None,
        }
    }

    fn text(&self, column: Column) -> Option<&str> {
        match column {
            Column::Name => Some(&self.name),
            Column::Surname => Some(&self.surname),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl DictionaryStore for MemoryStore {
    async fn list_dictionary(&self, dictionary: Dictionary, filter: &DictionaryFilter) -> StoreResult<Vec<DictionaryEntry>> {
        let tables = self.tables.lock().await;
        let predicates = filter.predicates();
        let entries: Vec<DictionaryEntry> = tables
            .dictionary(dictionary)
            .iter()
            .map(|(id, name)| DictionaryEntry {
                id: *id,
                name: name.clone(),
            })
            .filter(|entry| matches_all(&predicates, entry))
            .collect();

        Ok(match filter.pagination() {
            Some(pagination) => pagination.apply(entries),
            None => entries,
        })
    }

    async fn create_dictionary_entry(&self, dictionary: Dictionary, name: &str) -> StoreResult<DictionaryEntry> {
        self.tables.lock().await.insert_dictionary(dictionary, name)
    }

    async fn update_dictionary_entry(&self, dictionary: Dictionary, id: Id, patch: &DictionaryPatch) -> StoreResult<DictionaryEntry> {
        let mut tables = self.tables.lock().await;
        let current = tables
            .dictionary(dictionary)
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(dictionary.entity(), id))?;

        let Some(name) = &patch.name else {
            return Ok(DictionaryEntry { id, name: current });
        };

        tables.ensure_unique_name(dictionary, name, Some(id))?;
        tables.dictionary_mut(dictionary).insert(id, name.clone());
        Ok(DictionaryEntry {
            id,
            name: name.clone(),
        })
    }

    async fn delete_dictionary_entry(&self, dictionary: Dictionary, id: Id) -> StoreResult<DictionaryEntry> {
        let mut tables = self.tables.lock().await;
        let name = tables
            .dictionary_mut(dictionary)
            .remove(&id)
            .ok_or_else(|| StoreError::not_found(dictionary.entity(), id))?;

        for record in tables.persons.values_mut() {
            let reference = match dictionary {
                Dictionary::Gender => &mut record.gender_id,
                Dictionary::Nationality => &mut record.nationality_id,
            };
            if *reference == Some(id) {
                *reference = None;
            }
        }

        Ok(DictionaryEntry { id, name })
    }
}

#[async_trait::async_trait]
impl PersonStore for MemoryStore {
    async fn list_persons(&self, filter: &PersonFilter) -> StoreResult<Vec<Person>> {
        let tables = self.tables.lock().await;
        let predicates = filter.predicates();
        let persons: Vec<Person> = tables
            .persons
            .iter()
            .map(|(id, record)| tables.joined(*id, record))
            .filter(|person| matches_all(&predicates, person))
            .collect();

        Ok(match filter.pagination() {
            Some(pagination) => pagination.apply(persons),
            None => persons,
        })
    }

    async fn patch_person(&self, id: Id, patch: &PersonPatch) -> StoreResult<Person> {
        let mut tables = self.tables.lock().await;
        let mut record = tables
            .persons
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("person", id))?;

        if patch.is_empty() {
            return tables.person(id);
        }

        if let Some(name) = &patch.name {
            record.name = name.clone();
        }
        if let Some(surname) = &patch.surname {
            record.surname = surname.clone();
        }
        if let Some(patronymic) = &patch.patronymic {
            record.patronymic = Some(patronymic.clone());
        }
        if let Some(age) = patch.age {
            record.age = age;
        }
        if let Some(gender_id) = patch.gender_id {
            record.gender_id = Some(gender_id);
        }
        if let Some(nationality_id) = patch.nationality_id {
            record.nationality_id = Some(nationality_id);
        }

        tables.check_references(record.gender_id, record.nationality_id)?;
        tables.persons.insert(id, record);
        tables.person(id)
    }

    async fn replace_person(&self, id: Id, person: &NewPerson) -> StoreResult<Person> {
        let mut tables = self.tables.lock().await;
        if !tables.persons.contains_key(&id) {
            return Err(StoreError::not_found("person", id));
        }

        tables.check_references(person.gender_id, person.nationality_id)?;
        tables.persons.insert(id, PersonRecord::from(person));
        tables.person(id)
    }

    async fn delete_person(&self, id: Id) -> StoreResult<DeletedPerson> {
        let record = self
            .tables
            .lock()
            .await
            .persons
            .remove(&id)
            .ok_or_else(|| StoreError::not_found("person", id))?;

        Ok(DeletedPerson {
            id,
            name: record.name,
            surname: record.surname,
        })
    }

    async fn begin_enrichment(&self) -> StoreResult<Box<dyn EnrichmentTx>> {
        let guard = self.tables.clone().lock_owned().await;
        let snapshot = guard.clone();
        Ok(Box::new(MemoryEnrichmentTx {
            guard,
            snapshot: Some(snapshot),
        }))
    }
}

/// Holds the table lock for its whole lifetime; the snapshot is restored
/// unless the transaction commits.
pub struct MemoryEnrichmentTx {
    guard: OwnedMutexGuard<Tables>,
    snapshot: Option<Tables>,
}

impl Drop for MemoryEnrichmentTx {
    fn drop(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            *self.guard = snapshot;
        }
    }
}

#[async_trait::async_trait]
impl EnrichmentTx for MemoryEnrichmentTx {
    async fn find_dictionary_entry(&mut self, dictionary: Dictionary, name: &str) -> StoreResult<Option<DictionaryEntry>> {
        Ok(self.guard.find_by_name(dictionary, name))
    }

    async fn create_dictionary_entry(&mut self, dictionary: Dictionary, name: &str) -> StoreResult<DictionaryEntry> {
        self.guard.insert_dictionary(dictionary, name)
    }

    async fn insert_person(&mut self, person: &NewPerson) -> StoreResult<Id> {
        self.guard.insert_person(person)
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let mut tx = self;
        tx.snapshot = None;
        Ok(())
    }
}
