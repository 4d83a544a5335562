//! Person creation: look the given name up in the three inference services,
//! then resolve-or-create the dictionary rows and insert the person inside a
//! single store transaction.

use crate::error::{PipelineError, Stage, StoreError};
use crate::logic::lookup::NameLookup;
use crate::model::{CreatePersonRequest, Dictionary, Id, NewPerson, Person};
use crate::store::traits::{EnrichmentTx, PersonStore};

/// What the lookups produced for one name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enrichment {
    pub age: i32,
    pub gender: String,
    pub nationality: String,
}

pub struct EnrichmentPipeline<'a, S: ?Sized> {
    store: &'a S,
    lookup: &'a dyn NameLookup,
}

impl<'a, S: PersonStore + ?Sized> EnrichmentPipeline<'a, S> {
    pub fn new(store: &'a S, lookup: &'a dyn NameLookup) -> Self {
        Self { store, lookup }
    }

    pub async fn create_person(&self, request: CreatePersonRequest) -> Result<Person, PipelineError> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(PipelineError::MissingName);
        }

        log::debug!("Creating person with name: {}, surname: {}", name, request.surname);
        let enrichment = self.enrich(name).await?;
        log::debug!("Enrichment for {}: {:?}", name, enrichment);

        let person = self.persist(&request, name, &enrichment).await.map_err(|e| {
            log::error!("{}", e);
            e
        })?;

        log::info!("Successfully created person with ID {}", person.id);
        Ok(person)
    }

    /// Sequential lookups; the first failure aborts before anything is written.
    async fn enrich(&self, name: &str) -> Result<Enrichment, PipelineError> {
        let age = self.lookup.fetch_age(name).await.map_err(|source| {
            log::error!("Failed to get age for name {}: {}", name, source);
            PipelineError::Lookup {
                stage: Stage::GettingAge,
                source,
            }
        })?;

        let gender = self.lookup.fetch_gender_label(name).await.map_err(|source| {
            log::error!("Failed to get gender for name {}: {}", name, source);
            PipelineError::Lookup {
                stage: Stage::GettingGender,
                source,
            }
        })?;

        let nationality = self.lookup.fetch_nationality_code(name).await.map_err(|source| {
            log::error!("Failed to get nationality for name {}: {}", name, source);
            PipelineError::Lookup {
                stage: Stage::GettingNationality,
                source,
            }
        })?;

        Ok(Enrichment {
            age,
            gender,
            nationality,
        })
    }

    async fn persist(
        &self,
        request: &CreatePersonRequest,
        name: &str,
        enrichment: &Enrichment,
    ) -> Result<Person, PipelineError> {
        let creation = |source: StoreError| PipelineError::Store {
            stage: Stage::Creation,
            source,
        };

        let mut tx = self.store.begin_enrichment().await.map_err(creation)?;

        let gender_id = resolve_or_create(tx.as_mut(), Dictionary::Gender, &enrichment.gender)
            .await
            .map_err(|source| PipelineError::Store {
                stage: Stage::CreatingGender,
                source,
            })?;

        let nationality_id = resolve_or_create(tx.as_mut(), Dictionary::Nationality, &enrichment.nationality)
            .await
            .map_err(|source| PipelineError::Store {
                stage: Stage::CreatingNationality,
                source,
            })?;

        let person = NewPerson {
            name: name.to_string(),
            surname: request.surname.clone(),
            patronymic: request.patronymic.clone().filter(|p| !p.is_empty()),
            age: enrichment.age,
            gender_id,
            nationality_id,
        };

        log::debug!("Saving person to database");
        let id = tx.insert_person(&person).await.map_err(creation)?;
        tx.commit().await.map_err(creation)?;

        self.store.get_person(id).await.map_err(creation)
    }
}

/// Exact (case-insensitive) name lookup, creating the row when absent. An
/// empty label leaves the reference unset.
async fn resolve_or_create(tx: &mut dyn EnrichmentTx, dictionary: Dictionary, label: &str) -> Result<Option<Id>, StoreError> {
    if label.is_empty() {
        log::info!("No {} label returned, leaving it unset", dictionary);
        return Ok(None);
    }

    if let Some(existing) = tx.find_dictionary_entry(dictionary, label).await? {
        log::info!("Using existing {} '{}' with ID {}", dictionary, label, existing.id);
        return Ok(Some(existing.id));
    }

    log::info!("{} '{}' not found in database, creating new entry", dictionary, label);
    let created = tx.create_dictionary_entry(dictionary, label).await?;
    log::info!("Created new {} '{}' with ID {}", dictionary, label, created.id);
    Ok(Some(created.id))
}
