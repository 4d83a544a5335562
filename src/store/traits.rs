use crate::error::{StoreError, StoreResult};
use crate::model::{
    DeletedPerson, Dictionary, DictionaryEntry, DictionaryFilter, DictionaryPatch, Id, NewPerson, Person,
    PersonFilter, PersonPatch,
};

/// Gender and nationality tables share one contract, selected by [`Dictionary`].
#[async_trait::async_trait]
pub trait DictionaryStore: Send + Sync {
    /// List entries matching the filter, ascending by id.
    async fn list_dictionary(&self, dictionary: Dictionary, filter: &DictionaryFilter) -> StoreResult<Vec<DictionaryEntry>>;
    async fn create_dictionary_entry(&self, dictionary: Dictionary, name: &str) -> StoreResult<DictionaryEntry>;
    /// Apply the fields present in `patch`. An empty patch returns the current row without writing.
    async fn update_dictionary_entry(&self, dictionary: Dictionary, id: Id, patch: &DictionaryPatch) -> StoreResult<DictionaryEntry>;
    /// Delete and return the removed row.
    async fn delete_dictionary_entry(&self, dictionary: Dictionary, id: Id) -> StoreResult<DictionaryEntry>;

    async fn get_dictionary_entry(&self, dictionary: Dictionary, id: Id) -> StoreResult<DictionaryEntry> {
        self.list_dictionary(dictionary, &DictionaryFilter::by_id(id))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::not_found(dictionary.entity(), id))
    }
}

#[async_trait::async_trait]
pub trait PersonStore: Send + Sync {
    /// List persons joined with both dictionaries, ascending by id.
    async fn list_persons(&self, filter: &PersonFilter) -> StoreResult<Vec<Person>>;
    /// Apply the fields present in `patch` and return the re-fetched joined row.
    async fn patch_person(&self, id: Id, patch: &PersonPatch) -> StoreResult<Person>;
    /// Overwrite every column, including both dictionary references.
    async fn replace_person(&self, id: Id, person: &NewPerson) -> StoreResult<Person>;
    async fn delete_person(&self, id: Id) -> StoreResult<DeletedPerson>;
    /// Start the unit of work used by the enrichment pipeline.
    async fn begin_enrichment(&self) -> StoreResult<Box<dyn EnrichmentTx>>;

    async fn get_person(&self, id: Id) -> StoreResult<Person> {
        self.list_persons(&PersonFilter::by_id(id))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::not_found("person", id))
    }

    /// Insert and return the joined record.
    async fn create_person(&self, person: &NewPerson) -> StoreResult<Person> {
        let mut tx = self.begin_enrichment().await?;
        let id = tx.insert_person(person).await?;
        tx.commit().await?;
        self.get_person(id).await
    }
}

/// Writes of one person creation. Dropping without [`EnrichmentTx::commit`]
/// discards everything written through it.
#[async_trait::async_trait]
pub trait EnrichmentTx: Send {
    /// Exact, case-insensitive name lookup.
    async fn find_dictionary_entry(&mut self, dictionary: Dictionary, name: &str) -> StoreResult<Option<DictionaryEntry>>;
    async fn create_dictionary_entry(&mut self, dictionary: Dictionary, name: &str) -> StoreResult<DictionaryEntry>;
    async fn insert_person(&mut self, person: &NewPerson) -> StoreResult<Id>;
    async fn commit(self: Box<Self>) -> StoreResult<()>;
}

pub trait Store: DictionaryStore + PersonStore + Send + Sync {}

impl<T: DictionaryStore + PersonStore + Send + Sync> Store for T {}
