use anyhow::{Context, Result};
use sqlx::{postgres::PgPoolOptions, PgConnection, PgPool, Postgres, QueryBuilder, Transaction};

use crate::error::{StoreError, StoreResult};
use crate::model::{
    DeletedPerson, Dictionary, DictionaryEntry, DictionaryFilter, DictionaryPatch, Id, NewPerson, Person,
    PersonFilter, PersonPatch,
};
use crate::store::query::{push_pagination, push_predicates};
use crate::store::traits::{DictionaryStore, EnrichmentTx, PersonStore};

const PERSON_SELECT: &str = "SELECT p.id, p.name, p.surname, p.patronymic, p.age, \
     p.gender_id, g.name AS gender_name, p.nationality_id, n.name AS nationality_name \
     FROM persons p \
     LEFT JOIN genders g ON g.id = p.gender_id \
     LEFT JOIN nationalities n ON n.id = p.nationality_id \
     WHERE 1=1";

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new PostgreSQL store with the given database URL
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("Failed to create PostgreSQL connection pool")?;

        Ok(Self { pool })
    }

    /// Run the embedded migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }
}

/// Joined row as returned by [`PERSON_SELECT`]. Unset references come back as NULLs.
#[derive(Debug, sqlx::FromRow)]
struct PersonRow {
    id: Id,
    name: String,
    surname: String,
    patronymic: Option<String>,
    age: i32,
    gender_id: Option<Id>,
    gender_name: Option<String>,
    nationality_id: Option<Id>,
    nationality_name: Option<String>,
}

impl From<PersonRow> for Person {
    fn from(row: PersonRow) -> Self {
        Person {
            id: row.id,
            name: row.name,
            surname: row.surname,
            patronymic: row.patronymic,
            age: row.age,
            gender: DictionaryEntry {
                id: row.gender_id.unwrap_or_default(),
                name: row.gender_name.unwrap_or_default(),
            },
            nationality: DictionaryEntry {
                id: row.nationality_id.unwrap_or_default(),
                name: row.nationality_name.unwrap_or_default(),
            },
        }
    }
}

async fn select_dictionary(
    conn: &mut PgConnection,
    dictionary: Dictionary,
    filter: &DictionaryFilter,
) -> StoreResult<Vec<DictionaryEntry>> {
    let mut builder = QueryBuilder::<Postgres>::new(format!("SELECT id, name FROM {} WHERE 1=1", dictionary.table()));
    push_predicates(&mut builder, &filter.predicates(), "");
    builder.push(" ORDER BY id");
    push_pagination(&mut builder, filter.pagination());

    let entries = builder
        .build_query_as::<DictionaryEntry>()
        .fetch_all(&mut *conn)
        .await?;
    Ok(entries)
}

async fn fetch_dictionary_entry(conn: &mut PgConnection, dictionary: Dictionary, id: Id) -> StoreResult<DictionaryEntry> {
    sqlx::query_as::<_, DictionaryEntry>(&format!("SELECT id, name FROM {} WHERE id = $1", dictionary.table()))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| StoreError::not_found(dictionary.entity(), id))
}

async fn insert_dictionary_entry(conn: &mut PgConnection, dictionary: Dictionary, name: &str) -> StoreResult<DictionaryEntry> {
    let entry = sqlx::query_as::<_, DictionaryEntry>(&format!(
        "INSERT INTO {} (name) VALUES ($1) RETURNING id, name",
        dictionary.table()
    ))
    .bind(name)
    .fetch_one(&mut *conn)
    .await?;
    Ok(entry)
}

async fn select_persons(conn: &mut PgConnection, filter: &PersonFilter) -> StoreResult<Vec<Person>> {
    let mut builder = QueryBuilder::<Postgres>::new(PERSON_SELECT);
    push_predicates(&mut builder, &filter.predicates(), "p.");
    builder.push(" ORDER BY p.id");
    push_pagination(&mut builder, filter.pagination());

    let rows = builder.build_query_as::<PersonRow>().fetch_all(&mut *conn).await?;
    Ok(rows.into_iter().map(Person::from).collect())
}

async fn fetch_person(conn: &mut PgConnection, id: Id) -> StoreResult<Person> {
    select_persons(conn, &PersonFilter::by_id(id))
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| StoreError::not_found("person", id))
}

async fn person_exists(conn: &mut PgConnection, id: Id) -> StoreResult<bool> {
    let found = sqlx::query_scalar::<_, Id>("SELECT id FROM persons WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(found.is_some())
}

/// `UPDATE persons SET ... WHERE id = ...` covering only the fields present in `patch`.
/// Callers must not pass an empty patch.
fn person_update_query(id: Id, patch: &PersonPatch) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::<Postgres>::new("UPDATE persons SET ");
    {
        let mut set = builder.separated(", ");
        if let Some(name) = &patch.name {
            set.push("name = ");
            set.push_bind_unseparated(name.clone());
        }
        if let Some(surname) = &patch.surname {
            set.push("surname = ");
            set.push_bind_unseparated(surname.clone());
        }
        if let Some(patronymic) = &patch.patronymic {
            set.push("patronymic = ");
            set.push_bind_unseparated(patronymic.clone());
        }
        if let Some(age) = patch.age {
            set.push("age = ");
            set.push_bind_unseparated(age);
        }
        if let Some(gender_id) = patch.gender_id {
            set.push("gender_id = ");
            set.push_bind_unseparated(gender_id);
        }
        if let Some(nationality_id) = patch.nationality_id {
            set.push("nationality_id = ");
            set.push_bind_unseparated(nationality_id);
        }
    }
    builder.push(" WHERE id = ");
    builder.push_bind(id);
    builder
}

#[async_trait::async_trait]
impl DictionaryStore for PostgresStore {
    async fn list_dictionary(&self, dictionary: Dictionary, filter: &DictionaryFilter) -> StoreResult<Vec<DictionaryEntry>> {
        let mut conn = self.pool.acquire().await?;
        select_dictionary(&mut conn, dictionary, filter).await
    }

    async fn create_dictionary_entry(&self, dictionary: Dictionary, name: &str) -> StoreResult<DictionaryEntry> {
        let mut conn = self.pool.acquire().await?;
        insert_dictionary_entry(&mut conn, dictionary, name).await
    }

    async fn update_dictionary_entry(&self, dictionary: Dictionary, id: Id, patch: &DictionaryPatch) -> StoreResult<DictionaryEntry> {
        let mut conn = self.pool.acquire().await?;
        let current = fetch_dictionary_entry(&mut conn, dictionary, id).await?;

        let Some(name) = &patch.name else {
            return Ok(current);
        };

        let updated = sqlx::query_as::<_, DictionaryEntry>(&format!(
            "UPDATE {} SET name = $1 WHERE id = $2 RETURNING id, name",
            dictionary.table()
        ))
        .bind(name)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        updated.ok_or_else(|| StoreError::not_found(dictionary.entity(), id))
    }

    async fn delete_dictionary_entry(&self, dictionary: Dictionary, id: Id) -> StoreResult<DictionaryEntry> {
        sqlx::query_as::<_, DictionaryEntry>(&format!("DELETE FROM {} WHERE id = $1 RETURNING id, name", dictionary.table()))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found(dictionary.entity(), id))
    }
}

#[async_trait::async_trait]
impl PersonStore for PostgresStore {
    async fn list_persons(&self, filter: &PersonFilter) -> StoreResult<Vec<Person>> {
        let mut conn = self.pool.acquire().await?;
        select_persons(&mut conn, filter).await
    }

    async fn patch_person(&self, id: Id, patch: &PersonPatch) -> StoreResult<Person> {
        let mut conn = self.pool.acquire().await?;
        if !person_exists(&mut conn, id).await? {
            return Err(StoreError::not_found("person", id));
        }
        if patch.is_empty() {
            return fetch_person(&mut conn, id).await;
        }

        let mut builder = person_update_query(id, patch);
        let result = builder.build().execute(&mut *conn).await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("person", id));
        }

        fetch_person(&mut conn, id).await
    }

    async fn replace_person(&self, id: Id, person: &NewPerson) -> StoreResult<Person> {
        let mut conn = self.pool.acquire().await?;
        if !person_exists(&mut conn, id).await? {
            return Err(StoreError::not_found("person", id));
        }

        let result = sqlx::query(
            r#"
            UPDATE persons
            SET name = $1, surname = $2, patronymic = $3, age = $4, gender_id = $5, nationality_id = $6
            WHERE id = $7
            "#,
        )
        .bind(&person.name)
        .bind(&person.surname)
        .bind(&person.patronymic)
        .bind(person.age)
        .bind(person.gender_id)
        .bind(person.nationality_id)
        .bind(id)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("person", id));
        }

        fetch_person(&mut conn, id).await
    }

    async fn delete_person(&self, id: Id) -> StoreResult<DeletedPerson> {
        let row: Option<(Id, String, String)> =
            sqlx::query_as("DELETE FROM persons WHERE id = $1 RETURNING id, name, surname")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        let (id, name, surname) = row.ok_or_else(|| StoreError::not_found("person", id))?;
        Ok(DeletedPerson { id, name, surname })
    }

    async fn begin_enrichment(&self) -> StoreResult<Box<dyn EnrichmentTx>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PostgresEnrichmentTx { tx }))
    }
}

/// Rolls back on drop unless committed (sqlx `Transaction` semantics).
pub struct PostgresEnrichmentTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait::async_trait]
impl EnrichmentTx for PostgresEnrichmentTx {
    async fn find_dictionary_entry(&mut self, dictionary: Dictionary, name: &str) -> StoreResult<Option<DictionaryEntry>> {
        let entry = sqlx::query_as::<_, DictionaryEntry>(&format!(
            "SELECT id, name FROM {} WHERE LOWER(name) = LOWER($1) ORDER BY id LIMIT 1",
            dictionary.table()
        ))
        .bind(name)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(entry)
    }

    async fn create_dictionary_entry(&mut self, dictionary: Dictionary, name: &str) -> StoreResult<DictionaryEntry> {
        insert_dictionary_entry(&mut self.tx, dictionary, name).await
    }

    async fn insert_person(&mut self, person: &NewPerson) -> StoreResult<Id> {
        let id = sqlx::query_scalar::<_, Id>(
            r#"
            INSERT INTO persons (name, surname, patronymic, age, gender_id, nationality_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&person.name)
        .bind(&person.surname)
        .bind(&person.patronymic)
        .bind(person.age)
        .bind(person.gender_id)
        .bind(person.nationality_id)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(id)
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
