use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::Json,
};

use crate::api::handlers::{
    json_rejection, path_id, pipeline_error, query_int, query_text, store_error, ApiError, AppState, RawQuery,
};
use crate::logic::EnrichmentPipeline;
use crate::model::{CreatePersonRequest, DeletedPerson, NewPerson, Person, PersonFilter, PersonPatch};
use crate::store::traits::Store;

pub async fn list_persons<S: Store>(
    State(state): State<AppState<S>>,
    Query(params): Query<RawQuery>,
) -> Result<Json<Vec<Person>>, ApiError> {
    let filter = PersonFilter {
        id: query_int(&params, &["id"]),
        name: query_text(&params, "name"),
        surname: query_text(&params, "surname"),
        age_from: query_int(&params, &["age_from"]),
        age_to: query_int(&params, &["age_to"]),
        gender_id: query_int(&params, &["gender_id"]),
        nationality_id: query_int(&params, &["nationality_id"]),
        page: query_int(&params, &["page", "Page"]),
        limit: query_int(&params, &["limit", "Limit"]),
    };
    log::debug!("Executing list_persons with filter: {:?}", filter);

    let persons = state.store.list_persons(&filter).await.map_err(store_error)?;

    log::info!("Successfully retrieved {} persons", persons.len());
    Ok(Json(persons))
}

pub async fn get_person<S: Store>(
    State(state): State<AppState<S>>,
    Path(raw_id): Path<String>,
) -> Result<Json<Person>, ApiError> {
    let id = path_id(&raw_id)?;
    let person = state.store.get_person(id).await.map_err(store_error)?;
    Ok(Json(person))
}

/// Runs the enrichment pipeline; failures are tagged with the stage that broke.
pub async fn create_person<S: Store>(
    State(state): State<AppState<S>>,
    payload: Result<Json<CreatePersonRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Person>), ApiError> {
    let Json(request) = payload.map_err(json_rejection)?;
    log::info!("Processing create person request");

    let pipeline = EnrichmentPipeline::new(state.store.as_ref(), state.lookup.as_ref());
    let person = pipeline.create_person(request).await.map_err(pipeline_error)?;

    Ok((StatusCode::CREATED, Json(person)))
}

pub async fn patch_person<S: Store>(
    State(state): State<AppState<S>>,
    Path(raw_id): Path<String>,
    payload: Result<Json<PersonPatch>, JsonRejection>,
) -> Result<Json<Person>, ApiError> {
    let id = path_id(&raw_id)?;
    let Json(patch) = payload.map_err(json_rejection)?;
    log::debug!("Patching person ID {} with: {:?}", id, patch);

    let person = state.store.patch_person(id, &patch).await.map_err(store_error)?;

    log::info!("Successfully patched person with ID {}", id);
    Ok(Json(person))
}

pub async fn replace_person<S: Store>(
    State(state): State<AppState<S>>,
    Path(raw_id): Path<String>,
    payload: Result<Json<NewPerson>, JsonRejection>,
) -> Result<Json<Person>, ApiError> {
    let id = path_id(&raw_id)?;
    let Json(person) = payload.map_err(json_rejection)?;

    let replaced = state.store.replace_person(id, &person).await.map_err(store_error)?;

    log::info!("Successfully updated person with ID {} using PUT", id);
    Ok(Json(replaced))
}

pub async fn delete_person<S: Store>(
    State(state): State<AppState<S>>,
    Path(raw_id): Path<String>,
) -> Result<Json<DeletedPerson>, ApiError> {
    let id = path_id(&raw_id)?;
    let deleted = state.store.delete_person(id).await.map_err(store_error)?;

    log::info!("Successfully deleted person with ID {}", id);
    Ok(Json(deleted))
}
