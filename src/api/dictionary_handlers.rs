//! `/genders` and `/nationalities`. Both routers share these handlers; the
//! table is selected by the [`Dictionary`] extension installed in `routes`.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::Json,
    Extension,
};

use crate::api::handlers::{
    bad_request, json_rejection, path_id, query_int, query_text, store_error, ApiError, AppState, RawQuery,
};
use crate::model::{Dictionary, DictionaryEntry, DictionaryFilter, DictionaryPatch, NewDictionaryEntry};
use crate::store::traits::Store;

pub async fn list_entries<S: Store>(
    State(state): State<AppState<S>>,
    Extension(dictionary): Extension<Dictionary>,
    Query(params): Query<RawQuery>,
) -> Result<Json<Vec<DictionaryEntry>>, ApiError> {
    let filter = DictionaryFilter {
        id: query_int(&params, &["id"]),
        name: query_text(&params, "name"),
        page: query_int(&params, &["page", "Page"]),
        limit: query_int(&params, &["limit", "Limit"]),
    };
    log::debug!("Listing {} entries with filter: {:?}", dictionary, filter);

    let entries = state
        .store
        .list_dictionary(dictionary, &filter)
        .await
        .map_err(store_error)?;

    log::info!("Successfully retrieved {} {} entries", entries.len(), dictionary);
    Ok(Json(entries))
}

pub async fn get_entry<S: Store>(
    State(state): State<AppState<S>>,
    Extension(dictionary): Extension<Dictionary>,
    Path(raw_id): Path<String>,
) -> Result<Json<DictionaryEntry>, ApiError> {
    let id = path_id(&raw_id)?;
    let entry = state
        .store
        .get_dictionary_entry(dictionary, id)
        .await
        .map_err(store_error)?;
    Ok(Json(entry))
}

pub async fn create_entry<S: Store>(
    State(state): State<AppState<S>>,
    Extension(dictionary): Extension<Dictionary>,
    payload: Result<Json<NewDictionaryEntry>, JsonRejection>,
) -> Result<(StatusCode, Json<DictionaryEntry>), ApiError> {
    let Json(body) = payload.map_err(json_rejection)?;
    let name = body
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| bad_request("name is required"))?;

    let created = state
        .store
        .create_dictionary_entry(dictionary, name)
        .await
        .map_err(store_error)?;

    log::info!("Created {} '{}' with ID {}", dictionary, created.name, created.id);
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_entry<S: Store>(
    State(state): State<AppState<S>>,
    Extension(dictionary): Extension<Dictionary>,
    Path(raw_id): Path<String>,
    payload: Result<Json<DictionaryPatch>, JsonRejection>,
) -> Result<Json<DictionaryEntry>, ApiError> {
    let id = path_id(&raw_id)?;
    let Json(patch) = payload.map_err(json_rejection)?;
    if patch.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
        return Err(bad_request("name must not be empty"));
    }

    let updated = state
        .store
        .update_dictionary_entry(dictionary, id, &patch)
        .await
        .map_err(store_error)?;

    log::info!("Successfully patched {} with ID {}", dictionary, id);
    Ok(Json(updated))
}

pub async fn delete_entry<S: Store>(
    State(state): State<AppState<S>>,
    Extension(dictionary): Extension<Dictionary>,
    Path(raw_id): Path<String>,
) -> Result<Json<DictionaryEntry>, ApiError> {
    let id = path_id(&raw_id)?;
    let deleted = state
        .store
        .delete_dictionary_entry(dictionary, id)
        .await
        .map_err(store_error)?;

    log::info!("Successfully deleted {} with ID {}", dictionary, id);
    Ok(Json(deleted))
}
