use axum::{
    middleware,
    routing::get,
    Extension, Router,
};
use tower::ServiceBuilder;

use crate::api::{dictionary_handlers, handlers, person_handlers};
use crate::logging::log_requests;
use crate::model::Dictionary;
use crate::store::traits::Store;

pub use crate::api::handlers::AppState;

pub fn create_router<S: Store + 'static>() -> Router<AppState<S>> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Persons
        .route(
            "/persons",
            get(person_handlers::list_persons::<S>).post(person_handlers::create_person::<S>),
        )
        .route(
            "/persons/:id",
            get(person_handlers::get_person::<S>)
                .patch(person_handlers::patch_person::<S>)
                .put(person_handlers::replace_person::<S>)
                .delete(person_handlers::delete_person::<S>),
        )
        // Dictionaries
        .merge(dictionary_router::<S>("/genders", Dictionary::Gender))
        .merge(dictionary_router::<S>("/nationalities", Dictionary::Nationality))
        .layer(ServiceBuilder::new().layer(middleware::from_fn(log_requests)))
}

fn dictionary_router<S: Store + 'static>(base: &str, dictionary: Dictionary) -> Router<AppState<S>> {
    Router::new()
        .route(
            base,
            get(dictionary_handlers::list_entries::<S>).post(dictionary_handlers::create_entry::<S>),
        )
        .route(
            &format!("{}/:id", base),
            get(dictionary_handlers::get_entry::<S>)
                .patch(dictionary_handlers::update_entry::<S>)
                .delete(dictionary_handlers::delete_entry::<S>),
        )
        .layer(Extension(dictionary))
}
