//! HTTP surface: routes, handlers and the shared application state.

mod dto;
mod handlers;
mod openapi;
mod routes;
mod state;

pub use dto::{
    CompareFacesForm, CompareFacesResponse, ErrorResponse, ExtractTextForm, ExtractTextResponse,
    HealthResponse,
};
pub use openapi::ApiDoc;
pub use routes::create_router;
pub use state::AppState;
