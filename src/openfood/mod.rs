pub mod client;
pub mod dto;
pub mod handlers;
mod mapping;
pub mod region;
mod services;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
