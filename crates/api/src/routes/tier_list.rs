//! Route definitions for tier lists.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::tier_list;
use crate::state::AppState;

/// Routes mounted at `/users/me/tier-lists`.
///
/// ```text
/// GET  /   -> list_mine
/// POST /   -> create
/// ```
pub fn owner_router() -> Router<AppState> {
    Router::new().route("/", get(tier_list::list_mine).post(tier_list::create))
}

/// Routes mounted at `/game-lists`.
///
/// ```text
/// GET /{game_list_id}/tier-list   -> get_or_create_for_game_list
/// ```
pub fn game_list_router() -> Router<AppState> {
    Router::new().route(
        "/{game_list_id}/tier-list",
        get(tier_list::get_or_create_for_game_list),
    )
}

/// Routes mounted at `/tier-lists`.
///
/// ```text
/// GET    /public                               -> list_public
/// GET    /{id}                                 -> get_by_id
/// PUT    /{id}                                 -> update
/// DELETE /{id}                                 -> delete
/// POST   /{id}/sections                        -> add_section
/// PUT    /{id}/sections/{section_id}           -> rename_section
/// DELETE /{id}/sections/{section_id}           -> remove_section
/// POST   /{id}/sections/{section_id}/items     -> add_item_to_section
/// POST   /{id}/items/unclassified              -> add_item_to_unclassified
/// PUT    /{id}/items/{item_id}/move            -> move_item
/// DELETE /{id}/items/{item_id}                 -> remove_item
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/public", get(tier_list::list_public))
        .route(
            "/{id}",
            get(tier_list::get_by_id)
                .put(tier_list::update)
                .delete(tier_list::delete),
        )
        .route("/{id}/sections", post(tier_list::add_section))
        .route(
            "/{id}/sections/{section_id}",
            put(tier_list::rename_section).delete(tier_list::remove_section),
        )
        .route(
            "/{id}/sections/{section_id}/items",
            post(tier_list::add_item_to_section),
        )
        .route(
            "/{id}/items/unclassified",
            post(tier_list::add_item_to_unclassified),
        )
        .route("/{id}/items/{item_id}/move", put(tier_list::move_item))
        .route("/{id}/items/{item_id}", delete(tier_list::remove_item))
}
