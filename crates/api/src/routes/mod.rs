pub mod health;
pub mod tier_list;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /users/me/tier-lists                                 create, list own (auth)
///
/// /game-lists/{game_list_id}/tier-list                 get-or-create + sync (auth)
///
/// /tier-lists/public                                   list public
/// /tier-lists/{id}                                     get (optional auth), update, delete
/// /tier-lists/{id}/sections                            add section
/// /tier-lists/{id}/sections/{section_id}               rename, remove section
/// /tier-lists/{id}/sections/{section_id}/items         add item to section
/// /tier-lists/{id}/items/unclassified                  add item to unclassified
/// /tier-lists/{id}/items/{item_id}                     remove item
/// /tier-lists/{id}/items/{item_id}/move                move item
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/users/me/tier-lists", tier_list::owner_router())
        .nest("/game-lists", tier_list::game_list_router())
        .nest("/tier-lists", tier_list::router())
}
