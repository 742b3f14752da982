//! Handlers for tier lists, their sections and their items.
//!
//! Every mutation follows the same cycle: load the whole aggregate, check the
//! caller, apply one engine operation in memory, save the aggregate under its
//! version guard, reload and render it.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use gamerank_core::error::CoreError;
use gamerank_core::tier_list::lifecycle::{self, NewTierList, TierListMetadataUpdate};
use gamerank_core::tier_list::{
    placement, sections, sync, LibraryEntryRef, SourceCollection, TierList, TierListKind,
};
use gamerank_core::types::DbId;
use gamerank_db::models::tier_list::StoredTierList;
use gamerank_db::repositories::{GameListRepo, LibraryEntryRepo, TierListRepo};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::handlers::tier_list_view::{self, TierListResponse};
use crate::middleware::auth::{AuthUser, MaybeAuthUser};
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CreateTierListRequest {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub is_public: bool,
}

/// All fields optional; only supplied fields change.
#[derive(Debug, Deserialize)]
pub struct UpdateTierListRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_public: Option<bool>,
}

impl From<UpdateTierListRequest> for TierListMetadataUpdate {
    fn from(req: UpdateTierListRequest) -> Self {
        TierListMetadataUpdate {
            name: req.name,
            description: req.description,
            is_public: req.is_public,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SectionRequest {
    pub name: String,
    pub color: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub library_entry_id: DbId,
    /// Zero-based position; missing, negative or past-the-end appends.
    pub order: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct MoveItemRequest {
    pub target_section_id: DbId,
    pub order: i32,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Sync rounds a get-or-create runs before giving up on concurrent writers.
const MAX_SYNC_ATTEMPTS: usize = 5;

async fn load(state: &AppState, public_id: Uuid) -> AppResult<StoredTierList> {
    TierListRepo::find_by_public_id(&state.pool, public_id)
        .await?
        .ok_or_else(|| CoreError::not_found("TierList", public_id).into())
}

/// Private tier lists are indistinguishable from missing ones to non-owners.
fn ensure_visible(tier_list: &TierList, caller_id: Option<DbId>) -> Result<(), CoreError> {
    if tier_list.is_visible_to(caller_id) {
        Ok(())
    } else {
        Err(CoreError::not_found("TierList", tier_list.public_id))
    }
}

/// Load an aggregate the caller is about to change.
async fn load_for_owner(state: &AppState, public_id: Uuid, user: AuthUser) -> AppResult<TierList> {
    let tier_list = load(state, public_id).await?.tier_list;
    ensure_visible(&tier_list, Some(user.user_id))?;
    tier_list.ensure_owner(user.user_id)?;
    Ok(tier_list)
}

/// Check invariants, save under the version guard, and render the fresh state.
async fn save_and_render(state: &AppState, tier_list: &TierList) -> AppResult<TierListResponse> {
    tier_list.check_invariants()?;
    if !TierListRepo::save(&state.pool, tier_list).await? {
        return Err(CoreError::Conflict(format!(
            "Tier list {} was modified concurrently; reload and retry",
            tier_list.public_id
        ))
        .into());
    }
    render_by_id(state, tier_list.id).await
}

async fn render_by_id(state: &AppState, id: DbId) -> AppResult<TierListResponse> {
    let stored = TierListRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::from(CoreError::not_found("TierList", id)))?;
    tier_list_view::render(&state.pool, stored).await
}

async fn resolve_entry(state: &AppState, library_entry_id: DbId) -> AppResult<LibraryEntryRef> {
    LibraryEntryRepo::find_ref(&state.pool, library_entry_id)
        .await?
        .ok_or_else(|| CoreError::not_found("LibraryEntry", library_entry_id).into())
}

async fn load_source(state: &AppState, game_list_id: DbId) -> AppResult<SourceCollection> {
    GameListRepo::find_source_by_id(&state.pool, game_list_id)
        .await?
        .ok_or_else(|| CoreError::not_found("GameList", game_list_id).into())
}

/// Insert the mirror of `source`, or return the one a concurrent request
/// inserted first.
async fn create_mirror(state: &AppState, source: &SourceCollection) -> AppResult<StoredTierList> {
    match TierListRepo::create(&state.pool, &NewTierList::for_collection(source)).await {
        Ok(stored) => {
            tracing::info!(
                tier_list_id = stored.tier_list.id,
                game_list_id = source.id,
                "Tier list created for game list"
            );
            Ok(stored)
        }
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            TierListRepo::find_by_source_game_list(&state.pool, source.id)
                .await?
                .ok_or_else(|| CoreError::not_found("TierList", source.public_id).into())
        }
        Err(err) => Err(err.into()),
    }
}

// ---------------------------------------------------------------------------
// Tier lists
// ---------------------------------------------------------------------------

/// POST /api/v1/users/me/tier-lists
///
/// Create a `PROFILE_GLOBAL` tier list with the default sections.
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateTierListRequest>,
) -> AppResult<impl IntoResponse> {
    let new = NewTierList::profile(auth.user_id, &input.name, input.description, input.is_public)?;
    let stored = TierListRepo::create(&state.pool, &new).await?;
    tracing::info!(
        tier_list_id = stored.tier_list.id,
        user_id = auth.user_id,
        "Tier list created"
    );
    let data = tier_list_view::render(&state.pool, stored).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data })))
}

/// GET /api/v1/users/me/tier-lists
///
/// The caller's own `PROFILE_GLOBAL` tier lists, newest first.
pub async fn list_mine(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let stored = TierListRepo::list_profile_by_owner(&state.pool, auth.user_id).await?;
    let data = tier_list_view::render_many(&state.pool, stored).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/tier-lists/public?limit=&offset=
///
/// Public tier lists of any kind, newest first.
pub async fn list_public(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    let stored = TierListRepo::list_public(&state.pool, params.limit, params.offset).await?;
    let data = tier_list_view::render_many(&state.pool, stored).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/game-lists/{game_list_id}/tier-list
///
/// Get or create the tier list mirroring a game list, synchronized with the
/// game list's current membership.
///
/// A sync whose save loses the version race against a concurrent request
/// reloads both the tier list and the game list and tries again; the winner's
/// write usually leaves nothing to do.
pub async fn get_or_create_for_game_list(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(game_list_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let mut source = GameListRepo::find_source_by_public_id(&state.pool, game_list_id)
        .await?
        .ok_or_else(|| AppError::from(CoreError::not_found("GameList", game_list_id)))?;
    lifecycle::ensure_collection_readable(&source, auth.user_id)?;

    let mut stored = match TierListRepo::find_by_source_game_list(&state.pool, source.id).await? {
        Some(stored) => stored,
        None => create_mirror(&state, &source).await?,
    };

    for attempt in 1..=MAX_SYNC_ATTEMPTS {
        ensure_visible(&stored.tier_list, Some(auth.user_id))?;

        let mut tier_list = stored.tier_list.clone();
        let outcome = sync::synchronize(&mut tier_list, &source)?;
        if outcome.is_noop() {
            tracing::debug!(tier_list_id = tier_list.id, "Tier list already in sync");
            let data = tier_list_view::render(&state.pool, stored).await?;
            return Ok(Json(DataResponse { data }));
        }

        tier_list.check_invariants()?;
        if TierListRepo::save(&state.pool, &tier_list).await? {
            tracing::info!(
                tier_list_id = tier_list.id,
                added = outcome.added.len(),
                removed = outcome.removed.len(),
                "Tier list synchronized with game list"
            );
            let data = render_by_id(&state, tier_list.id).await?;
            return Ok(Json(DataResponse { data }));
        }

        tracing::debug!(tier_list_id = tier_list.id, attempt, "Stale sync, reloading");
        source = load_source(&state, source.id).await?;
        stored = TierListRepo::find_by_id(&state.pool, tier_list.id)
            .await?
            .ok_or_else(|| AppError::from(CoreError::not_found("TierList", tier_list.id)))?;
    }

    Err(CoreError::Conflict(format!(
        "Tier list for game list {game_list_id} kept changing during synchronization"
    ))
    .into())
}

/// GET /api/v1/tier-lists/{id}
///
/// Public tier lists are readable by anyone; private ones by their owner only.
pub async fn get_by_id(
    caller: MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let stored = load(&state, id).await?;
    ensure_visible(&stored.tier_list, caller.user_id())?;
    let data = tier_list_view::render(&state.pool, stored).await?;
    Ok(Json(DataResponse { data }))
}

/// PUT /api/v1/tier-lists/{id}
///
/// Partial update of name, description and visibility.
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateTierListRequest>,
) -> AppResult<impl IntoResponse> {
    let mut tier_list = load_for_owner(&state, id, auth).await?;
    lifecycle::apply_metadata_update(&mut tier_list, &input.into())?;
    let data = save_and_render(&state, &tier_list).await?;
    Ok(Json(DataResponse { data }))
}

/// DELETE /api/v1/tier-lists/{id}
///
/// Delete a tier list with all of its sections and items.
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let tier_list = load_for_owner(&state, id, auth).await?;
    if !TierListRepo::delete(&state.pool, tier_list.id).await? {
        return Err(CoreError::not_found("TierList", id).into());
    }
    tracing::info!(tier_list_id = tier_list.id, user_id = auth.user_id, "Tier list deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// POST /api/v1/tier-lists/{id}/sections
pub async fn add_section(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<SectionRequest>,
) -> AppResult<impl IntoResponse> {
    let mut tier_list = load_for_owner(&state, id, auth).await?;
    sections::add_section(&mut tier_list, &input.name, input.color)?;
    let data = save_and_render(&state, &tier_list).await?;
    tracing::debug!(tier_list_id = tier_list.id, "Section added");
    Ok((StatusCode::CREATED, Json(DataResponse { data })))
}

/// PUT /api/v1/tier-lists/{id}/sections/{section_id}
pub async fn rename_section(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((id, section_id)): Path<(Uuid, DbId)>,
    Json(input): Json<SectionRequest>,
) -> AppResult<impl IntoResponse> {
    let mut tier_list = load_for_owner(&state, id, auth).await?;
    sections::rename_section(&mut tier_list, section_id, &input.name, input.color)?;
    let data = save_and_render(&state, &tier_list).await?;
    Ok(Json(DataResponse { data }))
}

/// DELETE /api/v1/tier-lists/{id}/sections/{section_id}
///
/// Items of the removed section move to the end of unclassified.
pub async fn remove_section(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((id, section_id)): Path<(Uuid, DbId)>,
) -> AppResult<impl IntoResponse> {
    let mut tier_list = load_for_owner(&state, id, auth).await?;
    sections::remove_section(&mut tier_list, section_id)?;
    let data = save_and_render(&state, &tier_list).await?;
    tracing::debug!(tier_list_id = tier_list.id, section_id, "Section removed");
    Ok(Json(DataResponse { data }))
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// POST /api/v1/tier-lists/{id}/sections/{section_id}/items
pub async fn add_item_to_section(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((id, section_id)): Path<(Uuid, DbId)>,
    Json(input): Json<AddItemRequest>,
) -> AppResult<impl IntoResponse> {
    let mut tier_list = load_for_owner(&state, id, auth).await?;
    tier_list.ensure_membership_editable()?;
    let entry = resolve_entry(&state, input.library_entry_id).await?;
    let placed =
        placement::add_item_to_section(&mut tier_list, section_id, &entry, input.order)?;
    let data = save_and_render(&state, &tier_list).await?;
    tracing::debug!(
        tier_list_id = tier_list.id,
        library_entry_id = entry.id,
        placement = placed.as_str(),
        "Item placed in section"
    );
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/tier-lists/{id}/items/unclassified
pub async fn add_item_to_unclassified(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<AddItemRequest>,
) -> AppResult<impl IntoResponse> {
    let mut tier_list = load_for_owner(&state, id, auth).await?;
    tier_list.ensure_membership_editable()?;
    let entry = resolve_entry(&state, input.library_entry_id).await?;
    let placed = placement::add_item_to_unclassified(&mut tier_list, &entry, input.order)?;
    let data = save_and_render(&state, &tier_list).await?;
    tracing::debug!(
        tier_list_id = tier_list.id,
        library_entry_id = entry.id,
        placement = placed.as_str(),
        "Item placed in unclassified"
    );
    Ok(Json(DataResponse { data }))
}

/// PUT /api/v1/tier-lists/{id}/items/{item_id}/move
///
/// Allowed for every kind. Items of a mirrored tier list whose game has left
/// the source game list cannot be moved until the next sync removes them.
pub async fn move_item(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((id, item_id)): Path<(Uuid, DbId)>,
    Json(input): Json<MoveItemRequest>,
) -> AppResult<impl IntoResponse> {
    let mut tier_list = load_for_owner(&state, id, auth).await?;
    if let TierListKind::FromCollection { source_list_id } = tier_list.kind {
        let source = load_source(&state, source_list_id).await?;
        sync::ensure_still_mirrored(&tier_list, item_id, &source)?;
    }
    placement::move_item(&mut tier_list, item_id, input.target_section_id, input.order)?;
    let data = save_and_render(&state, &tier_list).await?;
    Ok(Json(DataResponse { data }))
}

/// DELETE /api/v1/tier-lists/{id}/items/{item_id}
pub async fn remove_item(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((id, item_id)): Path<(Uuid, DbId)>,
) -> AppResult<impl IntoResponse> {
    let mut tier_list = load_for_owner(&state, id, auth).await?;
    let removed = placement::remove_item(&mut tier_list, item_id)?;
    let data = save_and_render(&state, &tier_list).await?;
    tracing::debug!(
        tier_list_id = tier_list.id,
        library_entry_id = removed.library_entry_id,
        "Item removed"
    );
    Ok(Json(DataResponse { data }))
}
