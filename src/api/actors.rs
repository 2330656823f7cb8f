// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};

use crate::{
    auth::{Authorized, DeleteActors, PostActors, UpdateActors, ViewActors},
    error::ApiError,
    models::{
        ActorId, ActorsResponse, CreateActorRequest, DeletedResponse, ErrorResponse, IdResponse,
        UpdateActorRequest,
    },
    state::AppState,
};

#[utoipa::path(
    get,
    path = "/actors",
    tag = "Actors",
    security(("bearer_auth" = ["view:actors"])),
    responses(
        (status = 200, body = ActorsResponse),
        (status = 401, body = ErrorResponse),
        (status = 403, body = ErrorResponse)
    )
)]
pub async fn list_actors(
    _auth: Authorized<ViewActors>,
    State(state): State<AppState>,
) -> Result<Json<ActorsResponse>, ApiError> {
    let store = state.store.read().await;
    Ok(Json(ActorsResponse {
        success: true,
        actors: store.list_actors(),
    }))
}

#[utoipa::path(
    post,
    path = "/actors",
    request_body = CreateActorRequest,
    tag = "Actors",
    security(("bearer_auth" = ["post:actors"])),
    responses(
        (status = 200, body = IdResponse),
        (status = 400, body = ErrorResponse),
        (status = 422, body = ErrorResponse)
    )
)]
pub async fn create_actor(
    Authorized(claims, _): Authorized<PostActors>,
    State(state): State<AppState>,
    body: Result<Json<CreateActorRequest>, JsonRejection>,
) -> Result<Json<IdResponse>, ApiError> {
    let Json(request) = body?;
    let mut store = state.store.write().await;
    let id = store.create_actor(request)?;
    tracing::info!(actor_id = id, sub = claims.subject().unwrap_or("-"), "actor created");
    Ok(Json(IdResponse { success: true, id }))
}

#[utoipa::path(
    patch,
    path = "/actors/{actor_id}",
    params(("actor_id" = i64, Path, description = "Identifier of the actor to update")),
    request_body = UpdateActorRequest,
    tag = "Actors",
    security(("bearer_auth" = ["update:actors"])),
    responses(
        (status = 200, body = IdResponse),
        (status = 422, body = ErrorResponse)
    )
)]
pub async fn update_actor(
    _auth: Authorized<UpdateActors>,
    actor_id: Result<Path<ActorId>, PathRejection>,
    State(state): State<AppState>,
    body: Result<Json<UpdateActorRequest>, JsonRejection>,
) -> Result<Json<IdResponse>, ApiError> {
    let Path(actor_id) = actor_id?;
    let Json(request) = body?;
    let mut store = state.store.write().await;
    let actor = store.update_actor(actor_id, request)?;
    Ok(Json(IdResponse {
        success: true,
        id: actor.id,
    }))
}

#[utoipa::path(
    delete,
    path = "/actors/{actor_id}",
    params(("actor_id" = i64, Path, description = "Identifier of the actor to delete")),
    tag = "Actors",
    security(("bearer_auth" = ["delete:actors"])),
    responses(
        (status = 200, body = DeletedResponse),
        (status = 422, body = ErrorResponse)
    )
)]
pub async fn delete_actor(
    Authorized(claims, _): Authorized<DeleteActors>,
    actor_id: Result<Path<ActorId>, PathRejection>,
    State(state): State<AppState>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let Path(actor_id) = actor_id?;
    let mut store = state.store.write().await;
    store.delete_actor(actor_id)?;
    tracing::info!(actor_id, sub = claims.subject().unwrap_or("-"), "actor deleted");
    Ok(Json(DeletedResponse {
        success: true,
        deleted: actor_id,
    }))
}
