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
    auth::{Authorized, DeleteMovies, PostMovies, UpdateMovies, ViewMovies},
    error::ApiError,
    models::{
        CreateMovieRequest, DeletedResponse, ErrorResponse, IdResponse, MovieId,
        MovieUpdatedResponse, MoviesResponse, UpdateMovieRequest,
    },
    state::AppState,
};

#[utoipa::path(
    get,
    path = "/movies",
    tag = "Movies",
    security(("bearer_auth" = ["view:movies"])),
    responses(
        (status = 200, body = MoviesResponse),
        (status = 401, body = ErrorResponse),
        (status = 403, body = ErrorResponse)
    )
)]
pub async fn list_movies(
    _auth: Authorized<ViewMovies>,
    State(state): State<AppState>,
) -> Result<Json<MoviesResponse>, ApiError> {
    let store = state.store.read().await;
    Ok(Json(MoviesResponse {
        success: true,
        movies: store.list_movies(),
    }))
}

#[utoipa::path(
    post,
    path = "/movies",
    request_body = CreateMovieRequest,
    tag = "Movies",
    security(("bearer_auth" = ["post:movies"])),
    responses(
        (status = 200, body = IdResponse),
        (status = 400, body = ErrorResponse),
        (status = 422, body = ErrorResponse)
    )
)]
pub async fn create_movie(
    Authorized(claims, _): Authorized<PostMovies>,
    State(state): State<AppState>,
    body: Result<Json<CreateMovieRequest>, JsonRejection>,
) -> Result<Json<IdResponse>, ApiError> {
    let Json(request) = body?;
    let mut store = state.store.write().await;
    let id = store.create_movie(request)?;
    tracing::info!(movie_id = id, sub = claims.subject().unwrap_or("-"), "movie created");
    Ok(Json(IdResponse { success: true, id }))
}

#[utoipa::path(
    patch,
    path = "/movies/{movie_id}",
    params(("movie_id" = i64, Path, description = "Identifier of the movie to update")),
    request_body = UpdateMovieRequest,
    tag = "Movies",
    security(("bearer_auth" = ["update:movies"])),
    responses(
        (status = 200, body = MovieUpdatedResponse),
        (status = 422, body = ErrorResponse)
    )
)]
pub async fn update_movie(
    _auth: Authorized<UpdateMovies>,
    movie_id: Result<Path<MovieId>, PathRejection>,
    State(state): State<AppState>,
    body: Result<Json<UpdateMovieRequest>, JsonRejection>,
) -> Result<Json<MovieUpdatedResponse>, ApiError> {
    let Path(movie_id) = movie_id?;
    let Json(request) = body?;
    let mut store = state.store.write().await;
    let updated = store.update_movie(movie_id, request)?;
    Ok(Json(MovieUpdatedResponse {
        success: true,
        updated,
    }))
}

#[utoipa::path(
    delete,
    path = "/movies/{movie_id}",
    params(("movie_id" = i64, Path, description = "Identifier of the movie to delete")),
    tag = "Movies",
    security(("bearer_auth" = ["delete:movies"])),
    responses(
        (status = 200, body = DeletedResponse),
        (status = 422, body = ErrorResponse)
    )
)]
pub async fn delete_movie(
    Authorized(claims, _): Authorized<DeleteMovies>,
    movie_id: Result<Path<MovieId>, PathRejection>,
    State(state): State<AppState>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let Path(movie_id) = movie_id?;
    let mut store = state.store.write().await;
    store.delete_movie(movie_id)?;
    tracing::info!(movie_id, sub = claims.subject().unwrap_or("-"), "movie deleted");
    Ok(Json(DeletedResponse {
        success: true,
        deleted: movie_id,
    }))
}
