// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response types of the movies and actors API. All types
//! derive `Serialize`/`Deserialize` and `ToSchema` for JSON handling and the
//! OpenAPI document.
//!
//! Request bodies carry every field as `Option`: a missing field is a
//! validation failure (422), not a malformed body (400).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub type MovieId = i64;
pub type ActorId = i64;

// =============================================================================
// Movies
// =============================================================================

/// Stored movie record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    pub release_date: NaiveDate,
}

/// Movie as returned to clients, with its cast.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct MovieView {
    pub id: MovieId,
    pub title: String,
    /// Release date, `YYYY-MM-DD`.
    #[schema(value_type = String, format = Date, example = "2026-05-01")]
    pub release_date: NaiveDate,
    pub actors: Vec<Actor>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateMovieRequest {
    pub title: Option<String>,
    /// Release date, `YYYY-MM-DD`.
    #[schema(example = "2026-05-01")]
    pub release_date: Option<String>,
}

/// Only the fields present are changed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateMovieRequest {
    pub title: Option<String>,
    #[schema(example = "2026-05-01")]
    pub release_date: Option<String>,
}

// =============================================================================
// Actors
// =============================================================================

/// An actor, optionally cast in one movie.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Actor {
    pub id: ActorId,
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub movie_id: Option<MovieId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateActorRequest {
    pub name: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<String>,
    /// Movie the actor is cast in; must exist when given.
    pub movie_id: Option<MovieId>,
}

/// Only the fields present are changed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateActorRequest {
    pub name: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub movie_id: Option<MovieId>,
}

// =============================================================================
// Response envelopes
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GreetingResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MoviesResponse {
    pub success: bool,
    pub movies: Vec<MovieView>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ActorsResponse {
    pub success: bool,
    pub actors: Vec<Actor>,
}

/// Identifier of a newly created or updated record.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IdResponse {
    pub success: bool,
    pub id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeletedResponse {
    pub success: bool,
    pub deleted: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MovieUpdatedResponse {
    pub success: bool,
    pub updated: MovieView,
}

/// Error envelope returned by every failing request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    /// HTTP status code.
    pub error: u16,
    /// Stable machine-readable error code.
    pub code: String,
    pub message: String,
}
