// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    routing::{get, patch},
    Json, Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    error::ApiError,
    models::{
        Actor, ActorsResponse, CreateActorRequest, CreateMovieRequest, DeletedResponse,
        ErrorResponse, GreetingResponse, IdResponse, MovieUpdatedResponse, MovieView,
        MoviesResponse, UpdateActorRequest, UpdateMovieRequest,
    },
    state::AppState,
};

pub mod actors;
pub mod health;
pub mod movies;

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    Router::new()
        .route("/", get(greeting))
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .route(
            "/movies",
            get(movies::list_movies).post(movies::create_movie),
        )
        .route(
            "/movies/{movie_id}",
            patch(movies::update_movie).delete(movies::delete_movie),
        )
        .route(
            "/actors",
            get(actors::list_actors).post(actors::create_actor),
        )
        .route(
            "/actors/{actor_id}",
            patch(actors::update_actor).delete(actors::delete_actor),
        )
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(cors),
        )
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Health",
    responses((status = 200, body = GreetingResponse))
)]
pub async fn greeting() -> Json<GreetingResponse> {
    Json(GreetingResponse {
        success: true,
        message: "welcome".to_string(),
    })
}

async fn not_found() -> ApiError {
    ApiError::not_found("resource not found")
}

/// Declares the bearer scheme referenced by the protected paths.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        greeting,
        health::health,
        health::liveness,
        health::readiness,
        movies::list_movies,
        movies::create_movie,
        movies::update_movie,
        movies::delete_movie,
        actors::list_actors,
        actors::create_actor,
        actors::update_actor,
        actors::delete_actor
    ),
    components(
        schemas(
            Actor,
            MovieView,
            CreateMovieRequest,
            UpdateMovieRequest,
            CreateActorRequest,
            UpdateActorRequest,
            GreetingResponse,
            MoviesResponse,
            ActorsResponse,
            IdResponse,
            DeletedResponse,
            MovieUpdatedResponse,
            ErrorResponse,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Movies", description = "Movie catalogue"),
        (name = "Actors", description = "Actor roster and casting"),
        (name = "Health", description = "Service status")
    )
)]
pub struct ApiDoc;
