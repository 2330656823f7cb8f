// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory movie and actor store.
//!
//! Records are keyed by sequential ids starting at 1. Every validation
//! failure (missing field, unparsable date, unknown id, dangling
//! `movie_id`) is an [`ApiError::unprocessable`].

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::error::ApiError;
use crate::models::{
    Actor, ActorId, CreateActorRequest, CreateMovieRequest, Movie, MovieId, MovieView,
    UpdateActorRequest, UpdateMovieRequest,
};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Default)]
pub struct InMemoryStore {
    movies: BTreeMap<MovieId, Movie>,
    actors: BTreeMap<ActorId, Actor>,
    next_movie_id: MovieId,
    next_actor_id: ActorId,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------------------------------------------------------
    // Movies
    // -------------------------------------------------------------------------

    pub fn list_movies(&self) -> Vec<MovieView> {
        self.movies.values().map(|movie| self.view(movie)).collect()
    }

    pub fn movie(&self, movie_id: MovieId) -> Result<MovieView, ApiError> {
        self.movies
            .get(&movie_id)
            .map(|movie| self.view(movie))
            .ok_or_else(|| unknown_movie(movie_id))
    }

    pub fn create_movie(&mut self, request: CreateMovieRequest) -> Result<MovieId, ApiError> {
        let title = required_text("title", request.title)?;
        let release_date = parse_date(&required_text("release_date", request.release_date)?)?;

        self.next_movie_id += 1;
        let id = self.next_movie_id;
        self.movies.insert(
            id,
            Movie {
                id,
                title,
                release_date,
            },
        );
        Ok(id)
    }

    pub fn update_movie(
        &mut self,
        movie_id: MovieId,
        request: UpdateMovieRequest,
    ) -> Result<MovieView, ApiError> {
        let title = request
            .title
            .map(|title| required_text("title", Some(title)))
            .transpose()?;
        let release_date = request
            .release_date
            .map(|date| parse_date(&date))
            .transpose()?;

        let movie = self
            .movies
            .get_mut(&movie_id)
            .ok_or_else(|| unknown_movie(movie_id))?;
        if let Some(title) = title {
            movie.title = title;
        }
        if let Some(release_date) = release_date {
            movie.release_date = release_date;
        }

        self.movie(movie_id)
    }

    /// Remove a movie; its actors stay, uncast.
    pub fn delete_movie(&mut self, movie_id: MovieId) -> Result<(), ApiError> {
        self.movies
            .remove(&movie_id)
            .ok_or_else(|| unknown_movie(movie_id))?;
        for actor in self.actors.values_mut() {
            if actor.movie_id == Some(movie_id) {
                actor.movie_id = None;
            }
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Actors
    // -------------------------------------------------------------------------

    pub fn list_actors(&self) -> Vec<Actor> {
        self.actors.values().cloned().collect()
    }

    pub fn actor(&self, actor_id: ActorId) -> Result<Actor, ApiError> {
        self.actors
            .get(&actor_id)
            .cloned()
            .ok_or_else(|| unknown_actor(actor_id))
    }

    pub fn create_actor(&mut self, request: CreateActorRequest) -> Result<ActorId, ApiError> {
        let name = required_text("name", request.name)?;
        let age = request
            .age
            .ok_or_else(|| missing_field("age"))?;
        let gender = required_text("gender", request.gender)?;
        if let Some(movie_id) = request.movie_id {
            self.ensure_movie(movie_id)?;
        }

        self.next_actor_id += 1;
        let id = self.next_actor_id;
        self.actors.insert(
            id,
            Actor {
                id,
                name,
                age,
                gender,
                movie_id: request.movie_id,
            },
        );
        Ok(id)
    }

    pub fn update_actor(
        &mut self,
        actor_id: ActorId,
        request: UpdateActorRequest,
    ) -> Result<Actor, ApiError> {
        let name = request
            .name
            .map(|name| required_text("name", Some(name)))
            .transpose()?;
        let gender = request
            .gender
            .map(|gender| required_text("gender", Some(gender)))
            .transpose()?;
        if let Some(movie_id) = request.movie_id {
            self.ensure_movie(movie_id)?;
        }

        let actor = self
            .actors
            .get_mut(&actor_id)
            .ok_or_else(|| unknown_actor(actor_id))?;
        if let Some(name) = name {
            actor.name = name;
        }
        if let Some(age) = request.age {
            actor.age = age;
        }
        if let Some(gender) = gender {
            actor.gender = gender;
        }
        if let Some(movie_id) = request.movie_id {
            actor.movie_id = Some(movie_id);
        }

        Ok(actor.clone())
    }

    pub fn delete_actor(&mut self, actor_id: ActorId) -> Result<(), ApiError> {
        self.actors
            .remove(&actor_id)
            .map(|_| ())
            .ok_or_else(|| unknown_actor(actor_id))
    }

    fn ensure_movie(&self, movie_id: MovieId) -> Result<(), ApiError> {
        if self.movies.contains_key(&movie_id) {
            Ok(())
        } else {
            Err(unknown_movie(movie_id))
        }
    }

    fn view(&self, movie: &Movie) -> MovieView {
        MovieView {
            id: movie.id,
            title: movie.title.clone(),
            release_date: movie.release_date,
            actors: self
                .actors
                .values()
                .filter(|actor| actor.movie_id == Some(movie.id))
                .cloned()
                .collect(),
        }
    }
}

fn required_text(field: &str, value: Option<String>) -> Result<String, ApiError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(missing_field(field)),
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
        ApiError::unprocessable(format!("release_date must be YYYY-MM-DD, got '{value}'"))
    })
}

fn missing_field(field: &str) -> ApiError {
    ApiError::unprocessable(format!("{field} is required"))
}

fn unknown_movie(movie_id: MovieId) -> ApiError {
    ApiError::unprocessable(format!("movie {movie_id} does not exist"))
}

fn unknown_actor(actor_id: ActorId) -> ApiError {
    ApiError::unprocessable(format!("actor {actor_id} does not exist"))
}
