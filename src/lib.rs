// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Casting Agency - Movies & Actors API
//!
//! A small CRUD service whose every mutating or listing route is gated by a
//! permission carried in an identity-provider-issued bearer token.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum) and the OpenAPI document
//! - `auth` - Bearer token verification against the provider's JWKS, permission checks
//! - `config` - Environment-driven settings
//! - `store` - In-memory movies and actors
//! - `telemetry` - Log output setup

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod state;
pub mod store;
pub mod telemetry;
