//! # Ouribadah Backend
//!
//! Geospatial and analytics backend for the Ouribadah daily-life application.
//!
//! This crate provides the computational core behind the app's compass and
//! community-analytics features: Qibla bearing calculation, geohash-5 spatial
//! bucketing, and k-anonymity-gated aggregation of prayer logs. The backend
//! exposes a REST API via Axum for the web frontend.
//!
//! ## Features
//!
//! - **Qibla bearing**: initial great-circle bearing toward the Kaaba
//! - **Geohash bucketing**: fixed-precision spatial keys used as privacy groups
//! - **Prayer logging**: batch submission of per-prayer status records
//! - **Aggregation**: windowed, privacy-gated statistics per spatial bucket
//! - **HTTP API**: RESTful endpoints for frontend integration
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`geo`]: Pure geospatial math (bearing, geohash encoding)
//! - [`models`]: Domain types shared across layers
//! - [`analytics`]: Pure aggregation and the k-anonymity gate
//! - [`db`]: Database operations, repository pattern, and persistence layer
//! - [`http`]: Axum-based HTTP server and request handlers

pub mod analytics;
pub mod db;
pub mod geo;
pub mod models;

#[cfg(feature = "http-server")]
pub mod http;
