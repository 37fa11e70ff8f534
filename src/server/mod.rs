//! Server-side API backend and business logic.
//!
//! This module contains the backend of the back office: the client backup/restore engine,
//! the per-tenant reference versioning store, and the HTTP surface exposing both. The
//! backend uses Axum as the web framework and SeaORM for database operations.
//!
//! # Architecture
//!
//! The server follows a layered architecture with clear separation of concerns:
//!
//! - **Controller Layer** (`controller/`) - HTTP request handlers and DTO conversion
//! - **Service Layer** (`service/`) - Backup export/import orchestration and ref versioning
//! - **Data Layer** (`data/`) - Document and ref repositories over SeaORM
//! - **Model Layer** (`model/`) - Snapshot, tenant, ref, and backup domain models
//! - **Error Layer** (`error/`) - Application error types and HTTP response mapping
//! - **Middleware** (`middleware/`) - Tenant resolution from upstream authentication
//! - **Utilities** (`util/`) - Archive codec, asset relocation, tenant id rewriting
//!
//! # Infrastructure
//!
//! - **Configuration** (`config`) - Environment-based application configuration
//! - **State** (`state`) - Shared application state (DB, backup settings, tenant locks)
//! - **Startup** (`startup`) - Logging, database, and directory initialization
//! - **Router** (`router`) - Axum route configuration and API documentation
//! - **Scheduler** (`scheduler/`) - Cron job pruning expired backup archives

pub mod config;
pub mod controller;
pub mod data;
pub mod error;
pub mod middleware;
pub mod model;
pub mod router;
pub mod scheduler;
pub mod service;
pub mod startup;
pub mod state;
pub mod util;
