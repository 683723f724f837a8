//! Supabase backend access
//!
//! The importer only talks to the backend through the [`Backend`] trait so the
//! driver can be exercised against an in-memory implementation. [`SupabaseClient`]
//! is the real implementation over the GoTrue admin, PostgREST and Storage
//! HTTP APIs.

pub mod backend;
pub mod client;
pub mod error;
pub mod query;

pub use backend::{AuthUser, Backend, NewUser, StorageObject, public_object_url};
pub use client::SupabaseClient;
pub use error::ApiError;
pub use query::{FilterValue, Query};
