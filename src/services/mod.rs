//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own business logic and persistence so route handlers stay
//! focused on request parsing, auth plumbing and status mapping. Every query
//! is scoped by the owning `user_id`.

pub mod ai;
pub mod category;
pub mod email_auth;
pub mod goal;
pub mod payment_method;
pub mod session;
pub mod settings;
pub mod transaction;
