//! REST shell over the [`Compass`](crate::service::Compass) service
//!
//! One shared service instance behind a mutex, so requests are handled one
//! at a time against the same corpus and backend session.

pub mod handlers;
pub mod routing;
pub mod startup;
pub mod types;
