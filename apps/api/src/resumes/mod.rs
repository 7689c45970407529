//! Stored resumes outside an editing session: listing, deletion, export and
//! presentation settings.

pub mod handlers;
