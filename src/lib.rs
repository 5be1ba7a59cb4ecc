//! Bookshelf application library.
//!
//! Hosts the application modules mounted by the HTTP facade.

pub mod modules;
