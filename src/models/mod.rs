//! Domain and wire models

pub mod book;
pub mod user;
