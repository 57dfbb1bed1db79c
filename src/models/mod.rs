// Entities and request DTOs

pub mod user;

pub use user::*;
