// API routes and handlers

pub mod docs;
pub mod health;
pub mod routes;
pub mod users;
