// HTTP CRUD service for the User resource

pub mod api;
pub mod config;
pub mod middleware;
pub mod models;
pub mod services;
