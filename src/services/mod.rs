// Business logic services

pub mod error;
pub mod user_service;

pub use error::{ServiceError, ServiceResult};
pub use user_service::UserService;
