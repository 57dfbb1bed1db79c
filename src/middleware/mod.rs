// Request binding and response shaping

pub mod binding;
pub mod response;

pub use binding::{Bind, BindQuery, BindingSource, PathId};
pub use response::{ApiError, ApiResponse};
