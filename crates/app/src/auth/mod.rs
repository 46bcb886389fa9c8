//! Authentication

mod errors;
mod repository;
mod service;
mod token;

pub use errors::*;
pub use repository::PgAuthRepository;
pub use service::*;
pub use token::*;
