pub mod error;
pub mod sweeper;
pub mod token;
pub mod token_service;

pub use error::AuthError;
pub use token_service::{TokenLifetimes, TokenService};
