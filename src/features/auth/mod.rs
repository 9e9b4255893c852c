mod validator;

pub mod dto;
pub mod handler;
pub mod model;
pub mod policy;
pub mod routes;

pub use policy::{AccessPolicy, Visibility};
pub use validator::JwtValidator;
