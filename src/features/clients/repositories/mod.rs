mod client_repository;

pub use client_repository::{ClientDeletion, ClientRepository, PgClientRepository};
