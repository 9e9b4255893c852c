//! Client and document registry: clients, their uploaded files, role-scoped
//! visibility, and a headless edit view for the client form.

pub mod core;
pub mod features;
pub mod modules;
pub mod shared;
pub mod ui;
