pub mod activo;
pub mod attachment;
pub mod auth;
pub mod catalog;
pub mod shared;
