pub mod activo;
pub mod attachment;
pub mod auth;
pub mod baja;
pub mod catalog;
