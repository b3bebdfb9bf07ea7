pub mod activo;
pub mod planta;
pub mod tipo;
pub mod ubicacion;
