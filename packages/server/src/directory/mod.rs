//! Tables owned by the employee directory. They are read-only here and stay
//! outside the `entity` module so the inventory schema sync never creates or
//! alters them.

pub mod empleado;
