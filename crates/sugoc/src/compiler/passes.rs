//! The passes shipped with the compiler

mod string_coercion;

pub use string_coercion::StringCoercion;
