//! [`Described`](crate::Described) and [`Bind`](crate::Bind) impls for the
//! built-in leaf and container types.

mod collections;
mod scalar;
mod tree;
