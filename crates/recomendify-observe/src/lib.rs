//! Observability for Recomendify: tracing subscriber setup and the span
//! attribute names shared by the server and the client.

pub mod attrs;
pub mod tracing_setup;
