// Middleware modules for the scan backend

pub mod cors;

pub use cors::dynamic_cors_middleware;
