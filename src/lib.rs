pub mod auth;
pub mod bootstrap;
pub mod configuration;
pub mod error;
pub mod logger;
pub mod middleware;
pub mod routes;
pub mod scheduler;
pub mod startup;
pub mod state;
pub mod store;
pub mod telemetry;
