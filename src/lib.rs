pub mod activity;
pub mod advice;
pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod generator;
pub mod growth;
pub mod logger;
pub mod model;
pub mod repl;
pub mod runner;
pub mod session;
pub mod time;
pub mod validate;
