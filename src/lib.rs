pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod domain;
pub mod explain;
pub mod generation;
pub mod grading;
pub mod handlers;
pub mod quiz;
pub mod session_store;
pub mod shuffle;
pub mod state;
