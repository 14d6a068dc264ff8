pub mod api;
pub mod auth;
pub mod config;
pub mod dimension;
pub mod injector;
pub mod models;
pub mod storage;
pub mod tracking;
