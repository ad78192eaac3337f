pub mod application;
pub mod archive;
pub mod auth;
pub mod commands;
pub mod config;
pub mod domain;
pub mod download;
pub mod error;
pub mod http;
pub mod matchmaking;
pub mod portal;
pub mod runtime;
