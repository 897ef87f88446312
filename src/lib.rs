pub mod app;
pub mod auth;
pub mod comments;
pub mod config;
pub mod error;
pub mod likes;
pub mod notifications;
pub mod pagination;
pub mod profile;
pub mod state;
pub mod storage;
pub mod stories;
pub mod uploads;
