pub mod cache;
pub mod models;
pub mod orchestration;
pub mod pager;
pub mod persistence;
pub mod preferences;
pub mod service;
pub mod sqlite;
