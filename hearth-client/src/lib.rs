pub mod api;
pub mod config;
pub mod observable;
pub mod refresh;
pub mod view_model;
pub mod weather;
