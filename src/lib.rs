pub mod app;
pub mod art;
pub mod config;
pub mod layout;
pub mod media;
pub mod render;
pub mod state;
pub mod theme;
pub mod tuner;
