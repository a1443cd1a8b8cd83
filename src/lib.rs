pub mod app;
pub mod catalog;
pub mod config;
pub mod gate;
pub mod library;
pub mod location;
pub mod logging;
pub mod reader;
pub mod render;
pub mod storage;
pub mod theme;
pub mod ui;
