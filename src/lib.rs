pub mod alerts;
pub mod app;
pub mod canvas;
pub mod chart;
pub mod cli;
pub mod constants;
pub mod crossing;
pub mod engine;
pub mod feed;
pub mod geometry;
pub mod interaction;
pub mod logging;
pub mod manage;
pub mod model;
pub mod notify;
pub mod overlay;
pub mod preview;
pub mod scheduler;
pub mod series;
pub mod session;
pub mod settings;
