pub mod app;
pub mod binder;
pub mod cart;
pub mod config;
pub mod gfx;
pub mod model;
pub mod overlay;
pub mod scene;
pub mod scroll;
pub mod session;
pub mod timeline;
