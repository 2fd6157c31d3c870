pub mod geometry;
pub mod host;
pub mod process;
pub mod screen;
pub mod window_server;
