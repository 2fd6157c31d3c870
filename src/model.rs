pub mod app;
pub mod registry;
pub mod server;
pub mod space;
pub mod validity;
pub mod window;
