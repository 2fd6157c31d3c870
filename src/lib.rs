//! Event-driven state synchronization for a tiling window manager.
//!
//! The [`actor::reactor::Reactor`] consumes host notifications in order and
//! keeps the [`model::registry::Registry`] coherent with what the host
//! reports, handing managed windows to a [`layout_engine::TilingEngine`].

pub mod actor;
pub mod common;
pub mod layout_engine;
pub mod model;
pub mod sys;
