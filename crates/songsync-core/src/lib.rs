pub mod config;
pub mod logging;

pub mod links;
pub mod poller;
pub mod reconcile;
pub mod session;
pub mod song;
pub mod source;
pub mod transfer;
pub mod view;
