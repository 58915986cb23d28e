pub mod config;
pub mod logging;

pub mod auth;
pub mod cell;
pub mod fetch;
pub mod http;
pub mod naming;
pub mod pipeline;
pub mod report;
pub mod session;
pub mod share_link;
pub mod sheets;
pub mod storage;
