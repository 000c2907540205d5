pub mod config;
pub mod logging;

pub mod downloader;
pub mod extract;
pub mod http;
pub mod naming;
pub mod pipeline;
pub mod retry;
pub mod storage;
