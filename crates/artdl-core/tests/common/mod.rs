#![allow(dead_code)]

pub mod fake_site;
pub mod gallery_server;
