#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]

mod client;
mod config;
mod models;
mod url;

pub use client::{ClientBuildError, GithubClient};
pub use config::GithubConfig;
pub use models::ContentsEntry;
