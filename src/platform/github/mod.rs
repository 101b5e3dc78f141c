mod client;
mod mapper;

pub use client::GitHubActions;
