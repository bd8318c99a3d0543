pub mod activity;
pub mod auth;
pub mod cli;
pub mod completion;
pub mod config;
pub mod store;
pub mod views;
pub mod web;
