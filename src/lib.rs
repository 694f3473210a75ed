pub mod api;
pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod integrations;
pub mod payments;
pub mod repository;
pub mod service;
