pub mod admin;
pub mod auth;
pub mod cart;
pub mod categories;
pub mod delivery;
pub mod notifications;
pub mod orders;
pub mod payments;
pub mod plants;
pub mod reviews;
pub mod root;
pub mod seller;
pub mod stores;
