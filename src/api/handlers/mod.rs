pub(crate) mod admin;
pub mod auth;
pub(crate) mod dashboard;
pub(crate) mod health;
pub(crate) mod menu;
pub(crate) mod notices;
pub(crate) mod root;
