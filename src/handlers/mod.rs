pub mod auth;
pub mod boards;
pub mod cards;
pub mod categories;
pub mod storage;
pub mod web;
