pub mod config;
pub mod controller;
pub mod coordinates;
pub mod form;
pub mod presentation;
pub mod storage;
pub mod store;
pub mod workout;
