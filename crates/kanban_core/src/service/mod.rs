//! Use-case services over the storage layer.

pub mod board_service;
pub mod theme_service;
