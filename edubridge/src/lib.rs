//! EduBridge library
//!
//! Data-access layer for the EduBridge admin back-office: a document store,
//! an image blob store, one generic access layer per entity kind, and the
//! services the admin screens are built on.

pub mod app;
pub mod config;
pub mod database;
pub mod error;
pub mod services;
pub mod storage;
