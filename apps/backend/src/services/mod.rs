//! Backend services

pub mod ai;
