//! Shared helpers for lempkit integration tests.

#![allow(dead_code)]

pub mod env;
