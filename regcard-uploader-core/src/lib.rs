#![doc = "regcard-uploader-core: core logic library for regcard-uploader."]

//! This crate holds everything that does not touch a terminal or the network:
//! the run configuration, the contract traits for the reporting API and for
//! interactive prompting, input loading, the wire payloads and the upload driver.
//!
//! # Usage
//! The CLI crate supplies real implementations of [`contract::DynamicFormsApi`]
//! and [`contract::SettingsPrompt`]; tests use the generated `mockall` mocks.

pub mod config;
pub mod contract;
pub mod driver;
pub mod inputs;
pub mod payload;
