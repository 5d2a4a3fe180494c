//! Test Helper Utilities
//!
//! In-memory collaborator fakes and builders shared by the tja-analyzer
//! integration tests.

#![allow(dead_code)]

pub mod db_utils;
pub mod fakes;

pub use db_utils::create_test_repository;
pub use fakes::{
    camera, FakeFetcher, InMemoryRepository, RecordingIndex, ScriptedAnalyzer, ScriptedModel,
};
