//! Configuration loading tests
