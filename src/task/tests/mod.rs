//! Unit tests for the task marketplace.

mod support;
