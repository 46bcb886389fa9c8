//! Shared test infrastructure for service-level integration tests.


pub(crate) use context::TestContext;
