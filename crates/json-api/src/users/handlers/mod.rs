//! User Handlers

pub(crate) mod register;
