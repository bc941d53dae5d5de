//! Request middleware, currently the authenticating session extractor.

pub mod auth;
