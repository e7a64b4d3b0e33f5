//! Config composition: defaults, source order, deserialization.

pub(crate) mod merge_policy;
pub(crate) mod service;
