//! XRPC endpoint names and wire shapes.

mod endpoints;

pub(crate) use endpoints::*;
