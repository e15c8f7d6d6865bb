// Each test binary only uses part of the helpers.
#![allow(dead_code)]

#[macro_use]
mod include_hex;
mod connector_mock;

pub use connector_mock::{ConnectionRefused, ConnectorMock};
