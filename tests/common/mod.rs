// These modules are used by the integration tests
#![allow(dead_code)]

pub mod mock_upstream;
