//! Common test utilities shared by the integration suites.
//!
//! - Fixtures (sample projects, coordinators wired to in-memory doubles)
//! - A scripted `CommandClient`
//! - Custom assertions

pub mod assertions;
pub mod fixtures;
pub mod mock_client;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;
#[allow(unused_imports)]
pub use mock_client::*;
