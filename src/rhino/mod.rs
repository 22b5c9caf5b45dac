//! Rhino host integration.
//!
//! This module turns annotation requests into commands for a running Rhino
//! instance:
//!
//! - [`Intent`] describes what to create
//! - [`Dispatcher`] sends it as a structured command, falling back to a
//!   generated RhinoScript program when that fails
//! - [`script`] renders the fallback program
//! - [`RhinoConnection`] carries both over TCP to the Rhino plugin
//!
//! # Example
//!
//! ```no_run
//! use rhino_mcp::config::RhinoConfig;
//! use rhino_mcp::rhino::{Coordinate, Dispatcher, Intent, RhinoConnection};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut dispatcher = Dispatcher::new(RhinoConnection::new(RhinoConfig::default()));
//!
//! let location: Coordinate = serde_json::from_str("[0, 0, 0]")?;
//! let intent = Intent::text_dot(Some("P1".to_string()), location)
//!     .with_name(Some("Dot-One".to_string()));
//!
//! let outcome = dispatcher.dispatch(&intent).await;
//! println!("{}", outcome.message);
//! # Ok(())
//! # }
//! ```

pub mod connection;
pub mod dispatcher;
pub mod error;
pub mod intent;
pub mod response;
pub mod script;

pub use connection::{HostConnection, RhinoConnection};
pub use dispatcher::{DispatchError, DispatchOutcome, Dispatcher, Route};
pub use error::{HostError, HostResult};
pub use intent::{Color, Coordinate, Intent, IntentError, ObjectKind, Shape};
pub use response::ErrorBody;
