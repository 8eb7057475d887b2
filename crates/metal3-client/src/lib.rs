//! Metal3 object store client
//!
//! Typed access to the two resources the hardware classification
//! controller works with:
//!
//! - `HardwareClassification` profiles: read, finalizer updates, status updates
//! - `BareMetalHost` objects: read, label updates
//!
//! Every write is a JSON merge patch carrying the `resourceVersion` the
//! caller read, so a write based on a stale read is rejected with
//! [`Metal3Error::Conflict`] instead of silently overwriting a newer object.
//!
//! # Example
//!
//! ```no_run
//! use metal3_client::{Metal3Client, Metal3ClientTrait};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Metal3Client::new(kube::Client::try_default().await?);
//! for host in client.list_hosts("metal3").await? {
//!     println!("{:?}", host.metadata.name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
#[path = "trait.rs"]
pub mod metal3_trait;
#[cfg(feature = "test-util")]
pub mod mock;

pub use client::Metal3Client;
pub use error::Metal3Error;
pub use metal3_trait::{LabelChanges, Metal3ClientTrait};
#[cfg(feature = "test-util")]
pub use mock::MockMetal3Client;
