//! Hardware classification CRD definitions
//!
//! `HardwareClassification` is owned by the classification controller.
//! `BareMetalHost` is a read-only mirror of the bare-metal operator's CRD.

pub mod baremetal_host;
pub mod hardware_classification;

pub use baremetal_host::*;
pub use hardware_classification::*;
