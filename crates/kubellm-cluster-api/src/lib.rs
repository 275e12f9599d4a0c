//! kubellm-cluster-api: cluster resource-model types for Kubellm.
//!
//! These are the pieces of the member-cluster API that the grading engine
//! reads and writes: the per-cluster `ResourceModel` ladder (desired state),
//! node snapshots delivered by inventory collection, and the node/resource
//! summaries written back into cluster status.
//!
//! # Serialization
//!
//! All types serialize with the camelCase field names used by the cluster
//! API. Resource amounts are [`Quantity`] values, which serialize as
//! canonical strings (`"4Gi"`, `"500m"`) and accept plain integers on input.

pub mod error;
pub mod quantity;
pub mod types;

pub use error::{QuantityError, QuantityResult};
pub use quantity::{Quantity, QuantityFormat};
pub use types::*;
