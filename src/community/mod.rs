//! Community detection.
//!
//! Detection runs once per loaded network and produces a [`Partition`]
//! that is then held fixed while the network is edited.
//!
//! [`Louvain`] greedily optimizes modularity
//!
//! ```text
//! Q = Σ_c [ in_c / m - γ (deg_c / 2m)² ]
//! ```
//!
//! through repeated local moving and aggregation (Blondel et al. 2008).
//! [`ConnectedComponents`] is a cheap baseline that puts every connected
//! component in its own community.

mod components;
mod louvain;
mod partition;
mod traits;

pub use components::ConnectedComponents;
pub use louvain::Louvain;
pub use partition::{CommunityId, Partition};
pub use traits::CommunityDetection;
