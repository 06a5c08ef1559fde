//! `pp-network`: road network link geometry.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`network`] | `Link`, `LinkNetwork`, `LinkNetworkBuilder`                 |
//! | [`loader`]  | `load_network_xml`, `load_network_reader`                   |
//! | [`error`]   | `NetworkError`, `NetworkResult<T>`                          |

pub mod error;
pub mod loader;
pub mod network;


pub use error::{NetworkError, NetworkResult};
pub use loader::{load_network_reader, load_network_xml};
pub use network::{Link, LinkNetwork, LinkNetworkBuilder};
