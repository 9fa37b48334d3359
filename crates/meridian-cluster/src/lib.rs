//! Client-side types for the Meridian execution platform.
//!
//! This crate defines the surface the launch layer uses to talk to a
//! cluster-wide execution platform:
//!
//! - [`ResourceSet`] / [`LocalizeResource`]: artifacts staged locally and
//!   localized to containers before an application starts
//! - [`CredentialSet`] / [`DelegationToken`]: delegation tokens attached to
//!   a submission so the remote execution can reach secured services
//! - [`SubmissionRequest`] / [`ClusterClient`]: the backend-agnostic
//!   submission API
//! - [`RemoteHandle`]: a live reference to a submitted execution with
//!   one-shot lifecycle notifications
//!
//! Concrete backends implement [`ClusterClient`] and [`RemoteHandle`];
//! [`MockCluster`] ships here for tests and local development.

#![forbid(unsafe_code)]

mod credentials;
mod error;
mod handle;
mod mock;
mod resources;
mod submit;

pub use credentials::{CredentialSet, DelegationToken};
pub use error::{ClusterError, ClusterResult};
pub use handle::{LifecycleCallback, RemoteHandle};
pub use mock::{MockCluster, MockHandle};
pub use resources::{LocalizeResource, ResourceSet};
pub use submit::{ClusterClient, SubmissionRequest};
