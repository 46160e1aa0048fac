//! Provider-facing descriptors (data), the registry that names them, and the built-in catalog.
//!
//! `descriptor` exposes validated metadata (`ProviderDescriptor`) covering endpoints, the
//! protocol version, OAuth 1.0a signing options, bearer placement, default parameters, and
//! the user-profile projection. Provider differences are data plus at most one hook
//! function; flows never branch on provider names.

pub mod catalog;
pub mod descriptor;
pub mod registry;

pub use descriptor::*;
pub use registry::*;
