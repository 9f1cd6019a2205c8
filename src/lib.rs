//! The library code for the `sitebuild` docs-site builder. A build is a single
//! pass over one source directory:
//!
//! 1. Every `*.md` file in the directory is converted to HTML
//!    ([`crate::markdown`]) and decorated with classes, heading anchors and
//!    section cards ([`crate::decorate`]).
//! 2. The decorated HTML is rendered through the page template and written
//!    next to its source as `.html` ([`crate::write`]).
//! 3. Optionally, the generated pages, marker files and subdirectories are
//!    copied into a freshly emptied publishing directory
//!    ([`crate::install`]).
//!
//! [`crate::build::build_site`] ties these together. Templates can also call
//! `hover(...)` ([`crate::hover`]) to embed image-with-overlay widgets.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod config;
pub mod decorate;
pub mod hover;
pub mod install;
pub mod markdown;
pub mod write;
