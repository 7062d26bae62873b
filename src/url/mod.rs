//! URL handling module for icon-scraper
//!
//! This module provides domain validation, served-host extraction and the
//! resolution rules that turn icon references found in markup into fetchable
//! URLs.

mod domain;
mod resolve;

pub use domain::{served_host, validate_domain, MAX_DOMAIN_LENGTH};
pub use resolve::{ensure_scheme, is_absolute_url, is_svg_url, resolve_reference};
