//! Crawler module for icon discovery
//!
//! This module contains the network side of the pipeline:
//! - HTTP transport and the bounded-concurrency dispatcher with retries
//! - HTML head scanning and web app manifest parsing
//! - Per-domain fan-out of candidate probes
//! - Orchestration of every domain of a call

mod coordinator;
mod dispatcher;
mod fetcher;
mod manifest;
mod parser;
mod report;
mod task_group;

pub use coordinator::{get_icon, get_icons, get_icons_with_transport, IconMap};
pub use dispatcher::{fetch_with_retry, DispatchHandle, Dispatcher, RetryPolicy};
pub use fetcher::{build_http_client, FetchResponse, ReqwestTransport, Transport};
pub use manifest::{
    manifest_candidates, parse_manifest, process_manifest, ManifestIcon, WebAppManifest,
};
pub use parser::{parse_html, scan_head, HeadReference, ICON_RELS};
pub use report::{CallSinks, Reporter};
pub use task_group::{CollectedIcons, IconTaskGroup};
