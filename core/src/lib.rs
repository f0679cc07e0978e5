//! Blocking client for the OSIsoft PI Web API.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern), and offers `PiWebApi`, which
//! runs those requests over a reused `ureq` agent for callers who just want
//! typed results.
//!
//! # Design
//! - `PiWebApiClient` is stateless: it holds only the API base URL.
//! - Each operation is split into `build_*` and `parse_*` so the I/O
//!   boundary is explicit. `PiWebApi` composes them through a `Transport`.
//! - Records are declared once through `pi_object!`: every field optional,
//!   omitted from JSON when unset.
//! - `Resource` / `ChildOf` place records in the URL space, so one generic
//!   façade serves every resource kind.
//! - No retries, caching or pooling policy: every failure reaches the caller
//!   as an `ApiError`.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod resource;
pub mod schema;
pub mod selector;
pub mod transport;
pub mod types;

pub use api::{PiWebApi, ResourceApi, StreamApi};
pub use client::PiWebApiClient;
pub use config::{Auth, ClientConfig};
pub use error::{ApiError, ErrorPayload};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use resource::{ChildOf, Resource, RootResource};
pub use schema::PiObject;
pub use selector::FieldSelector;
pub use transport::{Transport, UreqTransport};
pub use types::{
    PIAssetDatabase, PIAssetServer, PIAttribute, PIAttributeTemplate, PIDataServer, PIElement,
    PIElementTemplate, PIErrors, PIEventFrame, PIItems, PILanding, PILinks, PIPoint,
    PIPropertyError, PITimedValue, PIValue,
};
