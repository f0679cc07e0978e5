//! Stateless HTTP request builder and response parser for the PI Web API.
//!
//! # Design
//! `PiWebApiClient` holds only the API base URL and carries no mutable state
//! between calls. Each operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. Operations are generic over `Resource` / `ChildOf`, so the
//! URL templates are written once for every resource kind.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;
use url::Url;

use crate::error::{ApiError, ErrorPayload};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::resource::{ChildOf, Resource, RootResource};
use crate::schema::PiObject;
use crate::selector::FieldSelector;
use crate::types::{PIItems, PILanding, PITimedValue};

const SELECTED_FIELDS: &str = "selectedFields";
const STREAMS: &str = "streams";

/// Synchronous, stateless request builder for the PI Web API.
///
/// Builds `HttpRequest` values and parses `HttpResponse` values without
/// touching the network.
#[derive(Debug, Clone)]
pub struct PiWebApiClient {
    base_url: Url,
}

impl PiWebApiClient {
    /// `base_url` is the API root, e.g. `https://pi.example.com/piwebapi`.
    /// A trailing slash is ignored.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let base_url =
            Url::parse(base_url).map_err(|e| ApiError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(format!("{base_url}: not a hierarchical URL")));
        }
        Ok(Self { base_url })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    pub fn build_get_landing(&self) -> Result<HttpRequest, ApiError> {
        Ok(read_request(self.url(&[], None)?))
    }

    pub fn build_get<R: Resource>(
        &self,
        web_id: &str,
        selector: Option<&FieldSelector>,
    ) -> Result<HttpRequest, ApiError> {
        warn_unknown_fields::<R>(selector);
        let url = self.url(&[R::COLLECTION, web_id], selected(selector).as_ref())?;
        Ok(read_request(url))
    }

    /// Looks a resource up by its PI path, e.g. `\\PISRV1\Database1\Plant`.
    pub fn build_get_by_path<R: Resource>(
        &self,
        path: &str,
        selector: Option<&FieldSelector>,
    ) -> Result<HttpRequest, ApiError> {
        warn_unknown_fields::<R>(selector);
        let mut url = self.url(&[R::COLLECTION], None)?;
        url.query_pairs_mut().append_pair("path", path);
        append_selector(&mut url, selector);
        Ok(read_request(url))
    }

    pub fn build_list<R: RootResource>(
        &self,
        selector: Option<&FieldSelector>,
    ) -> Result<HttpRequest, ApiError> {
        warn_unknown_item_fields::<R>(selector);
        let url = self.url(&[R::COLLECTION], selected(selector).as_ref())?;
        Ok(read_request(url))
    }

    pub fn build_list_children<P: Resource, C: ChildOf<P>>(
        &self,
        parent_web_id: &str,
        selector: Option<&FieldSelector>,
    ) -> Result<HttpRequest, ApiError> {
        warn_unknown_item_fields::<C>(selector);
        let url = self.url(
            &[P::COLLECTION, parent_web_id, C::SEGMENT],
            selected(selector).as_ref(),
        )?;
        Ok(read_request(url))
    }

    pub fn build_create_child<P: Resource, C: ChildOf<P>>(
        &self,
        parent_web_id: &str,
        child: &C,
    ) -> Result<HttpRequest, ApiError> {
        let url = self.url(&[P::COLLECTION, parent_web_id, C::SEGMENT], None)?;
        write_request(HttpMethod::Post, url, Some(child))
    }

    /// PATCH sends only the fields set on `entity`; the server leaves the
    /// rest unchanged.
    pub fn build_update<R: Resource>(&self, web_id: &str, entity: &R) -> Result<HttpRequest, ApiError> {
        let url = self.url(&[R::COLLECTION, web_id], None)?;
        write_request(HttpMethod::Patch, url, Some(entity))
    }

    pub fn build_delete<R: Resource>(&self, web_id: &str) -> Result<HttpRequest, ApiError> {
        let url = self.url(&[R::COLLECTION, web_id], None)?;
        write_request::<()>(HttpMethod::Delete, url, None)
    }

    /// Current value of an attribute or point stream.
    pub fn build_get_value(
        &self,
        web_id: &str,
        selector: Option<&FieldSelector>,
    ) -> Result<HttpRequest, ApiError> {
        warn_unknown_fields::<PITimedValue>(selector);
        let url = self.url(&[STREAMS, web_id, "value"], selected(selector).as_ref())?;
        Ok(read_request(url))
    }

    pub fn build_update_value(&self, web_id: &str, value: &PITimedValue) -> Result<HttpRequest, ApiError> {
        let url = self.url(&[STREAMS, web_id, "value"], None)?;
        write_request(HttpMethod::Post, url, Some(value))
    }

    pub fn parse_get_landing(&self, response: HttpResponse) -> Result<PILanding, ApiError> {
        check_success(&response)?;
        deserialize(&response.body)
    }

    /// Parses the response of `build_get` or `build_get_by_path`.
    pub fn parse_get<R: Resource>(&self, response: HttpResponse) -> Result<R, ApiError> {
        check_success(&response)?;
        deserialize(&response.body)
    }

    /// Parses a `PIItems` page. A page without `Items` reads as empty.
    pub fn parse_list<R: PiObject>(&self, response: HttpResponse) -> Result<Vec<R>, ApiError> {
        check_success(&response)?;
        let page: PIItems<R> = deserialize(&response.body)?;
        Ok(page.items.unwrap_or_default())
    }

    /// Returns the WebId of the created resource, taken from `Location`.
    pub fn parse_create(&self, response: HttpResponse) -> Result<String, ApiError> {
        check_success(&response)?;
        let location = response.header("location").ok_or(ApiError::MissingLocation)?;
        self.web_id_from_location(location).ok_or(ApiError::MissingLocation)
    }

    pub fn parse_update(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_success(&response)
    }

    pub fn parse_delete(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_success(&response)
    }

    pub fn parse_get_value(&self, response: HttpResponse) -> Result<PITimedValue, ApiError> {
        check_success(&response)?;
        deserialize(&response.body)
    }

    /// The server answers 204, or 202 when the write was only buffered.
    pub fn parse_update_value(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_success(&response)
    }

    fn url(&self, segments: &[&str], query: Option<&(&str, String)>) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(format!("{}: not a hierarchical URL", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        if let Some((key, value)) = query {
            url.query_pairs_mut().append_pair(key, value);
        }
        Ok(url)
    }

    /// Last path segment of `location`, resolved against the base URL so
    /// relative locations work too.
    fn web_id_from_location(&self, location: &str) -> Option<String> {
        let url = self.base_url.join(location).ok()?;
        let segment = url.path_segments()?.filter(|s| !s.is_empty()).last()?;
        Some(segment.to_string())
    }
}

fn selected(selector: Option<&FieldSelector>) -> Option<(&'static str, String)> {
    selector
        .filter(|selector| !selector.is_empty())
        .map(|selector| (SELECTED_FIELDS, selector.to_query_value()))
}

fn append_selector(url: &mut Url, selector: Option<&FieldSelector>) {
    if let Some((key, value)) = selected(selector) {
        url.query_pairs_mut().append_pair(key, &value);
    }
}

fn warn_unknown_fields<T: PiObject>(selector: Option<&FieldSelector>) {
    if let Some(selector) = selector {
        let unknown = selector.unknown_fields::<T>();
        if !unknown.is_empty() {
            warn!(record = T::TYPE_NAME, fields = ?unknown, "selectedFields names fields the record does not have");
        }
    }
}

fn warn_unknown_item_fields<T: PiObject>(selector: Option<&FieldSelector>) {
    if let Some(selector) = selector {
        let unknown = selector.unknown_item_fields::<T>();
        if !unknown.is_empty() {
            warn!(record = T::TYPE_NAME, fields = ?unknown, "selectedFields names fields the items do not have");
        }
    }
}

fn read_request(url: Url) -> HttpRequest {
    HttpRequest {
        method: HttpMethod::Get,
        url: url.into(),
        headers: Vec::new(),
        body: None,
    }
}

/// PI Web API rejects write verbs lacking `X-Requested-With` (CSRF defence).
fn write_request<T: Serialize>(method: HttpMethod, url: Url, body: Option<&T>) -> Result<HttpRequest, ApiError> {
    let mut headers = vec![("x-requested-with".to_string(), "XMLHttpRequest".to_string())];
    let body = match body {
        Some(body) => {
            headers.push(("content-type".to_string(), "application/json".to_string()));
            Some(serde_json::to_string(body).map_err(|e| ApiError::SerializationError(e.to_string()))?)
        }
        None => None,
    };
    Ok(HttpRequest {
        method,
        url: url.into(),
        headers,
        body,
    })
}

fn deserialize<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_success(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    let payload = ErrorPayload::parse(&response.body);
    warn!(status = response.status, %payload, "PI Web API request failed");
    if response.status == 404 {
        return Err(ApiError::NotFound { payload });
    }
    Err(ApiError::HttpError {
        status: response.status,
        payload,
    })
}
