//! Blocking façades: one call per PI Web API operation.
//!
//! # Design
//! `PiWebApi` pairs the stateless `PiWebApiClient` with a `Transport` and
//! runs build → execute → parse for each call. Per-resource façades are thin
//! borrowed views (`ResourceApi<R>`) so every resource kind shares one
//! implementation of get / get-by-path / update / delete / children.

use std::marker::PhantomData;

use crate::client::PiWebApiClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::resource::{ChildOf, Resource, RootResource};
use crate::selector::FieldSelector;
use crate::transport::{Transport, UreqTransport};
use crate::types::{
    PIAssetDatabase, PIAssetServer, PIAttribute, PIAttributeTemplate, PIDataServer, PIElement,
    PIElementTemplate, PIEventFrame, PILanding, PIPoint, PITimedValue,
};

/// Blocking PI Web API client.
#[derive(Debug, Clone)]
pub struct PiWebApi<T = UreqTransport> {
    client: PiWebApiClient,
    transport: T,
}

impl PiWebApi<UreqTransport> {
    pub fn connect(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = PiWebApiClient::new(&config.base_url)?;
        Ok(Self::with_transport(client, UreqTransport::new(config)))
    }
}

impl<T: Transport> PiWebApi<T> {
    pub fn with_transport(client: PiWebApiClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &PiWebApiClient {
        &self.client
    }

    fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.transport.execute(request)
    }

    pub fn landing(&self) -> Result<PILanding, ApiError> {
        let request = self.client.build_get_landing()?;
        self.client.parse_get_landing(self.send(request)?)
    }

    /// Façade for any resource kind.
    pub fn resource<R: Resource>(&self) -> ResourceApi<'_, R, T> {
        ResourceApi {
            api: self,
            _resource: PhantomData,
        }
    }

    pub fn asset_servers(&self) -> ResourceApi<'_, PIAssetServer, T> {
        self.resource()
    }

    pub fn asset_databases(&self) -> ResourceApi<'_, PIAssetDatabase, T> {
        self.resource()
    }

    pub fn elements(&self) -> ResourceApi<'_, PIElement, T> {
        self.resource()
    }

    pub fn element_templates(&self) -> ResourceApi<'_, PIElementTemplate, T> {
        self.resource()
    }

    pub fn attributes(&self) -> ResourceApi<'_, PIAttribute, T> {
        self.resource()
    }

    pub fn attribute_templates(&self) -> ResourceApi<'_, PIAttributeTemplate, T> {
        self.resource()
    }

    pub fn data_servers(&self) -> ResourceApi<'_, PIDataServer, T> {
        self.resource()
    }

    pub fn points(&self) -> ResourceApi<'_, PIPoint, T> {
        self.resource()
    }

    pub fn event_frames(&self) -> ResourceApi<'_, PIEventFrame, T> {
        self.resource()
    }

    pub fn streams(&self) -> StreamApi<'_, T> {
        StreamApi { api: self }
    }
}

/// Operations on one resource kind.
pub struct ResourceApi<'a, R, T = UreqTransport> {
    api: &'a PiWebApi<T>,
    _resource: PhantomData<fn() -> R>,
}

impl<'a, R: Resource, T: Transport> ResourceApi<'a, R, T> {
    pub fn get(&self, web_id: &str, selector: Option<&FieldSelector>) -> Result<R, ApiError> {
        let client = &self.api.client;
        let request = client.build_get::<R>(web_id, selector)?;
        client.parse_get(self.api.send(request)?)
    }

    pub fn get_by_path(&self, path: &str, selector: Option<&FieldSelector>) -> Result<R, ApiError> {
        let client = &self.api.client;
        let request = client.build_get_by_path::<R>(path, selector)?;
        client.parse_get(self.api.send(request)?)
    }

    pub fn update(&self, web_id: &str, entity: &R) -> Result<(), ApiError> {
        let client = &self.api.client;
        let request = client.build_update(web_id, entity)?;
        client.parse_update(self.api.send(request)?)
    }

    pub fn delete(&self, web_id: &str) -> Result<(), ApiError> {
        let client = &self.api.client;
        let request = client.build_delete::<R>(web_id)?;
        client.parse_delete(self.api.send(request)?)
    }

    /// Creates `child` under `parent_web_id` and returns the new WebId.
    pub fn create_child<C: ChildOf<R>>(&self, parent_web_id: &str, child: &C) -> Result<String, ApiError> {
        let client = &self.api.client;
        let request = client.build_create_child::<R, C>(parent_web_id, child)?;
        client.parse_create(self.api.send(request)?)
    }

    pub fn list_children<C: ChildOf<R>>(
        &self,
        parent_web_id: &str,
        selector: Option<&FieldSelector>,
    ) -> Result<Vec<C>, ApiError> {
        let client = &self.api.client;
        let request = client.build_list_children::<R, C>(parent_web_id, selector)?;
        client.parse_list(self.api.send(request)?)
    }
}

impl<'a, R: RootResource, T: Transport> ResourceApi<'a, R, T> {
    pub fn list(&self, selector: Option<&FieldSelector>) -> Result<Vec<R>, ApiError> {
        let client = &self.api.client;
        let request = client.build_list::<R>(selector)?;
        client.parse_list(self.api.send(request)?)
    }
}

/// Value reads and writes for attribute and point streams.
pub struct StreamApi<'a, T = UreqTransport> {
    api: &'a PiWebApi<T>,
}

impl<'a, T: Transport> StreamApi<'a, T> {
    pub fn get_value(&self, web_id: &str, selector: Option<&FieldSelector>) -> Result<PITimedValue, ApiError> {
        let client = &self.api.client;
        let request = client.build_get_value(web_id, selector)?;
        client.parse_get_value(self.api.send(request)?)
    }

    pub fn update_value(&self, web_id: &str, value: &PITimedValue) -> Result<(), ApiError> {
        let client = &self.api.client;
        let request = client.build_update_value(web_id, value)?;
        client.parse_update_value(self.api.send(request)?)
    }
}
