//! WHOIS query backend client.

use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

use super::transport::RpcTransport;
use crate::error::RegistryError;
use crate::types::{
    Contact, Domain, Keyset, Nsset, ObjectType, Registrar, RegistrarCertification, RegistrarGroup,
    StatusDesc,
};
use crate::wire::{
    WireContact, WireDomain, WireKeyset, WireNsset, WireRegistrar, WireRegistrarCertification,
    WireRegistrarGroup, WireStatusDesc,
};

/// Read-side registry queries.
#[async_trait]
pub trait WhoisClient: Send + Sync {
    async fn get_contact_by_handle(&self, handle: &str) -> Result<Contact, RegistryError>;
    async fn get_domain_by_handle(&self, handle: &str) -> Result<Domain, RegistryError>;
    async fn get_nsset_by_handle(&self, handle: &str) -> Result<Nsset, RegistryError>;
    async fn get_keyset_by_handle(&self, handle: &str) -> Result<Keyset, RegistryError>;
    async fn get_registrar_by_handle(&self, handle: &str) -> Result<Registrar, RegistryError>;
    async fn get_registrars(&self) -> Result<Vec<Registrar>, RegistryError>;
    async fn get_registrar_groups(&self) -> Result<Vec<RegistrarGroup>, RegistryError>;
    async fn get_registrar_certification_list(
        &self,
    ) -> Result<Vec<RegistrarCertification>, RegistryError>;
    async fn get_managed_zone_list(&self) -> Result<Vec<String>, RegistryError>;
    async fn get_status_descriptions(
        &self,
        object_type: ObjectType,
        lang: &str,
    ) -> Result<Vec<StatusDesc>, RegistryError>;
}

/// HTTP implementation of [`WhoisClient`].
#[derive(Debug, Clone)]
pub struct HttpWhoisClient {
    transport: RpcTransport,
}

impl HttpWhoisClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RegistryError> {
        Ok(Self {
            transport: RpcTransport::new(base_url, timeout)?,
        })
    }
}

#[async_trait]
impl WhoisClient for HttpWhoisClient {
    async fn get_contact_by_handle(&self, handle: &str) -> Result<Contact, RegistryError> {
        let wire: WireContact = self
            .transport
            .call("get_contact_by_handle", json!({ "handle": handle }))
            .await?;
        Contact::try_from(wire)
    }

    async fn get_domain_by_handle(&self, handle: &str) -> Result<Domain, RegistryError> {
        let wire: WireDomain = self
            .transport
            .call("get_domain_by_handle", json!({ "handle": handle }))
            .await?;
        Domain::try_from(wire)
    }

    async fn get_nsset_by_handle(&self, handle: &str) -> Result<Nsset, RegistryError> {
        let wire: WireNsset = self
            .transport
            .call("get_nsset_by_handle", json!({ "handle": handle }))
            .await?;
        Nsset::try_from(wire)
    }

    async fn get_keyset_by_handle(&self, handle: &str) -> Result<Keyset, RegistryError> {
        let wire: WireKeyset = self
            .transport
            .call("get_keyset_by_handle", json!({ "handle": handle }))
            .await?;
        Keyset::try_from(wire)
    }

    async fn get_registrar_by_handle(&self, handle: &str) -> Result<Registrar, RegistryError> {
        let wire: WireRegistrar = self
            .transport
            .call("get_registrar_by_handle", json!({ "handle": handle }))
            .await?;
        Ok(wire.into())
    }

    async fn get_registrars(&self) -> Result<Vec<Registrar>, RegistryError> {
        let wire: Vec<WireRegistrar> = self.transport.call("get_registrars", json!({})).await?;
        Ok(wire.into_iter().map(Registrar::from).collect())
    }

    async fn get_registrar_groups(&self) -> Result<Vec<RegistrarGroup>, RegistryError> {
        let wire: Vec<WireRegistrarGroup> = self
            .transport
            .call("get_registrar_groups", json!({}))
            .await?;
        Ok(wire.into_iter().map(RegistrarGroup::from).collect())
    }

    async fn get_registrar_certification_list(
        &self,
    ) -> Result<Vec<RegistrarCertification>, RegistryError> {
        let wire: Vec<WireRegistrarCertification> = self
            .transport
            .call("get_registrar_certification_list", json!({}))
            .await?;
        wire.into_iter()
            .map(RegistrarCertification::try_from)
            .collect()
    }

    async fn get_managed_zone_list(&self) -> Result<Vec<String>, RegistryError> {
        self.transport.call("get_managed_zone_list", json!({})).await
    }

    async fn get_status_descriptions(
        &self,
        object_type: ObjectType,
        lang: &str,
    ) -> Result<Vec<StatusDesc>, RegistryError> {
        let operation = format!("get_{object_type}_status_descriptions");
        let wire: Vec<WireStatusDesc> = self
            .transport
            .call(&operation, json!({ "lang": lang }))
            .await?;
        Ok(wire.into_iter().map(StatusDesc::from).collect())
    }
}
