//! Wire payload shapes of the registry JSON protocol.
//!
//! Deserialization structs matching the backend responses, plus the
//! conversions into the decoded record types. Conversions fail hard:
//! a payload that does not decode never produces a partial record.

use serde::Deserialize;
use std::net::IpAddr;
use time::Date;

use crate::decode;
use crate::error::RegistryError;
use crate::types::{
    Address, Contact, Disclosable, DnsKey, Domain, FileInfo, Identification, Keyset, NameServer,
    Nsset, Registrar, RegistrarCertification, RegistrarGroup, ScanResult, StatusDesc,
};

/// Calendar date triple; `(0, 0, 0)` means "no date".
#[derive(Debug, Clone, Copy, Deserialize, Default)]
pub struct WireDate {
    pub year: i32,
    pub month: i32,
    pub day: i32,
}

impl WireDate {
    fn decode(self) -> Result<Option<Date>, RegistryError> {
        decode::decode_date(self.year, self.month, self.day)
    }

    fn decode_required(self, field: &str) -> Result<Date, RegistryError> {
        self.decode()?
            .ok_or_else(|| RegistryError::Decode(format!("date field {field} carries the empty sentinel")))
    }
}

/// A value paired with its privacy flag as transmitted by the registry.
#[derive(Debug, Clone, Deserialize)]
pub struct WireDisclosable<T> {
    pub value: T,
    pub disclose: bool,
}

impl<T> From<WireDisclosable<T>> for Disclosable<T> {
    fn from(wire: WireDisclosable<T>) -> Self {
        Self::new(wire.value, wire.disclose)
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct WireAddress {
    #[serde(default)]
    pub street1: String,
    #[serde(default)]
    pub street2: String,
    #[serde(default)]
    pub street3: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub stateorprovince: String,
    #[serde(default)]
    pub postalcode: String,
    #[serde(default)]
    pub country_code: String,
}

impl From<WireAddress> for Address {
    fn from(wire: WireAddress) -> Self {
        Self {
            street1: wire.street1,
            street2: wire.street2,
            street3: wire.street3,
            city: wire.city,
            stateorprovince: wire.stateorprovince,
            postalcode: wire.postalcode,
            country_code: wire.country_code,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireIdentification {
    pub identification_type: String,
    pub identification_data: String,
}

impl From<WireIdentification> for Identification {
    fn from(wire: WireIdentification) -> Self {
        Self {
            kind: wire.identification_type,
            value: wire.identification_data,
        }
    }
}

/// Contact record as transmitted by the WHOIS backend.
#[derive(Debug, Clone, Deserialize)]
pub struct WireContact {
    pub handle: String,
    pub organization: WireDisclosable<String>,
    pub name: WireDisclosable<String>,
    pub address: WireDisclosable<WireAddress>,
    pub phone: WireDisclosable<String>,
    pub fax: WireDisclosable<String>,
    pub email: WireDisclosable<String>,
    pub notify_email: WireDisclosable<String>,
    pub vat_number: WireDisclosable<String>,
    pub identification: WireDisclosable<WireIdentification>,
    pub creating_registrar_handle: String,
    pub sponsoring_registrar_handle: String,
    pub created: String,
    #[serde(default)]
    pub changed: Option<String>,
    #[serde(default)]
    pub last_transfer: Option<String>,
    #[serde(default)]
    pub statuses: Vec<String>,
}

impl TryFrom<WireContact> for Contact {
    type Error = RegistryError;

    fn try_from(wire: WireContact) -> Result<Self, Self::Error> {
        Ok(Self {
            handle: wire.handle,
            organization: wire.organization.into(),
            name: wire.name.into(),
            address: Disclosable::new(
                wire.address.value.into(),
                wire.address.disclose,
            ),
            phone: wire.phone.into(),
            fax: wire.fax.into(),
            email: wire.email.into(),
            notify_email: wire.notify_email.into(),
            vat_number: wire.vat_number.into(),
            identification: Disclosable::new(
                wire.identification.value.into(),
                wire.identification.disclose,
            ),
            creating_registrar_handle: wire.creating_registrar_handle,
            sponsoring_registrar_handle: wire.sponsoring_registrar_handle,
            created: decode::decode_datetime(&wire.created)?,
            changed: decode_datetime_opt(wire.changed.as_deref())?,
            last_transfer: decode_datetime_opt(wire.last_transfer.as_deref())?,
            statuses: wire.statuses,
        })
    }
}

/// Domain record as transmitted by the WHOIS backend.
#[derive(Debug, Clone, Deserialize)]
pub struct WireDomain {
    pub handle: String,
    pub registrant_handle: String,
    #[serde(default)]
    pub admin_contact_handles: Vec<String>,
    #[serde(default)]
    pub nsset_handle: Option<String>,
    #[serde(default)]
    pub keyset_handle: Option<String>,
    pub registrar_handle: String,
    #[serde(default)]
    pub statuses: Vec<String>,
    pub registered: String,
    #[serde(default)]
    pub changed: Option<String>,
    #[serde(default)]
    pub last_transfer: Option<String>,
    pub expire: WireDate,
    #[serde(default)]
    pub validated_to: WireDate,
}

impl TryFrom<WireDomain> for Domain {
    type Error = RegistryError;

    fn try_from(wire: WireDomain) -> Result<Self, Self::Error> {
        Ok(Self {
            handle: wire.handle,
            registrant_handle: wire.registrant_handle,
            admin_contact_handles: wire.admin_contact_handles,
            nsset_handle: wire.nsset_handle,
            keyset_handle: wire.keyset_handle,
            registrar_handle: wire.registrar_handle,
            statuses: wire.statuses,
            registered: decode::decode_datetime(&wire.registered)?,
            changed: decode_datetime_opt(wire.changed.as_deref())?,
            last_transfer: decode_datetime_opt(wire.last_transfer.as_deref())?,
            expire: wire.expire.decode_required("expire")?,
            validated_to: wire.validated_to.decode()?,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireNameServer {
    pub name: String,
    #[serde(default)]
    pub ip_addresses: Vec<String>,
}

impl TryFrom<WireNameServer> for NameServer {
    type Error = RegistryError;

    fn try_from(wire: WireNameServer) -> Result<Self, Self::Error> {
        let ip_addresses = wire
            .ip_addresses
            .iter()
            .map(|ip| {
                ip.parse::<IpAddr>().map_err(|_| {
                    RegistryError::Decode(format!("invalid name server address {ip:?}"))
                })
            })
            .collect::<Result<_, _>>()?;
        Ok(Self {
            name: wire.name,
            ip_addresses,
        })
    }
}

/// Name server set record as transmitted by the WHOIS backend.
#[derive(Debug, Clone, Deserialize)]
pub struct WireNsset {
    pub handle: String,
    #[serde(default)]
    pub name_servers: Vec<WireNameServer>,
    #[serde(default)]
    pub tech_contact_handles: Vec<String>,
    pub registrar_handle: String,
    pub created: String,
    #[serde(default)]
    pub changed: Option<String>,
    #[serde(default)]
    pub last_transfer: Option<String>,
    #[serde(default)]
    pub statuses: Vec<String>,
}

impl TryFrom<WireNsset> for Nsset {
    type Error = RegistryError;

    fn try_from(wire: WireNsset) -> Result<Self, Self::Error> {
        Ok(Self {
            handle: wire.handle,
            name_servers: wire
                .name_servers
                .into_iter()
                .map(NameServer::try_from)
                .collect::<Result<_, _>>()?,
            tech_contact_handles: wire.tech_contact_handles,
            registrar_handle: wire.registrar_handle,
            created: decode::decode_datetime(&wire.created)?,
            changed: decode_datetime_opt(wire.changed.as_deref())?,
            last_transfer: decode_datetime_opt(wire.last_transfer.as_deref())?,
            statuses: wire.statuses,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireDnsKey {
    pub flags: i64,
    pub protocol: i64,
    pub alg: i64,
    pub key: String,
}

impl TryFrom<WireDnsKey> for DnsKey {
    type Error = RegistryError;

    fn try_from(wire: WireDnsKey) -> Result<Self, Self::Error> {
        Ok(Self {
            flags: u16::try_from(wire.flags).map_err(|_| {
                RegistryError::Decode(format!("DNSKEY flags {} out of range", wire.flags))
            })?,
            protocol: u8::try_from(wire.protocol).map_err(|_| {
                RegistryError::Decode(format!("DNSKEY protocol {} out of range", wire.protocol))
            })?,
            alg: u8::try_from(wire.alg).map_err(|_| {
                RegistryError::Decode(format!("DNSKEY algorithm {} out of range", wire.alg))
            })?,
            key: wire.key,
        })
    }
}

/// Key set record as transmitted by the WHOIS backend.
#[derive(Debug, Clone, Deserialize)]
pub struct WireKeyset {
    pub handle: String,
    #[serde(default)]
    pub dns_keys: Vec<WireDnsKey>,
    #[serde(default)]
    pub tech_contact_handles: Vec<String>,
    pub registrar_handle: String,
    pub created: String,
    #[serde(default)]
    pub changed: Option<String>,
    #[serde(default)]
    pub last_transfer: Option<String>,
    #[serde(default)]
    pub statuses: Vec<String>,
}

impl TryFrom<WireKeyset> for Keyset {
    type Error = RegistryError;

    fn try_from(wire: WireKeyset) -> Result<Self, Self::Error> {
        Ok(Self {
            handle: wire.handle,
            dns_keys: wire
                .dns_keys
                .into_iter()
                .map(DnsKey::try_from)
                .collect::<Result<_, _>>()?,
            tech_contact_handles: wire.tech_contact_handles,
            registrar_handle: wire.registrar_handle,
            created: decode::decode_datetime(&wire.created)?,
            changed: decode_datetime_opt(wire.changed.as_deref())?,
            last_transfer: decode_datetime_opt(wire.last_transfer.as_deref())?,
            statuses: wire.statuses,
        })
    }
}

/// Registrar record as transmitted by the WHOIS backend.
#[derive(Debug, Clone, Deserialize)]
pub struct WireRegistrar {
    pub handle: String,
    pub name: String,
    #[serde(default)]
    pub organization: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub fax: String,
    #[serde(default)]
    pub address: WireAddress,
}

impl From<WireRegistrar> for Registrar {
    fn from(wire: WireRegistrar) -> Self {
        Self {
            handle: wire.handle,
            name: wire.name,
            organization: wire.organization,
            url: wire.url,
            phone: wire.phone,
            fax: wire.fax,
            address: wire.address.into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireRegistrarGroup {
    pub name: String,
    #[serde(default)]
    pub members: Vec<String>,
}

impl From<WireRegistrarGroup> for RegistrarGroup {
    fn from(wire: WireRegistrarGroup) -> Self {
        Self {
            name: wire.name,
            members: wire.members,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireRegistrarCertification {
    pub registrar_handle: String,
    pub score: i64,
    #[serde(default)]
    pub evaluation_file_id: Option<i64>,
}

impl TryFrom<WireRegistrarCertification> for RegistrarCertification {
    type Error = RegistryError;

    fn try_from(wire: WireRegistrarCertification) -> Result<Self, Self::Error> {
        Ok(Self {
            registrar_handle: wire.registrar_handle,
            score: u8::try_from(wire.score).map_err(|_| {
                RegistryError::Decode(format!("certification score {} out of range", wire.score))
            })?,
            evaluation_file_id: wire.evaluation_file_id,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireStatusDesc {
    pub handle: String,
    pub name: String,
}

impl From<WireStatusDesc> for StatusDesc {
    fn from(wire: WireStatusDesc) -> Self {
        Self {
            handle: wire.handle,
            name: wire.name,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireFileInfo {
    pub id: i64,
    pub name: String,
    pub mimetype: String,
    pub size: u64,
}

impl From<WireFileInfo> for FileInfo {
    fn from(wire: WireFileInfo) -> Self {
        Self {
            id: wire.id,
            name: wire.name,
            mimetype: wire.mimetype,
            size: wire.size,
        }
    }
}

/// One CDNSKEY scan observation as transmitted by the scanner.
#[derive(Debug, Clone, Deserialize)]
pub struct WireScanResult {
    pub worker_name: String,
    pub nameserver: String,
    #[serde(default)]
    pub nameserver_ip: String,
    pub cdnskey_status: String,
    #[serde(default)]
    pub flags: i64,
    #[serde(default)]
    pub proto: i64,
    #[serde(default)]
    pub alg: i64,
    #[serde(default)]
    pub public_key: String,
    pub scan_at: String,
}

impl TryFrom<WireScanResult> for ScanResult {
    type Error = RegistryError;

    fn try_from(wire: WireScanResult) -> Result<Self, Self::Error> {
        Ok(Self {
            worker_name: wire.worker_name,
            nameserver: wire.nameserver,
            nameserver_ip: wire.nameserver_ip,
            cdnskey_status: wire.cdnskey_status,
            flags: u16::try_from(wire.flags).map_err(|_| {
                RegistryError::Decode(format!("CDNSKEY flags {} out of range", wire.flags))
            })?,
            protocol: u8::try_from(wire.proto).map_err(|_| {
                RegistryError::Decode(format!("CDNSKEY protocol {} out of range", wire.proto))
            })?,
            alg: u8::try_from(wire.alg).map_err(|_| {
                RegistryError::Decode(format!("CDNSKEY algorithm {} out of range", wire.alg))
            })?,
            public_key: wire.public_key,
            scan_at: decode::decode_datetime(&wire.scan_at)?,
        })
    }
}

fn decode_datetime_opt(
    value: Option<&str>,
) -> Result<Option<time::OffsetDateTime>, RegistryError> {
    value.map(decode::decode_datetime).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    fn contact_json() -> serde_json::Value {
        serde_json::json!({
            "handle": "KOCHBA",
            "organization": {"value": "", "disclose": false},
            "name": {"value": "Jan Kochba", "disclose": true},
            "address": {"value": {"street1": "Dlouha 24", "city": "Praha", "postalcode": "11000", "country_code": "CZ"}, "disclose": true},
            "phone": {"value": "+420.720123456", "disclose": false},
            "fax": {"value": "", "disclose": false},
            "email": {"value": "kochba@example.cz", "disclose": false},
            "notify_email": {"value": "", "disclose": false},
            "vat_number": {"value": "", "disclose": false},
            "identification": {"value": {"identification_type": "BIRTHDAY", "identification_data": "1971-05-12"}, "disclose": true},
            "creating_registrar_handle": "REG-FRED_A",
            "sponsoring_registrar_handle": "REG-FRED_A",
            "created": "2015-06-10T10:30:00Z",
            "changed": null,
            "last_transfer": null,
            "statuses": ["linked"]
        })
    }

    #[test]
    fn contact_decodes_with_privacy_flags() {
        let wire: WireContact = serde_json::from_value(contact_json()).unwrap();
        let contact = Contact::try_from(wire).unwrap();
        assert_eq!(contact.handle, "KOCHBA");
        assert_eq!(contact.name.disclosed().map(String::as_str), Some("Jan Kochba"));
        assert_eq!(contact.email.disclosed(), None);
        assert_eq!(contact.created, datetime!(2015-06-10 10:30:00 UTC));
        assert_eq!(contact.changed, None);
        let identification = contact.identification.disclosed().unwrap();
        assert_eq!(identification.kind, "BIRTHDAY");
    }

    #[test]
    fn domain_decodes_date_sentinels() {
        let wire: WireDomain = serde_json::from_value(serde_json::json!({
            "handle": "fred.cz",
            "registrant_handle": "KOCHBA",
            "admin_contact_handles": ["TESTER"],
            "nsset_handle": "NSSET-1",
            "keyset_handle": null,
            "registrar_handle": "REG-FRED_A",
            "statuses": [],
            "registered": "2018-03-01T08:00:00Z",
            "expire": {"year": 2027, "month": 3, "day": 1},
            "validated_to": {"year": 0, "month": 0, "day": 0}
        }))
        .unwrap();
        let domain = Domain::try_from(wire).unwrap();
        assert_eq!(domain.expire, date!(2027 - 03 - 01));
        assert_eq!(domain.validated_to, None);
        assert_eq!(domain.keyset_handle, None);
    }

    #[test]
    fn out_of_range_dnskey_numbers_fail_decoding() {
        let wire = WireDnsKey {
            flags: 0x1_0000,
            protocol: 3,
            alg: 8,
            key: "AwEAAddt2AkLf".to_string(),
        };
        assert!(DnsKey::try_from(wire).is_err());

        let wire = WireDnsKey {
            flags: 257,
            protocol: 3,
            alg: 300,
            key: "AwEAAddt2AkLf".to_string(),
        };
        assert!(DnsKey::try_from(wire).is_err());
    }

    #[test]
    fn name_server_addresses_must_parse() {
        let wire = WireNameServer {
            name: "a.ns.nic.cz".to_string(),
            ip_addresses: vec!["194.0.12.1".to_string(), "not-an-ip".to_string()],
        };
        assert!(NameServer::try_from(wire).is_err());
    }

    #[test]
    fn certification_score_must_fit() {
        let wire = WireRegistrarCertification {
            registrar_handle: "REG-FRED_A".to_string(),
            score: 1000,
            evaluation_file_id: None,
        };
        assert!(RegistrarCertification::try_from(wire).is_err());
    }
}
