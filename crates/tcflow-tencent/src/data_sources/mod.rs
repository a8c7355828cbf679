//! Read-only data source types

pub mod kms_keys;
pub mod private_dns_zones;

pub use kms_keys::KmsKeys;
pub use private_dns_zones::PrivateDnsZones;
