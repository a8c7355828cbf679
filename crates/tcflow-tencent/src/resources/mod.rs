//! Managed resource types

pub mod cfs_access_group;
pub mod kms_key;
pub mod private_dns_zone;
pub mod tdmq_namespace;

pub use cfs_access_group::CfsAccessGroup;
pub use kms_key::KmsKey;
pub use private_dns_zone::PrivateDnsZone;
pub use tdmq_namespace::TdmqNamespace;
