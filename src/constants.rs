use std::time::Duration;

pub const DEFAULT_NPI_API_BASE_URL: &str = "https://npiregistry.cms.hhs.gov/api/";
pub const DEFAULT_NPI_API_VERSION: &str = "2.1";

pub const USER_AGENT: &str = concat!("npi-lookup/", env!("CARGO_PKG_VERSION"));

/// Upper bound on identifiers processed per batch.
pub const MAX_BATCH_SIZE: usize = 10;
pub const LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

pub const NPI_LENGTH: usize = 10;
pub const NOT_AVAILABLE: &str = "N/A";

pub const ENUMERATION_TYPE_INDIVIDUAL: &str = "NPI-1";
pub const ADDRESS_PURPOSE_LOCATION: &str = "LOCATION";
pub const ADDRESS_PURPOSE_MAILING: &str = "MAILING";
