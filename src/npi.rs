use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::constants::{
    ADDRESS_PURPOSE_LOCATION, ADDRESS_PURPOSE_MAILING, ENUMERATION_TYPE_INDIVIDUAL, NOT_AVAILABLE,
    NPI_LENGTH,
};
use crate::registry::{RawAddress, RawProviderRecord, RawTaxonomy};

/// A syntactically valid NPI: exactly ten ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Npi(String);

impl Npi {
    /// Accepts a candidate after trimming surrounding whitespace.
    pub fn parse(candidate: &str) -> Option<Self> {
        let candidate = candidate.trim();
        if candidate.len() == NPI_LENGTH && candidate.bytes().all(|b| b.is_ascii_digit()) {
            Some(Npi(candidate.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Npi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EntityCategory {
    Individual,
    Organization,
}

impl fmt::Display for EntityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityCategory::Individual => f.write_str("Individual"),
            EntityCategory::Organization => f.write_str("Organization"),
        }
    }
}

/// Flat, display-ready view of one registry record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayRecord {
    pub npi: String,
    pub name: String,
    pub entity_type: EntityCategory,
    pub sex: String,
    pub specialty: String,
    pub license: String,
    pub license_state: String,
    pub phone: String,
    pub fax: String,
    pub address: String,
    pub last_updated: String,
}

/// Maps a raw registry record onto the display schema. Pure: no I/O.
pub fn normalize(npi: &Npi, raw: &RawProviderRecord) -> DisplayRecord {
    let entity_type = classify_entity(raw.enumeration_type.as_deref());
    let basic = &raw.basic;

    let (name, sex) = match entity_type {
        EntityCategory::Individual => (
            individual_name(
                basic.name_prefix.as_deref(),
                basic.first_name.as_deref(),
                basic.middle_name.as_deref(),
                basic.last_name.as_deref(),
            ),
            map_sex(present(basic.sex.as_deref()).or(present(basic.gender.as_deref()))),
        ),
        EntityCategory::Organization => (
            or_na(basic.organization_name.as_deref()),
            NOT_AVAILABLE.to_string(),
        ),
    };

    let no_taxonomy = RawTaxonomy::default();
    let taxonomy = select_taxonomy(&raw.taxonomies).unwrap_or(&no_taxonomy);
    let no_address = RawAddress::default();
    let address = select_address(&raw.addresses).unwrap_or(&no_address);

    DisplayRecord {
        npi: npi.to_string(),
        name,
        entity_type,
        sex,
        specialty: or_na(taxonomy.desc.as_deref()),
        license: or_na(taxonomy.license.as_deref()),
        license_state: or_na(taxonomy.state.as_deref()),
        phone: or_na(address.telephone_number.as_deref()),
        fax: or_na(address.fax_number.as_deref()),
        address: format_address(address),
        last_updated: format_last_updated(basic.last_updated.as_deref()),
    }
}

pub fn classify_entity(enumeration_type: Option<&str>) -> EntityCategory {
    match enumeration_type.map(str::trim) {
        Some(ENUMERATION_TYPE_INDIVIDUAL) => EntityCategory::Individual,
        _ => EntityCategory::Organization,
    }
}

fn individual_name(
    prefix: Option<&str>,
    first: Option<&str>,
    middle: Option<&str>,
    last: Option<&str>,
) -> String {
    let (prefix, first, middle, last) = (
        present(prefix),
        present(first),
        present(middle),
        present(last),
    );
    if prefix.is_none() && first.is_none() && last.is_none() {
        return NOT_AVAILABLE.to_string();
    }
    [prefix, first, middle, last]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn map_sex(code: Option<&str>) -> String {
    match present(code) {
        Some("F") => "Female".to_string(),
        Some("M") => "Male".to_string(),
        Some(other) => other.to_string(),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// First entry matching the earliest predicate in `preferences`, else the
/// first entry overall.
fn select_preferred<'a, T>(entries: &'a [T], preferences: &[fn(&T) -> bool]) -> Option<&'a T> {
    preferences
        .iter()
        .find_map(|matches| entries.iter().find(|&entry| matches(entry)))
        .or_else(|| entries.first())
}

fn is_primary(taxonomy: &RawTaxonomy) -> bool {
    taxonomy.primary.unwrap_or(false)
}

fn is_location(address: &RawAddress) -> bool {
    has_purpose(address, ADDRESS_PURPOSE_LOCATION)
}

fn is_mailing(address: &RawAddress) -> bool {
    has_purpose(address, ADDRESS_PURPOSE_MAILING)
}

fn has_purpose(address: &RawAddress, purpose: &str) -> bool {
    address
        .address_purpose
        .as_deref()
        .map(|p| p.trim().eq_ignore_ascii_case(purpose))
        .unwrap_or(false)
}

pub fn select_taxonomy(taxonomies: &[RawTaxonomy]) -> Option<&RawTaxonomy> {
    const PREFERENCES: [fn(&RawTaxonomy) -> bool; 1] = [is_primary];
    select_preferred(taxonomies, &PREFERENCES)
}

pub fn select_address(addresses: &[RawAddress]) -> Option<&RawAddress> {
    const PREFERENCES: [fn(&RawAddress) -> bool; 2] = [is_location, is_mailing];
    select_preferred(addresses, &PREFERENCES)
}

/// Single-line postal address; requires a primary street line.
pub fn format_address(address: &RawAddress) -> String {
    let Some(street) = present(address.address_1.as_deref()) else {
        return NOT_AVAILABLE.to_string();
    };

    let mut parts = vec![street.to_string()];
    if let Some(line_2) = present(address.address_2.as_deref()) {
        parts.push(line_2.to_string());
    }
    if let Some(city) = present(address.city.as_deref()) {
        parts.push(city.to_string());
    }
    match (
        present(address.state.as_deref()),
        present(address.postal_code.as_deref()),
    ) {
        (Some(state), Some(postal)) => parts.push(format!("{state} {postal}")),
        (Some(state), None) => parts.push(state.to_string()),
        (None, Some(postal)) => parts.push(postal.to_string()),
        (None, None) => {}
    }
    parts.join(", ")
}

/// Renders the registry's last-updated stamp as e.g. "August 23, 2021".
pub fn format_last_updated(raw: Option<&str>) -> String {
    let Some(raw) = present(raw) else {
        return NOT_AVAILABLE.to_string();
    };
    match parse_registry_date(raw) {
        Some(date) => date.format("%B %-d, %Y").to_string(),
        None => raw.to_string(),
    }
}

fn parse_registry_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|dt| dt.date())
        })
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn or_na(value: Option<&str>) -> String {
    present(value).unwrap_or(NOT_AVAILABLE).to_string()
}
