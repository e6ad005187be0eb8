//! Reference timezone table
//!
//! The bundled list of timezones shown in the grid, grouped into canonical
//! UTC-offset buckets from the westernmost (-12:00) to the easternmost
//! (+14:00). The `offset` on each record is the bucket label; live offsets
//! always come from the time engine.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// A displayable timezone
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Timezone {
    /// IANA identifier, unique across the table
    pub id: String,
    /// Display label, e.g. "Eastern Time"
    pub name: String,
    pub city: String,
    pub country: String,
    /// Canonical UTC offset bucket, e.g. "-05:00"
    pub offset: String,
}

impl Timezone {
    pub fn new(id: &str, name: &str, city: &str, country: &str, offset: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            city: city.to_string(),
            country: country.to_string(),
            offset: offset.to_string(),
        }
    }

    /// Line shown under the city: the country, plus the zone name when it
    /// says something the city does not
    pub fn subtitle(&self) -> String {
        if self.name != self.city {
            format!("{} • {}", self.country, self.name)
        } else {
            self.country.clone()
        }
    }
}

/// Timezones sharing one canonical offset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimezoneGroup {
    pub offset: String,
    pub timezones: Vec<Timezone>,
}

type Row = (&'static str, &'static str, &'static str, &'static str);

const GROUPS: &[(&str, &[Row])] = &[
    ("-12:00", &[
        ("Pacific/Kwajalein", "UTC-12", "Kwajalein", "Marshall Islands"),
        ("Pacific/Wake", "UTC-12", "Wake Island", "USA"),
    ]),
    ("-11:00", &[
        ("Pacific/Midway", "UTC-11", "Midway", "USA"),
        ("Pacific/Niue", "UTC-11", "Alofi", "Niue"),
    ]),
    ("-10:00", &[
        ("Pacific/Honolulu", "Hawaii-Aleutian Time", "Honolulu", "USA"),
        ("Pacific/Tahiti", "Tahiti Time", "Papeete", "French Polynesia"),
    ]),
    ("-09:00", &[
        ("America/Anchorage", "Alaska Time", "Anchorage", "USA"),
        ("Pacific/Gambier", "Gambier Time", "Gambier", "French Polynesia"),
    ]),
    ("-08:00", &[
        ("America/Vancouver", "Pacific Time", "Vancouver", "Canada"),
        ("America/Los_Angeles", "Pacific Time", "Los Angeles", "USA"),
    ]),
    ("-07:00", &[
        ("America/Edmonton", "Mountain Time", "Edmonton", "Canada"),
        ("America/Phoenix", "Mountain Time", "Phoenix", "USA"),
    ]),
    ("-06:00", &[
        ("America/Winnipeg", "Central Time", "Winnipeg", "Canada"),
        ("America/Chicago", "Central Time", "Chicago", "USA"),
    ]),
    ("-05:00", &[
        ("America/Toronto", "Eastern Time", "Toronto", "Canada"),
        ("America/New_York", "Eastern Time", "New York", "USA"),
    ]),
    ("-04:00", &[
        ("America/Halifax", "Atlantic Time", "Halifax", "Canada"),
        ("America/Caracas", "Venezuela Time", "Caracas", "Venezuela"),
    ]),
    ("-03:30", &[
        ("America/St_Johns", "Newfoundland Time", "St. John's", "Canada"),
        ("America/Goose_Bay", "Newfoundland Time", "Goose Bay", "Canada"),
    ]),
    ("-03:00", &[
        ("America/Sao_Paulo", "Brasília Time", "São Paulo", "Brazil"),
        ("America/Argentina/Buenos_Aires", "Argentina Time", "Buenos Aires", "Argentina"),
    ]),
    ("-02:00", &[
        ("America/Noronha", "Fernando de Noronha Time", "Fernando de Noronha", "Brazil"),
        ("Atlantic/South_Georgia", "South Georgia Time", "Grytviken", "South Georgia"),
    ]),
    ("-01:00", &[
        ("Atlantic/Azores", "Azores Time", "Ponta Delgada", "Portugal"),
        ("Atlantic/Cape_Verde", "Cape Verde Time", "Praia", "Cape Verde"),
    ]),
    ("+00:00", &[
        ("Europe/London", "Greenwich Mean Time", "London", "UK"),
        ("Africa/Accra", "Greenwich Mean Time", "Accra", "Ghana"),
    ]),
    ("+01:00", &[
        ("Europe/Paris", "Central European Time", "Paris", "France"),
        ("Europe/Berlin", "Central European Time", "Berlin", "Germany"),
    ]),
    ("+02:00", &[
        ("Europe/Sofia", "Eastern European Time", "Sofia", "Bulgaria"),
        ("Africa/Cairo", "Eastern European Time", "Cairo", "Egypt"),
    ]),
    ("+03:00", &[
        ("Asia/Istanbul", "Turkey Time", "Istanbul", "Turkey"),
        ("Europe/Moscow", "Moscow Time", "Moscow", "Russia"),
    ]),
    ("+04:00", &[
        ("Asia/Tbilisi", "Georgia Time", "Tbilisi", "Georgia"),
        ("Asia/Dubai", "Gulf Standard Time", "Dubai", "UAE"),
    ]),
    ("+04:30", &[
        ("Asia/Kabul", "Afghanistan Time", "Kabul", "Afghanistan"),
        ("Asia/Tehran", "Iran Standard Time", "Tehran", "Iran"),
    ]),
    ("+05:00", &[
        ("Asia/Karachi", "Pakistan Standard Time", "Karachi", "Pakistan"),
        ("Asia/Tashkent", "Uzbekistan Time", "Tashkent", "Uzbekistan"),
    ]),
    ("+05:30", &[
        ("Asia/Kolkata", "India Standard Time", "Mumbai", "India"),
        ("Asia/Colombo", "Sri Lanka Time", "Colombo", "Sri Lanka"),
    ]),
    ("+06:00", &[
        ("Asia/Dhaka", "Bangladesh Standard Time", "Dhaka", "Bangladesh"),
        ("Asia/Almaty", "Kazakhstan Time", "Almaty", "Kazakhstan"),
    ]),
    ("+06:30", &[
        ("Asia/Yangon", "Myanmar Time", "Yangon", "Myanmar"),
        ("Indian/Cocos", "Cocos Islands Time", "West Island", "Cocos Islands"),
    ]),
    ("+07:00", &[
        ("Asia/Bangkok", "Indochina Time", "Bangkok", "Thailand"),
        ("Asia/Jakarta", "Western Indonesia Time", "Jakarta", "Indonesia"),
    ]),
    ("+08:00", &[
        ("Asia/Shanghai", "China Standard Time", "Shanghai", "China"),
        ("Australia/Perth", "Australian Western Time", "Perth", "Australia"),
    ]),
    ("+08:45", &[
        ("Australia/Eucla", "Australian Central Western Time", "Eucla", "Australia"),
    ]),
    ("+09:00", &[
        ("Asia/Tokyo", "Japan Standard Time", "Tokyo", "Japan"),
        ("Asia/Seoul", "Korea Standard Time", "Seoul", "South Korea"),
    ]),
    ("+09:30", &[
        ("Australia/Adelaide", "Australian Central Time", "Adelaide", "Australia"),
        ("Australia/Darwin", "Australian Central Time", "Darwin", "Australia"),
    ]),
    ("+10:00", &[
        ("Australia/Sydney", "Australian Eastern Time", "Sydney", "Australia"),
        ("Pacific/Port_Moresby", "Papua New Guinea Time", "Port Moresby", "Papua New Guinea"),
    ]),
    ("+10:30", &[
        ("Australia/Lord_Howe", "Lord Howe Time", "Lord Howe Island", "Australia"),
    ]),
    ("+11:00", &[
        ("Pacific/Guadalcanal", "Solomon Islands Time", "Honiara", "Solomon Islands"),
        ("Pacific/Noumea", "New Caledonia Time", "Nouméa", "New Caledonia"),
    ]),
    ("+12:00", &[
        ("Pacific/Auckland", "New Zealand Time", "Auckland", "New Zealand"),
        ("Pacific/Fiji", "Fiji Time", "Suva", "Fiji"),
    ]),
    ("+12:45", &[
        ("Pacific/Chatham", "Chatham Islands Time", "Waitangi", "New Zealand"),
    ]),
    ("+13:00", &[
        ("Pacific/Tongatapu", "Tonga Time", "Nukuʻalofa", "Tonga"),
        ("Pacific/Apia", "Samoa Time", "Apia", "Samoa"),
    ]),
    ("+14:00", &[
        ("Pacific/Kiritimati", "Line Islands Time", "Kiritimati", "Kiribati"),
        ("Pacific/Enderbury", "Phoenix Islands Time", "Enderbury", "Kiribati"),
    ]),
];

/// All offset groups, westernmost first
pub fn timezone_groups() -> &'static [TimezoneGroup] {
    static TABLE: OnceLock<Vec<TimezoneGroup>> = OnceLock::new();
    TABLE.get_or_init(|| {
        GROUPS
            .iter()
            .map(|(offset, rows)| TimezoneGroup {
                offset: offset.to_string(),
                timezones: rows
                    .iter()
                    .map(|(id, name, city, country)| {
                        Timezone::new(id, name, city, country, offset)
                    })
                    .collect(),
            })
            .collect()
    })
}

/// Every reference timezone in grid order
pub fn all_timezones() -> impl Iterator<Item = &'static Timezone> {
    timezone_groups().iter().flat_map(|g| g.timezones.iter())
}

/// Look up a reference timezone by IANA identifier
pub fn find_timezone(id: &str) -> Option<&'static Timezone> {
    all_timezones().find(|tz| tz.id == id)
}

/// Search by identifier, city or country (case-insensitive partial match)
pub fn search_timezones(query: &str) -> Vec<&'static Timezone> {
    let query_lower = query.to_lowercase();
    all_timezones()
        .filter(|tz| {
            tz.id.to_lowercase().contains(&query_lower)
                || tz.city.to_lowercase().contains(&query_lower)
                || tz.country.to_lowercase().contains(&query_lower)
        })
        .collect()
}
