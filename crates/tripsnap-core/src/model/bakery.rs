use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Keywords arrive either as a list or as one comma/hash separated string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Keywords {
    List(Vec<String>),
    Text(String),
}

impl Keywords {
    pub fn as_list(&self) -> Vec<String> {
        match self {
            Self::List(items) => items.clone(),
            Self::Text(text) => text
                .split([',', '#'])
                .map(str::trim)
                .filter(|keyword| !keyword.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

/// A bakery record, full (detail endpoint) or partial (list, search, chat results).
///
/// Every field but `id` is optional so a partial record can be merged into a
/// fuller one without erasing what is already known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Bakery {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub road_address: Option<String>,
    #[serde(default)]
    pub jibun_address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub operating_hours: Option<String>,
    #[serde(default)]
    pub keywords: Option<Keywords>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub rate: Option<f64>,
    #[serde(default)]
    pub like_count: Option<u64>,
    #[serde(default)]
    pub is_liked: Option<bool>,
    #[serde(default)]
    pub comment_count: Option<u64>,
    #[serde(default)]
    pub url: Option<String>,
    /// Fields this client does not model (per-day hours, scores, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Bakery {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Shallow merge: every field present in `newer` overwrites ours.
    pub fn merge(&mut self, newer: Bakery) {
        fn take<T>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }

        take(&mut self.name, newer.name);
        take(&mut self.latitude, newer.latitude);
        take(&mut self.longitude, newer.longitude);
        take(&mut self.road_address, newer.road_address);
        take(&mut self.jibun_address, newer.jibun_address);
        take(&mut self.phone, newer.phone);
        take(&mut self.operating_hours, newer.operating_hours);
        take(&mut self.keywords, newer.keywords);
        take(&mut self.rate, newer.rate);
        take(&mut self.like_count, newer.like_count);
        take(&mut self.is_liked, newer.is_liked);
        take(&mut self.comment_count, newer.comment_count);
        take(&mut self.url, newer.url);
        self.extra.extend(newer.extra);
    }

    /// Coordinates plus at least one address: enough for the map view.
    pub fn has_location(&self) -> bool {
        let has_address = [&self.road_address, &self.jibun_address]
            .iter()
            .any(|address| address.as_deref().is_some_and(|a| !a.trim().is_empty()));
        self.latitude.is_some() && self.longitude.is_some() && has_address
    }

    pub fn display_address(&self) -> Option<&str> {
        self.road_address
            .as_deref()
            .filter(|a| !a.trim().is_empty())
            .or(self.jibun_address.as_deref())
    }
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text.trim().parse().ok(),
        _ => None,
    })
}
