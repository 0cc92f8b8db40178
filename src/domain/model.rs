use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};

/// Point-in-time weather reading, passed through from the provider as-is.
///
/// Numbers keep the provider's own representation and any field not named here
/// lands in `extra`, so a stored snapshot serializes back to what was received.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observation_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_code: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_icons: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_descriptions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_speed: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_degree: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precip: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloudcover: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feelslike: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uv_index: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_day: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Location block of a weather response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherLocation {
    pub name: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub lat: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub lon: Option<f64>,
}

/// Successful weather lookup: current conditions plus resolved location.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub current: Option<WeatherSnapshot>,
    pub location: Option<WeatherLocation>,
}

impl WeatherReport {
    pub fn coordinates(&self) -> (Option<f64>, Option<f64>) {
        match &self.location {
            Some(location) => (location.lat, location.lon),
            None => (None, None),
        }
    }
}

// The provider reports coordinates as strings ("40.714"); accept numbers too.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

/// A persisted property row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: String,
    pub city: String,
    pub street: String,
    pub state: String,
    #[serde(rename = "zipCode")]
    pub zip_code: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub long: Option<f64>,
    #[serde(rename = "weatherData", default)]
    pub weather_data: Option<WeatherSnapshot>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePropertyInput {
    pub city: String,
    pub street: String,
    pub state: String,
    #[serde(rename = "zipCode")]
    pub zip_code: String,
}

impl CreatePropertyInput {
    /// Free-text query handed to the weather provider.
    pub fn location_query(&self) -> String {
        format!(
            "{}, {}, {}, United States",
            self.city, self.state, self.zip_code
        )
    }
}

/// Record sent to the store on insert; `id` and `created_at` are assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewProperty {
    pub city: String,
    pub street: String,
    pub state: String,
    #[serde(rename = "zipCode")]
    pub zip_code: String,
    #[serde(rename = "weatherData", skip_serializing_if = "Option::is_none")]
    pub weather_data: Option<WeatherSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long: Option<f64>,
}

impl NewProperty {
    pub fn from_lookup(input: CreatePropertyInput, report: WeatherReport) -> Self {
        let (lat, long) = report.coordinates();
        Self {
            city: input.city,
            street: input.street,
            state: input.state,
            zip_code: input.zip_code,
            weather_data: report.current,
            lat,
            long,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// `"asc"` / `"desc"` in any case; every other token means "no sort".
    pub fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "asc" => Some(SortDirection::Ascending),
            "desc" => Some(SortDirection::Descending),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }
}

/// Optional case-insensitive substring predicates, combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyFilter {
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
}

impl PropertyFilter {
    /// Empty strings impose no constraint.
    pub fn from_args(
        city: Option<String>,
        state: Option<String>,
        zip_code: Option<String>,
    ) -> Self {
        let keep = |v: Option<String>| v.filter(|s| !s.is_empty());
        Self {
            city: keep(city),
            state: keep(state),
            zip_code: keep(zip_code),
        }
    }

    /// `(column, value)` pairs for every supplied predicate, using store column names.
    pub fn predicates(&self) -> Vec<(&'static str, &str)> {
        let mut predicates = Vec::new();
        if let Some(city) = &self.city {
            predicates.push(("city", city.as_str()));
        }
        if let Some(state) = &self.state {
            predicates.push(("state", state.as_str()));
        }
        if let Some(zip_code) = &self.zip_code {
            predicates.push(("zipCode", zip_code.as_str()));
        }
        predicates
    }

    pub fn is_empty(&self) -> bool {
        self.city.is_none() && self.state.is_none() && self.zip_code.is_none()
    }

    /// In-process equivalent of the store's `ILIKE '%value%'` comparison.
    pub fn matches(&self, property: &Property) -> bool {
        fn contains(haystack: &str, needle: &Option<String>) -> bool {
            needle
                .as_ref()
                .map(|n| haystack.to_lowercase().contains(&n.to_lowercase()))
                .unwrap_or(true)
        }

        contains(&property.city, &self.city)
            && contains(&property.state, &self.state)
            && contains(&property.zip_code, &self.zip_code)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyQuery {
    pub filter: PropertyFilter,
    pub sort: Option<SortDirection>,
}

impl PropertyQuery {
    pub fn new(filter: PropertyFilter, sort: Option<SortDirection>) -> Self {
        Self { filter, sort }
    }

    /// Build from raw request arguments; an unrecognised sort token is dropped.
    pub fn from_args(
        city: Option<String>,
        state: Option<String>,
        zip_code: Option<String>,
        sort: Option<&str>,
    ) -> Self {
        Self {
            filter: PropertyFilter::from_args(city, state, zip_code),
            sort: sort.and_then(SortDirection::parse),
        }
    }
}
