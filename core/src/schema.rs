use std::fmt;

use serde::{
    de::{self, MapAccess, Visitor},
    Deserialize, Deserializer, Serialize, Serializer,
};

/// Property types that carry a list of options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Status,
    Select,
    MultiSelect,
}

impl OptionKind {
    pub fn from_type(kind: &str) -> Option<Self> {
        match kind {
            "status" => Some(Self::Status),
            "select" => Some(Self::Select),
            "multi_select" => Some(Self::MultiSelect),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Select => "select",
            Self::MultiSelect => "multi_select",
        }
    }
}

/// Database metadata as returned by `GET /databases/{id}`.
///
/// `properties` keeps the order in which the API listed them; auto-detection
/// scans in that order.
#[derive(Deserialize, Debug, Clone)]
pub struct Database {
    #[serde(default)]
    pub title: Vec<RichText>,
    #[serde(default, deserialize_with = "ordered_properties")]
    pub properties: Vec<Property>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct RichText {
    #[serde(default)]
    pub plain_text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub kind: String,
    /// `None` for property types without options.
    pub options: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct RawProperty {
    #[serde(rename = "type")]
    kind: String,
    status: Option<RawOptions>,
    select: Option<RawOptions>,
    multi_select: Option<RawOptions>,
}

#[derive(Deserialize)]
struct RawOptions {
    #[serde(default)]
    options: Vec<RawOption>,
}

#[derive(Deserialize)]
struct RawOption {
    #[serde(default)]
    name: Option<String>,
}

impl Property {
    fn from_raw(name: String, raw: RawProperty) -> Self {
        let listed = match OptionKind::from_type(&raw.kind) {
            Some(OptionKind::Status) => Some(raw.status),
            Some(OptionKind::Select) => Some(raw.select),
            Some(OptionKind::MultiSelect) => Some(raw.multi_select),
            None => None,
        };

        let options = listed.map(|list| {
            list.map(|l| l.options)
                .unwrap_or_default()
                .into_iter()
                .map(|o| o.name.unwrap_or_default())
                .collect()
        });

        Self {
            name,
            kind: raw.kind,
            options,
        }
    }

    pub fn option_kind(&self) -> Option<OptionKind> {
        OptionKind::from_type(&self.kind)
    }
}

fn ordered_properties<'de, D>(deserializer: D) -> Result<Vec<Property>, D::Error>
where
    D: Deserializer<'de>,
{
    struct PropertiesVisitor;

    impl<'de> Visitor<'de> for PropertiesVisitor {
        type Value = Vec<Property>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map of database properties")
        }

        fn visit_map<M>(self, mut map: M) -> Result<Self::Value, M::Error>
        where
            M: MapAccess<'de>,
        {
            let mut properties = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((name, raw)) = map.next_entry::<String, RawProperty>()? {
                properties.push(Property::from_raw(name, raw));
            }
            Ok(properties)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(PropertiesVisitor)
}

pub const SCHEMA_HINT: &str =
    "Find the property that holds the finished option, then set COUNT_PROPERTY and COUNT_MODE to match it.";

/// The `?debug` payload: every property with its type and, for option-bearing
/// types, the option names.
#[derive(Serialize, Debug, Clone)]
pub struct SchemaReport {
    pub database_title: String,
    #[serde(serialize_with = "properties_as_map")]
    pub properties: Vec<Property>,
    pub hint: &'static str,
}

#[derive(Serialize)]
struct PropertySummary<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<&'a [String]>,
}

fn properties_as_map<S>(properties: &[Property], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_map(properties.iter().map(|p| {
        (
            p.name.as_str(),
            PropertySummary {
                kind: &p.kind,
                options: p.options.as_deref(),
            },
        )
    }))
}

impl Database {
    pub fn title(&self) -> &str {
        match self.title.first().map(|t| t.plain_text.as_str()) {
            Some(title) if !title.is_empty() => title,
            _ => "(untitled)",
        }
    }

    pub fn into_report(self) -> SchemaReport {
        SchemaReport {
            database_title: self.title().to_string(),
            properties: self.properties,
            hint: SCHEMA_HINT,
        }
    }
}
