use serde::{Serialize, Serializer};
use serde_json::{json, Value};

use crate::schema::OptionKind;

/// A Notion query filter selecting the records to count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterSpec {
    StatusEquals { property: String, option: String },
    SelectEquals { property: String, option: String },
    MultiSelectContains { property: String, option: String },
    RichTextStartsWith { property: String, prefix: String },
    /// Matches when a `select` property equals any of the listed options.
    AnySelect { property: String, options: Vec<String> },
}

impl FilterSpec {
    pub fn for_option(kind: OptionKind, property: impl Into<String>, option: impl Into<String>) -> Self {
        let property = property.into();
        let option = option.into();
        match kind {
            OptionKind::Status => Self::StatusEquals { property, option },
            OptionKind::Select => Self::SelectEquals { property, option },
            OptionKind::MultiSelect => Self::MultiSelectContains { property, option },
        }
    }

    pub fn property(&self) -> &str {
        match self {
            Self::StatusEquals { property, .. }
            | Self::SelectEquals { property, .. }
            | Self::MultiSelectContains { property, .. }
            | Self::RichTextStartsWith { property, .. }
            | Self::AnySelect { property, .. } => property,
        }
    }

    /// Notion type name of the filtered property.
    pub fn property_type(&self) -> &'static str {
        match self {
            Self::StatusEquals { .. } => "status",
            Self::SelectEquals { .. } | Self::AnySelect { .. } => "select",
            Self::MultiSelectContains { .. } => "multi_select",
            Self::RichTextStartsWith { .. } => "rich_text",
        }
    }

    /// The single option matched, if the filter has exactly one.
    pub fn option(&self) -> Option<&str> {
        match self {
            Self::StatusEquals { option, .. }
            | Self::SelectEquals { option, .. }
            | Self::MultiSelectContains { option, .. } => Some(option),
            Self::RichTextStartsWith { .. } | Self::AnySelect { .. } => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::StatusEquals { property, option } => {
                json!({ "property": property, "status": { "equals": option } })
            }
            Self::SelectEquals { property, option } => {
                json!({ "property": property, "select": { "equals": option } })
            }
            Self::MultiSelectContains { property, option } => {
                json!({ "property": property, "multi_select": { "contains": option } })
            }
            Self::RichTextStartsWith { property, prefix } => {
                json!({ "property": property, "rich_text": { "starts_with": prefix } })
            }
            Self::AnySelect { property, options } => {
                let clauses: Vec<Value> = options
                    .iter()
                    .map(|option| json!({ "property": property, "select": { "equals": option } }))
                    .collect();
                json!({ "or": clauses })
            }
        }
    }
}

impl Serialize for FilterSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}
