//! Domain entities: menu records and their field types

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::error::DomainError;

/// Prefix carried by ids that have not been persisted yet.
pub const TEMP_ID_PREFIX: &str = "tmp-";

/// Opaque identifier of a menu entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh locally generated id, replaced by a permanent one on save.
    pub fn temporary() -> Self {
        Self(format!("{}{}", TEMP_ID_PREFIX, Uuid::new_v4()))
    }

    pub fn is_temporary(&self) -> bool {
        self.0.starts_with(TEMP_ID_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Where a link opens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkTarget {
    #[default]
    SameWindow,
    NewWindow,
}

impl LinkTarget {
    pub fn as_str(self) -> &'static str {
        match self {
            LinkTarget::SameWindow => "same-window",
            LinkTarget::NewWindow => "new-window",
        }
    }
}

impl fmt::Display for LinkTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LinkTarget {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "same-window" | "_self" => Ok(LinkTarget::SameWindow),
            "new-window" | "_blank" => Ok(LinkTarget::NewWindow),
            other => Err(DomainError::InvalidLinkTarget(other.to_string())),
        }
    }
}

/// One navigation entry in its flat, persisted shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: ItemId,
    pub label: String,
    pub link: String,
    #[serde(default)]
    pub link_target: LinkTarget,
    #[serde(default)]
    pub position: usize,
    #[serde(default)]
    pub parent_id: Option<ItemId>,
}

/// A menu entry with its children embedded, as used for editing and display.
///
/// Flat records deserialize into this shape too, with `children` empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NestedItem {
    #[serde(flatten)]
    pub item: MenuItem,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NestedItem>,
}

impl NestedItem {
    pub fn leaf(item: MenuItem) -> Self {
        Self {
            item,
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> &ItemId {
        &self.item.id
    }
}

impl From<MenuItem> for NestedItem {
    fn from(item: MenuItem) -> Self {
        Self::leaf(item)
    }
}

/// Defaults applied to newly created entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemDefaults {
    pub label: String,
    pub link: String,
    pub link_target: LinkTarget,
}

impl Default for ItemDefaults {
    fn default() -> Self {
        Self {
            label: "New Item".to_string(),
            link: "/".to_string(),
            link_target: LinkTarget::SameWindow,
        }
    }
}

impl ItemDefaults {
    /// Build a record with a fresh temporary id.
    pub fn instantiate(&self) -> MenuItem {
        MenuItem {
            id: ItemId::temporary(),
            label: self.label.clone(),
            link: self.link.clone(),
            link_target: self.link_target,
            position: 0,
            parent_id: None,
        }
    }
}

/// A single editable field together with its new value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuField {
    Label(String),
    Link(String),
    LinkTarget(LinkTarget),
}

impl MenuField {
    /// Parse a textual `(field, value)` pair, e.g. `("linkTarget", "new-window")`.
    pub fn parse(name: &str, value: &str) -> Result<Self, DomainError> {
        match name {
            "label" => Ok(MenuField::Label(value.to_string())),
            "link" => Ok(MenuField::Link(value.to_string())),
            "linkTarget" | "link-target" | "link_target" => {
                Ok(MenuField::LinkTarget(value.parse()?))
            }
            other => Err(DomainError::InvalidField(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            MenuField::Label(_) => "label",
            MenuField::Link(_) => "link",
            MenuField::LinkTarget(_) => "linkTarget",
        }
    }

    pub(crate) fn apply(self, item: &mut MenuItem) {
        match self {
            MenuField::Label(v) => item.label = v,
            MenuField::Link(v) => item.link = v,
            MenuField::LinkTarget(v) => item.link_target = v,
        }
    }
}

/// Expand environment variables in a path string.
///
/// Supports `$VAR`, `${VAR}` and `~`.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}
