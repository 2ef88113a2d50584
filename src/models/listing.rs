//! Listing query parameters, validated at the HTTP boundary.

use crate::errors::GatewayError;
use serde::Deserialize;
use std::str::FromStr;

/// Field a listing may be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    #[default]
    None,
    CreatedTime,
    Size,
}

impl FromStr for SortBy {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" | "" => Ok(Self::None),
            "createdTime" => Ok(Self::CreatedTime),
            "size" => Ok(Self::Size),
            other => Err(GatewayError::validation(format!(
                "unrecognized sortBy `{other}`, expected none|createdTime|size"
            ))),
        }
    }
}

/// Direction of an ordered listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" | "" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(GatewayError::validation(format!(
                "unrecognized sortOrder `{other}`, expected asc|desc"
            ))),
        }
    }
}

/// Raw query parameters of `GET /files` before validation.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingParams {
    pub folder_id: Option<String>,
    pub keyword: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

/// Validated listing request handed to the catalog service.
#[derive(Debug, Clone)]
pub struct ListingQuery {
    /// Parent folder the listing is scoped under.
    pub parent_id: String,

    /// Case-insensitive name filter; empty means no filtering.
    pub keyword: Option<String>,

    pub sort_by: SortBy,
    pub sort_order: SortOrder,
}

impl ListingQuery {
    /// Validate raw query parameters, falling back to `default_parent` when
    /// no folder id was supplied. Unrecognized sort values are rejected
    /// rather than silently ignored.
    pub fn from_params(params: ListingParams, default_parent: &str) -> Result<Self, GatewayError> {
        let parent_id = match params.folder_id {
            Some(id) => {
                ensure_identifier(&id, "folderId")?;
                id
            }
            None => default_parent.to_string(),
        };

        let sort_by = params.sort_by.as_deref().unwrap_or("none").parse()?;
        let sort_order = params.sort_order.as_deref().unwrap_or("asc").parse()?;

        let keyword = params.keyword.filter(|k| !k.trim().is_empty());

        Ok(Self {
            parent_id,
            keyword,
            sort_by,
            sort_order,
        })
    }
}

/// Provider ids are opaque but always URL-safe. Rejecting anything else
/// keeps malformed input out of the provider query expression.
pub fn ensure_identifier(value: &str, field: &str) -> Result<(), GatewayError> {
    if value.is_empty() {
        return Err(GatewayError::validation(format!("{field} must not be empty")));
    }
    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(GatewayError::validation(format!(
            "{field} is not a valid identifier"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_values_parse() {
        assert_eq!("createdTime".parse::<SortBy>().unwrap(), SortBy::CreatedTime);
        assert_eq!("size".parse::<SortBy>().unwrap(), SortBy::Size);
        assert_eq!("none".parse::<SortBy>().unwrap(), SortBy::None);
        assert_eq!("desc".parse::<SortOrder>().unwrap(), SortOrder::Desc);
    }

    #[test]
    fn unrecognized_sort_values_are_rejected() {
        assert!("name".parse::<SortBy>().is_err());
        assert!("descending".parse::<SortOrder>().is_err());
    }

    #[test]
    fn missing_folder_id_falls_back_to_default() {
        let query = ListingQuery::from_params(ListingParams::default(), "root123").unwrap();
        assert_eq!(query.parent_id, "root123");
        assert_eq!(query.sort_by, SortBy::None);
        assert_eq!(query.sort_order, SortOrder::Asc);
    }

    #[test]
    fn malformed_folder_id_is_a_validation_error() {
        let params = ListingParams {
            folder_id: Some("abc' or trashed = true".into()),
            ..Default::default()
        };
        assert!(ListingQuery::from_params(params, "root").is_err());
    }

    #[test]
    fn blank_keyword_is_dropped() {
        let params = ListingParams {
            keyword: Some("   ".into()),
            ..Default::default()
        };
        let query = ListingQuery::from_params(params, "root").unwrap();
        assert!(query.keyword.is_none());
    }
}
