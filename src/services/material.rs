//! Material view model and the row → view mapping.

use serde::Serialize;
use time::OffsetDateTime;

use crate::supabase::types::MaterialRow;

/// Material as exposed to pages, keyed by table column accessors.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub id: i64,
    pub title: String,
    pub is_active: bool,
    pub creator_email: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

#[must_use]
pub fn to_material(row: MaterialRow) -> Material {
    Material {
        id: row.id,
        title: row.title,
        is_active: row.is_active,
        creator_email: row.profile.and_then(|p| p.email),
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

/// Parse a material id submitted by a form.
#[must_use]
pub fn parse_material_id(raw: Option<&str>) -> Option<i64> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse().ok())
}
