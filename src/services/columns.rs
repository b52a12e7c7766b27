//! Materials table columns and cell display text.

use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

use super::material::Material;

/// `Jan 5, 2025`
const DATE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[month repr:short] [day padding:none], [year]");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDef {
    /// Material field the column reads, or `actions` for the row menu.
    pub accessor_key: &'static str,
    pub header: Option<&'static str>,
    pub align: Align,
}

pub const COLUMNS: &[ColumnDef] = &[
    ColumnDef { accessor_key: "title", header: Some("Title"), align: Align::Left },
    ColumnDef { accessor_key: "isActive", header: Some("Status"), align: Align::Center },
    ColumnDef { accessor_key: "creatorEmail", header: Some("Created By"), align: Align::Left },
    ColumnDef { accessor_key: "createdAt", header: Some("Created At"), align: Align::Center },
    ColumnDef { accessor_key: "updatedAt", header: Some("Updated At"), align: Align::Center },
    ColumnDef { accessor_key: "actions", header: None, align: Align::Left },
];

/// Display text for one table row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialCells {
    pub id: i64,
    pub title: String,
    pub status: &'static str,
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
}

#[must_use]
pub fn status_label(is_active: bool) -> &'static str {
    if is_active { "Active" } else { "Inactive" }
}

#[must_use]
pub fn format_date(date: Option<OffsetDateTime>) -> String {
    date.and_then(|d| d.format(DATE_FORMAT).ok())
        .unwrap_or_else(|| "N/A".to_owned())
}

#[must_use]
pub fn render_cells(material: &Material) -> MaterialCells {
    MaterialCells {
        id: material.id,
        title: material.title.clone(),
        status: status_label(material.is_active),
        created_by: material
            .creator_email
            .clone()
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| "Unknown".to_owned()),
        created_at: format_date(material.created_at),
        updated_at: format_date(material.updated_at),
    }
}

#[cfg(test)]
#[path = "columns_test.rs"]
mod tests;
