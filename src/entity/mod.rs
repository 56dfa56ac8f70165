//! Entity value types
//!
//! The rest of the pipeline only sees these types; how they are pulled out
//! of the markup is the extractor's business.

/// Column order of every persisted row
pub const HEADER: [&str; 14] = [
    "id",
    "name",
    "description",
    "region",
    "municipality",
    "province",
    "affiliation",
    "representative",
    "fiscal_code",
    "subscription_date",
    "competitive_members",
    "registered_practitioners",
    "sport_events",
    "educational_events",
];

/// One row of a list page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntitySummary {
    /// Unique identifier taken from the row's detail link; never empty
    pub id: String,
    pub name: String,
    pub description: String,
    pub region: String,
    pub municipality: String,
    pub province: String,
    pub affiliation: String,
}

impl EntitySummary {
    /// Looks up a field by column name
    pub fn get(&self, column: &str) -> Option<&str> {
        let value = match column {
            "id" => &self.id,
            "name" => &self.name,
            "description" => &self.description,
            "region" => &self.region,
            "municipality" => &self.municipality,
            "province" => &self.province,
            "affiliation" => &self.affiliation,
            _ => return None,
        };
        Some(value)
    }
}

/// Attributes of a detail page
///
/// Counts are kept as the text the site renders; they are never parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityDetail {
    pub representative: String,
    pub fiscal_code: String,
    pub subscription_date: String,
    pub competitive_members: String,
    pub registered_practitioners: String,
    pub sport_events: String,
    pub educational_events: String,
}

impl EntityDetail {
    /// Looks up a field by column name
    pub fn get(&self, column: &str) -> Option<&str> {
        let value = match column {
            "representative" => &self.representative,
            "fiscal_code" => &self.fiscal_code,
            "subscription_date" => &self.subscription_date,
            "competitive_members" => &self.competitive_members,
            "registered_practitioners" => &self.registered_practitioners,
            "sport_events" => &self.sport_events,
            "educational_events" => &self.educational_events,
            _ => return None,
        };
        Some(value)
    }
}

/// A summary merged with its detail, ready to be written once
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRecord {
    summary: EntitySummary,
    detail: EntityDetail,
}

impl EntityRecord {
    /// Merges summary fields then detail fields
    pub fn merge(summary: EntitySummary, detail: EntityDetail) -> Self {
        Self { summary, detail }
    }

    pub fn id(&self) -> &str {
        &self.summary.id
    }

    /// Value of a column; on a name collision the detail value wins
    pub fn field(&self, column: &str) -> &str {
        self.detail
            .get(column)
            .or_else(|| self.summary.get(column))
            .unwrap_or_default()
    }

    /// The record's values in [`HEADER`] order
    pub fn to_row(&self) -> [&str; 14] {
        HEADER.map(|column| self.field(column))
    }
}
