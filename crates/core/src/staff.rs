//! Staff members and their station assignment.

use serde::{Deserialize, Serialize};

use crate::table::TableRow;
use crate::types::{deserialize_id, deserialize_optional_id, EntityId};

/// A staff user as returned by the staff and user endpoints.
///
/// `station_id` is the only discriminator between assigned and unassigned
/// staff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffMember {
    #[serde(alias = "_id", deserialize_with = "deserialize_id")]
    pub id: EntityId,
    #[serde(alias = "full_name", default)]
    pub full_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(
        default,
        alias = "station_id",
        deserialize_with = "deserialize_optional_id"
    )]
    pub station_id: Option<EntityId>,
}

impl StaffMember {
    pub fn is_assigned(&self) -> bool {
        self.station_id.is_some()
    }

    /// Name for notices, falling back to the email and then the id.
    pub fn display_name(&self) -> &str {
        if !self.full_name.trim().is_empty() {
            return &self.full_name;
        }
        self.email.as_deref().unwrap_or(&self.id)
    }
}

impl TableRow for StaffMember {
    fn row_id(&self) -> Option<String> {
        Some(self.id.clone()).filter(|id| !id.is_empty())
    }
}
