use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CivicError;

/// Review status of a property application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Submitted,
    UnderReview,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    /// Terminal statuses stamp the completion date.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::UnderReview => "under_review",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl std::str::FromStr for ApplicationStatus {
    type Err = CivicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "submitted" => Ok(Self::Submitted),
            "under_review" => Ok(Self::UnderReview),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(CivicError::InvalidStatus(other.to_string())),
        }
    }
}

/// Kind of property an application concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    Residential,
    Commercial,
    Industrial,
}

/// A citizen-submitted property application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
    pub id: Uuid,
    pub reference_number: String,

    // Personal information
    pub full_name: String,
    pub id_number: String,
    pub phone_number: String,
    pub email: Option<String>,

    // Property information
    pub property_address: String,
    pub stand_number: String,
    pub property_type: PropertyType,
    pub reason: String,
    #[serde(default)]
    pub documents: Vec<String>,

    // Review state
    pub status: ApplicationStatus,
    pub submitted_date: DateTime<Utc>,
    pub review_date: Option<DateTime<Utc>>,
    pub completed_date: Option<DateTime<Utc>>,
    pub admin_notes: Option<String>,
    pub reviewed_by: Option<String>,
}

/// Intake payload for a new application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewApplication {
    pub full_name: String,
    pub id_number: String,
    pub phone_number: String,
    #[serde(default)]
    pub email: Option<String>,
    pub property_address: String,
    pub stand_number: String,
    pub property_type: PropertyType,
    pub reason: String,
    #[serde(default)]
    pub documents: Vec<String>,
}

impl NewApplication {
    /// Required fields must be non-empty before an application is stored.
    pub fn validate(&self) -> Result<(), CivicError> {
        let required = [
            ("full_name", &self.full_name),
            ("id_number", &self.id_number),
            ("phone_number", &self.phone_number),
            ("property_address", &self.property_address),
            ("stand_number", &self.stand_number),
            ("reason", &self.reason),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(CivicError::Validation(format!("{field} must not be empty")));
            }
        }
        Ok(())
    }
}

/// Per-status counts for the admin dashboard.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApplicationStatistics {
    pub total: usize,
    pub submitted: usize,
    pub under_review: usize,
    pub approved: usize,
    pub rejected: usize,
    pub pending: usize,
}
