use chrono::{Datelike, Utc};
use dashmap::DashMap;
use rand::Rng;
use uuid::Uuid;

use civicledger_types::{
    Admin, Application, ApplicationStatistics, ApplicationStatus, CivicError, NewApplication,
    Result,
};

/// In-memory application and admin store.
///
/// Data lives for the process lifetime, matching the ledger's retention.
pub struct MemStorage {
    applications: DashMap<Uuid, Application>,
    admins: DashMap<Uuid, Admin>,
}

impl MemStorage {
    /// Create a store seeded with the default administrator account.
    pub fn new() -> Self {
        let storage = Self {
            applications: DashMap::new(),
            admins: DashMap::new(),
        };
        let password = std::env::var("CIVICLEDGER_ADMIN_PASSWORD")
            .unwrap_or_else(|_| "admin123".to_string());
        storage.create_admin("admin", &password, "System Administrator");
        storage
    }

    pub fn create_admin(&self, username: &str, password: &str, full_name: &str) -> Admin {
        let admin = Admin {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password: password.to_string(),
            full_name: full_name.to_string(),
            created_at: Utc::now(),
        };
        self.admins.insert(admin.id, admin.clone());
        admin
    }

    pub fn get_admin_by_username(&self, username: &str) -> Option<Admin> {
        self.admins
            .iter()
            .find(|entry| entry.username == username)
            .map(|entry| entry.clone())
    }

    /// Validate and store a new application under a fresh reference number.
    pub fn create_application(&self, intake: NewApplication) -> Result<Application> {
        intake.validate()?;

        let reference_number = format!(
            "RCC-{}-{:06}",
            Utc::now().year(),
            rand::thread_rng().gen_range(100_000..1_000_000)
        );
        let application = Application {
            id: Uuid::new_v4(),
            reference_number,
            full_name: intake.full_name,
            id_number: intake.id_number,
            phone_number: intake.phone_number,
            email: intake.email,
            property_address: intake.property_address,
            stand_number: intake.stand_number,
            property_type: intake.property_type,
            reason: intake.reason,
            documents: intake.documents,
            status: ApplicationStatus::Submitted,
            submitted_date: Utc::now(),
            review_date: None,
            completed_date: None,
            admin_notes: None,
            reviewed_by: None,
        };
        self.applications
            .insert(application.id, application.clone());
        Ok(application)
    }

    pub fn get_application(&self, id: Uuid) -> Option<Application> {
        self.applications.get(&id).map(|entry| entry.clone())
    }

    pub fn get_application_by_reference(&self, reference_number: &str) -> Option<Application> {
        self.applications
            .iter()
            .find(|entry| entry.reference_number == reference_number)
            .map(|entry| entry.clone())
    }

    /// All applications, newest submission first.
    pub fn all_applications(&self) -> Vec<Application> {
        let mut applications: Vec<Application> = self
            .applications
            .iter()
            .map(|entry| entry.clone())
            .collect();
        applications.sort_by(|a, b| b.submitted_date.cmp(&a.submitted_date));
        applications
    }

    /// Move an application through the review workflow, stamping review and
    /// completion dates.
    pub fn update_application_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
        reviewed_by: Option<&str>,
        admin_notes: Option<&str>,
    ) -> Result<Application> {
        let mut entry = self
            .applications
            .get_mut(&id)
            .ok_or_else(|| CivicError::ApplicationNotFound(id.to_string()))?;

        let now = Utc::now();
        entry.status = status;
        if let Some(reviewer) = reviewed_by {
            entry.reviewed_by = Some(reviewer.to_string());
        }
        if let Some(notes) = admin_notes {
            entry.admin_notes = Some(notes.to_string());
        }
        entry.review_date.get_or_insert(now);
        if status.is_terminal() {
            entry.completed_date = Some(now);
        }
        Ok(entry.clone())
    }

    /// Attach uploaded document references to an existing application.
    pub fn attach_documents(&self, id: Uuid, documents: &[String]) -> Result<Application> {
        let mut entry = self
            .applications
            .get_mut(&id)
            .ok_or_else(|| CivicError::ApplicationNotFound(id.to_string()))?;
        entry.documents.extend(documents.iter().cloned());
        Ok(entry.clone())
    }

    pub fn statistics(&self) -> ApplicationStatistics {
        let mut stats = ApplicationStatistics::default();
        for entry in self.applications.iter() {
            stats.total += 1;
            match entry.status {
                ApplicationStatus::Submitted => stats.submitted += 1,
                ApplicationStatus::UnderReview => stats.under_review += 1,
                ApplicationStatus::Approved => stats.approved += 1,
                ApplicationStatus::Rejected => stats.rejected += 1,
            }
        }
        stats.pending = stats.submitted + stats.under_review;
        stats
    }
}

impl Default for MemStorage {
    fn default() -> Self {
        Self::new()
    }
}
