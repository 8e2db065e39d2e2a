//! Service requests submitted through the public contact form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::prefixed_id;

prefixed_id!(ServiceRequestId, "req");

/// Requests listed per admin page.
pub const PAGE_SIZE: u64 = 10;

pub const DEFAULT_LANGUAGE: &str = "fr";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Initial state of every submission; never set by an admin.
    New,
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl RequestStatus {
    /// The statuses an admin may assign, in display order.
    pub const ADMIN_ASSIGNABLE: [RequestStatus; 4] = [
        RequestStatus::Pending,
        RequestStatus::InProgress,
        RequestStatus::Completed,
        RequestStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::New => "new",
            RequestStatus::Pending => "pending",
            RequestStatus::InProgress => "in_progress",
            RequestStatus::Completed => "completed",
            RequestStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_admin_assignable(&self) -> bool {
        Self::ADMIN_ASSIGNABLE.contains(self)
    }
}

impl std::str::FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(RequestStatus::New),
            "pending" => Ok(RequestStatus::Pending),
            "in_progress" => Ok(RequestStatus::InProgress),
            "completed" => Ok(RequestStatus::Completed),
            "cancelled" => Ok(RequestStatus::Cancelled),
            other => Err(format!("unknown status: {other}")),
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRequest {
    pub id: ServiceRequestId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub service_type: String,
    pub message: String,
    pub language: String,
    pub status: RequestStatus,
    pub read: bool,
    pub admin_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ServiceRequest {
    pub fn service_type_name(&self) -> &str {
        service_type_name(&self.service_type)
    }
}

/// Contact-form payload. Every field except `language` is required.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewServiceRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub service_type: Option<String>,
    pub message: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ServiceType {
    pub id: &'static str,
    pub name: &'static str,
}

pub const SERVICE_TYPES: [ServiceType; 6] = [
    ServiceType {
        id: "vide_maison",
        name: "Vide Maison",
    },
    ServiceType {
        id: "vide_appartement",
        name: "Vide Appartement",
    },
    ServiceType {
        id: "vide_grenier",
        name: "Vide Grenier",
    },
    ServiceType {
        id: "vide_locaux",
        name: "Vide Locaux Professionnels",
    },
    ServiceType {
        id: "vide_bureau",
        name: "Vide Bureau",
    },
    ServiceType {
        id: "nettoyage",
        name: "Nettoyage",
    },
];

/// Display name for a service type id; unknown ids display as themselves.
pub fn service_type_name(id: &str) -> &str {
    SERVICE_TYPES
        .iter()
        .find(|t| t.id == id)
        .map(|t| t.name)
        .unwrap_or(id)
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestPage {
    pub requests: Vec<ServiceRequest>,
    pub page: u64,
    pub total: u64,
    pub total_pages: u64,
}

impl RequestPage {
    pub fn total_pages_for(total: u64) -> u64 {
        total.div_ceil(PAGE_SIZE)
    }
}

/// Serialized with the `*Requests` keys the admin dashboard reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    #[serde(rename = "pendingRequests")]
    pub pending: u64,
    #[serde(rename = "inProgressRequests")]
    pub in_progress: u64,
    #[serde(rename = "completedRequests")]
    pub completed: u64,
    #[serde(rename = "cancelledRequests")]
    pub cancelled: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentRequest {
    pub id: ServiceRequestId,
    pub name: String,
    pub email: String,
    pub service_type: String,
    pub status: RequestStatus,
    /// `dd/mm/YYYY HH:MM`
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_requests: u64,
    #[serde(flatten)]
    pub today: StatusCounts,
    pub recent_requests: Vec<RecentRequest>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_type_names() {
        assert_eq!(service_type_name("vide_locaux"), "Vide Locaux Professionnels");
        assert_eq!(service_type_name("jardinage"), "jardinage");
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!(
            "in_progress".parse::<RequestStatus>().unwrap(),
            RequestStatus::InProgress
        );
        assert!("done".parse::<RequestStatus>().is_err());
        assert!(!RequestStatus::New.is_admin_assignable());
        assert!(RequestStatus::Cancelled.is_admin_assignable());
        assert_eq!(
            serde_json::to_string(&RequestStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(RequestPage::total_pages_for(0), 0);
        assert_eq!(RequestPage::total_pages_for(10), 1);
        assert_eq!(RequestPage::total_pages_for(11), 2);
    }
}
