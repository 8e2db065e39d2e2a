use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use videmaison_core::{
    Error, RequestStatus, ServiceRequest, ServiceRequestId, repositories::ServiceRequestRepository,
};

use crate::{SqliteServiceRequest, repositories::database_error};

pub struct SqliteServiceRequestRepository {
    pool: SqlitePool,
}

impl SqliteServiceRequestRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ServiceRequestRepository for SqliteServiceRequestRepository {
    async fn create(&self, request: &ServiceRequest) -> Result<ServiceRequest, Error> {
        let row = sqlx::query_as::<_, SqliteServiceRequest>(
            r#"
            INSERT INTO service_requests (id, name, email, phone, address, service_type, message,
                                          language, status, read, admin_notes, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            RETURNING *
            "#,
        )
        .bind(request.id.as_str())
        .bind(&request.name)
        .bind(&request.email)
        .bind(&request.phone)
        .bind(&request.address)
        .bind(&request.service_type)
        .bind(&request.message)
        .bind(&request.language)
        .bind(request.status.as_str())
        .bind(request.read)
        .bind(&request.admin_notes)
        .bind(request.created_at.timestamp())
        .bind(request.updated_at.timestamp())
        .fetch_one(&self.pool)
        .await
        .map_err(database_error("Failed to create service request"))?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: &ServiceRequestId) -> Result<Option<ServiceRequest>, Error> {
        let row =
            sqlx::query_as::<_, SqliteServiceRequest>("SELECT * FROM service_requests WHERE id = ?1")
                .bind(id.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(database_error("Failed to find service request"))?;

        Ok(row.map(ServiceRequest::from))
    }

    async fn list(
        &self,
        status: Option<RequestStatus>,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<ServiceRequest>, Error> {
        let rows = sqlx::query_as::<_, SqliteServiceRequest>(
            r#"
            SELECT * FROM service_requests
            WHERE ?1 IS NULL OR status = ?1
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?2 OFFSET ?3
            "#,
        )
        .bind(status.map(|s| s.as_str()))
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .bind(i64::try_from(offset).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(database_error("Failed to list service requests"))?;

        Ok(rows.into_iter().map(ServiceRequest::from).collect())
    }

    async fn count(&self, status: Option<RequestStatus>) -> Result<u64, Error> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM service_requests WHERE ?1 IS NULL OR status = ?1",
        )
        .bind(status.map(|s| s.as_str()))
        .fetch_one(&self.pool)
        .await
        .map_err(database_error("Failed to count service requests"))?;

        Ok(count as u64)
    }

    async fn count_unread(&self) -> Result<u64, Error> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM service_requests WHERE read = 0")
            .fetch_one(&self.pool)
            .await
            .map_err(database_error("Failed to count unread service requests"))?;

        Ok(count as u64)
    }

    async fn mark_read(&self, id: &ServiceRequestId) -> Result<bool, Error> {
        let result = sqlx::query("UPDATE service_requests SET read = 1 WHERE id = ?1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(database_error("Failed to mark service request read"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_status(
        &self,
        id: &ServiceRequestId,
        status: RequestStatus,
        admin_notes: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Option<ServiceRequest>, Error> {
        let row = sqlx::query_as::<_, SqliteServiceRequest>(
            r#"
            UPDATE service_requests
            SET status = ?2,
                admin_notes = COALESCE(?3, admin_notes),
                updated_at = ?4
            WHERE id = ?1
            RETURNING *
            "#,
        )
        .bind(id.as_str())
        .bind(status.as_str())
        .bind(admin_notes)
        .bind(now.timestamp())
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error("Failed to update service request status"))?;

        Ok(row.map(ServiceRequest::from))
    }

    async fn list_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ServiceRequest>, Error> {
        let rows = sqlx::query_as::<_, SqliteServiceRequest>(
            r#"
            SELECT * FROM service_requests
            WHERE created_at >= ?1 AND created_at < ?2
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .bind(start.timestamp())
        .bind(end.timestamp())
        .fetch_all(&self.pool)
        .await
        .map_err(database_error("Failed to list service requests"))?;

        Ok(rows.into_iter().map(ServiceRequest::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use videmaison_core::repositories::ServiceRequestRepositoryProvider;

    use super::*;
    use crate::test_support::migrated_provider;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, 9, 0, 0).unwrap()
    }

    fn request(created_at: DateTime<Utc>) -> ServiceRequest {
        ServiceRequest {
            id: ServiceRequestId::new_random(),
            name: "Luc Peeters".to_string(),
            email: "luc@example.be".to_string(),
            phone: "0470 00 00 00".to_string(),
            address: "Meir 1, 2000 Antwerpen".to_string(),
            service_type: "vide_maison".to_string(),
            message: "Volledige woning leegmaken".to_string(),
            language: "nl".to_string(),
            status: RequestStatus::New,
            read: false,
            admin_notes: None,
            created_at,
            updated_at: created_at,
        }
    }

    #[tokio::test]
    async fn test_create_find_and_list() {
        let provider = migrated_provider().await;
        let repo = provider.service_request();

        let mut ids = Vec::new();
        for i in 0..3 {
            let created = repo.create(&request(t0() + Duration::minutes(i))).await.unwrap();
            ids.push(created.id);
        }

        let found = repo.find_by_id(&ids[0]).await.unwrap().unwrap();
        assert_eq!(found.language, "nl");
        assert_eq!(found.created_at, t0());

        let page = repo.list(None, 0, 2).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].id, ids[2]);
        assert_eq!(page[1].id, ids[1]);
        assert_eq!(repo.list(None, 2, 2).await.unwrap()[0].id, ids[0]);

        assert_eq!(repo.count(None).await.unwrap(), 3);
        assert_eq!(repo.count(Some(RequestStatus::Pending)).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_mark_read_and_unread_count() {
        let provider = migrated_provider().await;
        let repo = provider.service_request();
        let a = repo.create(&request(t0())).await.unwrap();
        repo.create(&request(t0())).await.unwrap();

        assert_eq!(repo.count_unread().await.unwrap(), 2);
        assert!(repo.mark_read(&a.id).await.unwrap());
        assert_eq!(repo.count_unread().await.unwrap(), 1);
        assert!(!repo.mark_read(&ServiceRequestId::new("req_missing")).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_status_keeps_notes_when_absent() {
        let provider = migrated_provider().await;
        let repo = provider.service_request();
        let a = repo.create(&request(t0())).await.unwrap();

        let updated = repo
            .update_status(&a.id, RequestStatus::InProgress, Some("Camion réservé"), t0())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.admin_notes.as_deref(), Some("Camion réservé"));

        let updated = repo
            .update_status(&a.id, RequestStatus::Completed, None, t0() + Duration::hours(1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, RequestStatus::Completed);
        assert_eq!(updated.admin_notes.as_deref(), Some("Camion réservé"));
        assert_eq!(updated.updated_at, t0() + Duration::hours(1));

        assert_eq!(repo.count(Some(RequestStatus::Completed)).await.unwrap(), 1);
        assert!(
            repo.update_status(&ServiceRequestId::new("req_missing"), RequestStatus::Pending, None, t0())
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_list_created_between_is_half_open() {
        let provider = migrated_provider().await;
        let repo = provider.service_request();
        let start = t0();
        let end = t0() + Duration::days(1);

        repo.create(&request(start - Duration::seconds(1))).await.unwrap();
        let first = repo.create(&request(start)).await.unwrap();
        let last = repo.create(&request(end - Duration::seconds(1))).await.unwrap();
        repo.create(&request(end)).await.unwrap();

        let within = repo.list_created_between(start, end).await.unwrap();
        let ids: Vec<_> = within.into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![last.id, first.id]);
    }
}
