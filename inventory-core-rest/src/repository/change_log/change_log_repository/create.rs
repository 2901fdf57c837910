use async_trait::async_trait;
use inventory_core_api::CreateChangeLogRequest;
use inventory_core_db::CreateChangeLog;
use std::error::Error;

use super::repo_impl::ChangeLogRepositoryImpl;

impl ChangeLogRepositoryImpl {
    pub(super) async fn create_impl(
        repo: &ChangeLogRepositoryImpl,
        request: &CreateChangeLogRequest,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        if request.changes.is_empty() {
            return Err("Change log request carries no changes".into());
        }

        let url = repo.client.endpoint(&["change-logs"])?;
        repo.client.post_discard(url, request).await?;
        tracing::debug!(
            table = %request.table_name,
            record_id = %request.record_id,
            entries = request.changes.len(),
            "Change log written"
        );
        Ok(())
    }
}

#[async_trait]
impl CreateChangeLog for ChangeLogRepositoryImpl {
    async fn create_change_log(
        &self,
        request: &CreateChangeLogRequest,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        Self::create_impl(self, request).await
    }
}

#[cfg(test)]
mod tests {
    use crate::test_helper::setup;
    use inventory_core_api::{CreateChangeLogRequest, FieldValue, PendingChange, RecordId};
    use inventory_core_db::{CreateChangeLog, LoadChangeLogsBatch, TrackedTable};

    fn request(changes: Vec<PendingChange>) -> CreateChangeLogRequest {
        CreateChangeLogRequest {
            table_name: "equipments".to_string(),
            record_id: RecordId::from("A"),
            changes,
            change_reason: Some("corrección mensual".to_string()),
            module_name: "Equipos".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_posts_every_change_in_one_request() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let (stub, repositories) = setup().await;
        let repo = repositories.build_change_log_repo();
        let id = RecordId::from("A");

        repo.create_change_log(&request(vec![
            PendingChange::new(id.clone(), "pvp_est", "PVP Est.", FieldValue::Null, FieldValue::Integer(50000)),
            PendingChange::new(id.clone(), "state", "Estado", FieldValue::text("Disponible"), FieldValue::text("Reservada")),
        ]))
        .await?;

        let posts = stub.posts();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].changes.len(), 2);
        assert_eq!(posts[0].change_reason.as_deref(), Some("corrección mensual"));

        let history = repo.load_batch(TrackedTable::Equipments, &[id.clone()]).await?;
        let rows = &history[&id];
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|row| row.module_name.as_deref() == Some("Equipos")));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_rejects_empty_request_without_calling_backend() {
        let (stub, repositories) = setup().await;
        let repo = repositories.build_change_log_repo();

        assert!(repo.create_change_log(&request(Vec::new())).await.is_err());
        assert!(stub.posts().is_empty());
    }

    #[tokio::test]
    async fn test_create_failure_surfaces_status() {
        let (stub, repositories) = setup().await;
        let repo = repositories.build_change_log_repo();
        stub.fail_next_posts(1);

        let change = PendingChange::new(
            RecordId::from("A"),
            "state",
            "Estado",
            FieldValue::text("Disponible"),
            FieldValue::text("Vendida"),
        );
        let err = repo.create_change_log(&request(vec![change])).await.unwrap_err();
        assert!(err.to_string().contains("500"));
        assert!(stub.posts().is_empty());
    }
}
