use async_trait::async_trait;
use inventory_core_db::{FindSpecsByModel, MachineSpecsModel};
use std::error::Error;

use super::repo_impl::SpecsRepositoryImpl;

impl SpecsRepositoryImpl {
    pub(super) async fn find_by_model_impl(
        repo: &SpecsRepositoryImpl,
        model: &str,
    ) -> Result<Option<MachineSpecsModel>, Box<dyn Error + Send + Sync>> {
        let model = model.trim();
        if model.is_empty() {
            return Ok(None);
        }

        let url = repo.client.endpoint(&["model-specs", model])?;
        let specs = repo.client.get_optional::<MachineSpecsModel>(url).await?;
        if specs.is_none() {
            tracing::debug!(model, "No specification registered for model");
        }
        Ok(specs)
    }
}

#[async_trait]
impl FindSpecsByModel for SpecsRepositoryImpl {
    async fn find_specs_by_model(
        &self,
        model: &str,
    ) -> Result<Option<MachineSpecsModel>, Box<dyn Error + Send + Sync>> {
        Self::find_by_model_impl(self, model).await
    }
}

#[cfg(test)]
mod tests {
    use crate::test_helper::setup;
    use inventory_core_db::{FindSpecsByModel, MachineSpecsModel};

    #[tokio::test]
    async fn test_find_known_and_unknown_models() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let (stub, repositories) = setup().await;
        stub.seed_specs(MachineSpecsModel {
            model: "PC200-8".to_string(),
            cabin: Some("Cerrada".to_string()),
            track_width: Some("600 mm".to_string()),
            ..MachineSpecsModel::default()
        });
        let repo = repositories.build_specs_repo();

        let found = repo.find_specs_by_model(" PC200-8 ").await?.unwrap();
        assert_eq!(found.cabin.as_deref(), Some("Cerrada"));
        assert_eq!(found.wet_line, None);

        assert_eq!(repo.find_specs_by_model("ZX210").await?, None);
        assert_eq!(repo.find_specs_by_model("   ").await?, None);
        Ok(())
    }
}
