//! Brand catalog service.

use async_trait::async_trait;
use std::sync::Arc;
use validator::Validate;

use crate::domain::{
    car::split_search_terms, validation_field_errors, Brand, BrandInput, BrandOrdering,
    BrandQuery, CarModel,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

#[async_trait]
pub trait BrandService: Send + Sync {
    async fn list(&self, query: BrandQuery) -> AppResult<Vec<Brand>>;

    async fn get(&self, id: i64) -> AppResult<Brand>;

    async fn create(&self, input: BrandInput) -> AppResult<Brand>;

    async fn update(&self, id: i64, input: BrandInput) -> AppResult<Brand>;

    /// Fails with `Protected` while listings reference the brand
    async fn delete(&self, id: i64) -> AppResult<()>;

    async fn models(&self, brand_id: i64) -> AppResult<Vec<CarModel>>;
}

pub struct BrandCatalog<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> BrandCatalog<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

fn duplicate_name(err: AppError) -> AppError {
    match err {
        AppError::Conflict(_) => AppError::field("name", "Brand with this name already exists"),
        other => other,
    }
}

#[async_trait]
impl<U: UnitOfWork> BrandService for BrandCatalog<U> {
    async fn list(&self, query: BrandQuery) -> AppResult<Vec<Brand>> {
        let search = query
            .search
            .as_deref()
            .map(split_search_terms)
            .unwrap_or_default();
        let ordering = query
            .ordering
            .as_deref()
            .map(BrandOrdering::parse)
            .unwrap_or_default();

        self.uow.brands().list(search, ordering).await
    }

    async fn get(&self, id: i64) -> AppResult<Brand> {
        self.uow.brands().find_by_id(id).await?.ok_or_not_found()
    }

    async fn create(&self, input: BrandInput) -> AppResult<Brand> {
        input.validate().map_err(validation_field_errors)?;
        let brand = self
            .uow
            .brands()
            .create(input.name.trim().to_string())
            .await
            .map_err(duplicate_name)?;

        tracing::info!(brand_id = brand.id, name = %brand.name, "Brand created");
        Ok(brand)
    }

    async fn update(&self, id: i64, input: BrandInput) -> AppResult<Brand> {
        input.validate().map_err(validation_field_errors)?;
        self.uow
            .brands()
            .rename(id, input.name.trim().to_string())
            .await
            .map_err(duplicate_name)
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        self.uow.brands().delete(id).await?;
        tracing::info!(brand_id = id, "Brand deleted");
        Ok(())
    }

    async fn models(&self, brand_id: i64) -> AppResult<Vec<CarModel>> {
        self.get(brand_id).await?;
        self.uow.brands().models_of(brand_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::MockBrandRepository;
    use crate::services::testing::TestUnitOfWork;
    use chrono::Utc;

    #[tokio::test]
    async fn test_list_splits_search_and_parses_ordering() {
        let mut brands = MockBrandRepository::new();
        brands
            .expect_list()
            .withf(|search, ordering| {
                search == &vec!["to".to_string(), "ta".to_string()]
                    && *ordering == BrandOrdering::CreatedAtDesc
            })
            .returning(|_, _| Ok(Vec::new()));

        let service = BrandCatalog::new(Arc::new(TestUnitOfWork::default().with_brands(brands)));
        let query = BrandQuery {
            search: Some("to ta".into()),
            ordering: Some("-created_at".into()),
        };

        assert!(service.list(query).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_name_is_field_error() {
        let mut brands = MockBrandRepository::new();
        brands
            .expect_create()
            .returning(|_| Err(AppError::conflict("Record")));

        let service = BrandCatalog::new(Arc::new(TestUnitOfWork::default().with_brands(brands)));
        let err = service
            .create(BrandInput { name: "Lada".into() })
            .await
            .unwrap_err();

        assert!(err.field_errors().unwrap().contains_key("name"));
    }

    #[tokio::test]
    async fn test_delete_protected_brand() {
        let mut brands = MockBrandRepository::new();
        brands.expect_delete().returning(|_| Err(AppError::Protected));

        let service = BrandCatalog::new(Arc::new(TestUnitOfWork::default().with_brands(brands)));

        assert!(matches!(
            service.delete(1).await.unwrap_err(),
            AppError::Protected
        ));
    }

    #[tokio::test]
    async fn test_models_of_unknown_brand() {
        let mut brands = MockBrandRepository::new();
        brands.expect_find_by_id().returning(|_| Ok(None));
        brands.expect_models_of().never();

        let service = BrandCatalog::new(Arc::new(TestUnitOfWork::default().with_brands(brands)));

        assert!(matches!(
            service.models(3).await.unwrap_err(),
            AppError::NotFound
        ));
    }

    #[tokio::test]
    async fn test_models_of_brand() {
        let mut brands = MockBrandRepository::new();
        brands.expect_find_by_id().returning(|id| {
            Ok(Some(Brand {
                id,
                name: "Lada".into(),
                created_at: Utc::now(),
            }))
        });
        brands.expect_models_of().returning(|brand_id| {
            Ok(vec![CarModel {
                id: 1,
                brand_id,
                name: "Vesta".into(),
                created_at: Utc::now(),
            }])
        });

        let service = BrandCatalog::new(Arc::new(TestUnitOfWork::default().with_brands(brands)));

        assert_eq!(service.models(3).await.unwrap()[0].brand_id, 3);
    }
}
