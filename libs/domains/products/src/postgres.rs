use async_trait::async_trait;
use domain_users::User;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel,
    QueryFilter, QueryOrder, Select,
};

use crate::{
    entity,
    error::{ProductError, ProductResult},
    models::{NewProduct, Product, ProductListing, UpdateProduct},
    repository::ProductRepository,
};

/// PostgreSQL implementation of ProductRepository using SeaORM
#[derive(Clone)]
pub struct PgProductRepository {
    db: DatabaseConnection,
}

impl PgProductRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// LEFT JOIN users, ordered by product id
    async fn listings(&self, query: Select<entity::Entity>) -> ProductResult<Vec<ProductListing>> {
        let rows = query
            .find_also_related(domain_users::entity::Entity)
            .order_by_asc(entity::Column::ProductId)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(product, owner)| {
                let owner = owner.map(User::from);
                ProductListing::new(product.into(), owner.as_ref())
            })
            .collect())
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn list_all(&self) -> ProductResult<Vec<ProductListing>> {
        self.listings(entity::Entity::find()).await
    }

    async fn list_by_name(&self, model_name: &str) -> ProductResult<Vec<ProductListing>> {
        self.listings(entity::Entity::find().filter(entity::Column::ModelName.eq(model_name)))
            .await
    }

    async fn list_by_owner(&self, user_id: i32) -> ProductResult<Vec<ProductListing>> {
        self.listings(entity::Entity::find().filter(entity::Column::UserId.eq(user_id)))
            .await
    }

    async fn find_listing(&self, product_id: i32) -> ProductResult<Option<ProductListing>> {
        let mut found = self
            .listings(entity::Entity::find_by_id(product_id))
            .await?;
        Ok(found.pop())
    }

    async fn get_by_id(&self, product_id: i32) -> ProductResult<Option<Product>> {
        let model = entity::Entity::find_by_id(product_id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn create(&self, input: NewProduct) -> ProductResult<Product> {
        let now = chrono::Utc::now();
        let active = entity::ActiveModel {
            product_id: NotSet,
            user_id: Set(input.user_id),
            model_name: Set(input.model_name),
            description: Set(input.description),
            price: Set(input.price),
            quantity: Set(input.quantity),
            is_featured_ad: Set(input.is_featured_ad),
            image_uri: Set(input.image_uri),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let model = active.insert(&self.db).await?;

        tracing::info!(product_id = model.product_id, user_id = model.user_id, "Created product");
        Ok(model.into())
    }

    async fn update(&self, product_id: i32, input: UpdateProduct) -> ProductResult<Product> {
        let mut active = entity::Entity::find_by_id(product_id)
            .one(&self.db)
            .await?
            .ok_or(ProductError::NotFound(product_id))?
            .into_active_model();

        active.model_name = Set(input.model_name);
        active.description = Set(input.description);
        active.price = Set(input.price);
        active.quantity = Set(input.quantity);
        active.updated_at = Set(chrono::Utc::now().into());

        // A delete between the lookup and the write leaves nothing to update
        let model = active.update(&self.db).await.map_err(|e| match e {
            DbErr::RecordNotUpdated => ProductError::NotFound(product_id),
            other => other.into(),
        })?;

        tracing::info!(product_id, "Updated product");
        Ok(model.into())
    }

    async fn delete(&self, product_id: i32) -> ProductResult<()> {
        let result = entity::Entity::delete_by_id(product_id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(ProductError::NotFound(product_id));
        }

        tracing::info!(product_id, "Deleted product");
        Ok(())
    }
}
