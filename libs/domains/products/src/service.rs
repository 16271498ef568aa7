//! Product Service - Business logic layer

use domain_notifications::{NotificationDispatcher, RemovedBy, templates};
use domain_users::UserRepository;
use std::sync::Arc;
use tracing::instrument;
use validator::Validate;

use crate::error::{ProductError, ProductResult};
use crate::models::{Actor, CreateProduct, NewProduct, Product, ProductListing, UpdateProduct};
use crate::policy;
use crate::repository::ProductRepository;

/// Product service providing the marketplace listing operations
///
/// Authorization is decided by [`policy`]; owners are resolved through the
/// user directory and notified through the dispatcher.
pub struct ProductService<R: ProductRepository, U: UserRepository> {
    repository: Arc<R>,
    users: Arc<U>,
    notifications: NotificationDispatcher,
}

impl<R: ProductRepository, U: UserRepository> Clone for ProductService<R, U> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            users: Arc::clone(&self.users),
            notifications: self.notifications.clone(),
        }
    }
}

impl<R: ProductRepository, U: UserRepository> ProductService<R, U> {
    pub fn new(repository: R, users: Arc<U>, notifications: NotificationDispatcher) -> Self {
        Self {
            repository: Arc::new(repository),
            users,
            notifications,
        }
    }

    #[instrument(skip(self))]
    pub async fn get_all_products(&self) -> ProductResult<Vec<ProductListing>> {
        self.repository.list_all().await
    }

    /// Exact match on model name. An empty result is reported as NotFound.
    #[instrument(skip(self))]
    pub async fn get_products_by_name(&self, model_name: &str) -> ProductResult<Vec<ProductListing>> {
        let listings = self.repository.list_by_name(model_name).await?;
        if listings.is_empty() {
            return Err(ProductError::NoProductsNamed(model_name.to_string()));
        }
        Ok(listings)
    }

    #[instrument(skip(self))]
    pub async fn get_product_by_id(&self, product_id: i32) -> ProductResult<ProductListing> {
        self.repository
            .find_listing(product_id)
            .await?
            .ok_or(ProductError::NotFound(product_id))
    }

    /// An empty result is reported as NotFound.
    #[instrument(skip(self))]
    pub async fn get_user_products(&self, user_id: i32) -> ProductResult<Vec<ProductListing>> {
        let listings = self.repository.list_by_owner(user_id).await?;
        if listings.is_empty() {
            return Err(ProductError::NoProductsForUser(user_id));
        }
        Ok(listings)
    }

    #[instrument(skip(self, input), fields(user_id = actor.user_id, model_name = %input.model_name))]
    pub async fn add_product(
        &self,
        actor: Actor,
        input: CreateProduct,
        image_uri: Option<String>,
    ) -> ProductResult<Product> {
        input.validate()?;
        self.repository
            .create(NewProduct::new(actor.user_id, input, image_uri))
            .await
    }

    /// Owner only. Admins get Forbidden like anyone else.
    #[instrument(skip(self, input), fields(user_id = actor.user_id))]
    pub async fn update_product(
        &self,
        actor: Actor,
        product_id: i32,
        input: UpdateProduct,
    ) -> ProductResult<Product> {
        let product = self.existing(product_id).await?;

        if !policy::can_mutate(&actor, &product) {
            return Err(ProductError::Forbidden {
                user_id: actor.user_id,
                product_id,
            });
        }

        input.validate()?;
        self.repository.update(product_id, input).await
    }

    /// Owner or admin. The owner is told about the removal in the background;
    /// delivery problems never affect the result.
    #[instrument(skip(self), fields(user_id = actor.user_id, is_admin = actor.is_admin))]
    pub async fn delete_product(&self, actor: Actor, product_id: i32) -> ProductResult<()> {
        let product = self.existing(product_id).await?;

        if !policy::can_delete(&actor, &product) {
            return Err(ProductError::Forbidden {
                user_id: actor.user_id,
                product_id,
            });
        }

        let owner = self
            .users
            .get_by_id(product.user_id)
            .await?
            .ok_or(ProductError::OwnerNotFound {
                user_id: product.user_id,
                product_id,
            })?;

        self.repository.delete(product_id).await?;

        let removed_by = if actor.user_id == product.user_id {
            RemovedBy::Owner
        } else {
            RemovedBy::Admin
        };
        self.notifications.dispatch(templates::product_removed(
            &owner.email,
            &owner.name,
            &product.model_name,
            removed_by,
        ));

        tracing::info!(product_id, owner_id = owner.user_id, "Product deleted, owner notification dispatched");
        Ok(())
    }

    async fn existing(&self, product_id: i32) -> ProductResult<Product> {
        self.repository
            .get_by_id(product_id)
            .await?
            .ok_or(ProductError::NotFound(product_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{InMemoryProductRepository, MockProductRepository};
    use chrono::Utc;
    use domain_notifications::RecordingGateway;
    use domain_users::{InMemoryUserRepository, MockUserRepository, NewUser, User};
    use std::time::Duration;

    const WAIT: Duration = Duration::from_millis(500);

    struct Fixture {
        service: ProductService<InMemoryProductRepository, InMemoryUserRepository>,
        users: InMemoryUserRepository,
        gateway: RecordingGateway,
    }

    fn fixture_with(gateway: RecordingGateway) -> Fixture {
        let users = InMemoryUserRepository::new();
        let dispatcher = NotificationDispatcher::new(Arc::new(gateway.clone()), Duration::from_millis(200));
        let service = ProductService::new(
            InMemoryProductRepository::new(users.clone()),
            Arc::new(users.clone()),
            dispatcher,
        );
        Fixture {
            service,
            users,
            gateway,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(RecordingGateway::new())
    }

    async fn user(users: &InMemoryUserRepository, name: &str, is_admin: bool) -> User {
        users
            .create(NewUser {
                name: name.into(),
                email: format!("{}@example.com", name.to_lowercase()),
                contact_number: Some(format!("{}-phone", name.to_lowercase())),
                password_hash: "hash".into(),
                is_admin,
            })
            .await
            .unwrap()
    }

    fn create(model_name: &str) -> CreateProduct {
        CreateProduct {
            model_name: model_name.into(),
            description: "Barely used".into(),
            price: 250.0,
            quantity: 1,
            is_featured_ad: false,
        }
    }

    fn update() -> UpdateProduct {
        UpdateProduct {
            model_name: "Renamed".into(),
            description: "Now with case".into(),
            price: 199.0,
            quantity: 2,
        }
    }

    fn actor(user: &User) -> Actor {
        Actor::new(user.user_id, user.is_admin)
    }

    #[tokio::test]
    async fn test_add_then_get_preserves_fields_and_owner_contact() {
        let f = fixture();
        let owner = user(&f.users, "Ana", false).await;

        let created = f
            .service
            .add_product(actor(&owner), create("Piano"), None)
            .await
            .unwrap();

        let listing = f.service.get_product_by_id(created.product_id).await.unwrap();
        assert_eq!(listing.product.user_id, owner.user_id);
        assert_eq!(listing.product.model_name, "Piano");
        assert_eq!(listing.product.description, "Barely used");
        assert_eq!(listing.product.price, 250.0);
        assert_eq!(listing.product.quantity, 1);
        assert!(listing.product.image_uri.is_none());
        assert_eq!(
            listing.user.unwrap().contact_number,
            owner.contact_number
        );
    }

    #[tokio::test]
    async fn test_add_records_image_uri() {
        let f = fixture();
        let owner = user(&f.users, "Ana", false).await;

        let created = f
            .service
            .add_product(actor(&owner), create("Piano"), Some("/uploads/p.png".into()))
            .await
            .unwrap();
        assert_eq!(created.image_uri.as_deref(), Some("/uploads/p.png"));
    }

    #[tokio::test]
    async fn test_add_rejects_invalid_fields() {
        let f = fixture();
        let mut input = create("");
        input.quantity = -1;

        let result = f.service.add_product(Actor::new(1, false), input, None).await;
        assert!(matches!(result, Err(ProductError::Validation(_))));
        assert!(f.service.get_all_products().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_lists() {
        let f = fixture();
        assert!(f.service.get_all_products().await.unwrap().is_empty());
        assert!(matches!(
            f.service.get_products_by_name("nonexistent").await,
            Err(ProductError::NoProductsNamed(_))
        ));
        assert!(matches!(
            f.service.get_user_products(3).await,
            Err(ProductError::NoProductsForUser(3))
        ));
        assert!(matches!(
            f.service.get_product_by_id(3).await,
            Err(ProductError::NotFound(3))
        ));
    }

    #[tokio::test]
    async fn test_lists_by_name_and_owner() {
        let f = fixture();
        let ana = user(&f.users, "Ana", false).await;
        let ivo = user(&f.users, "Ivo", false).await;
        f.service.add_product(actor(&ana), create("Lamp"), None).await.unwrap();
        f.service.add_product(actor(&ivo), create("Lamp"), None).await.unwrap();
        f.service.add_product(actor(&ivo), create("Sofa"), None).await.unwrap();

        assert_eq!(f.service.get_products_by_name("Lamp").await.unwrap().len(), 2);
        assert_eq!(f.service.get_user_products(ivo.user_id).await.unwrap().len(), 2);
        assert_eq!(f.service.get_all_products().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_update_by_owner_changes_only_mutable_fields() {
        let f = fixture();
        let owner = user(&f.users, "Ana", false).await;
        let created = f
            .service
            .add_product(actor(&owner), create("Piano"), Some("/uploads/p.png".into()))
            .await
            .unwrap();

        let updated = f
            .service
            .update_product(actor(&owner), created.product_id, update())
            .await
            .unwrap();

        assert_eq!(updated.model_name, "Renamed");
        assert_eq!(updated.price, 199.0);
        assert_eq!(updated.quantity, 2);
        assert_eq!(updated.user_id, owner.user_id);
        assert_eq!(updated.image_uri.as_deref(), Some("/uploads/p.png"));
        assert_eq!(updated.is_featured_ad, created.is_featured_ad);
    }

    #[tokio::test]
    async fn test_update_by_non_owner_is_forbidden_even_for_admin() {
        let f = fixture();
        let owner = user(&f.users, "Ana", false).await;
        let stranger = user(&f.users, "Ivo", false).await;
        let admin = user(&f.users, "Root", true).await;
        let created = f
            .service
            .add_product(actor(&owner), create("Piano"), None)
            .await
            .unwrap();

        for who in [&stranger, &admin] {
            let result = f
                .service
                .update_product(actor(who), created.product_id, update())
                .await;
            assert!(matches!(result, Err(ProductError::Forbidden { .. })));
        }

        let unchanged = f.service.get_product_by_id(created.product_id).await.unwrap();
        assert_eq!(unchanged.product.model_name, "Piano");
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let f = fixture();
        let result = f.service.update_product(Actor::new(1, true), 77, update()).await;
        assert!(matches!(result, Err(ProductError::NotFound(77))));
    }

    #[tokio::test]
    async fn test_owner_delete_succeeds_and_notifies_owner() {
        let f = fixture();
        let owner = user(&f.users, "Ana", false).await;
        let created = f
            .service
            .add_product(actor(&owner), create("Piano"), None)
            .await
            .unwrap();

        f.service
            .delete_product(actor(&owner), created.product_id)
            .await
            .unwrap();

        assert!(f.gateway.wait_for_count(1, WAIT).await);
        let sent = f.gateway.sent().await;
        assert!(sent[0].body.contains("has been deleted from your account"));
        assert!(!sent[0].body.contains("admin"));
        assert!(matches!(
            f.service.get_product_by_id(created.product_id).await,
            Err(ProductError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_admin_delete_sends_exactly_one_notification() {
        let f = fixture();
        let owner = user(&f.users, "Ana", false).await;
        let admin = user(&f.users, "Root", true).await;
        let created = f
            .service
            .add_product(actor(&owner), create("Piano"), None)
            .await
            .unwrap();

        f.service
            .delete_product(actor(&admin), created.product_id)
            .await
            .unwrap();

        assert!(f.gateway.wait_for_count(1, WAIT).await);
        tokio::time::sleep(Duration::from_millis(20)).await;

        let sent = f.gateway.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "ana@example.com");
        assert_eq!(sent[0].subject, "Your product has been deleted");
        assert!(sent[0].body.contains("Dear Ana"));
        assert!(sent[0].body.contains("\"Piano\" has been deleted by the admin."));
    }

    #[tokio::test]
    async fn test_non_owner_delete_is_forbidden_and_product_remains() {
        let f = fixture();
        let owner = user(&f.users, "Ana", false).await;
        let stranger = user(&f.users, "Ivo", false).await;
        let created = f
            .service
            .add_product(actor(&owner), create("Piano"), None)
            .await
            .unwrap();

        let result = f.service.delete_product(actor(&stranger), created.product_id).await;
        assert!(matches!(result, Err(ProductError::Forbidden { .. })));
        assert!(f.service.get_product_by_id(created.product_id).await.is_ok());
        assert_eq!(f.gateway.sent_count().await, 0);
    }

    #[tokio::test]
    async fn test_second_delete_is_not_found() {
        let f = fixture();
        let owner = user(&f.users, "Ana", false).await;
        let created = f
            .service
            .add_product(actor(&owner), create("Piano"), None)
            .await
            .unwrap();

        f.service.delete_product(actor(&owner), created.product_id).await.unwrap();
        let again = f.service.delete_product(actor(&owner), created.product_id).await;
        assert!(matches!(again, Err(ProductError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_succeeds_when_notification_fails() {
        let f = fixture_with(RecordingGateway::failing("relay down"));
        let owner = user(&f.users, "Ana", false).await;
        let created = f
            .service
            .add_product(actor(&owner), create("Piano"), None)
            .await
            .unwrap();

        f.service
            .delete_product(actor(&owner), created.product_id)
            .await
            .unwrap();
        assert!(f.service.get_product_by_id(created.product_id).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_does_not_wait_for_slow_gateway() {
        let f = fixture_with(RecordingGateway::new().with_delay(Duration::from_secs(30)));
        let owner = user(&f.users, "Ana", false).await;
        let created = f
            .service
            .add_product(actor(&owner), create("Piano"), None)
            .await
            .unwrap();

        let deleting = f.service.delete_product(actor(&owner), created.product_id);
        tokio::time::timeout(Duration::from_secs(5), deleting)
            .await
            .expect("delete waited on the gateway")
            .unwrap();
    }

    fn orphan(product_id: i32) -> Product {
        Product {
            product_id,
            user_id: 404,
            model_name: "Ghost".into(),
            description: "No owner".into(),
            price: 1.0,
            quantity: 1,
            is_featured_ad: false,
            image_uri: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_delete_with_missing_owner_is_integrity_fault() {
        let mut products = MockProductRepository::new();
        products
            .expect_get_by_id()
            .returning(|id| Ok(Some(orphan(id))));
        products.expect_delete().never();

        let mut users = MockUserRepository::new();
        users.expect_get_by_id().returning(|_| Ok(None));

        let gateway = RecordingGateway::new();
        let service = ProductService::new(
            products,
            Arc::new(users),
            NotificationDispatcher::new(Arc::new(gateway.clone()), Duration::from_millis(100)),
        );

        let result = service.delete_product(Actor::new(1, true), 5).await;
        assert!(matches!(
            result,
            Err(ProductError::OwnerNotFound { user_id: 404, product_id: 5 })
        ));
        assert_eq!(gateway.sent_count().await, 0);
    }
}
