use axum_helpers::JwtClaims;
use chrono::{DateTime, Utc};
use domain_users::User;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Product entity - matches SQL schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub product_id: i32,
    /// Owning user, fixed at creation
    pub user_id: i32,
    pub model_name: String,
    pub description: String,
    pub price: f64,
    pub quantity: i32,
    pub is_featured_ad: bool,
    /// Absent when the listing was created without an image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_uri: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The owner fields shown next to a listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OwnerContact {
    pub contact_number: Option<String>,
}

/// A product joined with its owner's contact details.
/// `user` is null when the owner row no longer exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductListing {
    #[serde(flatten)]
    pub product: Product,
    pub user: Option<OwnerContact>,
}

impl From<&User> for OwnerContact {
    fn from(user: &User) -> Self {
        Self {
            contact_number: user.contact_number.clone(),
        }
    }
}

impl ProductListing {
    pub fn new(product: Product, owner: Option<&User>) -> Self {
        Self {
            product,
            user: owner.map(OwnerContact::from),
        }
    }
}

/// NaN passes a range check, so non-finite prices are rejected separately
fn validate_finite_price(price: f64) -> Result<(), validator::ValidationError> {
    if !price.is_finite() {
        return Err(validator::ValidationError::new("non_finite_price")
            .with_message("Price must be a finite number".into()));
    }
    Ok(())
}

/// DTO for creating a listing. The owner comes from the authenticated actor.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProduct {
    #[validate(length(min = 1, max = 200, message = "Model name must be 1-200 characters"))]
    pub model_name: String,
    #[validate(length(min = 1, max = 5000, message = "Description must be 1-5000 characters"))]
    pub description: String,
    #[validate(
        range(min = 0.0, message = "Price must not be negative"),
        custom(function = "validate_finite_price")
    )]
    pub price: f64,
    #[validate(range(min = 0, message = "Quantity must not be negative"))]
    pub quantity: i32,
    #[serde(default)]
    pub is_featured_ad: bool,
}

/// Insert payload for the repository
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub user_id: i32,
    pub model_name: String,
    pub description: String,
    pub price: f64,
    pub quantity: i32,
    pub is_featured_ad: bool,
    pub image_uri: Option<String>,
}

impl NewProduct {
    pub fn new(user_id: i32, input: CreateProduct, image_uri: Option<String>) -> Self {
        Self {
            user_id,
            model_name: input.model_name,
            description: input.description,
            price: input.price,
            quantity: input.quantity,
            is_featured_ad: input.is_featured_ad,
            image_uri,
        }
    }
}

/// DTO for updating a listing. Only these four fields are mutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProduct {
    #[validate(length(min = 1, max = 200, message = "Model name must be 1-200 characters"))]
    pub model_name: String,
    #[validate(length(min = 1, max = 5000, message = "Description must be 1-5000 characters"))]
    pub description: String,
    #[validate(
        range(min = 0.0, message = "Price must not be negative"),
        custom(function = "validate_finite_price")
    )]
    pub price: f64,
    #[validate(range(min = 0, message = "Quantity must not be negative"))]
    pub quantity: i32,
}

impl Product {
    /// Apply the mutable fields from an update
    pub fn apply_update(&mut self, update: UpdateProduct) {
        self.model_name = update.model_name;
        self.description = update.description;
        self.price = update.price;
        self.quantity = update.quantity;
        self.updated_at = Utc::now();
    }
}

/// The caller on whose behalf an operation runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: i32,
    pub is_admin: bool,
}

impl Actor {
    pub fn new(user_id: i32, is_admin: bool) -> Self {
        Self { user_id, is_admin }
    }

    /// `None` when the token subject is not a user id
    pub fn from_claims(claims: &JwtClaims) -> Option<Self> {
        claims.user_id().map(|user_id| Self::new(user_id, claims.is_admin))
    }
}

/// Acknowledgment body for mutations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn product(image_uri: Option<&str>) -> Product {
        Product {
            product_id: 7,
            user_id: 2,
            model_name: "Canon AE-1".into(),
            description: "35mm film camera".into(),
            price: 180.0,
            quantity: 1,
            is_featured_ad: false,
            image_uri: image_uri.map(String::from),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_listing_wire_format() {
        let owner = User {
            user_id: 2,
            name: "Ana".into(),
            email: "ana@example.com".into(),
            contact_number: Some("555-0199".into()),
            password_hash: String::new(),
            is_admin: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let listing = ProductListing::new(product(None), Some(&owner));
        let json = serde_json::to_value(&listing).unwrap();

        assert_eq!(json["productId"], 7);
        assert_eq!(json["modelName"], "Canon AE-1");
        assert_eq!(json["isFeaturedAd"], false);
        assert!(json.get("imageUri").is_none());
        assert_eq!(json["user"], json!({ "contactNumber": "555-0199" }));
    }

    #[test]
    fn test_listing_without_owner_has_null_user() {
        let listing = ProductListing::new(product(Some("/uploads/a.png")), None);
        let json = serde_json::to_value(&listing).unwrap();

        assert!(json["user"].is_null());
        assert_eq!(json["imageUri"], "/uploads/a.png");
    }

    #[test]
    fn test_create_product_validation() {
        let input: CreateProduct = serde_json::from_value(json!({
            "modelName": "",
            "description": "desc",
            "price": -1.0,
            "quantity": 3
        }))
        .unwrap();

        assert!(!input.is_featured_ad);
        let errors = input.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("model_name"));
        assert!(fields.contains_key("price"));
        assert!(!fields.contains_key("quantity"));
    }

    #[test]
    fn test_non_finite_price_is_rejected() {
        for price in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let create = CreateProduct {
                model_name: "Amp".into(),
                description: "desc".into(),
                price,
                quantity: 1,
                is_featured_ad: false,
            };
            let errors = create.validate().unwrap_err();
            assert!(errors.field_errors().contains_key("price"), "{price} accepted");

            let update = UpdateProduct {
                model_name: "Amp".into(),
                description: "desc".into(),
                price,
                quantity: 1,
            };
            assert!(update.validate().is_err(), "{price} accepted on update");
        }
    }

    #[test]
    fn test_apply_update_keeps_owner_and_image() {
        let mut p = product(Some("/uploads/a.png"));
        p.apply_update(UpdateProduct {
            model_name: "Canon A-1".into(),
            description: "Updated".into(),
            price: 150.0,
            quantity: 2,
        });

        assert_eq!(p.model_name, "Canon A-1");
        assert_eq!(p.quantity, 2);
        assert_eq!(p.user_id, 2);
        assert_eq!(p.image_uri.as_deref(), Some("/uploads/a.png"));
    }
}
