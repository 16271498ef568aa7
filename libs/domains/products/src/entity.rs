use sea_orm::entity::prelude::*;

/// Sea-ORM Entity for the products table
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub product_id: i32,
    pub user_id: i32,
    pub model_name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(column_type = "Double")]
    pub price: f64,
    pub quantity: i32,
    pub is_featured_ad: bool,
    pub image_uri: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "domain_users::entity::Entity",
        from = "Column::UserId",
        to = "domain_users::entity::Column::UserId",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<domain_users::entity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for crate::models::Product {
    fn from(model: Model) -> Self {
        Self {
            product_id: model.product_id,
            user_id: model.user_id,
            model_name: model.model_name,
            description: model.description,
            price: model.price,
            quantity: model.quantity,
            is_featured_ad: model.is_featured_ad,
            image_uri: model.image_uri,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}
