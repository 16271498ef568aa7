use sea_orm::entity::prelude::*;

/// Sea-ORM Entity for the users table
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub user_id: i32,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub contact_number: Option<String>,
    pub password_hash: String,
    pub is_admin: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for crate::models::User {
    fn from(model: Model) -> Self {
        Self {
            user_id: model.user_id,
            name: model.name,
            email: model.email,
            contact_number: model.contact_number,
            password_hash: model.password_hash,
            is_admin: model.is_admin,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}
