//! Who may change or remove a listing.

use crate::models::{Actor, Product};

/// Only the owner may edit a listing. Admins are not exempt.
pub fn can_mutate(actor: &Actor, product: &Product) -> bool {
    actor.user_id == product.user_id
}

/// The owner or any admin may delete a listing.
pub fn can_delete(actor: &Actor, product: &Product) -> bool {
    actor.user_id == product.user_id || actor.is_admin
}
