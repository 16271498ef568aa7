//! Message texts sent by the marketplace.

/// A rendered message addressed to one recipient
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub to: String,
    pub subject: String,
    pub body: String,
}

pub const PRODUCT_REMOVED_SUBJECT: &str = "Your product has been deleted";

/// Who removed a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovedBy {
    Owner,
    Admin,
}

/// Sent to a listing's owner after the listing is deleted.
pub fn product_removed(
    to: &str,
    owner_name: &str,
    model_name: &str,
    removed_by: RemovedBy,
) -> Notification {
    let action = match removed_by {
        RemovedBy::Admin => "has been deleted by the admin",
        RemovedBy::Owner => "has been deleted from your account",
    };

    Notification {
        to: to.to_string(),
        subject: PRODUCT_REMOVED_SUBJECT.to_string(),
        body: format!(
            "Dear {owner_name},\n\n  Your product \"{model_name}\" {action}.\n  \n  Best regards,\n  Your Team"
        ),
    }
}
