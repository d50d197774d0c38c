use std::time::Instant;

use fake::Fake;
use fake::faker::name::en::{FirstName, LastName};

use bloodconnect_models::{AddUserRequest, Email, Role, UserStatus, ValueTypeError};

use crate::backend::MemoryUserBackend;

/// Every n-th seeded user is a volunteer, the rest are donors.
const VOLUNTEER_EVERY: usize = 5;

/// `first.last{n}@example.com`, keeping only the alphanumeric characters of
/// each name part.
fn seed_email(first_name: &str, last_name: &str, n: usize) -> Result<Email, ValueTypeError> {
    let clean = |part: &str| -> String {
        part.chars().filter(char::is_ascii_alphanumeric).collect()
    };
    Email::new(format!("{}.{}{n}@example.com", clean(first_name), clean(last_name)))
}

/// Fills the store with `count` fake users and returns how many were new.
pub async fn seed_users(users: &MemoryUserBackend, count: usize) -> anyhow::Result<usize> {
    let start_time = Instant::now();
    let mut inserted = 0;

    for i in 0..count {
        let first_name: String = FirstName().fake();
        let last_name: String = LastName().fake();
        let email = seed_email(&first_name, &last_name, i)?;
        let role = if (i + 1) % VOLUNTEER_EVERY == 0 {
            Role::Volunteer
        } else {
            Role::Donor
        };

        let outcome = users
            .upsert(&AddUserRequest {
                email,
                name: format!("{first_name} {last_name}"),
                role,
                status: Some(UserStatus::Active),
                photo_url: None,
            })
            .await;
        if outcome.is_inserted() {
            inserted += 1;
        }
    }

    tracing::info!(
        requested = count,
        inserted,
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "Seeded users"
    );
    Ok(inserted)
}

/// Creates `email` as an admin, or promotes the existing record.
pub async fn bootstrap_admin(users: &MemoryUserBackend, email: &str) -> anyhow::Result<()> {
    let email = Email::new(email)?;
    if users.set_role_by_email(&email, Role::Admin).await.is_none() {
        users
            .upsert(&AddUserRequest {
                email: email.clone(),
                name: email.local_part().to_string(),
                role: Role::Admin,
                status: Some(UserStatus::Active),
                photo_url: None,
            })
            .await;
    }

    tracing::info!(user.email = %email, "Administrator ready");
    Ok(())
}
