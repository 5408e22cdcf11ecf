use crate::config::Config;
use crate::models::user::Role;
use crate::services::AuthError;
use crate::state::SharedState;

pub async fn cmd_create_user(
    config: &Config,
    email: &str,
    password: &str,
    manager: bool,
) -> anyhow::Result<()> {
    let state = SharedState::new(config.clone()).await?;
    let role = if manager { Role::Manager } else { Role::User };

    match state.auth_service.register(email, password, role).await {
        Ok(id) => println!("✓ Created {role} account {email} (ID: {id})"),
        Err(AuthError::DuplicateEmail) => println!("An account already exists for {email}"),
        Err(AuthError::Validation(msg)) => println!("Invalid account: {msg}"),
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
