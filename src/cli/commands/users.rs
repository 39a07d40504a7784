use clap::Args;
use serde_json::json;
use uuid::Uuid;

use crate::auth::hash_password;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config;
use crate::database::models::student::is_institutional_email;
use crate::database::models::Role;
use crate::database::service::{self, NewUser};
use crate::database::{repository, DatabaseManager};
use crate::handlers::public::auth::register::MIN_PASSWORD_LEN;

#[derive(Args)]
pub struct CreateUserArgs {
    #[arg(long, help = "Display name")]
    pub name: String,
    #[arg(long, help = "Login email")]
    pub email: String,
    #[arg(long, help = "Initial password")]
    pub password: String,
    #[arg(long, help = "student, vendor or admin")]
    pub role: Role,
    #[arg(long, help = "Vendor the account belongs to (required for vendor accounts)")]
    pub vendor_id: Option<Uuid>,
}

pub async fn create(args: CreateUserArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    if args.password.chars().count() < MIN_PASSWORD_LEN {
        anyhow::bail!("Password must be at least {MIN_PASSWORD_LEN} characters");
    }
    let domain = &config::config().institution.email_domain;
    if args.role == Role::Student && !is_institutional_email(&args.email, domain) {
        anyhow::bail!("Student accounts need an @{domain} email");
    }

    let pool = DatabaseManager::pool().await?;
    match (args.role, args.vendor_id) {
        (Role::Vendor, None) => anyhow::bail!("--vendor-id is required for vendor accounts"),
        (_, Some(vendor_id)) => {
            if repository::find_vendor(&pool, vendor_id).await?.is_none() {
                anyhow::bail!("Vendor {vendor_id} not found");
            }
        }
        _ => {}
    }

    let user = service::insert_user(
        &pool,
        &NewUser {
            name: args.name,
            email: args.email,
            password_hash: hash_password(args.password).await?,
            role: args.role,
            vendor_id: args.vendor_id,
        },
    )
    .await?;

    output_success(
        output_format,
        &format!("Created {} account {} ({})", user.role, user.email, user.id),
        Some(json!({ "user": user })),
    )
}
