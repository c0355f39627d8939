use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHasher};
use dotenvy::dotenv;
use std::env;

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hash_password=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let Some(password) = env::args()
        .nth(1)
        .or_else(|| env::var("CATALOG_ADMIN_PASSWORD").ok())
        .filter(|p| !p.is_empty())
    else {
        error!("❌ No password given.");
        info!("Usage: hash_password <password>  (or set CATALOG_ADMIN_PASSWORD)");
        std::process::exit(1);
    };

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("failed to hash password: {}", e))?;

    info!("🔐 Put this value in CATALOG_ADMIN_PASSWORD_HASH:");
    println!("{}", hash);
    Ok(())
}
