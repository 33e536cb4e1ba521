use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use game_store_api::{config::AppConfig, db::create_pool};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let admin_id = ensure_account(&pool, "admin", "admin@example.com", "admin123", "admin").await?;
    let user_id = ensure_account(&pool, "player1", "user@example.com", "user123", "user").await?;
    seed_catalog(&pool).await?;

    println!("Seed completed. Admin ID: {admin_id}, User ID: {user_id}");
    Ok(())
}

async fn ensure_account(
    pool: &sqlx::PgPool,
    nickname: &str,
    email: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO users (id, nickname, email, password_hash, role_id)
        VALUES ($1, $2, $3, $4, (SELECT id FROM roles WHERE kind = $5))
        ON CONFLICT (email) DO UPDATE SET role_id = EXCLUDED.role_id
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(nickname)
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .fetch_optional(pool)
    .await?;

    // If the account already exists, fetch its id.
    let user_id = match row {
        Some((id,)) => id,
        None => {
            let existing: (Uuid,) = sqlx::query_as("SELECT id FROM users WHERE email = $1")
                .bind(email)
                .fetch_one(pool)
                .await?;
            existing.0
        }
    };

    // Every account gets its singleton cart, favorite and library rows.
    for table in ["carts", "favorites", "libraries"] {
        let sql = format!(
            "INSERT INTO {table} (id, user_id) VALUES ($1, $2) ON CONFLICT (user_id) DO NOTHING"
        );
        sqlx::query(&sql)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .execute(pool)
            .await?;
    }

    println!("Ensured account {email} (role={role})");
    Ok(user_id)
}

async fn seed_catalog(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let developers = vec![
        ("Crab Forge", "USA", "Indie studio", "https://crabforge.example"),
        ("Borrow Checkers", "Germany", "Co-op specialists", "https://borrowcheckers.example"),
    ];
    for (name, country, desc, url) in developers {
        sqlx::query(
            r#"
            INSERT INTO developers (id, name, country, description, website_url)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(country)
        .bind(desc)
        .bind(url)
        .execute(pool)
        .await?;
    }

    let categories = vec![
        ("Action", "Fast paced games"),
        ("Strategy", "Think before you click"),
        ("Indie", "Small studio gems"),
    ];
    for (name, desc) in categories {
        sqlx::query(
            r#"
            INSERT INTO categories (id, name, description)
            VALUES ($1, $2, $3)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(desc)
        .execute(pool)
        .await?;
    }

    // Prices are integer cents.
    let games = vec![
        ("Ferris Quest", "Save the beach, one crab at a time", 1999_i64, "Crab Forge", "Action"),
        ("Lifetime Wars", "Outlive your rivals", 2999_i64, "Borrow Checkers", "Strategy"),
        ("Mutex Garden", "A peaceful puzzler about sharing", 999_i64, "Crab Forge", "Indie"),
        ("Async Abyss", "Dive deep, await nothing", 2499_i64, "Borrow Checkers", "Action"),
    ];
    for (title, desc, price, dev, cat) in games {
        sqlx::query(
            r#"
            INSERT INTO games (id, title, description, price, developer_id, category_id)
            SELECT $1, $2, $3, $4, d.id, c.id
            FROM developers d, categories c
            WHERE d.name = $5 AND c.name = $6
              AND NOT EXISTS (SELECT 1 FROM games WHERE title = $2)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(title)
        .bind(desc)
        .bind(price)
        .bind(dev)
        .bind(cat)
        .execute(pool)
        .await?;
    }

    println!("Seeded catalog");
    Ok(())
}
