//! Seed the product catalog from a YAML file.
//!
//! The file holds the full catalog; seeding upserts by product name so it
//! can be re-run after edits. With `--replace`, products absent from the
//! file are soft-deactivated (never deleted, so existing cart lines and
//! reviews keep their references).
//!
//! # File Format
//!
//! ```yaml
//! products:
//!   - name: "Volt 14 Laptop"
//!     description: "14-inch ultrabook, 16 GB RAM"
//!     price: "1299.00"
//!     stock: 25
//!     category: "laptops"
//!     image_path: "/static/img/volt-14.jpg"
//! ```

use std::path::Path;

use rust_decimal::Decimal;
use secrecy::SecretString;
use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;

/// Errors from the seed command.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid catalog entry \"{name}\": {problem}")]
    InvalidEntry { name: String, problem: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Top-level catalog file structure.
#[derive(Debug, Deserialize)]
pub struct CatalogFile {
    pub products: Vec<CatalogProduct>,
}

/// One product entry in the catalog file.
#[derive(Debug, Deserialize)]
pub struct CatalogProduct {
    pub name: String,
    pub description: String,
    pub price: Option<Decimal>,
    pub stock: Option<i32>,
    pub category: Option<String>,
    pub image_path: Option<String>,
}

/// Seed the product catalog from a YAML file.
///
/// # Errors
///
/// Returns `SeedError` if the file is missing or malformed, an entry fails
/// validation, or a database operation fails.
pub async fn products(file_path: &str, replace: bool) -> Result<(), SeedError> {
    dotenvy::dotenv().ok();

    let database_url = database_url()?;

    let path = Path::new(file_path);
    if !path.exists() {
        return Err(SeedError::FileNotFound(file_path.to_owned()));
    }

    info!(path = %file_path, "Loading catalog from file");

    // Read and validate the YAML before touching the database.
    let content = tokio::fs::read_to_string(path).await?;
    let catalog: CatalogFile = serde_yaml::from_str(&content)?;
    validate_catalog(&catalog)?;

    info!(products = catalog.products.len(), "Parsed catalog");

    let pool = create_pool(&database_url).await?;
    info!("Connected to database");

    let mut upserted = 0usize;
    for product in &catalog.products {
        upsert_product(&pool, product).await?;
        upserted += 1;
    }

    if replace {
        let deactivated = deactivate_missing(&pool, &catalog).await?;
        info!(deactivated, "Deactivated products missing from the file");
    }

    info!(upserted, "Seeding complete!");
    Ok(())
}

/// Validate every catalog entry before any insert.
fn validate_catalog(catalog: &CatalogFile) -> Result<(), SeedError> {
    for product in &catalog.products {
        let invalid = |problem: &str| SeedError::InvalidEntry {
            name: product.name.clone(),
            problem: problem.to_owned(),
        };

        if product.name.trim().is_empty() {
            return Err(invalid("name is empty"));
        }
        if product.name.len() > 255 {
            return Err(invalid("name is longer than 255 characters"));
        }
        if let Some(price) = product.price
            && price < Decimal::ZERO
        {
            return Err(invalid("price is negative"));
        }
        if let Some(stock) = product.stock
            && stock < 0
        {
            return Err(invalid("stock is negative"));
        }
    }
    Ok(())
}

/// Upsert one product by name, reactivating it if previously deactivated.
async fn upsert_product(pool: &PgPool, product: &CatalogProduct) -> Result<(), SeedError> {
    sqlx::query(
        r"
        INSERT INTO storefront.product
            (name, description, price, stock, category, image_path, is_active)
        VALUES ($1, $2, $3, $4, $5, $6, TRUE)
        ON CONFLICT (name) DO UPDATE SET
            description = EXCLUDED.description,
            price = EXCLUDED.price,
            stock = EXCLUDED.stock,
            category = EXCLUDED.category,
            image_path = EXCLUDED.image_path,
            is_active = TRUE,
            updated_at = NOW()
        ",
    )
    .bind(&product.name)
    .bind(&product.description)
    .bind(product.price)
    .bind(product.stock)
    .bind(&product.category)
    .bind(&product.image_path)
    .execute(pool)
    .await?;

    Ok(())
}

/// Soft-deactivate products not named in the catalog file.
async fn deactivate_missing(pool: &PgPool, catalog: &CatalogFile) -> Result<u64, SeedError> {
    let names: Vec<String> = catalog.products.iter().map(|p| p.name.clone()).collect();

    let result = sqlx::query(
        r"
        UPDATE storefront.product
        SET is_active = FALSE, updated_at = NOW()
        WHERE is_active AND name <> ALL($1)
        ",
    )
    .bind(&names)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Resolve the database URL, preferring the storefront-specific variable.
fn database_url() -> Result<SecretString, SeedError> {
    std::env::var("STOREFRONT_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| SeedError::MissingEnvVar("STOREFRONT_DATABASE_URL"))
}

/// Connect to the storefront database.
async fn create_pool(database_url: &SecretString) -> Result<PgPool, sqlx::Error> {
    use secrecy::ExposeSecret;
    PgPool::connect(database_url.expose_secret()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, price: Option<Decimal>, stock: Option<i32>) -> CatalogProduct {
        CatalogProduct {
            name: name.to_owned(),
            description: "desc".to_owned(),
            price,
            stock,
            category: None,
            image_path: None,
        }
    }

    #[test]
    fn test_parse_catalog_yaml() {
        let yaml = r#"
products:
  - name: "Volt 14 Laptop"
    description: "14-inch ultrabook"
    price: "1299.00"
    stock: 25
    category: "laptops"
  - name: "Mystery Box"
    description: "Price on request"
"#;
        let catalog: CatalogFile = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(catalog.products.len(), 2);
        assert_eq!(
            catalog.products[0].price,
            Some(Decimal::new(129_900, 2))
        );
        assert_eq!(catalog.products[1].price, None);
        assert_eq!(catalog.products[1].stock, None);
    }

    #[test]
    fn test_validate_rejects_negative_price() {
        let catalog = CatalogFile {
            products: vec![entry("Widget", Some(Decimal::new(-1, 0)), Some(3))],
        };
        assert!(matches!(
            validate_catalog(&catalog),
            Err(SeedError::InvalidEntry { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_empty_name() {
        let catalog = CatalogFile {
            products: vec![entry("   ", None, None)],
        };
        assert!(validate_catalog(&catalog).is_err());
    }

    #[test]
    fn test_validate_accepts_untracked_stock() {
        let catalog = CatalogFile {
            products: vec![entry("Widget", Some(Decimal::new(999, 2)), None)],
        };
        assert!(validate_catalog(&catalog).is_ok());
    }
}
