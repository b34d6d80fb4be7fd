//! Development seed: a small catalog and a welcome coupon. Idempotent, keyed
//! on slugs and coupon codes.

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

struct CategorySeed {
    name: &'static str,
    slug: &'static str,
    description: &'static str,
    sort_order: i32,
}

struct ProductSeed {
    name: &'static str,
    slug: &'static str,
    description: &'static str,
    category_slug: &'static str,
    price_per_kg_cents: i64,
    stock_grams: i64,
}

const CATEGORIES: &[CategorySeed] = &[
    CategorySeed {
        name: "Castanhas",
        slug: "castanhas",
        description: "Selecao premium de castanhas brasileiras",
        sort_order: 1,
    },
    CategorySeed {
        name: "Mix Gourmet",
        slug: "mix",
        description: "Combos autorais para rituais de bem-estar",
        sort_order: 2,
    },
    CategorySeed {
        name: "Edicoes Limitadas",
        slug: "limitadas",
        description: "Curadoria sazonal em tiragens reduzidas",
        sort_order: 3,
    },
];

const PRODUCTS: &[ProductSeed] = &[
    ProductSeed {
        name: "Castanha do Para Premium",
        slug: "castanha-do-para-premium",
        description: "Castanhas selecionadas da Amazonia brasileira",
        category_slug: "castanhas",
        price_per_kg_cents: 8990,
        stock_grams: 50_000,
    },
    ProductSeed {
        name: "Castanha de Caju Torrada",
        slug: "castanha-de-caju-torrada",
        description: "Caju premium levemente torrado",
        category_slug: "castanhas",
        price_per_kg_cents: 6990,
        stock_grams: 42_000,
    },
    ProductSeed {
        name: "Mix Gourmet Tropical",
        slug: "mix-gourmet-tropical",
        description: "Castanhas e frutas secas em equilibrio perfeito",
        category_slug: "mix",
        price_per_kg_cents: 7990,
        stock_grams: 35_000,
    },
    ProductSeed {
        name: "Mix Energia Plus",
        slug: "mix-energia-plus",
        description: "Selecao para alto desempenho",
        category_slug: "mix",
        price_per_kg_cents: 9490,
        stock_grams: 28_000,
    },
];

async fn seed(pool: &PgPool) -> Result<()> {
    for category in CATEGORIES {
        sqlx::query(
            "INSERT INTO categories (id, name, slug, description, sort_order, active, created_at)
             VALUES ($1, $2, $3, $4, $5, TRUE, NOW())
             ON CONFLICT (slug) DO NOTHING",
        )
        .bind(Uuid::now_v7())
        .bind(category.name)
        .bind(category.slug)
        .bind(category.description)
        .bind(category.sort_order)
        .execute(pool)
        .await?;
    }

    for product in PRODUCTS {
        sqlx::query(
            "INSERT INTO products
               (id, name, slug, description, category_id, price_per_kg_cents,
                stock_grams, active, created_at, updated_at)
             SELECT $1, $2, $3, $4, c.id, $6, $7, TRUE, NOW(), NOW()
             FROM categories c WHERE c.slug = $5
             ON CONFLICT (slug) DO NOTHING",
        )
        .bind(Uuid::now_v7())
        .bind(product.name)
        .bind(product.slug)
        .bind(product.description)
        .bind(product.category_slug)
        .bind(product.price_per_kg_cents)
        .bind(product.stock_grams)
        .execute(pool)
        .await?;
    }

    sqlx::query(
        "INSERT INTO coupons
           (id, code, description, discount_type, discount_value, min_order_value,
            max_uses, used_count, is_active, created_at)
         VALUES ($1, 'BEMVINDO10', '10% na primeira compra', 'percentage', 10, NULL,
                 NULL, 0, TRUE, NOW())
         ON CONFLICT (code) DO NOTHING",
    )
    .bind(Uuid::now_v7())
    .execute(pool)
    .await?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;

    let pool = PgPoolOptions::new().max_connections(2).connect(&database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    seed(&pool).await?;

    println!("seeded {} categories and {} products", CATEGORIES.len(), PRODUCTS.len());
    Ok(())
}
