//! Marketplace database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::gamification::db::debit_currency_tx;
use crate::gamification::types::Currency;
use crate::marketplace::types::{MarketplaceItem, Purchase};

const ITEM_COLUMNS: &str = "id, name, item_type, template_id, creator_id, price, file, \
     preview_image, description, purchases_count, rating, is_active, created_at, updated_at";

/// Active items, optionally narrowed to one type, most popular first.
pub async fn browse_items(
    pool: &PgPool,
    item_type: Option<&str>,
) -> Result<Vec<MarketplaceItem>, sqlx::Error> {
    let query = format!(
        "SELECT {ITEM_COLUMNS} FROM marketplace_items
         WHERE is_active AND ($1::text IS NULL OR item_type = $1)
         ORDER BY purchases_count DESC, created_at DESC"
    );
    sqlx::query_as::<_, MarketplaceItem>(&query)
        .bind(item_type)
        .fetch_all(pool)
        .await
}

pub async fn get_item(
    pool: &PgPool,
    item_id: Uuid,
) -> Result<Option<MarketplaceItem>, sqlx::Error> {
    let query = format!("SELECT {ITEM_COLUMNS} FROM marketplace_items WHERE id = $1 AND is_active");
    sqlx::query_as::<_, MarketplaceItem>(&query)
        .bind(item_id)
        .fetch_optional(pool)
        .await
}

pub async fn creator_username(pool: &PgPool, item: &MarketplaceItem) -> Result<String, sqlx::Error> {
    let (username,): (String,) = sqlx::query_as("SELECT username FROM users WHERE id = $1")
        .bind(item.creator_id)
        .fetch_one(pool)
        .await?;
    Ok(username)
}

pub async fn owns_item(pool: &PgPool, user_id: Uuid, item_id: Uuid) -> Result<bool, sqlx::Error> {
    let row: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM purchases WHERE user_id = $1 AND item_id = $2")
            .bind(user_id)
            .bind(item_id)
            .fetch_optional(pool)
            .await?;
    Ok(row.is_some())
}

/// Create a marketplace listing; template items also get a catalog entry so
/// buyers can instantiate notes from them.
pub async fn create_item(
    pool: &PgPool,
    creator_id: Uuid,
    name: &str,
    item_type: &str,
    price: i32,
    description: &str,
    preview_image: Option<&str>,
    template_content: Option<&str>,
) -> Result<MarketplaceItem, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let template_id = if item_type == "template" {
        let (id,): (Uuid,) = sqlx::query_as(
            "INSERT INTO note_templates (id, name, description, content, is_premium, price, creator_id, created_at)
             VALUES ($1, $2, $3, $4, TRUE, $5, $6, NOW())
             RETURNING id",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(description)
        .bind(template_content.unwrap_or(""))
        .bind(price)
        .bind(creator_id)
        .fetch_one(&mut *tx)
        .await?;
        Some(id)
    } else {
        None
    };

    let query = format!(
        "INSERT INTO marketplace_items
            (id, name, item_type, template_id, creator_id, price, description, preview_image, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW(), NOW())
         RETURNING {ITEM_COLUMNS}"
    );
    let item = sqlx::query_as::<_, MarketplaceItem>(&query)
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(item_type)
        .bind(template_id)
        .bind(creator_id)
        .bind(price)
        .bind(description)
        .bind(preview_image)
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(item)
}

/// Outcome of a purchase attempt.
pub enum PurchaseOutcome {
    Completed(Purchase, Currency),
    AlreadyOwned,
    InsufficientFunds,
}

/// Buy an item. One transaction covers the ownership record, the buyer's
/// debit, the creator's payout, and the popularity counter, so a failure at
/// any step leaves no trace.
pub async fn purchase_item(
    pool: &PgPool,
    buyer_id: Uuid,
    item: &MarketplaceItem,
) -> Result<PurchaseOutcome, sqlx::Error> {
    let mut tx = pool.begin().await?;

    // Uniqueness on (user, item) makes this insert the arbiter under
    // concurrent purchases of the same item.
    let purchase: Option<Purchase> = sqlx::query_as(
        "INSERT INTO purchases (id, user_id, item_id, purchased_at, price_paid)
         VALUES ($1, $2, $3, NOW(), $4)
         ON CONFLICT (user_id, item_id) DO NOTHING
         RETURNING id, user_id, item_id, purchased_at, price_paid",
    )
    .bind(Uuid::new_v4())
    .bind(buyer_id)
    .bind(item.id)
    .bind(item.price)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(purchase) = purchase else {
        tx.rollback().await?;
        return Ok(PurchaseOutcome::AlreadyOwned);
    };

    let currency = if item.price > 0 {
        let debited = debit_currency_tx(
            &mut tx,
            buyer_id,
            item.price,
            &format!("Purchased: {}", item.name),
        )
        .await?;
        let Some(currency) = debited else {
            tx.rollback().await?;
            return Ok(PurchaseOutcome::InsufficientFunds);
        };

        // Creator earns the sale price.
        sqlx::query(
            "INSERT INTO currencies (id, user_id, balance, total_earned, created_at, updated_at)
             VALUES ($1, $2, $3, $3, NOW(), NOW())
             ON CONFLICT (user_id) DO UPDATE
             SET balance = currencies.balance + $3,
                 total_earned = currencies.total_earned + $3,
                 updated_at = NOW()",
        )
        .bind(Uuid::new_v4())
        .bind(item.creator_id)
        .bind(item.price)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO transactions (id, user_id, amount, transaction_type, description, created_at)
             VALUES ($1, $2, $3, 'earn', $4, NOW())",
        )
        .bind(Uuid::new_v4())
        .bind(item.creator_id)
        .bind(item.price)
        .bind(format!("Sold: {}", item.name))
        .execute(&mut *tx)
        .await?;

        currency
    } else {
        // Free item: no coins move, report the untouched wallet.
        sqlx::query(
            "INSERT INTO currencies (id, user_id, created_at, updated_at)
             VALUES ($1, $2, NOW(), NOW())
             ON CONFLICT (user_id) DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(buyer_id)
        .execute(&mut *tx)
        .await?;
        sqlx::query_as::<_, Currency>(
            "SELECT id, user_id, balance, total_earned, total_spent, created_at, updated_at
             FROM currencies WHERE user_id = $1",
        )
        .bind(buyer_id)
        .fetch_one(&mut *tx)
        .await?
    };

    sqlx::query(
        "UPDATE marketplace_items SET purchases_count = purchases_count + 1, updated_at = NOW()
         WHERE id = $1",
    )
    .bind(item.id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(PurchaseOutcome::Completed(purchase, currency))
}

pub async fn list_purchases(pool: &PgPool, user_id: Uuid) -> Result<Vec<Purchase>, sqlx::Error> {
    sqlx::query_as::<_, Purchase>(
        "SELECT id, user_id, item_id, purchased_at, price_paid
         FROM purchases WHERE user_id = $1
         ORDER BY purchased_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}
