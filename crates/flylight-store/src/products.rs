//! Storefront products.

use crate::error::StoreResult;
use crate::Store;
use chrono::{DateTime, Utc};
use flylight_core::Product;

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: String,
    name: String,
    description: Option<String>,
    price: f64,
    stock: i64,
    category: Option<String>,
    image_url: Option<String>,
    seller_id: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            stock: row.stock,
            category: row.category,
            image_url: row.image_url,
            seller_id: row.seller_id,
            created_at: row.created_at,
        }
    }
}

impl Store {
    pub async fn insert_product(&self, p: &Product) -> StoreResult<()> {
        sqlx::query(
            r#"INSERT INTO products
                (id, name, description, price, stock, category, image_url, seller_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&p.id)
        .bind(&p.name)
        .bind(&p.description)
        .bind(p.price)
        .bind(p.stock)
        .bind(&p.category)
        .bind(&p.image_url)
        .bind(&p.seller_id)
        .bind(p.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn update_product(&self, p: &Product) -> StoreResult<()> {
        sqlx::query(
            r#"UPDATE products SET
                name = ?, description = ?, price = ?, stock = ?, category = ?, image_url = ?
            WHERE id = ?"#,
        )
        .bind(&p.name)
        .bind(&p.description)
        .bind(p.price)
        .bind(p.stock)
        .bind(&p.category)
        .bind(&p.image_url)
        .bind(&p.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn delete_product(&self, id: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn find_product(&self, id: &str) -> StoreResult<Option<Product>> {
        Ok(sqlx::query_as::<_, ProductRow>("SELECT * FROM products WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Product::from))
    }

    pub async fn list_products(&self) -> StoreResult<Vec<Product>> {
        Ok(sqlx::query_as::<_, ProductRow>("SELECT * FROM products ORDER BY rowid")
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Product::from)
            .collect())
    }

    pub async fn list_products_by_seller(&self, seller_id: &str) -> StoreResult<Vec<Product>> {
        Ok(sqlx::query_as::<_, ProductRow>(
            "SELECT * FROM products WHERE seller_id = ? ORDER BY rowid",
        )
        .bind(seller_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(Product::from)
        .collect())
    }

    pub async fn count_products(&self) -> StoreResult<i64> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flylight_core::{Role, User};

    #[tokio::test]
    async fn test_products_by_seller() {
        let store = Store::in_memory().await.unwrap();
        let admin = User::new("admin@flylight.com", "h", Role::Admin);
        store.insert_user(&admin).await.unwrap();

        let racket = Product::new("Racket", 1500.0).unwrap().with_stock(5).with_seller(&admin.id);
        let shuttles = Product::new("Shuttles", 400.0).unwrap();
        store.insert_product(&racket).await.unwrap();
        store.insert_product(&shuttles).await.unwrap();

        assert_eq!(store.list_products().await.unwrap().len(), 2);
        let own = store.list_products_by_seller(&admin.id).await.unwrap();
        assert_eq!(own.len(), 1);
        assert_eq!(own[0].stock, 5);
        assert_eq!(store.count_products().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_update_and_delete_product() {
        let store = Store::in_memory().await.unwrap();
        let mut product = Product::new("Grip", 120.0).unwrap();
        store.insert_product(&product).await.unwrap();

        product.stock = 9;
        product.category = Some("accessories".into());
        store.update_product(&product).await.unwrap();

        let stored = store.find_product(&product.id).await.unwrap().unwrap();
        assert_eq!(stored.stock, 9);
        assert_eq!(stored.category.as_deref(), Some("accessories"));

        assert!(store.delete_product(&product.id).await.unwrap());
        assert!(store.find_product(&product.id).await.unwrap().is_none());
    }
}
