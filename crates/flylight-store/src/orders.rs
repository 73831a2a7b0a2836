//! Customer orders. Line items are stored as a JSON array.

use crate::error::{StoreError, StoreResult};
use crate::Store;
use chrono::{DateTime, Utc};
use flylight_core::{Order, OrderStatus};

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: String,
    customer_name: String,
    email: String,
    phone: String,
    address: String,
    city: String,
    zip_code: String,
    items: String,
    total_amount: f64,
    payment_id: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = StoreError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status = OrderStatus::parse(&row.status)
            .ok_or_else(|| StoreError::corrupt("orders", format!("status '{}'", row.status)))?;

        Ok(Order {
            id: row.id,
            customer_name: row.customer_name,
            email: row.email,
            phone: row.phone,
            address: row.address,
            city: row.city,
            zip_code: row.zip_code,
            items: serde_json::from_str(&row.items)?,
            total_amount: row.total_amount,
            payment_id: row.payment_id,
            status,
            created_at: row.created_at,
        })
    }
}

impl Store {
    pub async fn insert_order(&self, o: &Order) -> StoreResult<()> {
        sqlx::query(
            r#"INSERT INTO orders (
                id, customer_name, email, phone, address, city, zip_code,
                items, total_amount, payment_id, status, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&o.id)
        .bind(&o.customer_name)
        .bind(&o.email)
        .bind(&o.phone)
        .bind(&o.address)
        .bind(&o.city)
        .bind(&o.zip_code)
        .bind(serde_json::to_string(&o.items)?)
        .bind(o.total_amount)
        .bind(&o.payment_id)
        .bind(o.status.as_str())
        .bind(o.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn find_order(&self, id: &str) -> StoreResult<Option<Order>> {
        sqlx::query_as::<_, OrderRow>("SELECT * FROM orders WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Order::try_from)
            .transpose()
    }

    pub async fn list_orders(&self) -> StoreResult<Vec<Order>> {
        sqlx::query_as::<_, OrderRow>("SELECT * FROM orders ORDER BY rowid")
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Order::try_from)
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use flylight_core::{NewOrder, OrderItem};

    pub(crate) fn sample_order(items: Vec<OrderItem>) -> Order {
        NewOrder {
            customer_name: "Ravi".into(),
            email: "ravi@example.com".into(),
            phone: "9999999999".into(),
            address: "12 MG Road".into(),
            city: "Pune".into(),
            zip_code: "411001".into(),
            items,
            total_amount: Some(1200.0),
        }
        .into_order()
        .unwrap()
    }

    #[tokio::test]
    async fn test_order_items_persist_in_order() {
        let store = Store::in_memory().await.unwrap();
        let order = sample_order(vec![
            OrderItem { product_id: "p2".into(), quantity: 1, price: 600.0 },
            OrderItem { product_id: "p1".into(), quantity: 2, price: 300.0 },
        ]);
        store.insert_order(&order).await.unwrap();

        let stored = store.find_order(&order.id).await.unwrap().unwrap();
        assert_eq!(stored.items, order.items);
        assert_eq!(stored.status, OrderStatus::Pending);
        assert_eq!(store.list_orders().await.unwrap().len(), 1);
    }
}
