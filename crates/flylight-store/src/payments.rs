//! Payments and the transactional ledger behind the payment engine.

use crate::error::{StoreError, StoreResult};
use crate::Store;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use flylight_core::{
    Currency, FlylightResult, OrderItem, OrderStatus, Payment, PaymentLedger, PaymentStatus,
    Price, ReferenceType, RegistrationStatus, Settlement,
};
use sqlx::SqliteConnection;
use tracing::{debug, warn};

#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    id: String,
    transaction_id: String,
    amount_minor: i64,
    currency: String,
    payment_method: Option<String>,
    user_email: String,
    reference_id: String,
    reference_type: String,
    status: String,
    payment_reference: Option<String>,
    payment_proof_url: Option<String>,
    verification_token: String,
    transaction_hash: String,
    created_at: DateTime<Utc>,
    verified_at: Option<DateTime<Utc>>,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = StoreError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        let currency = Currency::parse(&row.currency).ok_or_else(|| {
            StoreError::corrupt("payments", format!("currency '{}'", row.currency))
        })?;
        let reference_type = ReferenceType::parse(&row.reference_type)
            .map_err(|e| StoreError::corrupt("payments", e.to_string()))?;
        let status = PaymentStatus::parse(&row.status)
            .ok_or_else(|| StoreError::corrupt("payments", format!("status '{}'", row.status)))?;

        Ok(Payment {
            id: row.id,
            transaction_id: row.transaction_id,
            amount: Price::from_minor(row.amount_minor, currency),
            payment_method: row.payment_method,
            user_email: row.user_email,
            reference_id: row.reference_id,
            reference_type,
            status,
            payment_reference: row.payment_reference,
            payment_proof_url: row.payment_proof_url,
            verification_token: row.verification_token,
            transaction_hash: row.transaction_hash,
            created_at: row.created_at,
            verified_at: row.verified_at,
        })
    }
}

impl Store {
    pub async fn insert_payment(&self, p: &Payment) -> StoreResult<()> {
        sqlx::query(
            r#"INSERT INTO payments (
                id, transaction_id, amount_minor, currency, payment_method,
                user_email, reference_id, reference_type, status,
                payment_reference, payment_proof_url, verification_token,
                transaction_hash, created_at, verified_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&p.id)
        .bind(&p.transaction_id)
        .bind(p.amount.amount)
        .bind(p.amount.currency.as_str())
        .bind(&p.payment_method)
        .bind(&p.user_email)
        .bind(&p.reference_id)
        .bind(p.reference_type.as_str())
        .bind(p.status.as_str())
        .bind(&p.payment_reference)
        .bind(&p.payment_proof_url)
        .bind(&p.verification_token)
        .bind(&p.transaction_hash)
        .bind(p.created_at)
        .bind(p.verified_at)
        .execute(&self.pool)
        .await
        .map_err(StoreError::on_unique("Payment identifiers collided"))?;
        Ok(())
    }

    pub async fn find_payment(&self, id: &str) -> StoreResult<Option<Payment>> {
        sqlx::query_as::<_, PaymentRow>("SELECT * FROM payments WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Payment::try_from)
            .transpose()
    }

    /// Record where an uploaded receipt for this payment lives
    pub async fn set_payment_proof(&self, id: &str, proof_url: &str) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE payments SET payment_proof_url = ? WHERE id = ?")
            .bind(proof_url)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list_payments_by_status(
        &self,
        status: PaymentStatus,
    ) -> StoreResult<Vec<Payment>> {
        sqlx::query_as::<_, PaymentRow>("SELECT * FROM payments WHERE status = ? ORDER BY rowid")
            .bind(status.as_str())
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Payment::try_from)
            .collect()
    }

    pub async fn count_payments_by_status(&self, status: PaymentStatus) -> StoreResult<i64> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM payments WHERE status = ?")
            .bind(status.as_str())
            .fetch_one(&self.pool)
            .await?)
    }

    async fn recent_completion(
        &self,
        user_email: &str,
        amount_minor: i64,
        reference_id: &str,
        since: DateTime<Utc>,
    ) -> StoreResult<bool> {
        // Timestamps are compared here rather than as TEXT in SQL.
        let verified: Vec<Option<DateTime<Utc>>> = sqlx::query_scalar(
            r#"SELECT verified_at FROM payments
            WHERE user_email = ? AND amount_minor = ? AND reference_id = ? AND status = ?"#,
        )
        .bind(user_email)
        .bind(amount_minor)
        .bind(reference_id)
        .bind(PaymentStatus::Completed.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(verified.into_iter().flatten().any(|at| at > since))
    }

    async fn settle(&self, payment: &Payment) -> StoreResult<Settlement> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "UPDATE payments SET status = ?, verified_at = ?, payment_reference = ? WHERE id = ?",
        )
        .bind(payment.status.as_str())
        .bind(payment.verified_at)
        .bind(&payment.payment_reference)
        .bind(&payment.id)
        .execute(&mut *tx)
        .await?;

        let settlement = match payment.reference_type {
            ReferenceType::Tournament => confirm_registration(&mut *tx, payment).await?,
            ReferenceType::Order => confirm_order(&mut *tx, payment).await?,
        };

        tx.commit().await?;
        Ok(settlement)
    }
}

/// Confirm the earliest pending registration for (tournament, payer)
async fn confirm_registration(
    conn: &mut SqliteConnection,
    payment: &Payment,
) -> StoreResult<Settlement> {
    let registration_id: Option<String> = sqlx::query_scalar(
        r#"SELECT id FROM tournament_registrations
        WHERE tournament_id = ? AND email = ? AND status = ?
        ORDER BY joined_at, rowid
        LIMIT 1"#,
    )
    .bind(&payment.reference_id)
    .bind(&payment.user_email)
    .bind(RegistrationStatus::Pending.as_str())
    .fetch_optional(&mut *conn)
    .await?;

    let Some(registration_id) = registration_id else {
        warn!(
            "No pending registration for {} in tournament {}",
            payment.user_email, payment.reference_id
        );
        return Ok(Settlement::Unmatched);
    };

    sqlx::query("UPDATE tournament_registrations SET status = ?, payment_id = ? WHERE id = ?")
        .bind(RegistrationStatus::Confirmed.as_str())
        .bind(&payment.id)
        .bind(&registration_id)
        .execute(&mut *conn)
        .await?;

    debug!("Registration {} confirmed", registration_id);
    Ok(Settlement::RegistrationConfirmed { registration_id })
}

/// Confirm the order and take its line quantities out of stock
async fn confirm_order(conn: &mut SqliteConnection, payment: &Payment) -> StoreResult<Settlement> {
    let items: Option<String> = sqlx::query_scalar("SELECT items FROM orders WHERE id = ?")
        .bind(&payment.reference_id)
        .fetch_optional(&mut *conn)
        .await?;

    let Some(items) = items else {
        warn!("Payment {} references unknown order {}", payment.id, payment.reference_id);
        return Ok(Settlement::Unmatched);
    };
    let items: Vec<OrderItem> = serde_json::from_str(&items)?;

    sqlx::query("UPDATE orders SET status = ?, payment_id = ? WHERE id = ?")
        .bind(OrderStatus::Confirmed.as_str())
        .bind(&payment.id)
        .bind(&payment.reference_id)
        .execute(&mut *conn)
        .await?;

    // Stock may go negative; products that no longer exist are skipped.
    let mut lines_adjusted = 0;
    for item in &items {
        let result = sqlx::query("UPDATE products SET stock = stock - ? WHERE id = ?")
            .bind(item.quantity)
            .bind(&item.product_id)
            .execute(&mut *conn)
            .await?;
        if result.rows_affected() > 0 {
            lines_adjusted += 1;
        } else {
            debug!("Skipping unknown product {}", item.product_id);
        }
    }

    Ok(Settlement::OrderConfirmed {
        order_id: payment.reference_id.clone(),
        lines_adjusted,
    })
}

#[async_trait]
impl PaymentLedger for Store {
    async fn insert_payment(&self, payment: &Payment) -> FlylightResult<()> {
        Ok(Store::insert_payment(self, payment).await?)
    }

    async fn find_payment(&self, payment_id: &str) -> FlylightResult<Option<Payment>> {
        Ok(Store::find_payment(self, payment_id).await?)
    }

    async fn has_recent_completion(
        &self,
        user_email: &str,
        amount_minor: i64,
        reference_id: &str,
        since: DateTime<Utc>,
    ) -> FlylightResult<bool> {
        Ok(self
            .recent_completion(user_email, amount_minor, reference_id, since)
            .await?)
    }

    async fn complete_and_settle(&self, payment: &Payment) -> FlylightResult<Settlement> {
        Ok(self.settle(payment).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::tests::sample_order;
    use crate::tournaments::tests::sample_tournament;
    use flylight_core::{
        InitiatePayment, PaymentEngine, Product, Registration, TransactionSigner, VerifyPayment,
    };
    use std::sync::Arc;

    fn engine(store: &Store) -> PaymentEngine {
        PaymentEngine::new(Arc::new(store.clone()), TransactionSigner::new("test-secret"))
    }

    fn initiate(
        amount: f64,
        email: &str,
        reference_id: &str,
        reference_type: &str,
    ) -> InitiatePayment {
        InitiatePayment {
            amount,
            email: email.into(),
            reference_id: reference_id.into(),
            reference_type: reference_type.into(),
            currency: None,
            payment_method: Some("upi".into()),
        }
    }

    fn verify(payment: &Payment) -> VerifyPayment {
        VerifyPayment {
            payment_id: payment.id.clone(),
            transaction_id: Some(payment.transaction_id.clone()),
            verification_token: Some(payment.verification_token.clone()),
            payment_reference: None,
        }
    }

    #[tokio::test]
    async fn test_payment_round_trip() {
        let store = Store::in_memory().await.unwrap();
        let payment = engine(&store)
            .initiate(initiate(199.99, "a@b.com", "O1", "order"))
            .await
            .unwrap();

        let stored = store.find_payment(&payment.id).await.unwrap().unwrap();
        assert_eq!(stored.amount.amount, 19999);
        assert_eq!(stored.transaction_hash, payment.transaction_hash);
        assert_eq!(stored.status, PaymentStatus::Pending);
        assert_eq!(store.count_payments_by_status(PaymentStatus::Pending).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_tournament_payment_confirms_exactly_one_registration() {
        let store = Store::in_memory().await.unwrap();
        store.insert_tournament(&sample_tournament("T1", None)).await.unwrap();
        let first = Registration::pending("T1", "Asha", "a@b.com", "1").unwrap();
        let second = Registration::pending("T1", "Asha", "a@b.com", "1").unwrap();
        let other = Registration::pending("T1", "Ravi", "r@b.com", "2").unwrap();
        for r in [&first, &second, &other] {
            store.insert_registration(r).await.unwrap();
        }

        let engine = engine(&store);
        let payment = engine
            .initiate(initiate(500.0, "a@b.com", "T1", "tournament"))
            .await
            .unwrap();
        let verified = engine.verify(verify(&payment)).await.unwrap();

        assert_eq!(
            verified.settlement,
            Settlement::RegistrationConfirmed { registration_id: first.id.clone() }
        );
        let registrations = store.list_registrations("T1").await.unwrap();
        let confirmed: Vec<_> = registrations
            .iter()
            .filter(|r| r.status == RegistrationStatus::Confirmed)
            .collect();
        assert_eq!(confirmed.len(), 1);
        assert_eq!(confirmed[0].id, first.id);
        assert_eq!(confirmed[0].payment_id.as_deref(), Some(payment.id.as_str()));
    }

    #[tokio::test]
    async fn test_order_payment_decrements_stock_below_zero() {
        let store = Store::in_memory().await.unwrap();
        let racket = Product::new("Racket", 1500.0).unwrap().with_stock(1);
        let grip = Product::new("Grip", 100.0).unwrap().with_stock(10);
        store.insert_product(&racket).await.unwrap();
        store.insert_product(&grip).await.unwrap();

        let order = sample_order(vec![
            OrderItem { product_id: racket.id.clone(), quantity: 3, price: 1500.0 },
            OrderItem { product_id: grip.id.clone(), quantity: 2, price: 100.0 },
            OrderItem { product_id: "gone".into(), quantity: 1, price: 10.0 },
        ]);
        store.insert_order(&order).await.unwrap();

        let engine = engine(&store);
        let payment = engine
            .initiate(initiate(order.total_amount, &order.email, &order.id, "order"))
            .await
            .unwrap();
        let verified = engine.verify(verify(&payment)).await.unwrap();

        assert_eq!(
            verified.settlement,
            Settlement::OrderConfirmed { order_id: order.id.clone(), lines_adjusted: 2 }
        );
        assert_eq!(store.find_product(&racket.id).await.unwrap().unwrap().stock, -2);
        assert_eq!(store.find_product(&grip.id).await.unwrap().unwrap().stock, 8);

        let stored = store.find_order(&order.id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Confirmed);
        assert_eq!(stored.payment_id.as_deref(), Some(payment.id.as_str()));
    }

    #[tokio::test]
    async fn test_duplicate_guard_against_store() {
        let store = Store::in_memory().await.unwrap();
        let engine = engine(&store);
        let first = engine.initiate(initiate(500.0, "a@b.com", "T9", "tournament")).await.unwrap();
        let second = engine.initiate(initiate(500.0, "a@b.com", "T9", "tournament")).await.unwrap();

        engine.verify(verify(&first)).await.unwrap();
        let err = engine.verify(verify(&second)).await.unwrap_err();
        assert_eq!(err.to_string(), "Duplicate payment detected");

        let second = store.find_payment(&second.id).await.unwrap().unwrap();
        assert_eq!(second.status, PaymentStatus::Pending);
        assert_eq!(store.list_payments_by_status(PaymentStatus::Completed).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_set_payment_proof() {
        let store = Store::in_memory().await.unwrap();
        let payment = engine(&store)
            .initiate(initiate(50.0, "a@b.com", "O1", "order"))
            .await
            .unwrap();

        assert!(store
            .set_payment_proof(&payment.id, "/uploads/payment-receipts/x.png")
            .await
            .unwrap());
        assert!(!store.set_payment_proof("missing", "/uploads/x.png").await.unwrap());
        let stored = store.find_payment(&payment.id).await.unwrap().unwrap();
        assert_eq!(stored.payment_proof_url.as_deref(), Some("/uploads/payment-receipts/x.png"));
    }
}
