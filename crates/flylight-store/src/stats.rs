//! Dashboard counters for an admin.

use crate::error::StoreResult;
use crate::Store;
use flylight_core::{PaymentStatus, ReferenceType};
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminStats {
    pub total_tournaments: usize,
    /// Registrations across the admin's tournaments
    pub total_players: usize,
    pub total_products: usize,
    /// Orders containing at least one of the admin's products
    pub total_orders: usize,
    /// Completed payments for those tournaments and orders, in major units
    pub total_revenue: f64,
    /// Pending payments across the whole store
    pub pending_payments: i64,
}

impl Store {
    pub async fn admin_stats(&self, admin_id: &str) -> StoreResult<AdminStats> {
        let tournaments = self.list_tournaments_by_creator(admin_id).await?;
        let mut total_players = 0;
        for t in &tournaments {
            total_players += self.list_registrations(&t.id).await?.len();
        }

        let products = self.list_products_by_seller(admin_id).await?;
        let product_ids: HashSet<&str> = products.iter().map(|p| p.id.as_str()).collect();

        let orders = self.list_orders().await?;
        let order_ids: HashSet<&str> = orders
            .iter()
            .filter(|o| o.items.iter().any(|i| product_ids.contains(i.product_id.as_str())))
            .map(|o| o.id.as_str())
            .collect();
        let tournament_ids: HashSet<&str> = tournaments.iter().map(|t| t.id.as_str()).collect();

        let total_revenue = self
            .list_payments_by_status(PaymentStatus::Completed)
            .await?
            .iter()
            .filter(|p| match p.reference_type {
                ReferenceType::Tournament => tournament_ids.contains(p.reference_id.as_str()),
                ReferenceType::Order => order_ids.contains(p.reference_id.as_str()),
            })
            .map(|p| p.amount.as_decimal())
            .sum();

        Ok(AdminStats {
            total_tournaments: tournaments.len(),
            total_players,
            total_products: products.len(),
            total_orders: order_ids.len(),
            total_revenue,
            pending_payments: self.count_payments_by_status(PaymentStatus::Pending).await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::tests::sample_order;
    use crate::tournaments::tests::sample_tournament;
    use flylight_core::{
        InitiatePayment, OrderItem, PaymentEngine, Product, Registration, Role, TransactionSigner,
        User, VerifyPayment,
    };
    use std::sync::Arc;

    #[tokio::test]
    async fn test_admin_stats_scoped_to_admin() {
        let store = Store::in_memory().await.unwrap();
        let admin = User::new("admin@flylight.com", "h", Role::Admin);
        let other = User::new("other@flylight.com", "h", Role::Admin);
        store.insert_user(&admin).await.unwrap();
        store.insert_user(&other).await.unwrap();

        store.insert_tournament(&sample_tournament("T1", Some(admin.id.as_str()))).await.unwrap();
        store.insert_tournament(&sample_tournament("T2", Some(other.id.as_str()))).await.unwrap();
        for (tid, email) in [("T1", "a@b.com"), ("T1", "c@d.com"), ("T2", "e@f.com")] {
            let reg = Registration::pending(tid, "Player", email, "1").unwrap();
            store.insert_registration(&reg).await.unwrap();
        }

        let racket = Product::new("Racket", 1500.0).unwrap().with_seller(&admin.id);
        store.insert_product(&racket).await.unwrap();
        store
            .insert_order(&sample_order(vec![OrderItem {
                product_id: racket.id.clone(),
                quantity: 1,
                price: 1500.0,
            }]))
            .await
            .unwrap();
        store
            .insert_order(&sample_order(vec![OrderItem {
                product_id: "someone-else".into(),
                quantity: 1,
                price: 10.0,
            }]))
            .await
            .unwrap();

        let engine = PaymentEngine::new(Arc::new(store.clone()), TransactionSigner::new("s"));
        let paid = engine
            .initiate(InitiatePayment {
                amount: 500.0,
                email: "a@b.com".into(),
                reference_id: "T1".into(),
                reference_type: "tournament".into(),
                currency: None,
                payment_method: None,
            })
            .await
            .unwrap();
        engine
            .verify(VerifyPayment {
                payment_id: paid.id.clone(),
                ..Default::default()
            })
            .await
            .unwrap();
        engine
            .initiate(InitiatePayment {
                amount: 500.0,
                email: "e@f.com".into(),
                reference_id: "T2".into(),
                reference_type: "tournament".into(),
                currency: None,
                payment_method: None,
            })
            .await
            .unwrap();

        let stats = store.admin_stats(&admin.id).await.unwrap();
        assert_eq!(stats.total_tournaments, 1);
        assert_eq!(stats.total_players, 2);
        assert_eq!(stats.total_products, 1);
        assert_eq!(stats.total_orders, 1);
        assert_eq!(stats.total_revenue, 500.0);
        assert_eq!(stats.pending_payments, 1);
    }
}
