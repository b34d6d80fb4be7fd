//! Post-payment settlement.
//!
//! Runs once per order when a payment webhook confirms funds: transitions
//! the order to `paid`, draws down stock by the shipped weights, books the
//! revenue split and counts the coupon use. The `pending -> paid` transition
//! is the idempotency gate; losing it means another delivery of the same
//! webhook already settled the order and nothing else may run.

use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::domain::events::{self, OrderEvent};
use crate::domain::finance::split_net_value;
use crate::domain::money::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementOutcome {
    /// This call performed the settlement.
    Settled,
    /// The order was already paid or dispatched; nothing was changed.
    AlreadySettled,
    /// No such order; the webhook is acknowledged and ignored.
    OrderNotFound,
}

pub async fn settle_order(
    pool: &PgPool,
    nats: Option<&async_nats::Client>,
    order_id: Uuid,
    net_value: Money,
) -> sqlx::Result<SettlementOutcome> {
    let Some(order) = db::find_order(pool, order_id).await? else {
        return Ok(SettlementOutcome::OrderNotFound);
    };

    if !db::mark_order_paid(pool, order_id).await? {
        tracing::info!(%order_id, "settlement replay ignored");
        return Ok(SettlementOutcome::AlreadySettled);
    }

    let items = db::fetch_order_items(pool, order_id).await?;
    for item in &items {
        db::decrement_stock(pool, item.product_id, item.weight_grams).await?;
    }

    let boxes = split_net_value(net_value.clamp_non_negative());
    db::insert_finance_boxes(pool, order_id, &boxes).await?;

    if let Some(code) = &order.coupon_code {
        db::register_coupon_use(pool, code).await?;
    }

    events::publish(
        nats,
        &OrderEvent::Paid { order_id, net_value_cents: net_value.cents() },
    )
    .await;

    tracing::info!(
        %order_id,
        net_value_cents = net_value.cents(),
        items = items.len(),
        "order settled"
    );
    Ok(SettlementOutcome::Settled)
}
