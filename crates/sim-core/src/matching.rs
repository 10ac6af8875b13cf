//! Price-time priority matching.
//!
//! An incoming order consumes the opposite side best-price-first, FIFO within
//! each level. Trades execute at the resting order's price. Limit remainders
//! rest; market remainders are discarded (immediate-or-cancel).

use types::{Order, OrderSide, OrderType, Trade, now_millis};

use crate::book::BookCore;
use crate::error::{BookError, Result};

/// Validate and match an incoming order against the book.
///
/// Returns the trades in match order. Rejected orders produce `Err` and
/// leave the book untouched; the command layer turns that into the empty
/// trade list callers observe.
pub(crate) fn execute(book: &mut BookCore, mut order: Order) -> Result<Vec<Trade>> {
    validate(&order)?;

    let opposite = order.side.opposite();
    let mut trades = Vec::new();

    while !order.remaining_quantity.is_zero() {
        let Some(best) = book.best_price(opposite) else {
            break;
        };
        if let Some(limit) = order.limit_price() {
            let crosses = match order.side {
                OrderSide::Buy => best <= limit,
                OrderSide::Sell => best >= limit,
            };
            if !crosses {
                break;
            }
        }

        let Some((resting_agent, resting_order, resting_qty)) = book.peek_front(opposite) else {
            debug_assert!(false, "non-empty side with no front order");
            break;
        };

        let fill = order.remaining_quantity.min(resting_qty);
        let (buyer_id, seller_id, buyer_order_id, seller_order_id) = match order.side {
            OrderSide::Buy => (order.agent_id, resting_agent, order.id, resting_order),
            OrderSide::Sell => (resting_agent, order.agent_id, resting_order, order.id),
        };
        trades.push(Trade {
            price: best,
            quantity: fill,
            buyer_id,
            seller_id,
            buyer_order_id,
            seller_order_id,
            timestamp: now_millis(),
        });

        order.remaining_quantity -= fill;
        book.fill_front(opposite, fill);
        book.set_last_price(best);
    }

    if !order.remaining_quantity.is_zero()
        && matches!(order.order_type, OrderType::Limit { .. })
    {
        book.rest(order);
    }

    Ok(trades)
}

fn validate(order: &Order) -> Result<()> {
    if order.remaining_quantity.is_zero() {
        return Err(BookError::ZeroQuantity);
    }
    if let OrderType::Limit { price } = order.order_type
        && !price.is_positive()
    {
        return Err(BookError::InvalidPrice);
    }
    Ok(())
}
