//! USD valuation of a wallet's trading
//!
//! Market caps at trade time are approximations: they scale the current
//! market cap by the ratio between the wallet's average trade price and the
//! current token price, assuming constant supply.

use serde::{Deserialize, Serialize};

/// Current market data for the token
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSnapshot {
    pub price_usd: f64,
    pub price_change_24h: f64,
    pub volume_24h_usd: f64,
    pub liquidity_usd: f64,
    /// Fully diluted valuation of the most liquid pair
    pub market_cap: f64,
}

/// Everything the valuation needs from earlier stages
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ValuationInputs {
    pub buys: usize,
    pub sells: usize,
    pub total_bought: f64,
    pub total_sold: f64,
    pub bought_native: f64,
    pub sold_native: f64,
    pub balance: f64,
    pub token_price_usd: f64,
    pub native_price_usd: f64,
    pub market_cap: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Valuation {
    pub total_bought_usd: f64,
    pub total_sold_usd: f64,
    pub profit_loss: f64,
    pub profit_loss_usd: f64,
    pub is_profitable: bool,
    pub market_cap_at_buy: f64,
    pub market_cap_at_sell: f64,
    pub market_cap_ath: f64,
    pub holding_value_usd: f64,
}

/// USD value of one side, preferring native totals over the current token price
fn side_usd(native: f64, native_price: f64, tokens: f64, token_price: f64) -> f64 {
    if native > 0.0 && native_price > 0.0 {
        native * native_price
    } else {
        tokens * token_price
    }
}

/// Average USD price per token of one side, when every input is known
fn avg_price_usd(count: usize, native: f64, tokens: f64, inputs: &ValuationInputs) -> Option<f64> {
    let known = count > 0
        && inputs.token_price_usd > 0.0
        && native > 0.0
        && inputs.native_price_usd > 0.0
        && tokens > 0.0;
    if !known {
        return None;
    }
    let price = native / tokens * inputs.native_price_usd;
    (price > 0.0).then_some(price)
}

pub fn value_trades(inputs: &ValuationInputs) -> Valuation {
    let total_bought_usd = side_usd(
        inputs.bought_native,
        inputs.native_price_usd,
        inputs.total_bought,
        inputs.token_price_usd,
    );
    let total_sold_usd = side_usd(
        inputs.sold_native,
        inputs.native_price_usd,
        inputs.total_sold,
        inputs.token_price_usd,
    );

    // Token-denominated P&L: native gain converted at the average buy rate
    let profit_loss = if inputs.bought_native > 0.0 && inputs.sold_native > 0.0 {
        let tokens_per_native = inputs.total_bought / inputs.bought_native;
        (inputs.sold_native - inputs.bought_native) * tokens_per_native
    } else {
        inputs.total_sold - inputs.total_bought
    };

    let market_cap_at_buy = avg_price_usd(inputs.buys, inputs.bought_native, inputs.total_bought, inputs)
        .map(|price| inputs.market_cap / (price / inputs.token_price_usd))
        .unwrap_or(inputs.market_cap);

    let market_cap_at_sell = avg_price_usd(inputs.sells, inputs.sold_native, inputs.total_sold, inputs)
        .map(|price| inputs.market_cap * (price / inputs.token_price_usd))
        .unwrap_or(inputs.market_cap);

    let mut market_cap_ath = inputs.market_cap;
    for estimate in [market_cap_at_buy, market_cap_at_sell] {
        if estimate > 0.0 && estimate > market_cap_ath {
            market_cap_ath = estimate;
        }
    }

    Valuation {
        total_bought_usd,
        total_sold_usd,
        profit_loss,
        profit_loss_usd: total_sold_usd - total_bought_usd,
        is_profitable: profit_loss > 0.0,
        market_cap_at_buy,
        market_cap_at_sell,
        market_cap_ath,
        holding_value_usd: inputs.balance * inputs.token_price_usd,
    }
}
