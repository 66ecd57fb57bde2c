use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::SystemTime;

/// Whether the request opens or closes exposure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderAction {
    Buy,
    Sell,
}

impl fmt::Display for OrderAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderAction::Buy => write!(f, "buy"),
            OrderAction::Sell => write!(f, "sell"),
        }
    }
}

/// Binary-option contract leg. Yes and no prices always sum to 100 cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Yes,
    No,
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderSide::Yes => write!(f, "yes"),
            OrderSide::No => write!(f, "no"),
        }
    }
}

/// The venue trades limit orders only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Limit,
}

impl Default for OrderType {
    fn default() -> Self {
        OrderType::Limit
    }
}

/// Time-in-force for a new order. Defaults to good-til-canceled on the wire
/// when unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeInForce {
    Day,
    Gtc,
    Ioc,
    Fok,
}

/// Self-trade prevention mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelfTradePrevention {
    /// Incoming order is canceled when it would match own resting order.
    CancelNewOrder,
    /// Resting order is canceled instead.
    CancelRestingOrder,
}

/// Observable order state as reported by the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Open in the book (new, partially filled, pending, or replaced).
    Resting,
    /// Fully filled.
    Executed,
    Canceled,
    Rejected,
    Expired,
    /// Reported with a status this crate does not recognize.
    Unknown,
}

impl OrderStatus {
    /// Terminal states can no longer transition.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Executed | OrderStatus::Canceled | OrderStatus::Rejected | OrderStatus::Expired
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderStatus::Resting => "resting",
            OrderStatus::Executed => "executed",
            OrderStatus::Canceled => "canceled",
            OrderStatus::Rejected => "rejected",
            OrderStatus::Expired => "expired",
            OrderStatus::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

/// Immutable snapshot of an order's observable state.
///
/// `yes_price + no_price == 100` and, for non-terminal reports,
/// `fill_count + remaining_count == initial_count`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Exchange-assigned identifier, empty until acknowledged.
    pub order_id: String,
    /// Caller correlation identifier (ClOrdID on the wire).
    pub client_order_id: String,
    pub ticker: String,
    pub action: OrderAction,
    pub side: OrderSide,
    pub order_type: OrderType,
    /// Yes-leg price in cents (1-99).
    pub yes_price: i32,
    /// No-leg price in cents, always `100 - yes_price`.
    pub no_price: i32,
    pub initial_count: i32,
    pub fill_count: i32,
    pub remaining_count: i32,
    pub status: OrderStatus,
    pub last_update: SystemTime,
}

impl Default for Order {
    fn default() -> Self {
        Self {
            order_id: String::new(),
            client_order_id: String::new(),
            ticker: String::new(),
            action: OrderAction::Buy,
            side: OrderSide::Yes,
            order_type: OrderType::Limit,
            yes_price: 0,
            no_price: 0,
            initial_count: 0,
            fill_count: 0,
            remaining_count: 0,
            status: OrderStatus::Unknown,
            last_update: SystemTime::UNIX_EPOCH,
        }
    }
}

impl Order {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// True while the order can still trade.
    pub fn is_active(&self) -> bool {
        self.status == OrderStatus::Resting
    }
}

/// Request to place a new limit order.
///
/// Exactly one of `yes_price` / `no_price` is required (both given is
/// accepted; the yes price wins). `count` must be positive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub ticker: String,
    pub action: OrderAction,
    pub side: OrderSide,
    pub count: i32,
    pub yes_price: Option<i32>,
    pub no_price: Option<i32>,
    /// Caller-chosen correlation id; generated when absent.
    pub client_order_id: Option<String>,
    pub time_in_force: Option<TimeInForce>,
    pub post_only: Option<bool>,
    pub self_trade_prevention: Option<SelfTradePrevention>,
    pub cancel_on_pause: Option<bool>,
    pub order_group_id: Option<String>,
    /// Cap on total execution cost in cents, buy orders only.
    pub buy_max_cost: Option<i64>,
}

impl Default for CreateOrderRequest {
    fn default() -> Self {
        Self {
            ticker: String::new(),
            action: OrderAction::Buy,
            side: OrderSide::Yes,
            count: 0,
            yes_price: None,
            no_price: None,
            client_order_id: None,
            time_in_force: None,
            post_only: None,
            self_trade_prevention: None,
            cancel_on_pause: None,
            order_group_id: None,
            buy_max_cost: None,
        }
    }
}

impl CreateOrderRequest {
    /// Minimal well-formed request; optional fields via struct update syntax.
    pub fn limit(
        ticker: &str,
        action: OrderAction,
        side: OrderSide,
        count: i32,
        yes_price: Option<i32>,
        no_price: Option<i32>,
    ) -> Self {
        Self {
            ticker: ticker.to_string(),
            action,
            side,
            count,
            yes_price,
            no_price,
            ..Default::default()
        }
    }
}

/// Request to modify a resting order. At least one field must be set; when
/// both prices are given the yes price wins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AmendOrderRequest {
    pub yes_price: Option<i32>,
    pub no_price: Option<i32>,
    /// New total count; remaining becomes `count - fill_count`.
    pub count: Option<i32>,
}

impl AmendOrderRequest {
    pub fn is_empty(&self) -> bool {
        self.yes_price.is_none() && self.no_price.is_none() && self.count.is_none()
    }
}
