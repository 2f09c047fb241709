use std::fmt;

use serde::Deserialize;
use serde_json::Value;

/// A value the storefront sends either as a JSON string or a number
/// (totals, prices, quantities, order ids all vary between the two).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Str(String),
    Num(serde_json::Number),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Str(s) => f.write_str(s),
            Scalar::Num(n) => write!(f, "{n}"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderItem {
    pub title: Option<String>,
    pub name: Option<String>,
    pub quantity: Option<Scalar>,
    pub price: Option<Scalar>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Order {
    pub id: Option<Scalar>,
    pub number: Option<Scalar>,
    pub total: Option<Scalar>,
    pub currency: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

/// `order_created_client` — the `order` object itself is required.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderCreated {
    pub order: Order,
}

/// `callback_request_client` — every field optional.
#[derive(Debug, Clone, Deserialize)]
pub struct CallbackRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub page: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessItem {
    pub name: Option<String>,
    pub price_per_unit: Option<Scalar>,
    pub quantity: Option<Scalar>,
    pub total: Option<Scalar>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessOrder {
    pub date: Option<String>,
    pub order_number: Option<Scalar>,
    pub customer_name: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
    pub delivery_method: Option<String>,
    pub payment_method: Option<String>,
    #[serde(default)]
    pub items: Vec<SuccessItem>,
    pub total: Option<Scalar>,
}

/// `order_success_page_hit` — `orderData` may be absent or null entirely.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSuccess {
    pub order_data: Option<SuccessOrder>,
    pub url: Option<String>,
}

/// An incoming webhook payload, discriminated on its `event` field.
///
/// Unrecognized (or missing) tags fall through to `Unknown`, which keeps the
/// raw payload for the diagnostic dump. A known tag with a structurally
/// invalid body is a deserialization error surfaced to the caller.
#[derive(Debug, Clone)]
pub enum WebhookEvent {
    OrderCreated(OrderCreated),
    CallbackRequest(CallbackRequest),
    OrderSuccess(OrderSuccess),
    Unknown {
        tag: Option<String>,
        payload: Value,
    },
}

impl WebhookEvent {
    pub fn from_payload(payload: &Value) -> Result<Self, serde_json::Error> {
        let tag = payload.get("event").and_then(Value::as_str);
        match tag {
            Some("order_created_client") => {
                serde_json::from_value(payload.clone()).map(Self::OrderCreated)
            }
            Some("callback_request_client") => {
                serde_json::from_value(payload.clone()).map(Self::CallbackRequest)
            }
            Some("order_success_page_hit") => {
                serde_json::from_value(payload.clone()).map(Self::OrderSuccess)
            }
            _ => Ok(Self::Unknown {
                tag: tag.map(str::to_string),
                payload: payload.clone(),
            }),
        }
    }
}
