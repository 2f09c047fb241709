//! Pure formatting of webhook events into Telegram Markdown messages.
//!
//! Every function here is transport-free: missing optional fields render the
//! `—` placeholder (ids fall back to `N/A`) and never fail formatting.

use serde_json::Value;

use crate::event::{
    CallbackRequest, OrderCreated, OrderSuccess, Scalar, SuccessOrder, WebhookEvent,
};

/// Placeholder for missing optional fields.
const DASH: &str = "—";

/// Cap on the pretty-printed JSON dump for unrecognized events.
const RAW_DUMP_LIMIT: usize = 300;

/// Max title length in the order-created item list.
const ORDER_ITEM_TITLE_LIMIT: usize = 50;

/// Max product name length in the success-page item list.
const SUCCESS_ITEM_NAME_LIMIT: usize = 70;

/// Escape characters that legacy Telegram Markdown treats as markup.
pub fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '_' | '*' | '`' | '[') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Truncate to at most `max` characters, never splitting a UTF-8 char.
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

fn scalar_or(value: Option<&Scalar>, fallback: &str) -> String {
    value
        .map(Scalar::to_string)
        .unwrap_or_else(|| fallback.to_string())
}

fn text_or_dash(value: Option<&str>) -> String {
    value.map(escape_markdown).unwrap_or_else(|| DASH.to_string())
}

/// Render any webhook event to its Telegram message body.
pub fn render(event: &WebhookEvent) -> String {
    match event {
        WebhookEvent::OrderCreated(e) => format_order_created(e),
        WebhookEvent::CallbackRequest(e) => format_callback_request(e),
        WebhookEvent::OrderSuccess(e) => format_order_success(e),
        WebhookEvent::Unknown { tag, payload } => format_unknown(tag.as_deref(), payload),
    }
}

pub fn format_order_created(event: &OrderCreated) -> String {
    let order = &event.order;
    let mut msg = String::from("🛒 *НОВЕ ЗАМОВЛЕННЯ*\n\n");

    let id = order
        .id
        .as_ref()
        .or(order.number.as_ref())
        .map(Scalar::to_string)
        .unwrap_or_else(|| "N/A".to_string());
    msg.push_str(&format!("🔔 ID: `{id}`\n"));
    msg.push_str(&format!(
        "💵 Сума: *{} {}*\n",
        scalar_or(order.total.as_ref(), DASH),
        order.currency.as_deref().unwrap_or("UAH"),
    ));
    msg.push_str(&format!("📦 Товарів: {}\n", order.items.len()));

    if !order.items.is_empty() {
        msg.push_str("\n*Склад:*\n");
        for (idx, item) in order.items.iter().enumerate() {
            let title = item.title.as_deref().or(item.name.as_deref()).unwrap_or("Товар");
            let title = escape_markdown(&truncate_chars(title, ORDER_ITEM_TITLE_LIMIT));
            let qty = scalar_or(item.quantity.as_ref(), "1");
            let price = scalar_or(item.price.as_ref(), DASH);
            msg.push_str(&format!("{}. {title}\n   ×{qty} – {price}\n", idx + 1));
        }
    }

    msg
}

pub fn format_callback_request(event: &CallbackRequest) -> String {
    let mut msg = String::from("📞 *ЗАПИТ НА ДЗВІНОК*\n\n");
    msg.push_str(&format!("👤 Ім'я: {}\n", text_or_dash(event.name.as_deref())));
    msg.push_str(&format!(
        "📱 Телефон: `{}`\n",
        event.phone.as_deref().unwrap_or(DASH),
    ));
    msg.push_str(&format!("📧 Email: {}\n", text_or_dash(event.email.as_deref())));
    msg.push_str(&format!("🌐 Сторінка: {}", text_or_dash(event.page.as_deref())));
    msg
}

pub fn format_order_success(event: &OrderSuccess) -> String {
    let empty = SuccessOrder::default();
    let od = event.order_data.as_ref().unwrap_or(&empty);

    let mut msg = String::from("✅ *ЗАМОВЛЕННЯ УСПІШНО ОФОРМЛЕНО*\n\n");

    if let Some(date) = &od.date {
        msg.push_str(&format!("📅 *Дата:* {}\n", escape_markdown(date)));
    }
    if let Some(number) = &od.order_number {
        msg.push_str(&format!("🔔 *Замовлення №* `{number}`\n\n"));
    }

    msg.push_str("*👤 Замовник:*\n");
    if let Some(name) = &od.customer_name {
        msg.push_str(&format!("  Ім'я: {}\n", escape_markdown(name)));
    }
    if let Some(phone) = &od.phone {
        msg.push_str(&format!("  📱 Телефон: `{phone}`\n"));
    }
    if let Some(city) = &od.city {
        msg.push_str(&format!("  📍 Місто: {}\n", escape_markdown(city)));
    }
    if let Some(address) = &od.address {
        msg.push_str(&format!("  🏠 Адреса: {}\n", escape_markdown(address)));
    }

    msg.push_str("\n*📦 Деталі замовлення:*\n");
    if let Some(delivery) = &od.delivery_method {
        msg.push_str(&format!("  Доставка: {}\n", escape_markdown(delivery)));
    }
    if let Some(payment) = &od.payment_method {
        msg.push_str(&format!("  Оплата: {}\n", escape_markdown(payment)));
    }

    if !od.items.is_empty() {
        msg.push_str("\n*🛍️  Товари:*\n");
        for (idx, item) in od.items.iter().enumerate() {
            let name = item.name.as_deref().unwrap_or("Товар");
            let name = escape_markdown(&truncate_chars(name, SUCCESS_ITEM_NAME_LIMIT));
            let price = scalar_or(item.price_per_unit.as_ref(), DASH);
            let quantity = scalar_or(item.quantity.as_ref(), "1");
            let total = scalar_or(item.total.as_ref(), DASH);
            msg.push_str(&format!(
                "\n{}. {name}\n   💰 {price} × {quantity} = {total}",
                idx + 1,
            ));
        }
        msg.push('\n');
    }

    if let Some(total) = &od.total {
        msg.push_str(&format!("\n*💰 Всього: {total}*\n"));
    }

    if let Some(url) = &event.url {
        msg.push_str(&format!("\n🌐 [Див. замовлення]({url})"));
    }

    msg
}

pub fn format_unknown(tag: Option<&str>, payload: &Value) -> String {
    let dump = serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string());
    let dump = truncate_chars(&dump, RAW_DUMP_LIMIT);
    format!("📌 *{}*\n```\n{dump}\n```", tag.unwrap_or("подія"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::WebhookEvent;
    use serde_json::json;

    fn render_payload(payload: serde_json::Value) -> String {
        render(&WebhookEvent::from_payload(&payload).unwrap())
    }

    #[test]
    fn test_order_created_full() {
        let msg = render_payload(json!({
            "event": "order_created_client",
            "order": {
                "id": "123",
                "total": 500,
                "currency": "UAH",
                "items": [{"title": "Widget", "quantity": 2, "price": 250}]
            }
        }));
        assert!(msg.contains("НОВЕ ЗАМОВЛЕННЯ"));
        assert!(msg.contains("`123`"));
        assert!(msg.contains("500 UAH"));
        assert!(msg.contains("1. Widget"));
        assert!(msg.contains("×2"));
        assert!(msg.contains("250"));
    }

    #[test]
    fn test_order_created_missing_fields_use_placeholders() {
        let msg = render_payload(json!({
            "event": "order_created_client",
            "order": {}
        }));
        assert!(msg.contains("`N/A`"));
        assert!(msg.contains("— UAH"));
        assert!(msg.contains("Товарів: 0"));
        assert!(!msg.contains("Склад"));
    }

    #[test]
    fn test_order_created_falls_back_to_number_and_name() {
        let msg = render_payload(json!({
            "event": "order_created_client",
            "order": {
                "number": 77,
                "items": [{"name": "Кавомолка", "price": "1200"}]
            }
        }));
        assert!(msg.contains("`77`"));
        assert!(msg.contains("1. Кавомолка"));
        assert!(msg.contains("×1 – 1200"));
    }

    #[test]
    fn test_item_title_truncated_to_50_chars() {
        let long = "a".repeat(80);
        let msg = render_payload(json!({
            "event": "order_created_client",
            "order": {"items": [{"title": long}]}
        }));
        assert!(msg.contains(&"a".repeat(50)));
        assert!(!msg.contains(&"a".repeat(51)));
    }

    #[test]
    fn test_callback_request_all_missing() {
        let msg = render_payload(json!({"event": "callback_request_client"}));
        assert!(msg.contains("ЗАПИТ НА ДЗВІНОК"));
        assert_eq!(msg.matches('—').count(), 4);
    }

    #[test]
    fn test_callback_request_fields_labeled() {
        let msg = render_payload(json!({
            "event": "callback_request_client",
            "name": "Іван",
            "phone": "+380501234567",
            "email": "ivan@example.com",
            "page": "/catalog"
        }));
        assert!(msg.contains("Ім'я: Іван"));
        assert!(msg.contains("`+380501234567`"));
        assert!(msg.contains("ivan@example.com"));
        assert!(msg.contains("/catalog"));
    }

    #[test]
    fn test_success_page_conditional_sections() {
        let msg = render_payload(json!({
            "event": "order_success_page_hit",
            "orderData": {
                "orderNumber": "A-42",
                "customerName": "Марія",
                "deliveryMethod": "Нова Пошта",
                "items": [{"name": "Чайник", "pricePerUnit": 900, "quantity": 1, "total": 900}],
                "total": "900 грн"
            },
            "url": "https://shop.example/orders/A-42"
        }));
        assert!(msg.contains("`A-42`"));
        assert!(msg.contains("Ім'я: Марія"));
        assert!(!msg.contains("Місто"));
        assert!(!msg.contains("Оплата"));
        assert!(msg.contains("1. Чайник"));
        assert!(msg.contains("900 × 1 = 900"));
        assert!(msg.contains("Всього: 900 грн"));
        assert!(msg.contains("[Див. замовлення](https://shop.example/orders/A-42)"));
    }

    #[test]
    fn test_success_page_empty_payload_still_formats() {
        let msg = render_payload(json!({"event": "order_success_page_hit"}));
        assert!(msg.contains("ЗАМОВЛЕННЯ УСПІШНО ОФОРМЛЕНО"));
        assert!(msg.contains("Замовник"));
        // No url — the link line is omitted rather than rendering a broken href.
        assert!(!msg.contains("Див. замовлення"));
    }

    #[test]
    fn test_unknown_event_dumps_payload() {
        let msg = render_payload(json!({"event": "unknown_tag", "foo": "bar"}));
        assert!(msg.contains("unknown_tag"));
        assert!(msg.contains("\"foo\": \"bar\""));
    }

    #[test]
    fn test_unknown_event_dump_truncated_at_300() {
        let blob = "x".repeat(600);
        let msg = render_payload(json!({"event": "unknown_tag", "blob": blob}));
        let dump = msg
            .split("```")
            .nth(1)
            .expect("fenced dump present")
            .trim();
        assert!(dump.chars().count() <= RAW_DUMP_LIMIT);
    }

    #[test]
    fn test_missing_event_tag_header() {
        let msg = render_payload(json!({"foo": "bar"}));
        assert!(msg.starts_with("📌 *подія*"));
    }

    #[test]
    fn test_escape_markdown() {
        assert_eq!(escape_markdown("a_b*c"), "a\\_b\\*c");
        assert_eq!(escape_markdown("plain text"), "plain text");
        assert_eq!(escape_markdown("[x]`y`"), "\\[x]\\`y\\`");
    }

    #[test]
    fn test_user_text_is_escaped() {
        let msg = render_payload(json!({
            "event": "callback_request_client",
            "name": "*bold* _sneaky_"
        }));
        assert!(msg.contains("\\*bold\\* \\_sneaky\\_"));
    }

    #[test]
    fn test_truncate_chars_multibyte_safe() {
        assert_eq!(truncate_chars("привіт", 4), "прив");
        assert_eq!(truncate_chars("short", 50), "short");
    }
}
