//! Synthetic responses for running without a live upstream.
//!
//! The payload is picked by an ordered rule table keyed on the operation name and method.
//! First matching rule wins; the last rule echoes the arguments back.

use crate::parser::OperationDescriptor;
use chrono::{Local, NaiveDateTime, TimeDelta};
use rand::Rng;
use rand::seq::IndexedRandom;
use reqwest::Method;
use rmcp::model::JsonObject;
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::atomic::{AtomicU64, Ordering};

pub const MOCK_NOTE: &str = "Mock response. Set use_real_api: true in config for real calls.";

/// First order id handed out by a fresh executor.
pub const ORDER_COUNTER_START: u64 = 1000;
/// First pet id handed out by a fresh executor.
pub const PET_COUNTER_START: u64 = 100;

/// Unit price used when an order names a size the pizza does not list.
const FALLBACK_UNIT_PRICE: f64 = 12.99;

const TRACKING_STATUSES: [&str; 4] = ["preparing", "baking", "quality_check", "out_for_delivery"];
const WEATHER_DESCRIPTIONS: [&str; 4] = ["Sunny", "Partly Cloudy", "Cloudy", "Light Rain"];

#[derive(Debug, Clone, Serialize)]
pub struct SizePrices {
    pub small: f64,
    pub medium: f64,
    pub large: f64,
    pub xlarge: f64,
}

impl SizePrices {
    fn for_size(&self, size: &str) -> Option<f64> {
        match size {
            "small" => Some(self.small),
            "medium" => Some(self.medium),
            "large" => Some(self.large),
            "xlarge" => Some(self.xlarge),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Pizza {
    pub id: &'static str,
    pub name: &'static str,
    pub category: &'static str,
    pub description: &'static str,
    pub prices: SizePrices,
    pub available: bool,
    pub toppings: Vec<&'static str>,
}

fn pizza(
    id: &'static str,
    name: &'static str,
    category: &'static str,
    description: &'static str,
    [small, medium, large, xlarge]: [f64; 4],
    toppings: Vec<&'static str>,
) -> Pizza {
    Pizza {
        id,
        name,
        category,
        description,
        prices: SizePrices {
            small,
            medium,
            large,
            xlarge,
        },
        available: true,
        toppings,
    }
}

fn pizza_menu() -> Vec<Pizza> {
    vec![
        pizza(
            "pizza_001",
            "Margherita",
            "classic",
            "Fresh mozzarella, tomato sauce, basil",
            [8.99, 11.99, 14.99, 17.99],
            vec!["mozzarella", "tomato sauce", "basil"],
        ),
        pizza(
            "pizza_002",
            "Pepperoni",
            "classic",
            "Pepperoni, mozzarella, tomato sauce",
            [9.99, 12.99, 15.99, 18.99],
            vec!["pepperoni", "mozzarella", "tomato sauce"],
        ),
        pizza(
            "pizza_003",
            "Hawaiian",
            "specialty",
            "Ham, pineapple, mozzarella",
            [10.99, 13.99, 16.99, 19.99],
            vec!["ham", "pineapple", "mozzarella"],
        ),
        pizza(
            "pizza_004",
            "Veggie Supreme",
            "vegetarian",
            "Bell peppers, onions, mushrooms, olives",
            [10.99, 13.99, 16.99, 19.99],
            vec!["bell peppers", "onions", "mushrooms", "olives", "mozzarella"],
        ),
        pizza(
            "pizza_005",
            "Meat Lovers",
            "specialty",
            "Pepperoni, sausage, bacon, ham",
            [11.99, 14.99, 17.99, 20.99],
            vec!["pepperoni", "sausage", "bacon", "ham", "mozzarella"],
        ),
    ]
}

/// What a rule looks at when deciding whether it applies.
struct RuleInput<'a> {
    name: String,
    method: &'a Method,
}

impl RuleInput<'_> {
    fn has(&self, needle: &str) -> bool {
        self.name.contains(needle)
    }
}

type Generator = fn(&MockExecutor, &JsonObject) -> Value;

struct MockRule {
    label: &'static str,
    matches: fn(&RuleInput<'_>) -> bool,
    generate: Generator,
}

/// Ordered; first match wins.
const RULES: &[MockRule] = &[
    MockRule {
        label: "menu",
        matches: |op| op.has("menu") || op.has("list"),
        generate: MockExecutor::pizza_menu_listing,
    },
    MockRule {
        label: "place_order",
        matches: |op| op.has("order") && *op.method == Method::POST,
        generate: MockExecutor::place_order,
    },
    MockRule {
        label: "track_order",
        matches: |op| op.has("track") || (op.has("order") && *op.method == Method::GET),
        generate: MockExecutor::track_order,
    },
    MockRule {
        label: "add_pet",
        matches: |op| op.has("pet") && *op.method == Method::POST,
        generate: MockExecutor::add_pet,
    },
    MockRule {
        label: "get_pet",
        matches: |op| op.has("pet") && *op.method == Method::GET,
        generate: MockExecutor::get_pet,
    },
    MockRule {
        label: "pets_by_status",
        matches: |op| op.has("pet") && op.has("status"),
        generate: MockExecutor::pets_by_status,
    },
    MockRule {
        label: "weather",
        matches: |op| op.has("weather") || op.has("forecast"),
        generate: MockExecutor::weather,
    },
    MockRule {
        label: "products",
        matches: |op| op.has("product"),
        generate: MockExecutor::products,
    },
    MockRule {
        label: "cart",
        matches: |op| op.has("cart"),
        generate: MockExecutor::cart,
    },
];

/// Mock executor with per-instance order and pet counters.
#[derive(Debug)]
pub struct MockExecutor {
    menu: Vec<Pizza>,
    order_counter: AtomicU64,
    pet_counter: AtomicU64,
}

impl Default for MockExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl MockExecutor {
    #[must_use]
    pub fn new() -> Self {
        Self {
            menu: pizza_menu(),
            order_counter: AtomicU64::new(ORDER_COUNTER_START),
            pet_counter: AtomicU64::new(PET_COUNTER_START),
        }
    }

    #[must_use]
    pub fn menu(&self) -> &[Pizza] {
        &self.menu
    }

    /// Build the full mock envelope for one call.
    pub fn call(&self, op: &OperationDescriptor, arguments: &JsonObject) -> Value {
        let (rule, data) = self.generate(op, arguments);
        tracing::debug!(operation = %op.name, rule, "Mock response");

        json!({
            "success": true,
            "status_code": 200,
            "mock": true,
            "data": data,
            "metadata": {
                "operation": op.name,
                "method": op.method.as_str(),
                "path": op.path,
                "base_url": op.base_url,
                "received_arguments": arguments,
            },
            "note": MOCK_NOTE,
        })
    }

    fn generate(&self, op: &OperationDescriptor, arguments: &JsonObject) -> (&'static str, Value) {
        let input = RuleInput {
            name: op.name.to_lowercase(),
            method: &op.method,
        };

        RULES
            .iter()
            .find(|rule| (rule.matches)(&input))
            .map_or_else(
                || ("generic", generic(arguments)),
                |rule| (rule.label, (rule.generate)(self, arguments)),
            )
    }

    fn pizza_menu_listing(&self, args: &JsonObject) -> Value {
        let pizzas: Vec<&Pizza> = match args.get("category").filter(|c| is_truthy(c)) {
            Some(category) => self
                .menu
                .iter()
                .filter(|p| category.as_str() == Some(p.category))
                .collect(),
            None => self.menu.iter().collect(),
        };

        json!({
            "total": pizzas.len(),
            "pizzas": pizzas,
            "timestamp": iso_now(),
        })
    }

    fn place_order(&self, args: &JsonObject) -> Value {
        let order_id = format!("ORD-{}", self.order_counter.fetch_add(1, Ordering::Relaxed));

        let pizza = args
            .get("pizza_id")
            .and_then(Value::as_str)
            .and_then(|id| self.menu.iter().find(|p| p.id == id));
        let size = args.get("size").cloned().unwrap_or_else(|| json!("medium"));
        let quantity = args.get("quantity").cloned().unwrap_or_else(|| json!(1));

        let price = pizza.map_or(0.0, |p| {
            let unit = size
                .as_str()
                .and_then(|s| p.prices.for_size(s))
                .unwrap_or(FALLBACK_UNIT_PRICE);
            unit * quantity.as_f64().unwrap_or(1.0)
        });

        let minutes = rand::rng().random_range(25..=45);

        json!({
            "order_id": order_id,
            "status": "confirmed",
            "pizza": pizza.map_or("Unknown", |p| p.name),
            "size": size,
            "quantity": quantity,
            "customer_name": arg_or_null(args, "customer_name"),
            "delivery_address": arg_or_null(args, "address"),
            "phone": arg_or_null(args, "phone"),
            "extra_toppings": args.get("extra_toppings").cloned().unwrap_or_else(|| json!([])),
            "total_price": round2(price),
            "estimated_delivery": display_time(now() + TimeDelta::minutes(minutes)),
            "order_time": iso_now(),
        })
    }

    fn track_order(&self, args: &JsonObject) -> Value {
        let mut rng = rand::rng();
        let status = TRACKING_STATUSES
            .choose(&mut rng)
            .copied()
            .unwrap_or("preparing");
        let driver = if status == "out_for_delivery" {
            json!({"name": "John Doe", "phone": "+1-555-0123"})
        } else {
            Value::Null
        };

        json!({
            "order_id": args.get("orderId").cloned().unwrap_or_else(|| json!("ORD-1000")),
            "status": status,
            "status_history": [
                {"status": "confirmed", "timestamp": "2024-01-15 18:00:00"},
                {"status": "preparing", "timestamp": "2024-01-15 18:05:00"},
                {"status": "baking", "timestamp": "2024-01-15 18:15:00"}
            ],
            "estimated_delivery": display_time(now() + TimeDelta::minutes(20)),
            "driver": driver,
        })
    }

    fn add_pet(&self, args: &JsonObject) -> Value {
        let id = self.pet_counter.fetch_add(1, Ordering::Relaxed);

        json!({
            "id": id,
            "name": arg_or_null(args, "name"),
            "photoUrls": args.get("photoUrls").cloned().unwrap_or_else(|| json!([])),
            "status": args.get("status").cloned().unwrap_or_else(|| json!("available")),
            "category": {"id": 1, "name": "Dogs"},
            "tags": [],
        })
    }

    fn get_pet(&self, args: &JsonObject) -> Value {
        let pet_id = args.get("petId").cloned().unwrap_or_else(|| json!(1));
        let label = display_value(&pet_id);

        json!({
            "id": pet_id,
            "name": format!("Pet_{label}"),
            "photoUrls": [format!("https://example.com/photo{label}.jpg")],
            "status": "available",
            "category": {"id": 1, "name": "Dogs"},
        })
    }

    fn pets_by_status(&self, args: &JsonObject) -> Value {
        let status = args.get("status").cloned().unwrap_or_else(|| json!("available"));

        json!([
            {"id": 1, "name": "Buddy", "status": status},
            {"id": 2, "name": "Max", "status": status},
            {"id": 3, "name": "Luna", "status": status}
        ])
    }

    fn weather(&self, args: &JsonObject) -> Value {
        let mut rng = rand::rng();
        let units = args.get("units").cloned().unwrap_or_else(|| json!("metric"));
        let temperature: i64 = if units.as_str() == Some("metric") {
            rng.random_range(15..=30)
        } else {
            rng.random_range(60..=85)
        };

        json!({
            "location": args.get("location").cloned().unwrap_or_else(|| json!("Unknown")),
            "current": {
                "temperature": temperature,
                "feels_like": temperature + rng.random_range(-3..=3_i64),
                "humidity": rng.random_range(40..=80_i64),
                "description": WEATHER_DESCRIPTIONS.choose(&mut rng).copied().unwrap_or("Sunny"),
                "wind_speed": rng.random_range(5..=20_i64),
            },
            "units": units,
            "timestamp": iso_now(),
        })
    }

    fn products(&self, args: &JsonObject) -> Value {
        let catalog = [
            json!({"id": "prod_1", "name": "Laptop", "price": 999.99, "category": "electronics"}),
            json!({"id": "prod_2", "name": "Headphones", "price": 79.99, "category": "electronics"}),
            json!({"id": "prod_3", "name": "T-Shirt", "price": 19.99, "category": "clothing"}),
            json!({"id": "prod_4", "name": "Coffee Maker", "price": 49.99, "category": "home"}),
        ];

        let products: Vec<Value> = match args.get("category").filter(|c| is_truthy(c)) {
            Some(category) => catalog
                .into_iter()
                .filter(|p| p.get("category") == Some(category))
                .collect(),
            None => catalog.into(),
        };

        json!({
            "total": products.len(),
            "products": products,
            "page": args.get("page").cloned().unwrap_or_else(|| json!(1)),
            "limit": args.get("limit").cloned().unwrap_or_else(|| json!(20)),
        })
    }

    fn cart(&self, args: &JsonObject) -> Value {
        let quantity = args.get("quantity").cloned().unwrap_or_else(|| json!(1));

        json!({
            "cart_id": "cart_123",
            "items": [{
                "product_id": arg_or_null(args, "product_id"),
                "quantity": quantity,
            }],
            "total_items": quantity,
            "timestamp": iso_now(),
        })
    }
}

fn generic(args: &JsonObject) -> Value {
    json!({
        "message": "Operation successful",
        "timestamp": iso_now(),
        "data": args,
    })
}

fn arg_or_null(args: &JsonObject, key: &str) -> Value {
    args.get(key).cloned().unwrap_or(Value::Null)
}

/// JSON truthiness: null, false, zero, and empty strings/collections are falsy.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

fn iso_now() -> String {
    now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

fn display_time(at: NaiveDateTime) -> String {
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}
