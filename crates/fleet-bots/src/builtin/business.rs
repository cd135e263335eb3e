//! Business Bot

use async_trait::async_trait;
use fleet_core::BotKind;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;

use super::{parse_params, unknown_command};
use crate::bot::Bot;

#[derive(Debug, Deserialize)]
struct ReportParams {
    title: String,
    metrics: BTreeMap<String, f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InvoiceItem {
    description: String,
    quantity: f64,
    unit_price: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InvoiceParams {
    client: String,
    items: Vec<InvoiceItem>,
    /// Fraction, e.g. `0.2` for 20%
    #[serde(default)]
    tax_rate: f64,
}

#[derive(Debug, Default)]
pub struct BusinessBot;

impl BusinessBot {
    pub fn new() -> Self {
        Self
    }

    fn report(&self, params: ReportParams) -> Result<Value, String> {
        if params.metrics.is_empty() {
            return Err("Report needs at least one metric".to_string());
        }

        let total: f64 = params.metrics.values().sum();
        let average = total / params.metrics.len() as f64;
        let highest = params
            .metrics
            .iter()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(name, value)| json!({ "name": name, "value": value }));
        let lowest = params
            .metrics
            .iter()
            .min_by(|a, b| a.1.total_cmp(b.1))
            .map(|(name, value)| json!({ "name": name, "value": value }));

        let lines: Vec<String> = params
            .metrics
            .iter()
            .map(|(name, value)| format!("{}: {}", name, value))
            .collect();

        Ok(json!({
            "title": params.title,
            "total": round_cents(total),
            "average": round_cents(average),
            "highest": highest,
            "lowest": lowest,
            "lines": lines,
        }))
    }

    fn invoice(&self, params: InvoiceParams) -> Result<Value, String> {
        if params.items.is_empty() {
            return Err(format!("Invoice for {} has no items", params.client));
        }
        if params.tax_rate < 0.0 {
            return Err("taxRate must not be negative".to_string());
        }

        let mut subtotal = 0.0;
        let mut lines = Vec::with_capacity(params.items.len());
        for item in &params.items {
            if item.quantity < 0.0 || item.unit_price < 0.0 {
                return Err(format!("Negative amount on line '{}'", item.description));
            }
            let amount = round_cents(item.quantity * item.unit_price);
            subtotal += amount;
            lines.push(json!({
                "description": item.description,
                "quantity": item.quantity,
                "unitPrice": item.unit_price,
                "amount": amount,
            }));
        }

        let subtotal = round_cents(subtotal);
        let tax = round_cents(subtotal * params.tax_rate);
        Ok(json!({
            "client": params.client,
            "lines": lines,
            "subtotal": subtotal,
            "tax": tax,
            "total": round_cents(subtotal + tax),
        }))
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[async_trait]
impl Bot for BusinessBot {
    fn kind(&self) -> BotKind {
        BotKind::Business
    }

    fn commands(&self) -> Vec<String> {
        vec!["report".to_string(), "invoice".to_string()]
    }

    async fn execute(&self, command: &str, params: Value) -> Result<Value, String> {
        match command {
            "report" => self.report(parse_params(command, params)?),
            "invoice" => self.invoice(parse_params(command, params)?),
            _ => Err(unknown_command(command)),
        }
    }
}
