use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{to_base_units, QuoteProvider, QuoteRequest};
use crate::constants::SYNTHETIC_ROUTE_LABEL;
use crate::types::{Quote, RouteHop, SimulationError};

/// Jupiter aggregator quote client.
///
/// No retries here - retry policy belongs to the caller.
pub struct JupiterQuoteClient {
    client: Client,
    quote_url: String,
}

#[derive(Debug, Deserialize)]
struct RoutePlanEntry {
    #[serde(rename = "swapInfo")]
    swap_info: Option<SwapInfo>,
    label: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SwapInfo {
    label: Option<String>,
}

impl JupiterQuoteClient {
    pub fn new(client: Client, quote_url: String) -> Self {
        Self { client, quote_url }
    }

    async fn fetch_raw(&self, request: &QuoteRequest, raw_amount: u64) -> Result<serde_json::Value, SimulationError> {
        let mut query_params = HashMap::new();
        query_params.insert("inputMint", request.input_mint.clone());
        query_params.insert("outputMint", request.output_mint.clone());
        query_params.insert("amount", raw_amount.to_string());
        query_params.insert("slippageBps", request.slippage_bps.to_string());
        query_params.insert("restrictIntermediateTokens", "true".to_string());

        debug!(
            "🔄 Requesting quote: {} -> {} ({})",
            request.input_mint, request.output_mint, raw_amount
        );

        let response = self
            .client
            .get(&self.quote_url)
            .query(&query_params)
            .send()
            .await
            .map_err(|e| SimulationError::UpstreamUnavailable(format!("quote request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SimulationError::UpstreamRejected {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| SimulationError::MalformedResponse(format!("quote body is not JSON: {e}")))
    }
}

#[async_trait]
impl QuoteProvider for JupiterQuoteClient {
    async fn get_quote(&self, request: &QuoteRequest) -> Result<Quote, SimulationError> {
        let raw_amount = to_base_units(request.amount_in, request.input_decimals)?;
        let raw = self.fetch_raw(request, raw_amount).await?;
        let quote = parse_quote(raw, request, raw_amount)?;

        debug!(
            "✅ Quote received: {} -> {} via {:?}",
            quote.raw_amount_in,
            quote.raw_amount_out,
            quote.route_labels()
        );

        Ok(quote)
    }
}

/// Turn the raw aggregator JSON into a [`Quote`]. Pure, so it is testable
/// against canned responses.
pub(crate) fn parse_quote(
    raw: serde_json::Value,
    request: &QuoteRequest,
    raw_amount_in: u64,
) -> Result<Quote, SimulationError> {
    // outAmount missing means "no route found", not a crash
    let out_amount_field = raw
        .get("outAmount")
        .or_else(|| raw.get("out_amount"))
        .ok_or_else(|| {
            warn!("quote response missing outAmount (no route found)");
            SimulationError::MalformedResponse("outAmount field absent".to_string())
        })?;

    let raw_amount_out = parse_amount(out_amount_field).ok_or_else(|| {
        SimulationError::MalformedResponse(format!("outAmount is not numeric: {out_amount_field}"))
    })?;

    let reported_price_impact_pct = raw
        .get("priceImpactPct")
        .or_else(|| raw.get("priceImpact"))
        .and_then(parse_float)
        .unwrap_or(0.0);

    let route = extract_route(&raw);

    Ok(Quote {
        input_mint: request.input_mint.clone(),
        output_mint: request.output_mint.clone(),
        raw_amount_in,
        raw_amount_out,
        reported_price_impact_pct,
        route,
        raw_response: raw,
        fetched_at: Utc::now(),
    })
}

/// Walk the route plan collecting DEX labels; synthesize a single
/// "aggregator" hop when the plan is empty or unlabeled.
fn extract_route(raw: &serde_json::Value) -> Vec<RouteHop> {
    let mut route = Vec::new();

    if let Some(plan) = raw.get("routePlan").and_then(|v| v.as_array()) {
        for entry in plan {
            if let Ok(entry) = serde_json::from_value::<RoutePlanEntry>(entry.clone()) {
                let label = entry
                    .swap_info
                    .and_then(|info| info.label)
                    .or(entry.label);
                if let Some(label) = label {
                    route.push(RouteHop { dex_label: label });
                }
            }
        }
    }

    if route.is_empty() {
        route.push(RouteHop {
            dex_label: SYNTHETIC_ROUTE_LABEL.to_string(),
        });
    }

    route
}

fn parse_amount(value: &serde_json::Value) -> Option<u64> {
    match value {
        serde_json::Value::String(s) => s.parse::<u64>().ok(),
        serde_json::Value::Number(n) => n.as_u64(),
        _ => None,
    }
}

fn parse_float(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::String(s) => s.parse::<f64>().ok(),
        serde_json::Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request() -> QuoteRequest {
        QuoteRequest {
            input_mint: crate::constants::SOL_MINT.to_string(),
            output_mint: crate::constants::USDC_MINT.to_string(),
            amount_in: 1.0,
            input_decimals: 9,
            slippage_bps: 50,
        }
    }

    #[test]
    fn test_parse_quote_full_response() {
        let raw = json!({
            "outAmount": "150000000",
            "priceImpactPct": "0.42",
            "routePlan": [
                { "swapInfo": { "label": "Orca" }, "percent": 60 },
                { "swapInfo": { "label": "Raydium" }, "percent": 40 },
            ],
        });

        let quote = parse_quote(raw, &request(), 1_000_000_000).unwrap();
        assert_eq!(quote.raw_amount_out, 150_000_000);
        assert_eq!(quote.reported_price_impact_pct, 0.42);
        assert_eq!(quote.route_labels(), vec!["Orca", "Raydium"]);
        assert_eq!(quote.raw_amount_in, 1_000_000_000);
    }

    #[test]
    fn test_parse_quote_top_level_labels() {
        let raw = json!({
            "outAmount": "42",
            "routePlan": [ { "label": "Meteora" } ],
        });

        let quote = parse_quote(raw, &request(), 100).unwrap();
        assert_eq!(quote.route_labels(), vec!["Meteora"]);
        // absent price impact defaults to zero
        assert_eq!(quote.reported_price_impact_pct, 0.0);
    }

    #[test]
    fn test_empty_route_plan_synthesizes_aggregator_hop() {
        let raw = json!({ "outAmount": "42", "routePlan": [] });
        let quote = parse_quote(raw, &request(), 100).unwrap();
        assert_eq!(quote.route_labels(), vec![SYNTHETIC_ROUTE_LABEL]);

        // Unlabeled hops behave the same as an empty plan
        let raw = json!({ "outAmount": "42", "routePlan": [ { "percent": 100 } ] });
        let quote = parse_quote(raw, &request(), 100).unwrap();
        assert_eq!(quote.route_labels(), vec![SYNTHETIC_ROUTE_LABEL]);

        // So does a missing plan entirely
        let raw = json!({ "outAmount": "42" });
        let quote = parse_quote(raw, &request(), 100).unwrap();
        assert_eq!(quote.hop_count(), 1);
    }

    #[test]
    fn test_missing_out_amount_is_malformed_not_panic() {
        let raw = json!({ "routePlan": [] });
        let err = parse_quote(raw, &request(), 100).unwrap_err();
        assert!(matches!(err, SimulationError::MalformedResponse(_)));
    }

    #[test]
    fn test_numeric_out_amount_and_impact() {
        let raw = json!({ "outAmount": 1234u64, "priceImpact": 1.5 });
        let quote = parse_quote(raw, &request(), 100).unwrap();
        assert_eq!(quote.raw_amount_out, 1234);
        assert_eq!(quote.reported_price_impact_pct, 1.5);
    }
}
