//! Candle retrieval with ordered market-category fallback
//!
//! Each category is one attempt against the public kline endpoint. The first
//! category that yields enough closes wins; when every category fails the
//! symbol gets an empty series for this tick.

use crate::config::RsiAlertConfig;
use crate::error::{MonitorError, Result};
use crate::transport::HttpTransport;
use serde::Deserialize;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Position of the close price inside a kline record
const CLOSE_INDEX: usize = 4;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KlineResponse {
    ret_code: Option<i64>,
    ret_msg: Option<String>,
    result: Option<KlineResult>,
}

#[derive(Debug, Deserialize)]
struct KlineResult {
    list: Option<Vec<Vec<Value>>>,
}

/// Decode a kline response into closes, oldest first.
///
/// The exchange lists candles newest first.
pub fn parse_closes(body: Value, min_candles: usize) -> Result<Vec<f64>> {
    let response: KlineResponse = serde_json::from_value(body)?;

    let list = match response.result.and_then(|r| r.list) {
        Some(list) => list,
        None => {
            return Err(MonitorError::malformed(format!(
                "missing result.list (retCode={:?}, retMsg={:?})",
                response.ret_code, response.ret_msg
            )))
        }
    };

    let mut closes = list
        .iter()
        .enumerate()
        .map(|(index, candle)| parse_close(index, candle))
        .collect::<Result<Vec<f64>>>()?;

    if closes.len() < min_candles {
        return Err(MonitorError::InsufficientCandles {
            got: closes.len(),
            need: min_candles,
        });
    }

    closes.reverse();
    Ok(closes)
}

fn parse_close(index: usize, candle: &[Value]) -> Result<f64> {
    let raw = candle.get(CLOSE_INDEX).ok_or_else(|| MonitorError::InvalidCandle {
        index,
        message: format!("expected at least {} fields, got {}", CLOSE_INDEX + 1, candle.len()),
    })?;

    let close = match raw {
        Value::String(s) => s.parse::<f64>().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    };

    match close {
        Some(value) if value.is_finite() => Ok(value),
        _ => Err(MonitorError::InvalidCandle {
            index,
            message: format!("unusable close value {}", raw),
        }),
    }
}

/// Run `attempt` for each category in order and return the first success.
///
/// Every failure is logged with the symbol and category; `None` means the
/// list was exhausted.
pub async fn first_success<T, F, Fut>(
    symbol: &str,
    categories: &[String],
    mut attempt: F,
) -> Option<(String, T)>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    for category in categories {
        match attempt(category.clone()).await {
            Ok(value) => return Some((category.clone(), value)),
            Err(MonitorError::InsufficientCandles { got, need }) => {
                warn!(
                    symbol = %symbol,
                    category = %category,
                    "Insufficient candles ({} < {}), trying next category",
                    got,
                    need
                );
            }
            Err(e) => {
                warn!(
                    symbol = %symbol,
                    category = %category,
                    error = %e,
                    "Candle fetch failed, trying next category"
                );
            }
        }
    }

    None
}

/// Fetches closing prices for one symbol at a time
#[derive(Clone)]
pub struct CandleFetcher {
    transport: Arc<dyn HttpTransport>,
    kline_url: String,
    categories: Vec<String>,
    interval: String,
    limit: usize,
    min_candles: usize,
    timeout: Duration,
}

impl CandleFetcher {
    pub fn new(transport: Arc<dyn HttpTransport>, config: &RsiAlertConfig) -> Self {
        Self {
            transport,
            kline_url: config.exchange.kline_url.clone(),
            categories: config.exchange.categories.clone(),
            interval: config.interval.clone(),
            limit: config.candle_limit,
            min_candles: config.min_candles(),
            timeout: config.request_timeout(),
        }
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Closes for `symbol`, oldest first, or empty when no category had enough data
    pub async fn fetch_closes(&self, symbol: &str) -> Vec<f64> {
        let fetched = first_success(symbol, &self.categories, |category| async move {
            self.fetch_category(symbol, &category).await
        })
        .await;

        match fetched {
            Some((category, closes)) => {
                debug!(
                    symbol = %symbol,
                    category = %category,
                    "Fetched {} closes",
                    closes.len()
                );
                closes
            }
            None => {
                warn!(symbol = %symbol, "All categories exhausted, no candles this tick");
                Vec::new()
            }
        }
    }

    async fn fetch_category(&self, symbol: &str, category: &str) -> Result<Vec<f64>> {
        let query = [
            ("category", category.to_string()),
            ("symbol", symbol.to_string()),
            ("interval", self.interval.clone()),
            ("limit", self.limit.to_string()),
        ];

        let body = tokio::time::timeout(
            self.timeout,
            self.transport.get_json(&self.kline_url, &query, self.timeout),
        )
        .await
        .map_err(|_| MonitorError::Timeout(self.timeout))??;

        parse_closes(body, self.min_candles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{kline_body, ScriptedTransport};
    use serde_json::json;

    fn config() -> RsiAlertConfig {
        let mut config = RsiAlertConfig::default();
        config.exchange.kline_url = "http://exchange.test/v5/market/kline".to_string();
        config.rsi_period = 3;
        config
    }

    #[test]
    fn test_parse_closes_reverses_to_oldest_first() {
        let body = kline_body(&[1.0, 2.0, 3.0, 4.0]);
        let closes = parse_closes(body, 4).unwrap();
        assert_eq!(closes, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_parse_closes_missing_structure() {
        let err = parse_closes(json!({"retCode": 10001, "retMsg": "bad", "result": {}}), 1)
            .unwrap_err();
        assert!(matches!(err, MonitorError::MalformedResponse { .. }));

        let err = parse_closes(json!({"retCode": 0}), 1).unwrap_err();
        assert!(matches!(err, MonitorError::MalformedResponse { .. }));
    }

    #[test]
    fn test_parse_closes_insufficient() {
        let err = parse_closes(kline_body(&[1.0, 2.0]), 4).unwrap_err();
        assert!(matches!(
            err,
            MonitorError::InsufficientCandles { got: 2, need: 4 }
        ));
    }

    #[test]
    fn test_parse_closes_rejects_bad_close() {
        let body = json!({"result": {"list": [["1", "1", "1", "1", "abc", "0", "0"]]}});
        assert!(matches!(
            parse_closes(body, 1).unwrap_err(),
            MonitorError::InvalidCandle { index: 0, .. }
        ));

        let body = json!({"result": {"list": [["1", "1", "1"]]}});
        assert!(matches!(
            parse_closes(body, 1).unwrap_err(),
            MonitorError::InvalidCandle { .. }
        ));
    }

    #[test]
    fn test_parse_closes_accepts_numeric_close() {
        let body = json!({"result": {"list": [[0, 1, 1, 1, 2.5, 0, 0]]}});
        assert_eq!(parse_closes(body, 1).unwrap(), vec![2.5]);
    }

    #[tokio::test]
    async fn test_first_success_stops_at_first_ok() {
        let categories = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let mut tried = Vec::new();

        let result = first_success("X", &categories, |category| {
            tried.push(category.clone());
            async move {
                if category == "b" {
                    Ok(7)
                } else {
                    Err(MonitorError::malformed("nope"))
                }
            }
        })
        .await;

        assert_eq!(result, Some(("b".to_string(), 7)));
        assert_eq!(tried, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_first_success_exhausted() {
        let categories = vec!["a".to_string()];
        let result: Option<(String, ())> = first_success("X", &categories, |_| async {
            Err(MonitorError::InsufficientCandles { got: 1, need: 2 })
        })
        .await;
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_linear_malformed_falls_back_to_spot() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.script("DOGEUSDT", "linear", Ok(json!({"retCode": 10001, "result": {}})));
        transport.script("DOGEUSDT", "spot", Ok(kline_body(&[5.0, 4.0, 3.0, 2.0, 1.0])));

        let fetcher = CandleFetcher::new(transport.clone(), &config());
        let closes = fetcher.fetch_closes("DOGEUSDT").await;

        assert_eq!(closes, vec![5.0, 4.0, 3.0, 2.0, 1.0]);
        assert_eq!(transport.categories_requested("DOGEUSDT"), vec!["linear", "spot"]);
    }

    #[tokio::test]
    async fn test_short_linear_falls_back_to_spot() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.script("PEPEUSDT", "linear", Ok(kline_body(&[1.0, 2.0])));
        transport.script("PEPEUSDT", "spot", Ok(kline_body(&[1.0, 2.0, 3.0, 4.0])));

        let fetcher = CandleFetcher::new(transport.clone(), &config());
        assert_eq!(fetcher.fetch_closes("PEPEUSDT").await, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[tokio::test]
    async fn test_success_does_not_try_later_categories() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.script("WIFUSDT", "linear", Ok(kline_body(&[1.0, 2.0, 3.0, 4.0])));
        transport.script("WIFUSDT", "spot", Ok(kline_body(&[9.0, 9.0, 9.0, 9.0])));

        let fetcher = CandleFetcher::new(transport.clone(), &config());
        assert_eq!(fetcher.fetch_closes("WIFUSDT").await, vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(transport.categories_requested("WIFUSDT"), vec!["linear"]);
    }

    #[tokio::test]
    async fn test_all_categories_fail_yields_empty() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.script(
            "BONKUSDT",
            "linear",
            Err(MonitorError::Transport {
                message: "connection reset".to_string(),
            }),
        );
        transport.script("BONKUSDT", "spot", Ok(json!({"unexpected": true})));

        let fetcher = CandleFetcher::new(transport.clone(), &config());
        let closes = fetcher.fetch_closes("BONKUSDT").await;

        assert!(closes.is_empty());
        assert_eq!(crate::indicators::RsiCalculator::new(3).calculate(&closes), None);
    }

    #[tokio::test]
    async fn test_request_parameters() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.script("SHIBUSDT", "linear", Ok(kline_body(&[1.0, 2.0, 3.0, 4.0])));

        let fetcher = CandleFetcher::new(transport.clone(), &config());
        fetcher.fetch_closes("SHIBUSDT").await;

        let calls = transport.get_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].url, "http://exchange.test/v5/market/kline");
        assert_eq!(calls[0].param("interval"), Some("240"));
        assert_eq!(calls[0].param("limit"), Some("100"));
        assert_eq!(calls[0].param("symbol"), Some("SHIBUSDT"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_request_times_out_and_falls_back() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.hang("FLOKIUSDT", "linear");
        transport.script("FLOKIUSDT", "spot", Ok(kline_body(&[1.0, 2.0, 3.0, 4.0])));

        let fetcher = CandleFetcher::new(transport.clone(), &config());
        assert_eq!(fetcher.fetch_closes("FLOKIUSDT").await, vec![1.0, 2.0, 3.0, 4.0]);
    }
}
