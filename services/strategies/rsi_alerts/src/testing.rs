//! Testing utilities: scripted HTTP transport and recording notifier

use crate::error::{MonitorError, Result};
use crate::notifier::Notifier;
use crate::transport::HttpTransport;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Barrier;

/// Bybit-shaped kline body for `closes` given oldest first
pub fn kline_body(closes: &[f64]) -> Value {
    let list: Vec<Value> = closes
        .iter()
        .enumerate()
        .rev()
        .map(|(i, close)| {
            let close = close.to_string();
            json!([
                (1_700_000_000_000u64 + i as u64 * 14_400_000).to_string(),
                close,
                close,
                close,
                close,
                "1000",
                "1000"
            ])
        })
        .collect();

    json!({
        "retCode": 0,
        "retMsg": "OK",
        "result": { "category": "linear", "list": list }
    })
}

#[derive(Debug, Clone)]
enum Scripted {
    Json(Value),
    Fail(String),
    Hang,
}

/// A GET observed by [`ScriptedTransport`]
#[derive(Debug, Clone)]
pub struct RecordedGet {
    pub url: String,
    pub query: Vec<(String, String)>,
}

impl RecordedGet {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// A POST observed by [`ScriptedTransport`]
#[derive(Debug, Clone)]
pub struct RecordedPost {
    pub url: String,
    pub form: Vec<(String, String)>,
}

impl RecordedPost {
    pub fn field(&self, key: &str) -> Option<&str> {
        self.form
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Transport double keyed by (symbol, category).
///
/// Each key holds a queue of responses; the last one repeats once the queue
/// is down to a single entry. Unscripted keys answer with a malformed body.
#[derive(Default)]
pub struct ScriptedTransport {
    scripts: Mutex<HashMap<(String, String), VecDeque<Scripted>>>,
    gets: Mutex<Vec<RecordedGet>>,
    posts: Mutex<Vec<RecordedPost>>,
    fail_posts: AtomicBool,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    rendezvous: Option<Arc<Barrier>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every GET waits until `parties` GETs are in flight at once
    pub fn with_rendezvous(parties: usize) -> Self {
        Self {
            rendezvous: Some(Arc::new(Barrier::new(parties))),
            ..Self::default()
        }
    }

    /// Queue a response for `symbol` in `category`
    pub fn script(&self, symbol: &str, category: &str, response: Result<Value>) {
        let entry = match response {
            Ok(body) => Scripted::Json(body),
            Err(e) => Scripted::Fail(e.to_string()),
        };
        self.push(symbol, category, entry);
    }

    /// Queue a request that never completes
    pub fn hang(&self, symbol: &str, category: &str) {
        self.push(symbol, category, Scripted::Hang);
    }

    /// Make every POST fail after being recorded
    pub fn fail_posts(&self, fail: bool) {
        self.fail_posts.store(fail, Ordering::SeqCst);
    }

    pub fn get_calls(&self) -> Vec<RecordedGet> {
        self.gets.lock().clone()
    }

    pub fn post_calls(&self) -> Vec<RecordedPost> {
        self.posts.lock().clone()
    }

    /// Categories requested for `symbol`, in request order
    pub fn categories_requested(&self, symbol: &str) -> Vec<String> {
        self.gets
            .lock()
            .iter()
            .filter(|g| g.param("symbol") == Some(symbol))
            .filter_map(|g| g.param("category").map(str::to_string))
            .collect()
    }

    /// Highest number of GETs observed in flight simultaneously
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn push(&self, symbol: &str, category: &str, entry: Scripted) {
        self.scripts
            .lock()
            .entry((symbol.to_string(), category.to_string()))
            .or_default()
            .push_back(entry);
    }

    fn next_response(&self, symbol: &str, category: &str) -> Option<Scripted> {
        let mut scripts = self.scripts.lock();
        let queue = scripts.get_mut(&(symbol.to_string(), category.to_string()))?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn get_json(
        &self,
        url: &str,
        query: &[(&str, String)],
        _timeout: Duration,
    ) -> Result<Value> {
        let recorded = RecordedGet {
            url: url.to_string(),
            query: query
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        };
        let symbol = recorded.param("symbol").unwrap_or_default().to_string();
        let category = recorded.param("category").unwrap_or_default().to_string();
        self.gets.lock().push(recorded);

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(barrier) = &self.rendezvous {
            barrier.wait().await;
        }

        let response = self.next_response(&symbol, &category);
        let outcome = match response {
            Some(Scripted::Json(body)) => Ok(body),
            Some(Scripted::Fail(message)) => Err(MonitorError::Transport { message }),
            Some(Scripted::Hang) => futures::future::pending().await,
            None => Ok(json!({ "retCode": 10001, "retMsg": "not scripted", "result": {} })),
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        outcome
    }

    async fn post_form(&self, url: &str, form: &[(&str, &str)], _timeout: Duration) -> Result<()> {
        self.posts.lock().push(RecordedPost {
            url: url.to_string(),
            form: form
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        });

        if self.fail_posts.load(Ordering::SeqCst) {
            return Err(MonitorError::Transport {
                message: "scripted POST failure".to_string(),
            });
        }
        Ok(())
    }
}

/// Notifier double that keeps every message
#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
    reject: AtomicBool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report every send as failed while still recording it
    pub fn rejecting() -> Self {
        let notifier = Self::default();
        notifier.reject.store(true, Ordering::SeqCst);
        notifier
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, text: &str) -> bool {
        self.messages.lock().push(text.to_string());
        !self.reject.load(Ordering::SeqCst)
    }
}
