use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use super::{Category, FetchError, Transport};

/// Canned outcome for one request.
#[derive(Debug, Clone)]
pub enum StubReply {
    Json(String),
    Status(u16),
    Unreachable,
    Delayed(Duration, Box<StubReply>),
}

impl StubReply {
    pub fn json(body: &str) -> Self {
        StubReply::Json(body.to_string())
    }

    pub fn delayed(ms: u64, reply: StubReply) -> Self {
        StubReply::Delayed(Duration::from_millis(ms), Box::new(reply))
    }
}

/// In-memory transport. A category with no reply behaves as unreachable.
///
/// Replies queue per category; the last queued reply is sticky and answers
/// every later request.
#[derive(Debug, Default)]
pub struct StubTransport {
    routes: Mutex<HashMap<Category, VecDeque<StubReply>>>,
    calls: Mutex<Vec<Category>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace whatever is queued for `category`.
    pub fn set(&self, category: Category, reply: StubReply) {
        if let Ok(mut routes) = self.routes.lock() {
            routes.insert(category, VecDeque::from([reply]));
        }
    }

    pub fn push(&self, category: Category, reply: StubReply) {
        if let Ok(mut routes) = self.routes.lock() {
            routes.entry(category).or_default().push_back(reply);
        }
    }

    pub fn clear(&self, category: Category) {
        if let Ok(mut routes) = self.routes.lock() {
            routes.remove(&category);
        }
    }

    /// Categories in the order requests were initiated.
    pub fn calls(&self) -> Vec<Category> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn next_reply(&self, category: Category) -> StubReply {
        let Ok(mut routes) = self.routes.lock() else {
            return StubReply::Unreachable;
        };
        match routes.get_mut(&category) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or(StubReply::Unreachable),
            Some(queue) => queue.front().cloned().unwrap_or(StubReply::Unreachable),
            None => StubReply::Unreachable,
        }
    }

    async fn answer(category: Category, mut reply: StubReply) -> Result<Vec<u8>, FetchError> {
        loop {
            match reply {
                StubReply::Json(body) => return Ok(body.into_bytes()),
                StubReply::Status(status) => return Err(FetchError::Status { category, status }),
                StubReply::Unreachable => {
                    return Err(FetchError::Transport {
                        category,
                        detail: "connection refused".to_string(),
                    })
                }
                StubReply::Delayed(delay, inner) => {
                    tokio::time::sleep(delay).await;
                    reply = *inner;
                }
            }
        }
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn get(&self, category: Category) -> Result<Vec<u8>, FetchError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(category);
        }
        let reply = self.next_reply(category);

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let result = Self::answer(category, reply).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_queue_then_sticky() {
        let stub = StubTransport::new();
        stub.push(Category::Kpis, StubReply::Status(503));
        stub.push(Category::Kpis, StubReply::json("{}"));

        assert!(stub.get(Category::Kpis).await.is_err());
        assert_eq!(stub.get(Category::Kpis).await.unwrap(), b"{}".to_vec());
        assert_eq!(stub.get(Category::Kpis).await.unwrap(), b"{}".to_vec());
    }

    #[tokio::test]
    async fn test_clear_makes_unreachable() {
        let stub = StubTransport::new();
        stub.set(Category::Trend, StubReply::json("[]"));
        stub.clear(Category::Trend);
        let err = stub.get(Category::Trend).await.unwrap_err();
        assert!(matches!(err, FetchError::Transport { .. }));
    }

    #[tokio::test]
    async fn test_tracks_overlap() {
        let stub = StubTransport::new();
        stub.set(Category::Kpis, StubReply::delayed(10, StubReply::json("1")));
        stub.set(Category::Radar, StubReply::delayed(10, StubReply::json("2")));
        let (a, b) = tokio::join!(stub.get(Category::Kpis), stub.get(Category::Radar));
        assert!(a.is_ok() && b.is_ok());
        assert_eq!(stub.max_in_flight(), 2);
        assert_eq!(stub.calls(), vec![Category::Kpis, Category::Radar]);
    }
}
