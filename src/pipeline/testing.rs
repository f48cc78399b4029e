//! In-memory doubles for pipeline tests.

use std::collections::BTreeSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::{Post, Snapshot};
use crate::services::{Fetcher, Notifier};
use crate::storage::SnapshotStore;

/// Render posts as a listing page in the default markup.
pub fn page(posts: &[(&str, &str)]) -> String {
    let items: String = posts
        .iter()
        .map(|(title, url)| format!("<li><a href=\"{url}\">{title}</a></li>"))
        .collect();
    format!("<html><body><div id=\"post\"><ul>{items}</ul></div></body></html>")
}

/// What the fake source returns.
pub enum Response {
    Page(String),
    Down,
    /// Never answers
    Hang,
}

/// Fetcher returning a swappable canned response.
pub struct FakeFetcher {
    response: Mutex<Response>,
    calls: AtomicUsize,
}

impl FakeFetcher {
    pub fn page(html: String) -> Self {
        Self {
            response: Mutex::new(Response::Page(html)),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn down() -> Self {
        Self {
            response: Mutex::new(Response::Down),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn hanging() -> Self {
        Self {
            response: Mutex::new(Response::Hang),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn set(&self, response: Response) {
        *self.response.lock().unwrap() = response;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let answer = match &*self.response.lock().unwrap() {
            Response::Page(html) => Some(Ok(html.clone())),
            Response::Down => Some(Err(AppError::fetch(url, "connection refused"))),
            Response::Hang => None,
        };
        match answer {
            Some(answer) => answer,
            None => std::future::pending().await,
        }
    }
}

/// Notifier that records every call and can be told to fail.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<BTreeSet<Post>>>,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::default(),
            fail: true,
        }
    }

    pub fn calls(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, added: &BTreeSet<Post>) -> Result<()> {
        self.sent.lock().unwrap().push(added.clone());
        if self.fail {
            return Err(AppError::notify("535 authentication failed"));
        }
        Ok(())
    }
}

/// Snapshot store held in memory, counting saves.
#[derive(Default)]
pub struct MemoryStore {
    pub snapshot: Mutex<Snapshot>,
    pub saves: AtomicUsize,
}

impl MemoryStore {
    pub fn with(snapshot: Snapshot) -> Self {
        Self {
            snapshot: Mutex::new(snapshot),
            saves: AtomicUsize::new(0),
        }
    }

    pub fn current(&self) -> Snapshot {
        self.snapshot.lock().unwrap().clone()
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn load(&self) -> Result<Snapshot> {
        Ok(self.current())
    }

    async fn save(&self, snapshot: &[Post]) -> Result<()> {
        *self.snapshot.lock().unwrap() = snapshot.to_vec();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
