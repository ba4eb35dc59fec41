use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex as StdMutex,
    },
};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::{
    domain::Product,
    protocol::{CompletionChoice, CompletionMessage, CompletionRequest, CompletionResponse},
};
use tokio::sync::Notify;

use crate::{
    completion::CompletionBackend,
    error::{ClientError, ClientResult},
    local_store::LocalStore,
};

pub(crate) fn product(name: &str, category: &str) -> Product {
    Product {
        name: name.to_string(),
        brand: format!("{name} Brand"),
        category: category.to_string(),
        image: format!("img/{}.png", name.to_ascii_lowercase()),
        description: Some(format!("{name} description")),
    }
}

pub(crate) fn reply(content: &str) -> CompletionResponse {
    CompletionResponse {
        choices: vec![Some(CompletionChoice {
            message: Some(CompletionMessage {
                role: Some("assistant".to_string()),
                content: Some(content.to_string()),
            }),
        })],
    }
}

/// Answers requests from a queue and records what was sent.
#[derive(Default)]
pub(crate) struct ScriptedBackend {
    replies: StdMutex<VecDeque<ClientResult<CompletionResponse>>>,
    requests: StdMutex<Vec<CompletionRequest>>,
}

impl ScriptedBackend {
    pub(crate) fn replying(replies: Vec<ClientResult<CompletionResponse>>) -> Arc<Self> {
        Arc::new(Self {
            replies: StdMutex::new(replies.into()),
            requests: StdMutex::new(Vec::new()),
        })
    }

    pub(crate) fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    async fn complete(&self, request: &CompletionRequest) -> ClientResult<CompletionResponse> {
        self.requests
            .lock()
            .expect("requests lock")
            .push(request.clone());
        self.replies
            .lock()
            .expect("replies lock")
            .pop_front()
            .unwrap_or_else(|| {
                Err(ClientError::fetch(
                    "scripted backend",
                    anyhow!("no scripted reply left"),
                ))
            })
    }
}

/// Holds every request until `release` is notified.
pub(crate) struct GatedBackend {
    pub(crate) started: Arc<Notify>,
    pub(crate) release: Arc<Notify>,
    pub(crate) calls: AtomicUsize,
    reply: String,
}

impl GatedBackend {
    pub(crate) fn new(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            started: Arc::new(Notify::new()),
            release: Arc::new(Notify::new()),
            calls: AtomicUsize::new(0),
            reply: reply.to_string(),
        })
    }
}

#[async_trait]
impl CompletionBackend for GatedBackend {
    async fn complete(&self, _request: &CompletionRequest) -> ClientResult<CompletionResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.started.notify_one();
        self.release.notified().await;
        Ok(reply(&self.reply))
    }
}

/// Counts writes; optionally fails every write.
#[derive(Default)]
pub(crate) struct RecordingStore {
    value: StdMutex<Option<String>>,
    pub(crate) writes: AtomicUsize,
    fail_writes: bool,
}

impl RecordingStore {
    pub(crate) fn holding(value: &str) -> Arc<Self> {
        Arc::new(Self {
            value: StdMutex::new(Some(value.to_string())),
            ..Self::default()
        })
    }

    pub(crate) fn failing_writes() -> Arc<Self> {
        Arc::new(Self {
            fail_writes: true,
            ..Self::default()
        })
    }

    pub(crate) fn value(&self) -> Option<String> {
        self.value.lock().expect("value lock").clone()
    }
}

#[async_trait]
impl LocalStore for RecordingStore {
    async fn get_item(&self, _key: &str) -> Result<Option<String>> {
        Ok(self.value())
    }

    async fn set_item(&self, _key: &str, value: &str) -> Result<()> {
        if self.fail_writes {
            return Err(anyhow!("disk full"));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        *self.value.lock().expect("value lock") = Some(value.to_string());
        Ok(())
    }
}

/// Every read fails.
pub(crate) struct UnreadableStore;

#[async_trait]
impl LocalStore for UnreadableStore {
    async fn get_item(&self, _key: &str) -> Result<Option<String>> {
        Err(anyhow!("database is locked"))
    }

    async fn set_item(&self, _key: &str, _value: &str) -> Result<()> {
        Err(anyhow!("database is locked"))
    }
}
