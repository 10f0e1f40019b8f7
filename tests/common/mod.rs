//! Shared test fakes
//!
//! Recording transport, scripted completion backend and scripted update feed.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use async_trait::async_trait;

use relaybot::core::rate_limiter::DEFAULT_WINDOW;
use relaybot::domain::{ChatId, MessageId};
use relaybot::{
    ChatTransport, CompletionBackend, CompletionClient, IncomingMessage, ManualClock,
    MessageOrchestrator, ParseMode, PolledUpdate, RateLimiter, RelayError, SentMessage,
    UpdateSource,
};

static INIT: Once = Once::new();

/// Install a test subscriber once per binary
pub fn setup() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .try_init();
    });
}

/// Log buffer filled by a scoped subscriber
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.0.lock().unwrap())
            .lines()
            .map(str::to_string)
            .collect()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Route this thread's events into a buffer until the guard drops
pub fn capture_logs() -> (CapturedLogs, tracing::subscriber::DefaultGuard) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .without_time()
        .with_target(false)
        .with_writer(move || writer.clone())
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (logs, guard)
}

pub const CHAT: ChatId = 100;
pub const USER: i64 = 4242;

pub fn text_message(user_id: i64, text: &str) -> IncomingMessage {
    IncomingMessage::new(CHAT, user_id, 1, text)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sent {
    pub chat_id: ChatId,
    pub message_id: MessageId,
    pub text: String,
    pub parse_mode: Option<ParseMode>,
}

/// Transport that records every call
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<Sent>>,
    deleted: Mutex<Vec<(ChatId, MessageId)>>,
    next_id: AtomicI64,
    /// Sends of exactly these texts fail
    fail_send_of: Mutex<Vec<String>>,
    fail_deletes: Mutex<bool>,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_send_of(&self, text: &str) {
        self.fail_send_of.lock().unwrap().push(text.to_string());
    }

    pub fn fail_deletes(&self) {
        *self.fail_deletes.lock().unwrap() = true;
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_texts(&self) -> Vec<String> {
        self.sent().into_iter().map(|s| s.text).collect()
    }

    pub fn deleted(&self) -> Vec<(ChatId, MessageId)> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatTransport for RecordingTransport {
    async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        parse_mode: Option<ParseMode>,
    ) -> relaybot::Result<SentMessage> {
        if self.fail_send_of.lock().unwrap().iter().any(|t| t == text) {
            return Err(RelayError::TransportError("sendMessage failed (403): Forbidden".to_string()));
        }

        let message_id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.sent.lock().unwrap().push(Sent {
            chat_id,
            message_id,
            text: text.to_string(),
            parse_mode,
        });
        Ok(SentMessage { chat_id, message_id })
    }

    async fn delete_message(&self, chat_id: ChatId, message_id: MessageId) -> relaybot::Result<()> {
        if *self.fail_deletes.lock().unwrap() {
            return Err(RelayError::TransportError(
                "deleteMessage failed (400): message can't be deleted".to_string(),
            ));
        }
        self.deleted.lock().unwrap().push((chat_id, message_id));
        Ok(())
    }
}

/// What the scripted backend does on every call
#[derive(Debug, Clone)]
pub enum Behavior {
    Echo,
    Delay(Duration),
    Fail(String),
    Panic,
}

pub struct ScriptedBackend {
    behavior: Behavior,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl ScriptedBackend {
    pub fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    async fn complete(&self, text: &str) -> anyhow::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(text.to_string());

        match &self.behavior {
            Behavior::Echo => Ok(format!("echo: {}", text)),
            Behavior::Delay(delay) => {
                tokio::time::sleep(*delay).await;
                Ok(format!("late echo: {}", text))
            }
            Behavior::Fail(cause) => Err(anyhow::anyhow!("{}", cause)),
            Behavior::Panic => panic!("backend exploded"),
        }
    }
}

pub struct Harness {
    pub transport: Arc<RecordingTransport>,
    pub backend: Arc<ScriptedBackend>,
    pub clock: ManualClock,
    pub orchestrator: Arc<MessageOrchestrator>,
}

/// Orchestrator with threshold 3, a 30s budget and a manual limiter clock
pub fn harness(behavior: Behavior) -> Harness {
    setup();
    let transport = RecordingTransport::new();
    let backend = ScriptedBackend::new(behavior);
    let clock = ManualClock::new();
    let limiter = Arc::new(RateLimiter::new(3, DEFAULT_WINDOW).with_clock(Arc::new(clock.clone())));
    let completion = CompletionClient::new(backend.clone(), Duration::from_secs(30));
    let orchestrator = Arc::new(MessageOrchestrator::new(transport.clone(), completion, limiter));

    Harness {
        transport,
        backend,
        clock,
        orchestrator,
    }
}

/// Update feed that replays a script, then idles like an empty long poll
#[derive(Default)]
pub struct ScriptedUpdates {
    script: Mutex<VecDeque<relaybot::Result<Vec<PolledUpdate>>>>,
    offsets: Mutex<Vec<i64>>,
}

impl ScriptedUpdates {
    pub fn new(script: Vec<relaybot::Result<Vec<PolledUpdate>>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            offsets: Mutex::new(Vec::new()),
        })
    }

    pub fn offsets(&self) -> Vec<i64> {
        self.offsets.lock().unwrap().clone()
    }
}

#[async_trait]
impl UpdateSource for ScriptedUpdates {
    async fn poll(&self, offset: i64, timeout: Duration) -> relaybot::Result<Vec<PolledUpdate>> {
        self.offsets.lock().unwrap().push(offset);
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(batch) => batch,
            None => {
                tokio::time::sleep(timeout).await;
                Ok(Vec::new())
            }
        }
    }
}
