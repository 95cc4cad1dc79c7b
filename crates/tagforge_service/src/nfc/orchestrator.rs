use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tagforge_core::codec::payload_size;
use tagforge_core::validation::rules_payload::DEFAULT_MAX_PAYLOAD_BYTES;
use tagforge_core::validation::ValidationEngine;
use tagforge_core::{standard_validator, FormData, SchemaContext};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::{NdefMessage, NfcTransport, TransportError};
use crate::event_log::EventLog;

#[derive(Debug, Clone)]
pub struct WriteConfig {
    pub base_url: String,
    pub max_attempts: u32,
    pub retry_delay: Duration,
    /// Deadline for the whole operation, all attempts included.
    pub operation_timeout: Duration,
    pub success_grace: Duration,
    pub cooldown: Duration,
    pub max_payload_bytes: usize,
}

impl Default for WriteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://example.com".to_string(),
            max_attempts: 3,
            retry_delay: Duration::from_millis(200),
            operation_timeout: Duration::from_millis(5000),
            success_grace: Duration::from_millis(2500),
            cooldown: Duration::from_millis(2000),
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteState {
    Idle,
    Writing,
    Success,
    Cooldown,
}

impl WriteState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WriteState::Idle => "idle",
            WriteState::Writing => "writing",
            WriteState::Success => "success",
            WriteState::Cooldown => "cooldown",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WriteOutcome {
    Written { url: String, attempts: u32 },
    /// Validation failed; nothing was sent to the tag.
    Invalid(Vec<String>),
    Failed { error: TransportError, message: String, attempts: u32 },
    /// A write, grace period or cooldown was already running.
    Ignored,
    /// `abort()` was called while this write was in flight.
    Aborted,
}

struct Shared {
    state: WriteState,
    // Bumped by every trigger and every abort. Results and timers that carry
    // an older generation are stale and must not touch the state.
    generation: u64,
    signal: Option<CancellationToken>,
    timer: Option<JoinHandle<()>>,
}

/// Drives one tag write at a time: validate, encode, retry, then hold the
/// success/cooldown states before accepting the next trigger.
#[derive(Clone)]
pub struct WriteOrchestrator {
    transport: Arc<dyn NfcTransport>,
    validator: Arc<ValidationEngine>,
    config: Arc<WriteConfig>,
    log: EventLog,
    shared: Arc<Mutex<Shared>>,
}

impl WriteOrchestrator {
    pub fn new(transport: Arc<dyn NfcTransport>, config: WriteConfig, log: EventLog) -> Self {
        let validator = standard_validator(&config.base_url, config.max_payload_bytes);
        Self {
            transport,
            validator: Arc::new(validator),
            config: Arc::new(config),
            log,
            shared: Arc::new(Mutex::new(Shared {
                state: WriteState::Idle,
                generation: 0,
                signal: None,
                timer: None,
            })),
        }
    }

    pub fn state(&self) -> WriteState {
        self.lock().state
    }

    pub fn config(&self) -> &WriteConfig {
        &self.config
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub async fn trigger(&self, ctx: &SchemaContext, data: &FormData) -> WriteOutcome {
        let (generation, signal) = {
            let mut shared = self.lock();
            if shared.state != WriteState::Idle {
                tracing::debug!("write trigger ignored while {}", shared.state.as_str());
                return WriteOutcome::Ignored;
            }
            shared.generation += 1;
            shared.state = WriteState::Writing;
            let signal = CancellationToken::new();
            shared.signal = Some(signal.clone());
            (shared.generation, signal)
        };

        let errors = self.validator.messages(ctx, data);
        if !errors.is_empty() {
            for message in &errors {
                self.log.err(message.clone());
            }
            let mut shared = self.lock();
            if shared.generation == generation {
                shared.state = WriteState::Idle;
                shared.signal = None;
            }
            return WriteOutcome::Invalid(errors);
        }

        let url = ctx.encode(data, &self.config.base_url);
        let message = NdefMessage::url(url.clone());

        let timed_out = Arc::new(AtomicBool::new(false));
        let deadline = spawn_deadline(signal.clone(), self.config.operation_timeout, timed_out.clone());
        let result = self.write_with_retries(&message, &signal, &timed_out).await;
        deadline.abort();

        let mut shared = self.lock();
        if shared.generation != generation {
            tracing::info!("write result discarded after abort");
            return WriteOutcome::Aborted;
        }
        shared.signal = None;

        match result {
            Ok(attempts) => {
                shared.state = WriteState::Success;
                shared.timer = Some(self.schedule_after_success(generation));
                drop(shared);
                self.log.ok("Tag written successfully.");
                WriteOutcome::Written { url, attempts }
            }
            Err((error, attempts)) => {
                let message = self.describe(&error, &url);
                shared.state = WriteState::Cooldown;
                shared.timer = Some(self.schedule_idle(generation));
                drop(shared);
                self.log.err(format!("NFC write: {}", message));
                WriteOutcome::Failed { error, message, attempts }
            }
        }
    }

    /// Cancels an in-flight write, clears pending timers and returns to idle.
    pub fn abort(&self) {
        let mut shared = self.lock();
        shared.generation += 1;
        if let Some(signal) = shared.signal.take() {
            signal.cancel();
        }
        if let Some(timer) = shared.timer.take() {
            timer.abort();
        }
        if shared.state != WriteState::Idle {
            tracing::info!("NFC operation aborted while {}", shared.state.as_str());
        }
        shared.state = WriteState::Idle;
    }

    async fn write_with_retries(
        &self,
        message: &NdefMessage,
        signal: &CancellationToken,
        timed_out: &AtomicBool,
    ) -> Result<u32, (TransportError, u32)> {
        let total = self.config.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            self.log.info(format!("Write attempt {}/{}...", attempt, total));

            let result = tokio::select! {
                r = self.transport.write(message, signal.clone()) => r,
                _ = signal.cancelled() => Err(TransportError::Abort("signal cancelled".to_string())),
            };

            let error = match result {
                Ok(()) => return Ok(attempt),
                Err(e) => classify(e, signal, timed_out),
            };
            tracing::warn!("write attempt {} failed: {}", attempt, error);

            if attempt >= total || error.is_terminal() {
                return Err((error, attempt));
            }

            tokio::select! {
                _ = tokio::time::sleep(self.config.retry_delay) => {}
                _ = signal.cancelled() => {
                    let error = classify(TransportError::Abort("signal cancelled".to_string()), signal, timed_out);
                    return Err((error, attempt));
                }
            }
        }
    }

    fn describe(&self, error: &TransportError, url: &str) -> String {
        let size = payload_size(url);
        if matches!(error, TransportError::Network(_)) && size > self.config.max_payload_bytes {
            return format!(
                "Payload too large: {} / {} bytes. Shorten some values.",
                size, self.config.max_payload_bytes
            );
        }
        error.readable()
    }

    fn schedule_after_success(&self, generation: u64) -> JoinHandle<()> {
        let shared = self.shared.clone();
        let grace = self.config.success_grace;
        let cooldown = self.config.cooldown;
        tokio::spawn(async move {
            tokio::time::sleep(grace).await;
            if advance(&shared, generation, WriteState::Success, WriteState::Cooldown) {
                tokio::time::sleep(cooldown).await;
                advance(&shared, generation, WriteState::Cooldown, WriteState::Idle);
            }
        })
    }

    fn schedule_idle(&self, generation: u64) -> JoinHandle<()> {
        let shared = self.shared.clone();
        let cooldown = self.config.cooldown;
        tokio::spawn(async move {
            tokio::time::sleep(cooldown).await;
            advance(&shared, generation, WriteState::Cooldown, WriteState::Idle);
        })
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Once the deadline passes the signal is cancelled, so timeout and abort
/// reach the transport the same way. `timed_out` tells them apart afterwards.
fn spawn_deadline(signal: CancellationToken, timeout: Duration, timed_out: Arc<AtomicBool>) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            _ = tokio::time::sleep(timeout) => {
                timed_out.store(true, Ordering::SeqCst);
                signal.cancel();
            }
            _ = signal.cancelled() => {}
        }
    })
}

fn classify(error: TransportError, signal: &CancellationToken, timed_out: &AtomicBool) -> TransportError {
    if !signal.is_cancelled() {
        return error;
    }
    if timed_out.load(Ordering::SeqCst) {
        TransportError::Timeout("NFC operation timed out".to_string())
    } else {
        TransportError::Abort("user aborted".to_string())
    }
}

fn advance(shared: &Mutex<Shared>, generation: u64, from: WriteState, to: WriteState) -> bool {
    let mut shared = shared.lock().unwrap_or_else(PoisonError::into_inner);
    if shared.generation != generation || shared.state != from {
        return false;
    }
    tracing::debug!("write state {} -> {}", from.as_str(), to.as_str());
    shared.state = to;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicU32;
    use tagforge_core::{FieldDefinition, FieldType, Schema};
    use tokio::time::Instant;

    struct ScriptedTransport {
        script: Mutex<VecDeque<Result<(), TransportError>>>,
        calls: AtomicU32,
    }

    impl ScriptedTransport {
        fn new(script: Vec<Result<(), TransportError>>) -> Arc<Self> {
            Arc::new(Self { script: Mutex::new(script.into()), calls: AtomicU32::new(0) })
        }

        fn always_failing() -> Arc<Self> {
            Self::new((0..10).map(|_| Err(TransportError::Network("tag moved".into()))).collect())
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl NfcTransport for ScriptedTransport {
        async fn write(&self, _message: &NdefMessage, _signal: CancellationToken) -> Result<(), TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.script.lock().unwrap().pop_front().unwrap_or(Ok(()))
        }
    }

    /// Never finishes on its own; only the signal ends the write.
    struct HangingTransport;

    #[async_trait]
    impl NfcTransport for HangingTransport {
        async fn write(&self, _message: &NdefMessage, signal: CancellationToken) -> Result<(), TransportError> {
            signal.cancelled().await;
            Err(TransportError::Abort("signal".into()))
        }
    }

    fn context() -> SchemaContext {
        SchemaContext::load(Schema::new(vec![
            FieldDefinition::new("HK-Nr", FieldType::Text).with_short_key("HK").required(),
            FieldDefinition::new("Spannung", FieldType::Number).with_short_key("U"),
        ]))
    }

    fn form() -> FormData {
        FormData::new().with("HK-Nr", "HC123").with("Spannung", "230")
    }

    fn orchestrator(transport: Arc<dyn NfcTransport>) -> WriteOrchestrator {
        WriteOrchestrator::new(transport, WriteConfig::default(), EventLog::new())
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_then_grace_then_cooldown() {
        let transport = ScriptedTransport::new(vec![Ok(())]);
        let nfc = orchestrator(transport.clone());

        let outcome = nfc.trigger(&context(), &form()).await;
        assert_eq!(
            outcome,
            WriteOutcome::Written { url: "https://example.com#HK=HC123&U=230".to_string(), attempts: 1 }
        );
        assert_eq!(nfc.state(), WriteState::Success);
        assert_eq!(nfc.trigger(&context(), &form()).await, WriteOutcome::Ignored);

        tokio::time::sleep(Duration::from_millis(2600)).await;
        assert_eq!(nfc.state(), WriteState::Cooldown);
        assert_eq!(nfc.trigger(&context(), &form()).await, WriteOutcome::Ignored);

        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert_eq!(nfc.state(), WriteState::Idle);
        assert_eq!(transport.calls(), 1);
        assert_eq!(nfc.log().messages()[0], "Tag written successfully.");
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_cap() {
        let transport = ScriptedTransport::always_failing();
        let nfc = orchestrator(transport.clone());

        let outcome = nfc.trigger(&context(), &form()).await;
        match outcome {
            WriteOutcome::Failed { error, attempts, .. } => {
                assert_eq!(attempts, 3);
                assert_eq!(error.name(), "NetworkError");
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(transport.calls(), 3);
        assert_eq!(nfc.state(), WriteState::Cooldown);

        let attempts = nfc.log().messages().iter().filter(|m| m.starts_with("Write attempt")).count();
        assert_eq!(attempts, 3);

        tokio::time::sleep(Duration::from_millis(2100)).await;
        assert_eq!(nfc.state(), WriteState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_recovers() {
        let transport = ScriptedTransport::new(vec![Err(TransportError::NotReadable("busy".into())), Ok(())]);
        let nfc = orchestrator(transport.clone());

        let started = Instant::now();
        let outcome = nfc.trigger(&context(), &form()).await;
        assert!(matches!(outcome, WriteOutcome::Written { attempts: 2, .. }));
        assert!(started.elapsed() >= Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_terminal_error_not_retried() {
        let transport = ScriptedTransport::new(vec![Err(TransportError::Timeout("tag".into()))]);
        let nfc = orchestrator(transport.clone());

        let outcome = nfc.trigger(&context(), &form()).await;
        assert!(matches!(outcome, WriteOutcome::Failed { attempts: 1, .. }));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_cancels_signal_and_reports_timeout() {
        let nfc = orchestrator(Arc::new(HangingTransport));

        let started = Instant::now();
        let outcome = nfc.trigger(&context(), &form()).await;
        match outcome {
            WriteOutcome::Failed { error, message, attempts } => {
                assert_eq!(error.name(), "TimeoutError");
                assert_eq!(message, "Write operation timed out.");
                assert_eq!(attempts, 1);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert!(started.elapsed() >= Duration::from_millis(5000));
        assert_eq!(nfc.state(), WriteState::Cooldown);
    }

    #[tokio::test(start_paused = true)]
    async fn test_abort_discards_late_result() {
        let nfc = orchestrator(Arc::new(HangingTransport));
        let writer = nfc.clone();

        let task = tokio::spawn(async move { writer.trigger(&context(), &form()).await });
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(nfc.state(), WriteState::Writing);

        nfc.abort();
        assert_eq!(task.await.unwrap(), WriteOutcome::Aborted);
        assert_eq!(nfc.state(), WriteState::Idle);
        assert!(!nfc.log().messages().iter().any(|m| m.starts_with("NFC write:")));

        // A fresh trigger is accepted straight away
        let retry = nfc.clone();
        let task = tokio::spawn(async move { retry.trigger(&context(), &form()).await });
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(nfc.state(), WriteState::Writing);
        nfc.abort();
        assert_eq!(task.await.unwrap(), WriteOutcome::Aborted);
    }

    #[tokio::test(start_paused = true)]
    async fn test_abort_clears_grace_timer() {
        let nfc = orchestrator(ScriptedTransport::new(vec![Ok(())]));
        nfc.trigger(&context(), &form()).await;
        assert_eq!(nfc.state(), WriteState::Success);

        nfc.abort();
        assert_eq!(nfc.state(), WriteState::Idle);

        tokio::time::sleep(Duration::from_millis(3000)).await;
        assert_eq!(nfc.state(), WriteState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_validation_errors_skip_transport_and_cooldown() {
        let transport = ScriptedTransport::new(vec![]);
        let nfc = orchestrator(transport.clone());

        let outcome = nfc.trigger(&context(), &FormData::new().with("Spannung", "abc")).await;
        assert_eq!(
            outcome,
            WriteOutcome::Invalid(vec![
                "HK-Nr is a required field.".to_string(),
                "Spannung must be a number (got 'abc').".to_string(),
            ])
        );
        assert_eq!(transport.calls(), 0);
        assert_eq!(nfc.state(), WriteState::Idle);
    }

    #[test]
    fn test_network_error_on_oversized_payload() {
        let config = WriteConfig { max_payload_bytes: 20, ..WriteConfig::default() };
        let nfc = WriteOrchestrator::new(ScriptedTransport::new(vec![]), config, EventLog::new());

        let message = nfc.describe(&TransportError::Network("lost".into()), "https://example.com#HK=HC123");
        assert_eq!(message, "Payload too large: 28 / 20 bytes. Shorten some values.");

        let message = nfc.describe(&TransportError::Network("lost".into()), "https://x.io#a=1");
        assert!(message.starts_with("Connection to the tag was lost"));
    }
}
