#![warn(missing_docs)]
//! # aether-ledger
//!
//! ## Purpose
//! Generates and plays back the scripted rescue-contract transaction log shown
//! in the report view.
//!
//! ## Responsibilities
//! - Fabricate display identifiers (transaction hash, block number, gas).
//! - Build the fixed six-entry rescue script or the single idle entry.
//! - Schedule entries onto a [`PlaybackSink`] at their offsets from
//!   invocation time.
//! - Hand out a [`PlaybackHandle`] whose [`CancelToken`] lets the caller stop
//!   a playback that has not finished yet.
//!
//! ## Data flow
//! Classification flag -> [`LedgerScript::for_flag`] -> [`LedgerPlayer::play`]
//! -> timer task -> [`PlaybackSink::append`].
//!
//! ## Ownership and lifetimes
//! Scripts are built once per invocation and moved into the timer task. The
//! sink is shared through `Arc` because the task outlives the call that
//! scheduled it.
//!
//! ## Error model
//! Playback has no failure path. Identifiers are display-only and carry no
//! cryptographic meaning.

use std::ops::Range;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use aether_core::{ClassificationFlag, ColorTag, LedgerEntry};
use rand::Rng;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Offsets of the rescue script entries, in milliseconds.
pub const RESCUE_DELAYS_MS: [u64; 6] = [0, 400, 800, 1200, 1800, 2200];

/// Range of fabricated block numbers.
pub const BLOCK_NUMBER_RANGE: Range<u64> = 14_000_000..15_000_000;

/// Range of fabricated gas estimates.
pub const GAS_RANGE: Range<u64> = 50_000..210_000;

/// Text of the single entry written when no survivor was detected.
pub const IDLE_MESSAGE: &str = "> NO SURVIVOR DETECTED. SMART CONTRACT IDLE.";

const SHOWN_HASH_CHARS: usize = 25;

/// Fabricated identifiers embedded in one rescue script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerIdentifiers {
    /// `0x` followed by 64 lowercase hex digits.
    pub tx_hash: String,
    /// Block-number-like integer in [`BLOCK_NUMBER_RANGE`].
    pub block_number: u64,
    /// Gas-like integer in [`GAS_RANGE`].
    pub gas_used: u64,
}

impl LedgerIdentifiers {
    /// Draws a fresh set of identifiers.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut hash = [0_u8; 32];
        rng.fill(&mut hash);

        Self {
            tx_hash: format!("0x{}", hex::encode(hash)),
            block_number: rng.random_range(BLOCK_NUMBER_RANGE),
            gas_used: rng.random_range(GAS_RANGE),
        }
    }

    fn short_hash(&self) -> &str {
        &self.tx_hash[..SHOWN_HASH_CHARS.min(self.tx_hash.len())]
    }
}

/// Ordered entries to play for one report opening.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerScript {
    /// No survivor: one static entry, no timers.
    Idle(LedgerEntry),
    /// Survivor: timed transaction narrative.
    Rescue {
        /// Identifiers embedded in the entries.
        identifiers: LedgerIdentifiers,
        /// Entries ordered by non-decreasing delay.
        entries: Vec<LedgerEntry>,
    },
}

impl LedgerScript {
    /// Builds the script selected by a classification flag.
    pub fn for_flag<R: Rng + ?Sized>(flag: ClassificationFlag, rng: &mut R) -> Self {
        if !flag.is_positive() {
            return Self::Idle(idle_entry());
        }

        let identifiers = LedgerIdentifiers::generate(rng);
        let entries = rescue_entries(&identifiers);
        Self::Rescue {
            identifiers,
            entries,
        }
    }

    /// Returns the script's entries in playback order.
    pub fn entries(&self) -> &[LedgerEntry] {
        match self {
            Self::Idle(entry) => std::slice::from_ref(entry),
            Self::Rescue { entries, .. } => entries,
        }
    }
}

/// The static idle entry.
pub fn idle_entry() -> LedgerEntry {
    LedgerEntry::new(IDLE_MESSAGE, ColorTag::Idle, 0)
}

/// Builds the six rescue entries for a set of identifiers.
pub fn rescue_entries(identifiers: &LedgerIdentifiers) -> Vec<LedgerEntry> {
    let [d0, d1, d2, d3, d4, d5] = RESCUE_DELAYS_MS;
    vec![
        LedgerEntry::new(
            "INITIALIZING SMART CONTRACT 'AetherRescue.sol'...",
            ColorTag::Primary,
            d0,
        ),
        LedgerEntry::new(
            format!(
                "> CONNECTING TO ETHEREUM MAINNET (Block {})...",
                identifiers.block_number
            ),
            ColorTag::Muted,
            d1,
        ),
        LedgerEntry::new(
            "> VERIFYING SURVIVOR COORDINATES ON-CHAIN...",
            ColorTag::Muted,
            d2,
        ),
        LedgerEntry::new(
            format!("> GAS ESTIMATE: {} Gwei", identifiers.gas_used),
            ColorTag::Muted,
            d3,
        ),
        LedgerEntry::new(
            format!("> TRANSACTION CONFIRMED: {}...", identifiers.short_hash()),
            ColorTag::Confirmed,
            d4,
        ),
        LedgerEntry::new(
            "> RESCUE FUNDS RELEASED TO LOCAL NGO WALLET.",
            ColorTag::Accent,
            d5,
        ),
    ]
}

/// Destination of played entries.
pub trait PlaybackSink: Send + Sync + 'static {
    /// Removes previously rendered entries and reveals the panel.
    fn clear(&self);
    /// Appends one entry below the existing ones.
    fn append(&self, entry: LedgerEntry);
}

/// Shared cancellation flag for one playback.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Creates an uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the playback as cancelled.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns `true` once [`CancelToken::cancel`] was called.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Handle to one scheduled playback.
///
/// Dropping the handle does not stop the playback.
#[derive(Debug)]
pub struct PlaybackHandle {
    token: CancelToken,
    offsets: Vec<u64>,
    task: Option<JoinHandle<()>>,
}

impl PlaybackHandle {
    /// Offsets (ms) of the entries scheduled on a timer. Empty for idle.
    pub fn scheduled_offsets(&self) -> &[u64] {
        &self.offsets
    }

    /// Stops any entries that have not been appended yet.
    pub fn cancel(&self) {
        self.token.cancel();
        if let Some(task) = &self.task {
            task.abort();
        }
    }

    /// Returns `true` once cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Returns `true` when no entry is still pending.
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Waits until the last entry is appended or the playback is cancelled.
    pub async fn finished(self) {
        if let Some(task) = self.task {
            // A cancelled task resolves with a JoinError; both mean "done".
            let _ = task.await;
        }
    }
}

/// Schedules ledger scripts onto a sink.
#[derive(Debug)]
pub struct LedgerPlayer<S> {
    sink: Arc<S>,
}

impl<S> Clone for LedgerPlayer<S> {
    fn clone(&self) -> Self {
        Self {
            sink: Arc::clone(&self.sink),
        }
    }
}

impl<S: PlaybackSink> LedgerPlayer<S> {
    /// Creates a player writing to `sink`.
    pub fn new(sink: Arc<S>) -> Self {
        Self { sink }
    }

    /// Returns the shared sink.
    pub fn sink(&self) -> &Arc<S> {
        &self.sink
    }

    /// Clears the sink and plays `script`.
    ///
    /// Idle scripts are written synchronously. Rescue scripts are appended by
    /// one spawned task at `invocation + delay_ms`, so this must be called from
    /// within a tokio runtime.
    pub fn play(&self, script: LedgerScript) -> PlaybackHandle {
        self.sink.clear();
        let token = CancelToken::new();

        let (identifiers, entries) = match script {
            LedgerScript::Idle(entry) => {
                self.sink.append(entry);
                tracing::debug!(stage = "ledger", action = "idle", "idle entry written");
                return PlaybackHandle {
                    token,
                    offsets: Vec::new(),
                    task: None,
                };
            }
            LedgerScript::Rescue {
                identifiers,
                entries,
            } => (identifiers, entries),
        };

        let offsets: Vec<u64> = entries.iter().map(|entry| entry.delay_ms).collect();
        tracing::debug!(
            stage = "ledger",
            action = "schedule",
            entries = entries.len(),
            block = identifiers.block_number,
            "rescue playback scheduled"
        );

        let start = Instant::now();
        let sink = Arc::clone(&self.sink);
        let task_token = token.clone();
        let task = tokio::spawn(async move {
            for entry in entries {
                tokio::time::sleep_until(start + Duration::from_millis(entry.delay_ms)).await;
                if task_token.is_cancelled() {
                    return;
                }
                sink.append(entry);
            }
        });

        PlaybackHandle {
            token,
            offsets,
            task: Some(task),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for script generation.

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn identifiers_stay_in_their_ranges() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..64 {
            let ids = LedgerIdentifiers::generate(&mut rng);
            assert_eq!(ids.tx_hash.len(), 66);
            assert!(ids.tx_hash.starts_with("0x"));
            assert!(ids.tx_hash[2..].chars().all(|c| c.is_ascii_hexdigit()));
            assert!(BLOCK_NUMBER_RANGE.contains(&ids.block_number));
            assert!(GAS_RANGE.contains(&ids.gas_used));
        }
    }

    #[test]
    fn rescue_script_embeds_identifiers_in_order() {
        let ids = LedgerIdentifiers {
            tx_hash: format!("0x{}", "ab".repeat(32)),
            block_number: 14_500_000,
            gas_used: 90_000,
        };
        let entries = rescue_entries(&ids);

        let delays: Vec<u64> = entries.iter().map(|entry| entry.delay_ms).collect();
        assert_eq!(delays, RESCUE_DELAYS_MS);
        assert_eq!(
            entries[1].text,
            "> CONNECTING TO ETHEREUM MAINNET (Block 14500000)..."
        );
        assert_eq!(entries[3].text, "> GAS ESTIMATE: 90000 Gwei");
        assert_eq!(
            entries[4].text,
            format!("> TRANSACTION CONFIRMED: 0x{}...", &"ab".repeat(32)[..23])
        );
        assert_eq!(entries[4].color, ColorTag::Confirmed);
    }

    #[test]
    fn negative_flag_selects_idle_script() {
        let mut rng = StdRng::seed_from_u64(1);
        let script = LedgerScript::for_flag(ClassificationFlag::from(false), &mut rng);
        assert_eq!(script, LedgerScript::Idle(idle_entry()));
        assert_eq!(script.entries().len(), 1);
    }
}
