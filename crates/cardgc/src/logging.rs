//! Card Table Logging and Tracing
//!
//! Structured event log for card table operations, useful for:
//! - Debugging crossing-map corruption
//! - Measuring minor-collection scan cost
//! - Production monitoring
//!
//! Only cold operations emit events: table creation, clearing, compaction
//! rebase, verification and dirty-card scans. The write barrier and the
//! crossing-map update never log.
//!
//! The global logger stores nothing until [`configure_logger`] is called;
//! before that, `log_event` is a single atomic load. Each logger keeps at
//! most `capacity` events and drops the oldest first.
//!
//! Log Levels:
//! - ERROR: Broken card boundaries
//! - INFO: Table creation, compaction rebase
//! - DEBUG: Clears, verification, scans
//! - TRACE: Root section traversal

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// Log level for card table events
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

/// Card table event types
#[derive(Debug, Clone, PartialEq)]
pub enum CardEvent {
    /// Card table built for a segment
    TableCreated {
        base: usize,
        num_cards: usize,
        card_size: usize,
    },

    /// Every card reset to Clean
    Cleared { num_cards: usize },

    /// Card state rebased on a post-compaction level
    CompactionRebase {
        new_level: usize,
        dirty_cards: usize,
        clean_cards: usize,
    },

    /// Crossing map verified
    BoundariesVerified {
        from_index: usize,
        cards_checked: usize,
    },

    /// Crossing map resolved a card to the wrong object
    BoundaryBroken {
        index: usize,
        address: usize,
        reason: String,
    },

    /// Dirty cards scanned during a minor collection
    DirtyScan {
        cards_scanned: usize,
        objects_visited: usize,
        duration_us: u64,
    },

    /// Root section traversed
    RootSection { section: String, slots: usize },
}

/// Card logger configuration
#[derive(Debug, Clone)]
pub struct CardLoggerConfig {
    /// Minimum log level
    pub level: LogLevel,

    /// Enable console output
    pub console: bool,

    /// Enable JSON format
    pub json: bool,

    /// Enable timestamps
    pub timestamps: bool,

    /// Maximum number of buffered events
    pub capacity: usize,
}

impl Default for CardLoggerConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            console: false,
            json: false,
            timestamps: true,
            capacity: 1024,
        }
    }
}

/// Card logger - centralized event log for card table operations
pub struct CardLogger {
    config: CardLoggerConfig,
    events: Mutex<VecDeque<(Instant, CardEvent)>>,
    enabled: AtomicBool,
}

impl CardLogger {
    /// Create new card logger
    pub fn new(config: CardLoggerConfig) -> Self {
        Self {
            config,
            events: Mutex::new(VecDeque::new()),
            enabled: AtomicBool::new(true),
        }
    }

    /// Enable logging
    pub fn enable(&self) {
        self.enabled.store(true, Ordering::Relaxed);
    }

    /// Disable logging
    pub fn disable(&self) {
        self.enabled.store(false, Ordering::Relaxed);
    }

    /// Check if logging is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Log a card event
    pub fn log(&self, event: CardEvent) {
        if !self.is_enabled() {
            return;
        }

        if Self::event_level(&event) > self.config.level {
            return;
        }

        if self.config.console {
            self.output_console(&event);
        }

        if self.config.capacity == 0 {
            return;
        }
        let mut events = self.events.lock();
        if events.len() == self.config.capacity {
            events.pop_front();
        }
        events.push_back((Instant::now(), event));
    }

    /// Get log level for event
    fn event_level(event: &CardEvent) -> LogLevel {
        match event {
            CardEvent::BoundaryBroken { .. } => LogLevel::Error,
            CardEvent::TableCreated { .. } | CardEvent::CompactionRebase { .. } => LogLevel::Info,
            CardEvent::Cleared { .. }
            | CardEvent::BoundariesVerified { .. }
            | CardEvent::DirtyScan { .. } => LogLevel::Debug,
            CardEvent::RootSection { .. } => LogLevel::Trace,
        }
    }

    /// Output to console
    fn output_console(&self, event: &CardEvent) {
        let prefix = if self.config.timestamps {
            format!("[{}] ", chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
        } else {
            String::new()
        };

        if self.config.json {
            println!("{}{}", prefix, Self::format_json(event));
        } else {
            println!("{}{}", prefix, Self::format_human(event));
        }
    }

    /// Render in human-readable format
    pub fn format_human(event: &CardEvent) -> String {
        match event {
            CardEvent::TableCreated {
                base,
                num_cards,
                card_size,
            } => format!(
                "[CARD] Table at {:#x}: {} cards of {} bytes",
                base, num_cards, card_size
            ),
            CardEvent::Cleared { num_cards } => format!("[CARD] Cleared {} cards", num_cards),
            CardEvent::CompactionRebase {
                new_level,
                dirty_cards,
                clean_cards,
            } => format!(
                "[CARD] Rebased on level {:#x}: {} dirty, {} clean",
                new_level, dirty_cards, clean_cards
            ),
            CardEvent::BoundariesVerified {
                from_index,
                cards_checked,
            } => format!(
                "[CARD] Verified {} boundaries from card {}",
                cards_checked, from_index
            ),
            CardEvent::BoundaryBroken {
                index,
                address,
                reason,
            } => format!(
                "[CARD] Boundary broken at card {} ({:#x}): {}",
                index, address, reason
            ),
            CardEvent::DirtyScan {
                cards_scanned,
                objects_visited,
                duration_us,
            } => format!(
                "[CARD] Scanned {} dirty cards, {} objects ({} us)",
                cards_scanned, objects_visited, duration_us
            ),
            CardEvent::RootSection { section, slots } => {
                format!("[CARD] Root section {}: {} slots", section, slots)
            },
        }
    }

    /// Render in JSON format
    pub fn format_json(event: &CardEvent) -> String {
        let json = match event {
            CardEvent::TableCreated {
                base,
                num_cards,
                card_size,
            } => serde_json::json!({
                "type": "table_created",
                "base": base,
                "num_cards": num_cards,
                "card_size": card_size
            }),
            CardEvent::Cleared { num_cards } => serde_json::json!({
                "type": "cleared",
                "num_cards": num_cards
            }),
            CardEvent::CompactionRebase {
                new_level,
                dirty_cards,
                clean_cards,
            } => serde_json::json!({
                "type": "compaction_rebase",
                "new_level": new_level,
                "dirty_cards": dirty_cards,
                "clean_cards": clean_cards
            }),
            CardEvent::BoundariesVerified {
                from_index,
                cards_checked,
            } => serde_json::json!({
                "type": "boundaries_verified",
                "from_index": from_index,
                "cards_checked": cards_checked
            }),
            CardEvent::BoundaryBroken {
                index,
                address,
                reason,
            } => serde_json::json!({
                "type": "boundary_broken",
                "index": index,
                "address": address,
                "reason": reason
            }),
            CardEvent::DirtyScan {
                cards_scanned,
                objects_visited,
                duration_us,
            } => serde_json::json!({
                "type": "dirty_scan",
                "cards_scanned": cards_scanned,
                "objects_visited": objects_visited,
                "duration_us": duration_us
            }),
            CardEvent::RootSection { section, slots } => serde_json::json!({
                "type": "root_section",
                "section": section,
                "slots": slots
            }),
        };

        json.to_string()
    }

    /// Get all events
    pub fn get_events(&self) -> Vec<(Instant, CardEvent)> {
        self.events.lock().iter().cloned().collect()
    }

    /// Clear all events
    pub fn clear_events(&self) {
        self.events.lock().clear();
    }

    /// Get event count
    pub fn event_count(&self) -> usize {
        self.events.lock().len()
    }
}

impl Default for CardLogger {
    fn default() -> Self {
        Self::new(CardLoggerConfig::default())
    }
}

// Global card logger
lazy_static::lazy_static! {
    static ref GLOBAL_LOGGER: Mutex<CardLogger> = Mutex::new(CardLogger::default());
}

static GLOBAL_CONFIGURED: AtomicBool = AtomicBool::new(false);

/// Check if the global logger has been configured
#[inline]
pub fn is_logger_configured() -> bool {
    GLOBAL_CONFIGURED.load(Ordering::Relaxed)
}

/// Log a card event to the global logger
///
/// Dropped without locking until the global logger is configured.
pub fn log_event(event: CardEvent) {
    if !is_logger_configured() {
        return;
    }
    GLOBAL_LOGGER.lock().log(event);
}

/// Configure global logger and start buffering events
pub fn configure_logger(config: CardLoggerConfig) {
    *GLOBAL_LOGGER.lock() = CardLogger::new(config);
    GLOBAL_CONFIGURED.store(true, Ordering::Relaxed);
}

/// Get global logger event count
pub fn get_event_count() -> usize {
    GLOBAL_LOGGER.lock().event_count()
}

/// Snapshot of the global logger's events
pub fn get_events() -> Vec<CardEvent> {
    GLOBAL_LOGGER
        .lock()
        .get_events()
        .into_iter()
        .map(|(_, event)| event)
        .collect()
}
