use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

/// Number of low bits reserved for the node identifier.
const NODE_BITS: u32 = 8;

/// Timestamp source for LWW writes.
///
/// Produces `(physical_us << 8) | node_id`, where `physical_us` is wall-clock
/// microseconds since the UNIX epoch, bumped by one whenever the wall clock
/// has not advanced past the last value handed out. Values from one clock
/// are therefore strictly increasing, and two clocks with distinct node ids
/// never collide.
///
/// Safe for concurrent use via an internal [`Mutex`].
pub struct TimestampClock {
    node_id: u8,
    last_us: Mutex<u64>,
}

impl TimestampClock {
    pub fn new(node_id: u8) -> Self {
        Self {
            node_id,
            last_us: Mutex::new(0),
        }
    }

    /// Generate a timestamp strictly greater than every previous one.
    pub fn now(&self) -> u64 {
        let wall = Self::wall_clock_us();
        let mut last = self.last_us.lock().expect("clock mutex poisoned");
        let next = wall.max(*last + 1);
        *last = next;
        (next << NODE_BITS) | u64::from(self.node_id)
    }

    pub fn node_id(&self) -> u8 {
        self.node_id
    }

    /// Split a timestamp back into `(physical_us, node_id)`.
    pub fn split(timestamp: u64) -> (u64, u8) {
        (timestamp >> NODE_BITS, (timestamp & 0xff) as u8)
    }

    fn wall_clock_us() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_micros() as u64
    }
}

impl Default for TimestampClock {
    fn default() -> Self {
        Self::new(0)
    }
}

impl std::fmt::Debug for TimestampClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimestampClock")
            .field("node_id", &self.node_id)
            .finish()
    }
}
