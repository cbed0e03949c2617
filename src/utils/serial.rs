use std::cell::Cell;

/// A serial type, whose comparison takes into account the wrapping-around behavior of the
/// underlying counter.
#[derive(Debug, Copy, Clone, Hash)]
pub struct Serial(pub(crate) u32);

impl PartialEq for Serial {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Serial {}

impl PartialOrd for Serial {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        let distance = self.0.abs_diff(other.0);
        if distance < u32::MAX / 2 {
            self.0.partial_cmp(&other.0)
        } else {
            // wrap-around occurred, invert comparison
            other.0.partial_cmp(&self.0)
        }
    }
}

impl From<u32> for Serial {
    fn from(n: u32) -> Self {
        Serial(n)
    }
}

impl From<Serial> for u32 {
    fn from(serial: Serial) -> u32 {
        serial.0
    }
}

impl Serial {
    /// Checks if a serial was generated after or is equal to another given serial
    pub fn is_no_older_than(&self, other: &Serial) -> bool {
        other <= self
    }
}

/// A counter for generating serials, owned by a [`Display`](crate::wayland::Display)
///
/// Serials start at 1 and never take the value 0. The counter is not shared between
/// displays, so two displays in the same process hand out independent sequences.
///
/// Serials are only guaranteed to be strictly increasing until the 32-bit space is
/// exhausted, after which the counter wraps around skipping 0. Long running sessions
/// that need ordering across the wrap should compare with [`Serial`]'s ordering, which
/// accounts for it.
#[derive(Debug)]
pub struct SerialCounter {
    serial: Cell<u32>,
}

impl Default for SerialCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl SerialCounter {
    /// Create a new counter, the first serial handed out is 1
    pub fn new() -> Self {
        Self { serial: Cell::new(1) }
    }

    /// Retrieve the next serial from the counter
    pub fn next_serial(&self) -> Serial {
        let mut serial = self.serial.get();
        if serial == 0 {
            serial = 1;
        }
        self.serial.set(serial.wrapping_add(1));
        Serial(serial)
    }

    /// The serial that was handed out last, if any
    pub fn last_serial(&self) -> Option<Serial> {
        match self.serial.get().wrapping_sub(1) {
            0 => None,
            n => Some(Serial(n)),
        }
    }
}
