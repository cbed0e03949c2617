use crate::utils::Size;

bitflags::bitflags! {
    /// Flags of a [`Mode`]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ModeFlags: u32 {
        /// The output is currently driven with this mode
        const CURRENT = 0x1;
        /// The mode the hardware prefers
        const PREFERRED = 0x2;
    }
}

/// A resolution mode of an output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Mode {
    /// The size of the mode, in pixels
    pub size: Size<i32>,
    /// The refresh rate in millihertz
    ///
    /// `1000` is one fps (frame per second), `2000` is 2 fps, etc...
    pub refresh: i32,
    /// Current and preferred flags
    pub flags: ModeFlags,
    /// Stable identifier of the mode, only meaningful for output devices
    pub id: i32,
}

impl Mode {
    /// A mode without flags
    pub fn new(size: impl Into<Size<i32>>, refresh: i32) -> Mode {
        Mode {
            size: size.into(),
            refresh,
            flags: ModeFlags::empty(),
            id: -1,
        }
    }

    /// The same mode with the given flags
    pub fn with_flags(mut self, flags: ModeFlags) -> Mode {
        self.flags = flags;
        self
    }

    /// The same mode with the given id
    pub fn with_id(mut self, id: i32) -> Mode {
        self.id = id;
        self
    }

    /// Whether the mode is flagged current
    pub fn is_current(&self) -> bool {
        self.flags.contains(ModeFlags::CURRENT)
    }

    /// Whether the mode is flagged preferred
    pub fn is_preferred(&self) -> bool {
        self.flags.contains(ModeFlags::PREFERRED)
    }

    fn same_mode(&self, size: Size<i32>, refresh: i32) -> bool {
        self.size == size && self.refresh == refresh
    }
}

/// Errors of mode manipulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum OutputError {
    /// No mode with this size and refresh rate was added
    #[error("no mode {}x{}@{} known for this output", .size.w, .size.h, .refresh)]
    UnknownMode {
        /// requested size
        size: Size<i32>,
        /// requested refresh rate
        refresh: i32,
    },
    /// No mode with this id was added
    #[error("no mode with id {0} known for this output")]
    UnknownModeId(i32),
}

/// Ordered list of the modes of an output
///
/// Once a mode was added exactly one of them is current, and at most one is preferred.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModeList {
    modes: Vec<Mode>,
}

impl ModeList {
    /// An empty list
    pub fn new() -> ModeList {
        ModeList::default()
    }

    /// Add a mode, or update the flags of the mode with the same size and refresh rate
    ///
    /// The first mode added becomes current whatever its flags. Returns whether the list
    /// changed.
    pub fn add(&mut self, mut mode: Mode) -> bool {
        let existing = self
            .modes
            .iter()
            .position(|m| m.same_mode(mode.size, mode.refresh));
        let other_current = self
            .modes
            .iter()
            .enumerate()
            .any(|(idx, m)| m.is_current() && Some(idx) != existing);
        if !other_current {
            mode.flags |= ModeFlags::CURRENT;
        }

        if let Some(idx) = existing {
            if self.modes[idx] == mode {
                return false;
            }
        }

        for (idx, other) in self.modes.iter_mut().enumerate() {
            if Some(idx) == existing {
                continue;
            }
            if mode.is_current() {
                other.flags.remove(ModeFlags::CURRENT);
            }
            if mode.is_preferred() {
                other.flags.remove(ModeFlags::PREFERRED);
            }
        }

        match existing {
            Some(idx) => self.modes[idx] = mode,
            None => self.modes.push(mode),
        }
        true
    }

    /// Make the mode with this size and refresh rate current
    ///
    /// Returns `Ok(false)` if it already was.
    pub fn set_current(&mut self, size: Size<i32>, refresh: i32) -> Result<bool, OutputError> {
        let idx = self
            .modes
            .iter()
            .position(|m| m.same_mode(size, refresh))
            .ok_or(OutputError::UnknownMode { size, refresh })?;
        Ok(self.make_current(idx))
    }

    /// Make the mode with this id current
    ///
    /// Returns `Ok(false)` if it already was.
    pub fn set_current_by_id(&mut self, id: i32) -> Result<bool, OutputError> {
        let idx = self
            .modes
            .iter()
            .position(|m| m.id == id)
            .ok_or(OutputError::UnknownModeId(id))?;
        Ok(self.make_current(idx))
    }

    fn make_current(&mut self, idx: usize) -> bool {
        if self.modes[idx].is_current() {
            return false;
        }
        for mode in &mut self.modes {
            mode.flags.remove(ModeFlags::CURRENT);
        }
        self.modes[idx].flags.insert(ModeFlags::CURRENT);
        true
    }

    /// Every mode, in insertion order
    pub fn modes(&self) -> &[Mode] {
        &self.modes
    }

    /// The current mode
    pub fn current(&self) -> Option<Mode> {
        self.modes.iter().copied().find(Mode::is_current)
    }

    /// The preferred mode
    pub fn preferred(&self) -> Option<Mode> {
        self.modes.iter().copied().find(Mode::is_preferred)
    }

    /// The mode with this id
    pub fn by_id(&self, id: i32) -> Option<Mode> {
        self.modes.iter().copied().find(|m| m.id == id)
    }

    /// The order modes are announced in: every non current mode, then the current one
    pub fn replay_order(&self) -> impl Iterator<Item = Mode> + '_ {
        self.modes
            .iter()
            .filter(|m| !m.is_current())
            .chain(self.modes.iter().filter(|m| m.is_current()))
            .copied()
    }

    /// Whether no mode was added yet
    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }
}
