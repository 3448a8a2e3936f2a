use zerocopy::{
    FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned,
    little_endian::{U16, U32},
};

/// The header of a [`Frame`].
#[repr(C)]
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, IntoBytes, FromBytes, Immutable, KnownLayout, Unaligned,
)]
pub struct FrameHeader {
    generation: U32,
    slot_cycles: U32,
    num_banks: U16,
    bank_size: U16,
}

impl FrameHeader {
    /// Creates a new [`FrameHeader`].
    #[must_use]
    pub fn new(generation: u32, slot_cycles: u32, num_banks: u16, bank_size: u16) -> Self {
        Self {
            generation: U32::new(generation),
            slot_cycles: U32::new(slot_cycles),
            num_banks: U16::new(num_banks),
            bank_size: U16::new(bank_size),
        }
    }

    /// The configuration generation this frame belongs to.
    #[must_use]
    pub fn generation(&self) -> u32 {
        self.generation.get()
    }

    /// The number of carrier cycles each mux slot lasts.
    #[must_use]
    pub fn slot_cycles(&self) -> u32 {
        self.slot_cycles.get()
    }

    /// The number of banks.
    #[must_use]
    pub fn num_banks(&self) -> u16 {
        self.num_banks.get()
    }

    /// The number of channels per bank.
    #[must_use]
    pub fn bank_size(&self) -> u16 {
        self.bank_size.get()
    }
}

/// The drive setting of one channel in a [`Frame`].
#[repr(C)]
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, IntoBytes, FromBytes, Immutable, KnownLayout, Unaligned,
)]
pub struct ChannelEntry {
    channel: U16,
    bank: U16,
    select: U16,
    pulse_width: U16,
    phase: U16,
}

impl ChannelEntry {
    /// Creates a new [`ChannelEntry`].
    #[must_use]
    pub fn new(channel: u16, bank: u16, select: u16, pulse_width: u16, phase: u16) -> Self {
        Self {
            channel: U16::new(channel),
            bank: U16::new(bank),
            select: U16::new(select),
            pulse_width: U16::new(pulse_width),
            phase: U16::new(phase),
        }
    }

    /// The channel (emitter) index.
    #[must_use]
    pub fn channel(&self) -> u16 {
        self.channel.get()
    }

    /// The bank the channel belongs to.
    #[must_use]
    pub fn bank(&self) -> u16 {
        self.bank.get()
    }

    /// The mux select code that routes the bank generator to this channel.
    #[must_use]
    pub fn select(&self) -> u16 {
        self.select.get()
    }

    /// The pulse width in generator ticks.
    #[must_use]
    pub fn pulse_width(&self) -> u16 {
        self.pulse_width.get()
    }

    /// The rising-edge offset in generator ticks.
    #[must_use]
    pub fn phase(&self) -> u16 {
        self.phase.get()
    }
}

/// A complete per-refresh-cycle timing table in the fixed little-endian wire format.
///
/// Entries are stored slot-major: all entries of select code 0, then select code 1, and so on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    header: FrameHeader,
    entries: Vec<ChannelEntry>,
}

impl Frame {
    /// Creates a new [`Frame`].
    #[must_use]
    pub const fn new(header: FrameHeader, entries: Vec<ChannelEntry>) -> Self {
        Self { header, entries }
    }

    /// Gets the header.
    #[must_use]
    pub const fn header(&self) -> &FrameHeader {
        &self.header
    }

    /// Gets the entries.
    #[must_use]
    pub fn entries(&self) -> &[ChannelEntry] {
        &self.entries
    }

    /// Serializes the frame.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf =
            Vec::with_capacity(size_of::<FrameHeader>() + size_of_val(self.entries.as_slice()));
        buf.extend_from_slice(self.header.as_bytes());
        buf.extend_from_slice(self.entries.as_bytes());
        buf
    }

    /// Deserializes a frame. Returns `None` if `bytes` is not a whole frame.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let (header, rest) = FrameHeader::read_from_prefix(bytes).ok()?;
        let entries = <[ChannelEntry]>::ref_from_bytes(rest).ok()?;
        Some(Self {
            header,
            entries: entries.to_vec(),
        })
    }
}
