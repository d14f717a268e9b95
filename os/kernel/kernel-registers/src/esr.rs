//! `ESR_EL1`: Exception Syndrome Register.

use bitfield_struct::bitfield;

/// Instruction abort taken from a lower exception level (user space).
pub const EC_IABT_LOWER_EL: u8 = 0b10_0000;
/// Instruction abort taken without a change in exception level.
pub const EC_IABT_CURRENT_EL: u8 = 0b10_0001;
/// Data abort taken from a lower exception level (user space).
pub const EC_DABT_LOWER_EL: u8 = 0b10_0100;
/// Data abort taken without a change in exception level.
pub const EC_DABT_CURRENT_EL: u8 = 0b10_0101;

/// Mask of the fault status code inside the ISS of an abort.
pub const FSC_MASK: u32 = 0x3F;

/// `ESR_EL1` layout.
#[bitfield(u64)]
pub struct EsrEl1 {
    /// Bits 0–24: Instruction Specific Syndrome; layout depends on [`ec`](Self::ec).
    #[bits(25)]
    pub iss: u32,

    /// Bit 25: 32-bit instruction trapped.
    pub il: bool,

    /// Bits 26–31: Exception Class.
    #[bits(6)]
    pub ec: u8,

    /// Bits 32–36: ISS2 (FEAT_LS64 and friends).
    #[bits(5)]
    pub iss2: u8,

    #[bits(27)]
    __: u32,
}

impl EsrEl1 {
    /// Raw six-bit fault status code (`DFSC`/`IFSC`).
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn fsc_bits(&self) -> u8 {
        (self.iss() & FSC_MASK) as u8
    }

    /// Decoded fault status code.
    #[inline]
    #[must_use]
    pub const fn fault_status(&self) -> FaultStatusCode {
        FaultStatusCode::from_bits(self.fsc_bits())
    }
}

/// Page-table level at which a fault was detected.
pub type Level = u8;

/// Decoded `DFSC`/`IFSC`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FaultStatusCode {
    AddressSize(Level),
    /// No valid translation at the given lookup level.
    Translation(Level),
    AccessFlag(Level),
    Permission(Level),
    SyncExternalAbort,
    Alignment,
    TlbConflict,
    Other(u8),
}

impl FaultStatusCode {
    #[must_use]
    pub const fn from_bits(fsc: u8) -> Self {
        let level = fsc & 0b11;
        match fsc {
            0x00..=0x03 => Self::AddressSize(level),
            0x04..=0x07 => Self::Translation(level),
            0x08..=0x0B => Self::AccessFlag(level),
            0x0C..=0x0F => Self::Permission(level),
            0x10 => Self::SyncExternalAbort,
            0x21 => Self::Alignment,
            0x30 => Self::TlbConflict,
            other => Self::Other(other),
        }
    }

    /// Translation fault at level 0 to 3, the class serviced by demand paging.
    #[inline]
    #[must_use]
    pub const fn is_translation_fault(self) -> bool {
        matches!(self, Self::Translation(_))
    }
}
