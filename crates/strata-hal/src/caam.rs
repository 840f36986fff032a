// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! CAAM / SNVS secret source
//!
//! NXP Layerscape and i.MX parts derive the device master key inside the
//! CAAM from the OTP master key. The key is only the true OTP-derived value
//! while the security monitor is in Trusted or Secure state and PRIBLOB in
//! the CAAM security configuration register is still zero. Setting PRIBLOB
//! to the normal value changes the derivation for the rest of the power
//! cycle, which is how the secret is hidden.
//!
//! # Variants
//!
//! - **Layerscape**: state from the security monitor status register (SSM
//!   state field), PRIBLOB must be zero.
//! - **i.MX**: state from the CAAM status register (mode of operation), and
//!   the SNVS master key selector must point at the OTP master key.
//!
//! # Secure Boot
//!
//! On Layerscape the boot ROM's secure boot status is in the fuse block
//! (OSPR intent-to-secure) and the reset configuration word (SB_EN). When
//! it is enabled, DCFG scratch register 1 holds the address of the CSF
//! header the ROM validated, from which [`csf_auth_key`] extracts the key
//! that authenticated this stage.

use core::ptr::{read_volatile, write_volatile};

use strata_common::constants::HARDWARE_SECRET_SIZE;
use strata_common::SecurityState;

use crate::error::{HalError, HalResult};
use crate::traits::{RollForward, SecretSource};

// =============================================================================
// CAAM Register Definitions
// =============================================================================

/// Security configuration register offset
pub const SEC_SCFGR: usize = 0x000C;

/// CAAM status register offset
pub const SEC_CSTA: usize = 0x0FD4;

/// PRIBLOB field mask in SCFGR
pub const PRIBLOB_MASK: u32 = 0x3;

/// PRIBLOB value for secure boot blobs (secret readable)
pub const PRIBLOB_SECURE_BOOT: u32 = 0x0;

/// PRIBLOB value after roll-forward
pub const PRIBLOB_NORMAL: u32 = 0x3;

// Mode of operation field in CSTA
const CSTA_MOO_MASK: u32 = 0x3 << 8;
const CSTA_MOO_SECURE: u32 = 0x1 << 8;
const CSTA_MOO_TRUSTED: u32 = 0x2 << 8;

// =============================================================================
// Security Monitor / SNVS Register Definitions
// =============================================================================

/// HP status register offset
pub const SNVS_HPSR: usize = 0x14;

/// HP lock register offset
pub const SNVS_HPLOCK: usize = 0x00;

/// LP lock register offset
pub const SNVS_LPLOCK: usize = 0x34;

/// LP master key control register offset
pub const SNVS_LPMKEYCTL: usize = 0x3C;

// SSM state field in HPSR
const HPSR_SSM_ST_MASK: u32 = 0xF << 8;
const HPSR_SSM_ST_TRUST: u32 = 0xD << 8;
const HPSR_SSM_ST_SECURE: u32 = 0xF << 8;

// Master key selector
const MKEYCTL_SEL_MASK: u32 = 0x3;
const MKEYCTL_SEL_OTP: u32 = 0x0;
const MKEYSEL_LOCK: u32 = 1 << 9;

// =============================================================================
// Register Decoding
// =============================================================================

/// Extract PRIBLOB from SCFGR
#[must_use]
pub const fn priblob(scfgr: u32) -> u32 {
    scfgr & PRIBLOB_MASK
}

/// Decode the SSM state field of HPSR
#[must_use]
pub const fn decode_ssm_state(hpsr: u32) -> SecurityState {
    match hpsr & HPSR_SSM_ST_MASK {
        HPSR_SSM_ST_TRUST => SecurityState::Trusted,
        HPSR_SSM_ST_SECURE => SecurityState::Secure,
        _ => SecurityState::Unknown,
    }
}

/// Decode the mode-of-operation field of CSTA
#[must_use]
pub const fn decode_mode_of_operation(csta: u32) -> SecurityState {
    match csta & CSTA_MOO_MASK {
        CSTA_MOO_TRUSTED => SecurityState::Trusted,
        CSTA_MOO_SECURE => SecurityState::Secure,
        _ => SecurityState::Unknown,
    }
}

/// Combine the monitor state with PRIBLOB
///
/// A rolled-forward PRIBLOB wins over everything; any other non-zero
/// PRIBLOB means the key is not the secure-boot derivation.
#[must_use]
pub const fn combine_state(monitor: SecurityState, scfgr: u32) -> SecurityState {
    match priblob(scfgr) {
        PRIBLOB_NORMAL => SecurityState::Normal,
        PRIBLOB_SECURE_BOOT => monitor,
        _ => SecurityState::Unknown,
    }
}

// =============================================================================
// Register Access
// =============================================================================

/// 32-bit register block access by byte offset
pub trait RegisterAccess {
    /// Read a register
    fn read32(&self, offset: usize) -> u32;

    /// Write a register
    fn write32(&mut self, offset: usize, value: u32);
}

/// Memory-mapped register block
#[derive(Debug)]
pub struct MmioRegisters {
    base: usize,
}

impl MmioRegisters {
    /// Create an accessor for the block at `base`
    ///
    /// # Safety
    ///
    /// `base` must be the address of a mapped register block covering every
    /// offset used by the caller, and nothing else may access it concurrently.
    #[must_use]
    pub const unsafe fn new(base: usize) -> Self {
        Self { base }
    }
}

impl RegisterAccess for MmioRegisters {
    fn read32(&self, offset: usize) -> u32 {
        // SAFETY: validity of base + offset is the constructor's contract
        unsafe { read_volatile((self.base + offset) as *const u32) }
    }

    fn write32(&mut self, offset: usize, value: u32) {
        // SAFETY: validity of base + offset is the constructor's contract
        unsafe { write_volatile((self.base + offset) as *mut u32, value) }
    }
}

/// Reads the CAAM-derived master key
///
/// On hardware this runs the blob key verification job; the engine applies
/// the current PRIBLOB itself, so implementations may ignore `priblob`.
pub trait MasterKeyReader {
    /// Read the master key derived under `priblob`
    fn read_master_key(&mut self, priblob: u32, out: &mut [u8; HARDWARE_SECRET_SIZE]) -> HalResult<()>;
}

// =============================================================================
// Secure Boot Registers
// =============================================================================

/// OSPR offset in the SFP block
pub const SFP_OSPR: usize = 0x200;

/// Intent-to-secure fuse in OSPR
pub const OSPR_ITS_MASK: u32 = 0x0000_0004;

/// First reset configuration word status register in the DCFG block
pub const DCFG_RCWSR1: usize = 0x100;

/// RCW status word carrying SB_EN (1-based)
pub const RCW_SB_EN_REG_INDEX: usize = 7;

/// SB_EN bit in its RCW status word
pub const RCW_SB_EN_MASK: u32 = 0x0020_0000;

/// DCFG scratch register holding the CSF header address
pub const DCFG_SCRATCHRW1: usize = 0x200;

/// Secure boot status as read from the fuse and RCW registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HabStatus {
    /// OSPR intent-to-secure fuse blown
    pub its: bool,
    /// SB_EN set in the reset configuration word
    pub sb_en: bool,
}

impl HabStatus {
    /// Decode OSPR and the RCW status word
    #[must_use]
    pub const fn decode(ospr: u32, rcwsr: u32) -> Self {
        Self {
            its: ospr & OSPR_ITS_MASK != 0,
            sb_en: rcwsr & RCW_SB_EN_MASK != 0,
        }
    }

    /// Either source enables secure boot
    #[must_use]
    pub const fn enabled(&self) -> bool {
        self.its || self.sb_en
    }
}

/// SFP and DCFG register blocks
///
/// DCFG registers are big-endian; SFP registers are native.
#[derive(Debug)]
pub struct HabRegisters<R: RegisterAccess> {
    sfp: R,
    dcfg: R,
}

impl<R: RegisterAccess> HabRegisters<R> {
    /// Create an accessor from the SFP and DCFG blocks
    pub const fn new(sfp: R, dcfg: R) -> Self {
        Self { sfp, dcfg }
    }

    /// Read the secure boot status
    #[must_use]
    pub fn status(&self) -> HabStatus {
        let ospr = self.sfp.read32(SFP_OSPR);
        let rcwsr = u32::from_be(self.dcfg.read32(DCFG_RCWSR1 + (RCW_SB_EN_REG_INDEX - 1) * 4));
        HabStatus::decode(ospr, rcwsr)
    }

    /// Whether the boot ROM enforced secure boot
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.status().enabled()
    }

    /// Address of the CSF header left by the boot ROM
    #[must_use]
    pub fn csf_header_address(&self) -> usize {
        u32::from_be(self.dcfg.read32(DCFG_SCRATCHRW1)) as usize
    }
}

// =============================================================================
// CSF Header
// =============================================================================

/// Barker code opening every CSF header
pub const CSF_BARKER: [u8; 4] = [0x68, 0x39, 0x27, 0x81];

/// Size of the CSF header
pub const CSF_HEADER_SIZE: usize = 0x40;

/// Key storage of one SRK table entry
pub const SRK_KEY_CAPACITY: usize = 2048;

/// Size of one SRK table entry: key length word, then the key storage
pub const SRK_ENTRY_SIZE: usize = 4 + SRK_KEY_CAPACITY;

/// Maximum number of SRK table entries
pub const MAX_SRK_ENTRIES: u32 = 4;

// Header layout (little-endian words)
const CSF_KEY_OFFSET: usize = 0x04;
const CSF_KEY_LEN: usize = 0x08;

fn le_word(bytes: &[u8], offset: usize) -> HalResult<u32> {
    let end = offset.checked_add(4).ok_or(HalError::InvalidCsf)?;
    let word = bytes.get(offset..end).ok_or(HalError::InvalidCsf)?;
    Ok(u32::from_le_bytes([word[0], word[1], word[2], word[3]]))
}

/// Extract the stage authentication key from a CSF header
///
/// With the SRK table flag set, the key is the table entry selected by the
/// header's key number (1-based); otherwise the header points at the key
/// directly. Direct keys are whole RSA modulus/exponent pairs, so the low
/// byte of their length word, which doubles as the table flag, is zero.
///
/// # Errors
///
/// `InvalidCsf` on a barker mismatch, a key number outside the table, or
/// a key that does not lie within `csf`.
pub fn csf_auth_key(csf: &[u8]) -> HalResult<&[u8]> {
    let header = csf.get(..CSF_HEADER_SIZE).ok_or(HalError::InvalidCsf)?;
    if header[..CSF_BARKER.len()] != CSF_BARKER {
        return Err(HalError::InvalidCsf);
    }
    let offset = le_word(header, CSF_KEY_OFFSET)? as usize;
    let len_kr = le_word(header, CSF_KEY_LEN)?;

    let srk_table_flag = len_kr & 0xFF;
    let (key_offset, key_len) = if srk_table_flag == 0 {
        (offset, len_kr as usize)
    } else {
        let key_num = (len_kr >> 8) & 0xFF;
        if key_num == 0 || key_num > MAX_SRK_ENTRIES {
            return Err(HalError::InvalidCsf);
        }
        let entry = offset
            .checked_add((key_num as usize - 1) * SRK_ENTRY_SIZE)
            .ok_or(HalError::InvalidCsf)?;
        let key_len = le_word(csf, entry)? as usize;
        if key_len > SRK_KEY_CAPACITY {
            return Err(HalError::InvalidCsf);
        }
        (entry + 4, key_len)
    };

    if key_len == 0 {
        return Err(HalError::InvalidCsf);
    }
    let end = key_offset.checked_add(key_len).ok_or(HalError::InvalidCsf)?;
    csf.get(key_offset..end).ok_or(HalError::InvalidCsf)
}

/// View the CSF image left in memory by the boot ROM
///
/// # Safety
///
/// `address..address + len` must be mapped, readable memory that is not
/// written for the rest of this boot stage.
#[must_use]
pub unsafe fn csf_region(address: usize, len: usize) -> &'static [u8] {
    // SAFETY: forwarded to the caller
    unsafe { core::slice::from_raw_parts(address as *const u8, len) }
}

// =============================================================================
// Secret Source
// =============================================================================

/// SoC family, selecting where the security state is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaamVariant {
    /// Layerscape: SSM state in the security monitor
    Layerscape,
    /// i.MX: CAAM mode of operation plus SNVS key selector
    Imx,
}

/// Secret source backed by the CAAM master key
pub struct CaamSecretSource<R: RegisterAccess, K: MasterKeyReader> {
    variant: CaamVariant,
    sec: R,
    monitor: R,
    key: K,
    secure_boot: bool,
    hab: Option<(HabRegisters<R>, &'static [u8])>,
}

impl<R: RegisterAccess, K: MasterKeyReader> CaamSecretSource<R, K> {
    /// Create a source from the CAAM block, the monitor/SNVS block and a key reader
    pub const fn new(variant: CaamVariant, sec: R, monitor: R, key: K) -> Self {
        Self {
            variant,
            sec,
            monitor,
            key,
            secure_boot: false,
            hab: None,
        }
    }

    /// Record the secure boot (HAB) status reported by the boot ROM
    ///
    /// Used on parts without readable secure boot registers; see
    /// [`with_hab`](Self::with_hab) otherwise.
    #[must_use]
    pub fn with_secure_boot(mut self, enforced: bool) -> Self {
        self.secure_boot = enforced;
        self
    }

    /// Read secure boot status from `hab` and the stage key from `csf`
    #[must_use]
    pub fn with_hab(mut self, hab: HabRegisters<R>, csf: &'static [u8]) -> Self {
        self.hab = Some((hab, csf));
        self
    }

    /// The CAAM register block
    pub fn sec(&self) -> &R {
        &self.sec
    }

    /// The monitor/SNVS register block
    pub fn monitor(&self) -> &R {
        &self.monitor
    }

    /// The master key reader
    pub fn key_reader(&self) -> &K {
        &self.key
    }

    fn key_selector_is_otp(&self) -> bool {
        self.monitor.read32(SNVS_LPMKEYCTL) & MKEYCTL_SEL_MASK == MKEYCTL_SEL_OTP
    }

    fn key_selector_locked(&self) -> bool {
        self.monitor.read32(SNVS_LPLOCK) & MKEYSEL_LOCK != 0
            || self.monitor.read32(SNVS_HPLOCK) & MKEYSEL_LOCK != 0
    }

    /// Point the SNVS master key selector at the OTP master key
    ///
    /// # Errors
    ///
    /// `KeySourceLocked` if the selector is hard- or soft-locked to another source.
    pub fn select_otp_master_key(&mut self) -> HalResult<()> {
        if self.key_selector_is_otp() {
            return Ok(());
        }
        if self.key_selector_locked() {
            return Err(HalError::KeySourceLocked);
        }
        let val = self.monitor.read32(SNVS_LPMKEYCTL);
        self.monitor
            .write32(SNVS_LPMKEYCTL, (val & !MKEYCTL_SEL_MASK) | MKEYCTL_SEL_OTP);
        Ok(())
    }
}

impl<R: RegisterAccess, K: MasterKeyReader> SecretSource for CaamSecretSource<R, K> {
    fn security_state(&self) -> SecurityState {
        let monitor = match self.variant {
            CaamVariant::Layerscape => decode_ssm_state(self.monitor.read32(SNVS_HPSR)),
            CaamVariant::Imx => {
                if !self.key_selector_is_otp() && self.key_selector_locked() {
                    SecurityState::Unknown
                } else {
                    decode_mode_of_operation(self.sec.read32(SEC_CSTA))
                }
            }
        };
        combine_state(monitor, self.sec.read32(SEC_SCFGR))
    }

    fn read_secret(&mut self, out: &mut [u8; HARDWARE_SECRET_SIZE]) -> HalResult<()> {
        if self.variant == CaamVariant::Imx {
            self.select_otp_master_key()?;
        }
        let priblob = priblob(self.sec.read32(SEC_SCFGR));
        self.key
            .read_master_key(priblob, out)
            .map_err(|_| HalError::SecretReadFailed)
    }

    fn roll_forward(&mut self) -> HalResult<RollForward> {
        let val = self.sec.read32(SEC_SCFGR);
        if priblob(val) == PRIBLOB_NORMAL {
            return Ok(RollForward::AlreadyNormal);
        }
        self.sec.write32(SEC_SCFGR, val | PRIBLOB_NORMAL);
        if priblob(self.sec.read32(SEC_SCFGR)) != PRIBLOB_NORMAL {
            return Err(HalError::RollForwardFailed);
        }
        Ok(RollForward::Performed)
    }

    fn secure_boot_enforced(&self) -> bool {
        self.hab
            .as_ref()
            .map_or(self.secure_boot, |(hab, _)| hab.is_enabled())
    }

    fn stage_auth_key(&self, out: &mut [u8]) -> HalResult<usize> {
        let (hab, csf) = self.hab.as_ref().ok_or(HalError::NotSupported)?;
        if !hab.is_enabled() {
            return Err(HalError::SecureBootDisabled);
        }
        let key = csf_auth_key(csf)?;
        out.get_mut(..key.len())
            .ok_or(HalError::InvalidParameter)?
            .copy_from_slice(key);
        Ok(key.len())
    }
}
