//! Infrastructure modules for sio0-rs.

// Copyright (c) 2025 Piers Finlayson <piers@piers.rocks>
//
// GPLv3 licensed - see https://www.gnu.org/licenses/gpl-3.0.html

pub mod config;
pub mod regs;

pub use regs::{Control, Mode, SioRegisters, Status};
