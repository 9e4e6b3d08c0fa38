//! Ingress/egress wire views (§4.7, §6.1, §6.2). Plain fixed-offset
//! `from_le_bytes`/`to_le_bytes` reads, no allocation, no external
//! zero-copy crate — nothing in the corpus actually exercises one.
#![allow(dead_code)]

use crate::queue::Command;
use crate::types::{OrderId, Price, Qty, Side};

pub const INBOUND_FRAME_LEN: usize = 25;
pub const OUTBOUND_FRAME_LEN: usize = 26;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    ShortFrame,
    BadSide(u8),
}

/// A non-owning view over a 25-byte inbound order-command frame (§6.1).
/// Reused across frames by the I/O thread; never copies the buffer.
pub struct InboundView<'a> {
    buf: &'a [u8],
}

impl<'a> InboundView<'a> {
    #[inline]
    pub fn new(buf: &'a [u8]) -> Result<Self, DecodeError> {
        if buf.len() < INBOUND_FRAME_LEN {
            return Err(DecodeError::ShortFrame);
        }
        Ok(Self { buf })
    }

    #[inline]
    pub fn order_id(&self) -> OrderId {
        i64::from_le_bytes(self.buf[0..8].try_into().unwrap())
    }

    #[inline]
    pub fn price(&self) -> Price {
        i64::from_le_bytes(self.buf[8..16].try_into().unwrap())
    }

    #[inline]
    pub fn quantity(&self) -> Qty {
        i64::from_le_bytes(self.buf[16..24].try_into().unwrap())
    }

    #[inline]
    pub fn side(&self) -> Result<Side, DecodeError> {
        match self.buf[24] {
            0 => Ok(Side::Buy),
            1 => Ok(Side::Sell),
            other => Err(DecodeError::BadSide(other)),
        }
    }

    /// Extracts all four fields into a ring-buffer `Command`, per §4.7's
    /// "matching thread copies the four scalar fields into a slot".
    #[inline]
    pub fn to_command(&self) -> Result<Command, DecodeError> {
        Ok(Command { order_id: self.order_id(), price: self.price(), qty: self.quantity(), side: self.side()? })
    }
}

#[inline]
pub fn encode_inbound(order_id: OrderId, price: Price, qty: Qty, side: Side) -> [u8; INBOUND_FRAME_LEN] {
    let mut out = [0u8; INBOUND_FRAME_LEN];
    out[0..8].copy_from_slice(&order_id.to_le_bytes());
    out[8..16].copy_from_slice(&price.to_le_bytes());
    out[16..24].copy_from_slice(&qty.to_le_bytes());
    out[24] = match side {
        Side::Buy => 0,
        Side::Sell => 1,
    };
    out
}

/// Execution report status byte (§6.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportStatus {
    Accepted = 0,
    Filled = 1,
}

/// Encodes a 26-byte outbound execution report.
#[inline]
pub fn encode_outbound(
    order_id: OrderId,
    filled_qty: Qty,
    fill_price: Price,
    status: ReportStatus,
    side: Side,
) -> [u8; OUTBOUND_FRAME_LEN] {
    let mut out = [0u8; OUTBOUND_FRAME_LEN];
    out[0..8].copy_from_slice(&order_id.to_le_bytes());
    out[8..16].copy_from_slice(&filled_qty.to_le_bytes());
    out[16..24].copy_from_slice(&fill_price.to_le_bytes());
    out[24] = status as u8;
    out[25] = match side {
        Side::Buy => 0,
        Side::Sell => 1,
    };
    out
}

/// Non-owning view over a 26-byte outbound frame, for tests and any
/// downstream consumer that wants field access without a copy.
pub struct OutboundView<'a> {
    buf: &'a [u8],
}

impl<'a> OutboundView<'a> {
    #[inline]
    pub fn new(buf: &'a [u8]) -> Result<Self, DecodeError> {
        if buf.len() < OUTBOUND_FRAME_LEN {
            return Err(DecodeError::ShortFrame);
        }
        Ok(Self { buf })
    }

    #[inline]
    pub fn order_id(&self) -> OrderId {
        i64::from_le_bytes(self.buf[0..8].try_into().unwrap())
    }
    #[inline]
    pub fn filled_qty(&self) -> Qty {
        i64::from_le_bytes(self.buf[8..16].try_into().unwrap())
    }
    #[inline]
    pub fn fill_price(&self) -> Price {
        i64::from_le_bytes(self.buf[16..24].try_into().unwrap())
    }
    #[inline]
    pub fn status(&self) -> Result<ReportStatus, DecodeError> {
        match self.buf[24] {
            0 => Ok(ReportStatus::Accepted),
            1 => Ok(ReportStatus::Filled),
            other => Err(DecodeError::BadSide(other)),
        }
    }
    #[inline]
    pub fn side(&self) -> Result<Side, DecodeError> {
        match self.buf[25] {
            0 => Ok(Side::Buy),
            1 => Ok(Side::Sell),
            other => Err(DecodeError::BadSide(other)),
        }
    }
}
