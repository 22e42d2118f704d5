use byteorder::{ByteOrder, LittleEndian};

use crate::error::ParseError;

/// Length of the smallest complete stream: the bare end marker `0x11 0x00 0x00`.
pub const MIN_STREAM_LEN: usize = 3;

const M2_MARKER: u8 = 0x40;
const M3_MARKER: u8 = 0x20;
const M4_MARKER: u8 = 0x10;

const M2_MAX_OFFSET: usize = 0x0800;
const M4_BASE_OFFSET: usize = 0x4000;

/// One decoded unit of an lzo1x stream.
///
/// Literal runs borrow their bytes straight from the compressed input, the
/// cursor has already moved past them when the instruction is handed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction<'a> {
    LiteralRun(&'a [u8]),
    Match { length: usize, distance: usize },
    EndOfStream,
}

/// What the previous instruction was. Opcodes below 0x10 mean three different
/// things depending on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum History {
    Start,
    Match,
    /// 1 to 3 literal bytes.
    ShortLiteral,
    LongLiteral,
}

/// Parse state for a single decode call.
#[derive(Debug, Clone)]
pub struct Cursor {
    pos: usize,
    history: History,
    // literal bytes owed by the last match, taken from its two low state bits
    trailing_literals: usize,
    finished: bool,
}

impl Default for Cursor {
    fn default() -> Self {
        Cursor::new()
    }
}

impl Cursor {
    pub fn new() -> Cursor {
        Cursor {
            pos: 0,
            history: History::Start,
            trailing_literals: 0,
            finished: false,
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn history(&self) -> History {
        self.history
    }

    /// Decodes the instruction at the cursor and advances past it.
    ///
    /// Once the end marker has been seen every further call returns
    /// [`Instruction::EndOfStream`] without touching the input.
    pub fn next_instruction<'a>(&mut self, src: &'a [u8]) -> Result<Instruction<'a>, ParseError> {
        if self.finished {
            return Ok(Instruction::EndOfStream);
        }

        if self.trailing_literals > 0 {
            let length = self.trailing_literals;
            self.trailing_literals = 0;
            return self.literal_run(src, length);
        }

        let start = self.pos;
        let op = self.read_u8(src)?;

        match (self.history, op) {
            (History::Start, 18..=255) => self.literal_run(src, op as usize - 17),
            (History::Start, 16..=17) => match self.far_match(src, op, start)? {
                Instruction::EndOfStream => Ok(Instruction::EndOfStream),
                // nothing has been decoded yet, so there is nothing to reference
                _ => Err(ParseError::InvalidOpcode { opcode: op, offset: start }),
            },
            (_, M2_MARKER..=255) => self.near_match(src, op),
            (_, M3_MARKER..=63) => self.mid_match(src, op, start),
            (_, M4_MARKER..=31) => self.far_match(src, op, start),
            (History::Start | History::Match, _) => {
                let length = self.extended_length(src, start, op, 15, 3)?;
                self.literal_run(src, length)
            }
            (History::ShortLiteral, _) => self.short_match(src, op, 2, 1),
            (History::LongLiteral, _) => self.short_match(src, op, 3, M2_MAX_OFFSET + 1),
        }
    }

    fn literal_run<'a>(&mut self, src: &'a [u8], length: usize) -> Result<Instruction<'a>, ParseError> {
        let bytes = self.take(src, length)?;
        self.history = if length < 4 {
            History::ShortLiteral
        } else {
            History::LongLiteral
        };
        Ok(Instruction::LiteralRun(bytes))
    }

    // 0 0 0 0 D D S S, H: directly after a literal run
    fn short_match<'a>(
        &mut self,
        src: &[u8],
        op: u8,
        length: usize,
        base_distance: usize,
    ) -> Result<Instruction<'a>, ParseError> {
        let high = self.read_u8(src)? as usize;
        let distance = base_distance + (op >> 2) as usize + (high << 2);
        Ok(self.matched(length, distance, op))
    }

    // 0 1 L D D D S S or 1 L L D D D S S, H: length 3..=8 within 2 KiB
    fn near_match<'a>(&mut self, src: &[u8], op: u8) -> Result<Instruction<'a>, ParseError> {
        let high = self.read_u8(src)? as usize;
        let length = (op >> 5) as usize + 1;
        let distance = 1 + ((op >> 2) & 0x07) as usize + (high << 3);
        Ok(self.matched(length, distance, op))
    }

    // 0 0 1 L L L L L, [ext], D D: within 16 KiB
    fn mid_match<'a>(&mut self, src: &[u8], op: u8, start: usize) -> Result<Instruction<'a>, ParseError> {
        let length = self.extended_length(src, start, op & 0x1F, 31, 2)?;
        let raw = self.read_le16(src)?;
        let distance = (raw >> 2) as usize + 1;
        Ok(self.matched(length, distance, raw as u8))
    }

    // 0 0 0 1 H L L L, [ext], D D: 16 KiB..48 KiB, zero distance ends the stream
    fn far_match<'a>(&mut self, src: &[u8], op: u8, start: usize) -> Result<Instruction<'a>, ParseError> {
        let length = self.extended_length(src, start, op & 0x07, 7, 2)?;
        let raw = self.read_le16(src)?;
        let distance = (((op & 0x08) as usize) << 11) + (raw >> 2) as usize;

        if distance == 0 {
            if length != 3 {
                return Err(ParseError::InvalidOpcode { opcode: op, offset: start });
            }
            self.finished = true;
            return Ok(Instruction::EndOfStream);
        }

        Ok(self.matched(length, distance + M4_BASE_OFFSET, raw as u8))
    }

    fn matched<'a>(&mut self, length: usize, distance: usize, state: u8) -> Instruction<'a> {
        self.trailing_literals = (state & 0x03) as usize;
        self.history = History::Match;
        Instruction::Match { length, distance }
    }

    /// Length field of an opcode. A zero field means a run of zero bytes
    /// (255 each) closed by a non-zero byte, on top of the field maximum.
    fn extended_length(
        &mut self,
        src: &[u8],
        start: usize,
        bits: u8,
        max: usize,
        bias: usize,
    ) -> Result<usize, ParseError> {
        let overflow = ParseError::LengthOverflow { offset: start };

        let length = if bits != 0 {
            bits as usize
        } else {
            let zeros = src[self.pos..].iter().take_while(|&&b| b == 0).count();
            self.pos += zeros;
            let tail = self.read_u8(src)? as usize;
            zeros
                .checked_mul(255)
                .and_then(|n| n.checked_add(max + tail))
                .ok_or_else(|| overflow.clone())?
        };

        length.checked_add(bias).ok_or(overflow)
    }

    fn take<'a>(&mut self, src: &'a [u8], n: usize) -> Result<&'a [u8], ParseError> {
        let remaining = src.len() - self.pos;
        if n > remaining {
            return Err(ParseError::Truncated {
                offset: self.pos,
                needed: n - remaining,
            });
        }
        let bytes = &src[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    fn read_u8(&mut self, src: &[u8]) -> Result<u8, ParseError> {
        Ok(self.take(src, 1)?[0])
    }

    fn read_le16(&mut self, src: &[u8]) -> Result<u16, ParseError> {
        Ok(LittleEndian::read_u16(self.take(src, 2)?))
    }
}
