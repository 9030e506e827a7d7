use super::ClockError;

pub const SEGMENT_COUNT: usize = 7;

// Bit 6 is segment a, bit 0 is segment g
const LOOKUP: [u8; 10] = [0x7e, 0x30, 0x6d, 0x79, 0x33, 0x5b, 0x5f, 0x70, 0x7f, 0x7b];

/// On/off state of segments a to g for one decimal digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SevenSegment([bool; SEGMENT_COUNT]);

impl SevenSegment {
    pub fn encode(digit: u32) -> Result<Self, ClockError> {
        let bits = *LOOKUP
            .get(digit as usize)
            .ok_or(ClockError::InvalidDigit(digit))?;
        let mut segments = [false; SEGMENT_COUNT];
        for (i, lit) in segments.iter_mut().enumerate() {
            *lit = bits & (0x40 >> i) != 0;
        }
        Ok(Self(segments))
    }

    pub fn segments(&self) -> [bool; SEGMENT_COUNT] {
        self.0
    }

    pub fn is_lit(&self, segment: usize) -> bool {
        self.0.get(segment).copied().unwrap_or(false)
    }

    /// Indices of the lit segments, a = 0.
    pub fn lit(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().enumerate().filter(|(_, on)| **on).map(|(i, _)| i)
    }
}
