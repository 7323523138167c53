//! Knuth subtractive pseudo-random generator
//!
//! Lagged-Fibonacci construction over a 56-word state. Issued fingerprints
//! depend on every detail of the seeding and draw order, so this must stay
//! bit-exact.

use crate::constants::codec::{CURSOR_LAG, MBIG, MIXING_SWEEPS, MSEED, STATE_SIZE};

/// Subtractive generator state
///
/// Cheap to clone: seeding is the expensive part, so callers seed once and
/// clone the fresh state for every independent stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtractiveGenerator {
    state: [i32; STATE_SIZE],
    next: usize,
    next_lagged: usize,
}

impl SubtractiveGenerator {
    /// Seed a new generator
    pub fn new(seed: i32) -> Self {
        let mut state = [0i32; STATE_SIZE];
        let last = STATE_SIZE - 1;

        let subtraction = if seed == i32::MIN { i32::MAX } else { seed.abs() };
        let mut mj = MSEED - subtraction;
        state[last] = mj;
        let mut mk = 1i32;

        for i in 1..last {
            let ii = (CURSOR_LAG * i) % last;
            state[ii] = mk;
            mk = mj - mk;
            if mk < 0 {
                mk += MBIG;
            }
            mj = state[ii];
        }

        for _ in 0..MIXING_SWEEPS {
            for i in 1..STATE_SIZE {
                state[i] = state[i].wrapping_sub(state[1 + (i + 30) % last]);
                if state[i] < 0 {
                    state[i] = state[i].wrapping_add(MBIG);
                }
            }
        }

        Self {
            state,
            next: 0,
            next_lagged: CURSOR_LAG,
        }
    }

    /// Next 31-bit value in `[0, MBIG)`
    pub fn next_sample(&mut self) -> i32 {
        self.next = advance(self.next);
        self.next_lagged = advance(self.next_lagged);

        let mut value = self.state[self.next].wrapping_sub(self.state[self.next_lagged]);
        if value == MBIG {
            value -= 1;
        }
        if value < 0 {
            value += MBIG;
        }

        self.state[self.next] = value;
        value
    }

    /// Low byte of the next draw
    pub fn next_byte(&mut self) -> u8 {
        (self.next_sample() & 0xFF) as u8
    }
}

/// Cursors wrap to 1, index 0 is never drawn from
fn advance(cursor: usize) -> usize {
    let next = cursor + 1;
    if next >= STATE_SIZE {
        1
    } else {
        next
    }
}
