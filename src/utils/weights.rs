//! Block edit weight table
//!
//! Rewards for matching blocks grow polynomially with block length,
//! penalties for editing blocks grow logarithmically.

use lazy_static::lazy_static;

/// Longest block length stored in the table. Longer blocks fall back to the closed form.
pub const MAX_TABLED_BLOCK: usize = 64;

/// The five kinds of block operation the scorer can charge for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpClass {
    /// Reward for a block that already matches (negative)
    Correct,
    /// Insert a block of the target
    Add,
    /// Drop a block of the source
    Sub,
    /// Substitute a mismatched block
    Swap,
    /// Move a block to another position
    Trans,
}

impl OpClass {
    pub const ALL: [OpClass; 5] = [
        OpClass::Correct,
        OpClass::Add,
        OpClass::Sub,
        OpClass::Swap,
        OpClass::Trans,
    ];

    /// Closed form weight for a block of length `len` (>= 1)
    pub fn formula(self, len: usize) -> i32 {
        let l = len.max(1) as f64;
        let log_tier = l.ln() + 1.0;
        let value = match self {
            OpClass::Correct => -l.powf(1.2).floor(),
            OpClass::Add => (2.0 * log_tier).floor(),
            OpClass::Sub => (6.0 * log_tier).floor(),
            OpClass::Swap => (7.0 * log_tier).floor(),
            OpClass::Trans => log_tier.floor(),
        };
        value as i32
    }

    fn row(self) -> usize {
        match self {
            OpClass::Correct => 0,
            OpClass::Add => 1,
            OpClass::Sub => 2,
            OpClass::Swap => 3,
            OpClass::Trans => 4,
        }
    }
}

/// Immutable per-class weights indexed by block length
#[derive(Debug, Clone)]
pub struct WeightTable {
    rows: [Vec<i32>; 5],
}

impl WeightTable {
    /// Tabulate every class for block lengths `1..=max_len`
    pub fn build(max_len: usize) -> Self {
        let row = |class: OpClass| (1..=max_len).map(|l| class.formula(l)).collect::<Vec<_>>();
        Self {
            rows: [
                row(OpClass::Correct),
                row(OpClass::Add),
                row(OpClass::Sub),
                row(OpClass::Swap),
                row(OpClass::Trans),
            ],
        }
    }

    /// Weight of a `len`-long block for `class`
    #[inline]
    pub fn get(&self, class: OpClass, len: usize) -> i32 {
        match self.rows[class.row()].get(len.wrapping_sub(1)) {
            Some(w) => *w,
            None => class.formula(len),
        }
    }

    /// Number of block lengths held in the table
    pub fn len(&self) -> usize {
        self.rows[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

lazy_static! {
    static ref WEIGHTS: WeightTable = WeightTable::build(MAX_TABLED_BLOCK);
}

/// Shared weight table used by every scoring call
pub fn weights() -> &'static WeightTable {
    &WEIGHTS
}
