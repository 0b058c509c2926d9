//! 48 位线性同余随机数生成器
//!
//! 与 `java.util.Random` 逐位一致，保证同一种子在任何部署上得到相同的题目与选项顺序。

const MULTIPLIER: i64 = 0x5DEE_CE66D;
const ADDEND: i64 = 0xB;
const MASK: i64 = (1 << 48) - 1;

#[derive(Debug, Clone)]
pub struct JavaRandom {
    seed: i64,
}

impl JavaRandom {
    pub fn new(seed: i64) -> Self {
        Self {
            seed: (seed ^ MULTIPLIER) & MASK,
        }
    }

    fn next(&mut self, bits: u32) -> i32 {
        self.seed = self.seed.wrapping_mul(MULTIPLIER).wrapping_add(ADDEND) & MASK;
        (self.seed >> (48 - bits)) as i32
    }

    pub fn next_int(&mut self) -> i32 {
        self.next(32)
    }

    /// `[0, bound)` 内的均匀整数，bound 必须为正
    pub fn next_int_bounded(&mut self, bound: i32) -> i32 {
        debug_assert!(bound > 0);
        if bound & bound.wrapping_neg() == bound {
            return ((i64::from(bound) * i64::from(self.next(31))) >> 31) as i32;
        }
        loop {
            let bits = self.next(31);
            let val = bits % bound;
            if bits.wrapping_sub(val).wrapping_add(bound - 1) >= 0 {
                return val;
            }
        }
    }
}

/// 按种子原地打乱（与 `Collections.shuffle(list, new Random(seed))` 顺序一致）
pub fn seeded_shuffle<T>(items: &mut [T], seed: i64) {
    let mut rng = JavaRandom::new(seed);
    for k in (1..items.len()).rev() {
        let bound = i32::try_from(k + 1).unwrap_or(i32::MAX);
        let j = rng.next_int_bounded(bound) as usize;
        items.swap(k, j);
    }
}
