use log::debug;
use nsc::Job;
use nsc::digits::{DigitSequence, StoreError};
use nsc::symbol::MAX_BASE;

/// How two bases relate when one is an integral power of the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerRelation {
    /// `base_out == base_in^exponent`: every `exponent` source digits form one output digit.
    Group { exponent: u32 },
    /// `base_in == base_out^exponent`: every source digit splits into `exponent` output digits.
    Split { exponent: u32 },
}

/// Find `k >= 1` with `smaller^k == larger`. Equal bases relate with `k = 1`.
pub fn power_relation(base_in: u8, base_out: u8) -> Option<PowerRelation> {
    let (smaller, larger) = (base_in.min(base_out) as u32, base_in.max(base_out) as u32);
    if smaller < 2 {
        return None;
    }

    let mut power = smaller;
    let mut exponent = 1;
    while power < larger && power <= MAX_BASE {
        power *= smaller;
        exponent += 1;
    }
    if power != larger {
        return None;
    }

    if base_in <= base_out {
        Some(PowerRelation::Group { exponent })
    } else {
        Some(PowerRelation::Split { exponent })
    }
}

/// Convert by regrouping digits. The source sequence is drained as it is read.
pub fn convert(job: Job, relation: PowerRelation) -> Result<Job, StoreError> {
    let Job {
        base_in,
        base_out,
        digits,
    } = job;
    debug!(
        "power conversion {} -> {} ({:?}) over {} digits",
        base_in,
        base_out,
        relation,
        digits.len()
    );

    let mut converted = match relation {
        PowerRelation::Group { exponent } => group(digits, base_in as u32, exponent)?,
        PowerRelation::Split { exponent } => split(digits, base_out as u32, exponent)?,
    };
    converted.strip_leading_zeros()?;

    Ok(Job {
        base_in: base_out,
        base_out,
        digits: converted,
    })
}

fn group(
    mut source: DigitSequence,
    base_in: u32,
    exponent: u32,
) -> Result<DigitSequence, StoreError> {
    let mut out = DigitSequence::with_config(source.config());
    let group_size = exponent as usize;
    // The leading group absorbs the remainder so that every later group is full.
    let mut pending = match source.len() % group_size {
        0 => group_size,
        short => short,
    };
    let mut value = 0u32;

    while let Some(block) = source.pop_front_block() {
        for &digit in block.digits() {
            value = value * base_in + u32::from(digit);
            pending -= 1;
            if pending == 0 {
                out.push_back(value as u8)?;
                value = 0;
                pending = group_size;
            }
        }
    }
    Ok(out)
}

fn split(
    mut source: DigitSequence,
    base_out: u32,
    exponent: u32,
) -> Result<DigitSequence, StoreError> {
    let mut out = DigitSequence::with_config(source.config());
    let weights: Vec<u32> = (0..exponent).rev().map(|i| base_out.pow(i)).collect();

    while let Some(block) = source.pop_front_block() {
        for &digit in block.digits() {
            let mut rest = u32::from(digit);
            for &weight in &weights {
                out.push_back((rest / weight) as u8)?;
                rest %= weight;
            }
        }
    }
    Ok(out)
}
