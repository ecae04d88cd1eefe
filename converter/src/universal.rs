use log::{debug, trace};
use nsc::Job;
use nsc::digits::{DigitSequence, StoreError};

/// Largest factor folded into a single multiply-add pass.
const FACTOR_LIMIT: u64 = 1 << 32;

/// Convert between any two bases with Horner's method.
///
/// The accumulator holds the value read so far in `base_out`. Each pass
/// multiplies it by `base_in^k` and adds the next `k` source digits, carrying
/// from the least-significant end. The source sequence is drained as it is read.
pub fn convert(job: Job) -> Result<Job, StoreError> {
    let Job {
        base_in,
        base_out,
        mut digits,
    } = job;
    debug!(
        "universal conversion {} -> {} over {} digits",
        base_in,
        base_out,
        digits.len()
    );

    let base_in = u64::from(base_in);
    let radix = u64::from(base_out);
    let mut acc = DigitSequence::with_config(digits.config());
    let mut factor = 1u64;
    let mut addend = 0u64;

    while let Some(block) = digits.pop_front_block() {
        for &digit in block.digits() {
            if factor * base_in > FACTOR_LIMIT {
                multiply_add(&mut acc, factor, addend, radix)?;
                factor = 1;
                addend = 0;
            }
            factor *= base_in;
            addend = addend * base_in + u64::from(digit);
        }
        trace!("accumulator at {} digits", acc.len());
    }
    if factor > 1 {
        multiply_add(&mut acc, factor, addend, radix)?;
    }
    acc.strip_leading_zeros()?;

    Ok(Job {
        base_in: base_out,
        base_out,
        digits: acc,
    })
}

/// `acc = acc * factor + addend`, with every stored digit kept below `radix`.
fn multiply_add(
    acc: &mut DigitSequence,
    factor: u64,
    addend: u64,
    radix: u64,
) -> Result<(), StoreError> {
    let mut carry = addend;
    let mut cursor = acc.tail();
    while let Some(id) = cursor {
        let Some(block) = acc.block_mut(id) else {
            break;
        };
        for digit in block.digits_mut().iter_mut().rev() {
            let value = u64::from(*digit) * factor + carry;
            *digit = (value % radix) as u8;
            carry = value / radix;
        }
        cursor = block.prev();
    }
    while carry > 0 {
        acc.push_front((carry % radix) as u8)?;
        carry /= radix;
    }
    Ok(())
}
