//! Hides short text messages in the low-order bit of the frequency field
//! across a sequence of feature records. Illustrative, not cryptographic:
//! anyone who knows the scheme can read the payload.

use crate::analysis::FeatureRecord;

const BITS_PER_BYTE: usize = 8;

/// Writes the message into the carrier records, one bit per record, MSB
/// first within each byte. Each written record gets its frequency replaced
/// by the truncated integer part with the low bit forced to the payload
/// bit; every other field is untouched. Records beyond the last bit pass
/// through unchanged, and an empty carrier comes back unchanged. Bits that
/// do not fit in the carrier are dropped.
pub fn embed(message: &str, records: &[FeatureRecord]) -> Vec<FeatureRecord> {
    let mut carrier = records.to_vec();
    if carrier.is_empty() {
        return carrier;
    }

    let mut bits = message
        .bytes()
        .flat_map(|byte| (0..BITS_PER_BYTE).rev().map(move |shift| (byte >> shift) & 1));

    for record in carrier.iter_mut() {
        let Some(bit) = bits.next() else {
            break;
        };
        let truncated = record.frequency.trunc() as i64;
        record.frequency = ((truncated & !1) | i64::from(bit)) as f32;
    }

    carrier
}

/// Recovers a message from the low bits of the carrier frequencies.
///
/// The embedding carries no length prefix or terminator, so the caller
/// either supplies the expected byte length or accepts the fallback: stop
/// at the first NUL byte, otherwise decode every full byte (a trailing
/// partial byte is dropped). Bytes are decoded as UTF-8, lossily.
pub fn extract(records: &[FeatureRecord], expected_len: Option<usize>) -> String {
    let mut bytes = Vec::new();
    let mut current = 0u8;
    let mut filled = 0usize;

    for record in records {
        let bit = (record.frequency.trunc() as i64 & 1) as u8;
        current = (current << 1) | bit;
        filled += 1;
        if filled == BITS_PER_BYTE {
            bytes.push(current);
            current = 0;
            filled = 0;
            if expected_len.is_some_and(|len| bytes.len() >= len) {
                break;
            }
        }
    }

    match expected_len {
        Some(len) => bytes.truncate(len),
        None => {
            if let Some(terminator) = bytes.iter().position(|byte| *byte == 0) {
                bytes.truncate(terminator);
            }
        }
    }

    String::from_utf8_lossy(&bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn carrier(len: usize) -> Vec<FeatureRecord> {
        (0..len)
            .map(|step| FeatureRecord {
                frequency: 400.0 + step as f32 * 3.7,
                amplitude: 0.5,
                harmonics: vec![880.0],
                phase: 0.4,
                coherence: 0.6,
                timestamp: step as f64 * 0.05,
            })
            .collect()
    }

    #[test]
    fn round_trips_with_known_length() {
        let message = "resonate";
        let records = carrier(message.len() * 8 + 5);

        let embedded = embed(message, &records);
        assert_eq!(extract(&embedded, Some(message.len())), message);
    }

    #[test]
    fn leaves_records_beyond_the_payload_untouched() {
        let message = "hi";
        let records = carrier(40);
        let embedded = embed(message, &records);

        for (index, (before, after)) in records.iter().zip(embedded.iter()).enumerate() {
            assert_eq!(before.amplitude, after.amplitude);
            assert_eq!(before.harmonics, after.harmonics);
            assert_eq!(before.phase, after.phase);
            assert_eq!(before.coherence, after.coherence);
            assert_eq!(before.timestamp, after.timestamp);
            if index >= message.len() * 8 {
                assert_eq!(before, after);
            }
        }
    }

    #[test]
    fn empty_carrier_passes_through_unchanged() {
        let embedded = embed("anything", &[]);
        assert!(embedded.is_empty());
    }

    #[test]
    fn nul_terminator_bounds_extraction_without_a_length() {
        let message = "ping\u{0}";
        let records = carrier(message.len() * 8);

        let embedded = embed(message, &records);
        assert_eq!(extract(&embedded, None), "ping");
    }

    #[test]
    fn trailing_partial_bytes_are_dropped() {
        let message = "ab";
        // 19 records: two full bytes plus three stray bits.
        let records = carrier(19);
        let embedded = embed(message, &records);

        assert_eq!(extract(&embedded, Some(2)), "ab");
    }

    #[test]
    fn embedded_bits_match_the_message_msb_first() {
        let records = carrier(8);
        let embedded = embed("A", &records); // 0b01000001

        let bits: Vec<i64> = embedded
            .iter()
            .map(|record| record.frequency.trunc() as i64 & 1)
            .collect();
        assert_eq!(bits, vec![0, 1, 0, 0, 0, 0, 0, 1]);
    }
}
