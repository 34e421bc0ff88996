//! BIP-173 bech32 encoding, as used for Cardano stake addresses
//!
//! Only the encoding direction is needed: addresses are derived and compared as strings.
//! The BIP-173 checksum constant (`1`) is used, not bech32m.

const CHARSET: &[u8; 32] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";
const GENERATOR: [u32; 5] = [0x3b6a57b2, 0x26508e6d, 0x1ea119fa, 0x3d4233dd, 0x2a1462b3];
const CHECKSUM_LEN: usize = 6;

/// Encode `payload` under the human-readable part `hrp`.
///
/// `hrp` is expected to be lowercase ASCII; it is not validated.
pub fn encode(hrp: &str, payload: &[u8]) -> String {
    let data = convert_bits(payload, 8, 5, true).unwrap_or_default();
    let checksum = create_checksum(hrp, &data);

    let mut out = String::with_capacity(hrp.len() + 1 + data.len() + CHECKSUM_LEN);
    out.push_str(hrp);
    out.push('1');
    out.extend(
        data.iter()
            .chain(checksum.iter())
            .map(|&d| CHARSET[usize::from(d)] as char),
    );
    out
}

/// Regroup `data` from `from_bits`-wide values into `to_bits`-wide values, MSB first.
///
/// With `pad` set the final partial group is right-padded with zero bits and the call
/// cannot fail for 8-bit input. Without `pad`, leftover non-zero bits (or a whole
/// leftover input group) yield `None`, as does any input value wider than `from_bits`.
pub fn convert_bits(data: &[u8], from_bits: u32, to_bits: u32, pad: bool) -> Option<Vec<u8>> {
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    let max_value: u32 = (1 << to_bits) - 1;
    let max_acc: u32 = (1 << (from_bits + to_bits - 1)) - 1;
    let mut out = Vec::with_capacity(data.len() * from_bits as usize / to_bits as usize + 1);

    for &value in data {
        let value = u32::from(value);
        if value >> from_bits != 0 {
            return None;
        }
        acc = ((acc << from_bits) | value) & max_acc;
        bits += from_bits;
        while bits >= to_bits {
            bits -= to_bits;
            out.push(((acc >> bits) & max_value) as u8);
        }
    }

    if pad {
        if bits > 0 {
            out.push(((acc << (to_bits - bits)) & max_value) as u8);
        }
    } else if bits >= from_bits || (acc << (to_bits - bits)) & max_value != 0 {
        return None;
    }

    Some(out)
}

pub(crate) fn polymod(values: &[u8]) -> u32 {
    let mut chk: u32 = 1;
    for &value in values {
        let top = chk >> 25;
        chk = ((chk & 0x1ffffff) << 5) ^ u32::from(value);
        for (i, generator) in GENERATOR.iter().enumerate() {
            if (top >> i) & 1 == 1 {
                chk ^= generator;
            }
        }
    }
    chk
}

pub(crate) fn hrp_expand(hrp: &str) -> Vec<u8> {
    let bytes = hrp.as_bytes();
    let mut out = Vec::with_capacity(bytes.len() * 2 + 1);
    out.extend(bytes.iter().map(|b| b >> 5));
    out.push(0);
    out.extend(bytes.iter().map(|b| b & 31));
    out
}

fn create_checksum(hrp: &str, data: &[u8]) -> [u8; CHECKSUM_LEN] {
    let mut values = hrp_expand(hrp);
    values.extend_from_slice(data);
    values.extend_from_slice(&[0; CHECKSUM_LEN]);
    let polymod = polymod(&values) ^ 1;

    let mut checksum = [0u8; CHECKSUM_LEN];
    for (i, slot) in checksum.iter_mut().enumerate() {
        *slot = ((polymod >> (5 * (5 - i))) & 31) as u8;
    }
    checksum
}
