/// Calculate the key tag of a DNSKEY from its wire-format RDATA
/// (RFC 4034 Appendix B).
///
/// The RDATA is summed as big-endian 16-bit words; an odd trailing byte is
/// the high byte of a final word. The input is at most 65535 bytes, the
/// RDLENGTH limit enforced by `DnskeyRecord::new`, so the sum fits in a `u32`.
pub fn calculate_key_tag(rdata: &[u8]) -> u16 {
    let mut accumulator: u32 = 0;

    for (i, &byte) in rdata.iter().enumerate() {
        if i % 2 == 0 {
            accumulator += u32::from(byte) << 8;
        } else {
            accumulator += u32::from(byte);
        }
    }

    // Fold the carries back in and mask to 16 bits
    accumulator += (accumulator >> 16) & 0xFFFF;
    (accumulator & 0xFFFF) as u16
}
