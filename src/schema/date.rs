use chrono::NaiveDate;

/// Fast parse of an 8-digit `yyyyMMdd` string → calendar date.
pub fn parse_yyyymmdd(s: &str) -> Option<NaiveDate> {
    let b = s.trim().as_bytes();
    // exactly 8 digits, nothing else
    if b.len() != 8 || !b.iter().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let y = (b[0] - b'0') as i32 * 1000
        + (b[1] - b'0') as i32 * 100
        + (b[2] - b'0') as i32 * 10
        + (b[3] - b'0') as i32;
    let m = ((b[4] - b'0') as u32) * 10 + (b[5] - b'0') as u32;
    let d = ((b[6] - b'0') as u32) * 10 + (b[7] - b'0') as u32;

    NaiveDate::from_ymd_opt(y, m, d)
}
