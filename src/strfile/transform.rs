/// Strip one trailing `\n` and then one trailing `\r`.
pub fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Caesar rotation by 13 over ASCII letters; every other byte is left alone.
/// Applying it twice yields the input.
pub fn rot13(input: &[u8]) -> Vec<u8> {
    input
        .iter()
        .map(|&b| match b {
            b'a'..=b'z' => (b - b'a' + 13) % 26 + b'a',
            b'A'..=b'Z' => (b - b'A' + 13) % 26 + b'A',
            _ => b,
        })
        .collect()
}

pub fn lowercase(input: &[u8]) -> Vec<u8> {
    match std::str::from_utf8(input) {
        Ok(text) => text.to_lowercase().into_bytes(),
        Err(_) => input.to_ascii_lowercase(),
    }
}

/// Sort key for an entry. The source bytes themselves are never rewritten.
pub fn sort_key(entry: &[u8], ignore_case: bool, rotated: bool) -> Vec<u8> {
    let key = if rotated { rot13(entry) } else { entry.to_vec() };
    if ignore_case {
        lowercase(&key)
    } else {
        key
    }
}
