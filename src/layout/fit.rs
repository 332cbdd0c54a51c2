/// Pick the largest font size in `[min_size, max_size]` (descending, step 2)
/// at which the *unwrapped* string fits in `max_width` pixels.
///
/// Sizing against the unwrapped string keeps every wrapped line at one uniform
/// size and biases long strings toward the floor. If nothing fits, the floor
/// size is returned and wrapping deals with the horizontal overflow.
pub fn fit_size<M>(mut measure: M, text: &str, max_width: f32, max_size: u32, min_size: u32) -> u32
where
    M: FnMut(&str, u32) -> f32,
{
    let mut size = max_size.max(min_size);
    loop {
        if measure(text, size) <= max_width {
            return size;
        }
        if size <= min_size {
            return min_size;
        }
        size = size.saturating_sub(2).max(min_size);
    }
}

/// Greedy character-by-character wrap: commit the current line when appending
/// the next character would exceed `max_width` and the line is non-empty.
///
/// No whitespace special-casing on purpose: the supported corpus has no
/// inter-word spacing, so word-boundary wrapping would be wrong for it. A
/// single character wider than `max_width` gets a line of its own.
pub fn wrap<M>(mut measure: M, text: &str, max_width: f32) -> Vec<String>
where
    M: FnMut(&str) -> f32,
{
    let mut lines = Vec::new();
    let mut current = String::new();

    for ch in text.chars() {
        let mut candidate = current.clone();
        candidate.push(ch);
        if measure(&candidate) > max_width && !current.is_empty() {
            lines.push(std::mem::replace(&mut current, ch.to_string()));
        } else {
            current = candidate;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
