// src/exec/output.rs

/// Normalize captured text into an ordered list of non-empty lines.
///
/// `\r\n` becomes `\n` before splitting, and a stray trailing `\r` left by a
/// lone carriage return at the end of a line is dropped too.
pub fn normalize_output(text: &str) -> Vec<String> {
    text.replace("\r\n", "\n")
        .split('\n')
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Normalize lines already split by the capture layer.
///
/// Captured lines may still carry terminators or be blank; joining and
/// re-splitting gives the same result as normalizing the raw stream.
pub fn normalize_lines(lines: &[String]) -> Vec<String> {
    normalize_output(&lines.join("\n"))
}
