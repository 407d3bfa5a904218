//! Cleanup of extracted text layers

/// Strip carriage returns and trailing whitespace, collapse runs of blank
/// lines to one, trim the whole text.
pub fn normalize_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut blank_run = 0usize;

    for line in raw.split('\n') {
        let line = line.trim_end_matches(['\r', ' ', '\t']).replace('\r', "");
        if line.trim().is_empty() {
            blank_run += 1;
            continue;
        }
        if !out.is_empty() {
            out.push_str(if blank_run > 0 { "\n\n" } else { "\n" });
        }
        blank_run = 0;
        out.push_str(&line);
    }
    out
}
