pub fn separated_by<T, F>(
    out: &mut String,
    values: impl IntoIterator<Item = T>,
    mut f: F,
    separator: &str,
) where
    F: FnMut(&mut String, T),
{
    let mut len = out.len();
    for v in values {
        if out.len() > len {
            out.push_str(separator);
        }
        len = out.len();
        f(out, v);
    }
}

/// Escape occurrences of `search` char with `replace` while copying into buffer.
pub fn write_escaped(out: &mut String, value: &str, search: char, replace: &str) {
    let mut position = 0;
    for (i, c) in value.char_indices() {
        if c == search {
            out.push_str(&value[position..i]);
            out.push_str(replace);
            position = i + c.len_utf8();
        }
    }
    out.push_str(&value[position..]);
}

/// Quote identifiers ("name") doubling inner quotes.
pub fn write_identifier_quoted(out: &mut String, value: &str) {
    out.push('"');
    write_escaped(out, value, '"', "\"\"");
    out.push('"');
}

/// Caller supplied tail clause without surrounding blanks and statement terminators.
pub fn trim_tail(tail: &str) -> &str {
    tail.trim().trim_end_matches(|c: char| c == ';' || c.is_whitespace())
}

#[macro_export]
macro_rules! truncate_long {
    ($query:expr) => {{
        let query: &str = &$query;
        let mut end = ::std::cmp::min(query.len(), 497);
        while !query.is_char_boundary(end) {
            end -= 1;
        }
        format!(
            "{}{}",
            query[..end].trim_end(),
            if query.len() > end { "..." } else { "" },
        )
    }};
}
