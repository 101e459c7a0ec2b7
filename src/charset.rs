// Copyright (c) 2026 rezky_nightky

/// Glyphs the loader rain falls in when nothing else is asked for.
pub const LOADER_GLYPHS: &str = "BOOTSTRIX01RUSTTERMCRATESCARGOTOKIO<>/{}[]();=+-*&#@!?%";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Charset {
    Loader,
    Binary,
    Hex,
    Ascii,
    Katakana,
    Matrix,
}

pub fn charset_from_str(name: &str) -> Result<Charset, String> {
    match name.trim().to_ascii_lowercase().as_str() {
        "loader" | "auto" => Ok(Charset::Loader),
        "bin" | "binary" | "01" => Ok(Charset::Binary),
        "hex" | "hexadecimal" => Ok(Charset::Hex),
        "ascii" => Ok(Charset::Ascii),
        "katakana" => Ok(Charset::Katakana),
        "matrix" => Ok(Charset::Matrix),
        other => Err(format!(
            "unsupported charset: {} (allowed: loader, binary, hex, ascii, katakana, matrix)",
            other
        )),
    }
}

fn push_range(out: &mut Vec<char>, start: u32, end: u32) {
    out.extend((start..=end).filter_map(char::from_u32));
}

/// Expands a preset, or the custom glyph string when one is given. A UTF-8
/// locale is needed for katakana; without it those presets fall back to
/// plain ASCII.
pub fn build_chars(charset: Charset, custom: Option<&str>, ascii_only: bool) -> Vec<char> {
    if let Some(s) = custom {
        let out: Vec<char> = s.chars().filter(|c| !c.is_control()).collect();
        if !out.is_empty() {
            return out;
        }
    }

    let mut out = Vec::new();
    match charset {
        Charset::Loader => out.extend(LOADER_GLYPHS.chars()),
        Charset::Binary => push_range(&mut out, 0x30, 0x31),
        Charset::Hex => {
            push_range(&mut out, 0x30, 0x39);
            push_range(&mut out, 0x41, 0x46);
        }
        Charset::Ascii => push_range(&mut out, 0x21, 0x7E),
        Charset::Katakana | Charset::Matrix if ascii_only => {
            push_range(&mut out, 0x30, 0x39);
            push_range(&mut out, 0x41, 0x5A);
        }
        Charset::Katakana => push_range(&mut out, 0xFF66, 0xFF9D),
        Charset::Matrix => {
            push_range(&mut out, 0x30, 0x39);
            push_range(&mut out, 0x41, 0x5A);
            push_range(&mut out, 0xFF66, 0xFF9D);
        }
    }

    if out.is_empty() {
        out.extend(['0', '1']);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_has_only_0_and_1() {
        assert_eq!(build_chars(Charset::Binary, None, true), vec!['0', '1']);
    }

    #[test]
    fn custom_glyphs_override_preset() {
        assert_eq!(
            build_chars(Charset::Hex, Some("ab"), false),
            vec!['a', 'b']
        );
        assert_eq!(build_chars(Charset::Binary, Some(""), false).len(), 2);
    }

    #[test]
    fn katakana_falls_back_without_utf8() {
        assert!(build_chars(Charset::Katakana, None, true)
            .iter()
            .all(|c| c.is_ascii()));
        assert!(charset_from_str("nope").is_err());
        assert_eq!(charset_from_str(" Loader "), Ok(Charset::Loader));
    }
}
