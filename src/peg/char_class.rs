//! Byte sets and named character classes
//!
//! [`ByteSet`] is the 256-bit membership table behind `CharSet` rules.
//! [`CharacterPattern`] names the common ASCII classes (`\d`, `\w`, `\s`, ...)
//! so grammars can use them as predicate rules without compiling a regex.

use std::fmt;

/// 256-bit membership table for single bytes
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ByteSet([u64; 4]);

impl ByteSet {
    /// The empty set
    pub const fn new() -> Self {
        Self([0; 4])
    }

    /// Insert a byte
    #[inline]
    pub fn insert(&mut self, b: u8) {
        self.0[(b >> 6) as usize] |= 1u64 << (b & 63);
    }

    /// Whether the set contains `b`
    #[inline(always)]
    pub fn contains(&self, b: u8) -> bool {
        self.0[(b >> 6) as usize] & (1u64 << (b & 63)) != 0
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.0.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Whether the set has no members
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|w| *w == 0)
    }

    /// Members in ascending order
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (0u8..=255).filter(move |b| self.contains(*b))
    }

    /// The only member, if the set has exactly one
    pub fn single(&self) -> Option<u8> {
        if self.len() == 1 {
            self.iter().next()
        } else {
            None
        }
    }
}

impl FromIterator<u8> for ByteSet {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        let mut set = ByteSet::new();
        for b in iter {
            set.insert(b);
        }
        set
    }
}

impl fmt::Debug for ByteSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for b in self.iter() {
            write!(f, "{}", std::ascii::escape_default(b))?;
        }
        f.write_str("]")
    }
}

/// Named ASCII character class
///
/// # Example
///
/// ```rust
/// use pegknot::peg::char_class::CharacterPattern;
///
/// let pattern = CharacterPattern::from_pattern("\\d").unwrap();
/// assert!(pattern.matches(b'5'));
/// assert!(!pattern.matches(b'a'));
///
/// let pred = pattern.predicate();
/// assert!(pred(b'9'));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharacterPattern {
    /// Digit: [0-9] or \\d
    Digit,
    /// Non-digit: \\D
    NonDigit,
    /// Lowercase: [a-z]
    Lower,
    /// Uppercase: [A-Z]
    Upper,
    /// Alphabetic: [a-zA-Z]
    Alpha,
    /// Alphanumeric: [a-zA-Z0-9]
    Alnum,
    /// Word character: [a-zA-Z0-9_] or \\w
    Word,
    /// Non-word character: \\W
    NonWord,
    /// Hex digit: [0-9a-fA-F]
    HexDigit,
    /// Whitespace: [ \\t\\n\\r\\f\\v] or \\s
    Space,
    /// Non-whitespace: \\S
    NonSpace,
    /// Blank: [ \\t]
    Blank,
    /// Control characters
    Cntrl,
    /// Printable (not space, not cntrl)
    Graph,
    /// Printable including space
    Print,
    /// Punctuation
    Punct,
}

impl CharacterPattern {
    /// Look up the class written as `pattern`
    ///
    /// | Pattern | CharacterPattern |
    /// |---------|-----------------|
    /// | `[0-9]`, `\\d` | Digit |
    /// | `\\D` | NonDigit |
    /// | `[a-z]` | Lower |
    /// | `[A-Z]` | Upper |
    /// | `[a-zA-Z]`, `[A-Za-z]` | Alpha |
    /// | `[a-zA-Z0-9]`, `[0-9a-zA-Z]` | Alnum |
    /// | `\\w`, `[a-zA-Z0-9_]` | Word |
    /// | `\\W` | NonWord |
    /// | `[0-9a-fA-F]` | HexDigit |
    /// | `\\s` | Space |
    /// | `\\S` | NonSpace |
    /// | `[ \\t]`, `\\h` | Blank |
    pub fn from_pattern(pattern: &str) -> Option<Self> {
        let class = match pattern {
            "[0-9]" | "\\d" => Self::Digit,
            "\\D" => Self::NonDigit,
            "[a-z]" => Self::Lower,
            "[A-Z]" => Self::Upper,
            "[a-zA-Z]" | "[A-Za-z]" => Self::Alpha,
            "[a-zA-Z0-9]" | "[0-9a-zA-Z]" => Self::Alnum,
            "\\w" | "[a-zA-Z0-9_]" | "[0-9a-zA-Z_]" => Self::Word,
            "\\W" => Self::NonWord,
            "[0-9a-fA-F]" | "[0-9A-Fa-f]" => Self::HexDigit,
            "\\s" => Self::Space,
            "\\S" => Self::NonSpace,
            "[ \t]" | "\\h" => Self::Blank,
            "[:cntrl:]" => Self::Cntrl,
            "[:graph:]" => Self::Graph,
            "[:print:]" => Self::Print,
            "[:punct:]" => Self::Punct,
            _ => return None,
        };
        Some(class)
    }

    /// Canonical spelling, used as the rule label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Digit => "\\d",
            Self::NonDigit => "\\D",
            Self::Lower => "[a-z]",
            Self::Upper => "[A-Z]",
            Self::Alpha => "[a-zA-Z]",
            Self::Alnum => "[a-zA-Z0-9]",
            Self::Word => "\\w",
            Self::NonWord => "\\W",
            Self::HexDigit => "[0-9a-fA-F]",
            Self::Space => "\\s",
            Self::NonSpace => "\\S",
            Self::Blank => "\\h",
            Self::Cntrl => "[:cntrl:]",
            Self::Graph => "[:graph:]",
            Self::Print => "[:print:]",
            Self::Punct => "[:punct:]",
        }
    }

    /// Whether byte `b` belongs to the class
    #[inline(always)]
    pub fn matches(&self, b: u8) -> bool {
        (self.predicate())(b)
    }

    /// Membership test as a plain function pointer
    #[inline]
    pub fn predicate(&self) -> fn(u8) -> bool {
        match self {
            Self::Digit => |b| b.is_ascii_digit(),
            Self::NonDigit => |b| !b.is_ascii_digit(),
            Self::Lower => |b| b.is_ascii_lowercase(),
            Self::Upper => |b| b.is_ascii_uppercase(),
            Self::Alpha => |b| b.is_ascii_alphabetic(),
            Self::Alnum => |b| b.is_ascii_alphanumeric(),
            Self::Word => is_word,
            Self::NonWord => |b| !is_word(b),
            Self::HexDigit => |b| b.is_ascii_hexdigit(),
            Self::Space => is_space,
            Self::NonSpace => |b| !is_space(b),
            Self::Blank => |b| b == b' ' || b == b'\t',
            Self::Cntrl => |b| b.is_ascii_control(),
            Self::Graph => |b| b.is_ascii_graphic(),
            Self::Print => |b| b.is_ascii_graphic() || b == b' ',
            Self::Punct => |b| b.is_ascii_punctuation(),
        }
    }

    /// Look up a bracket expression that a regex would match byte for byte
    ///
    /// Escapes like `\d` are Unicode-aware in a regex and POSIX names need
    /// double brackets there, so only ASCII bracket spellings qualify.
    pub fn from_ascii_bracket(pattern: &str) -> Option<Self> {
        if !pattern.starts_with('[') || pattern.starts_with("[:") {
            return None;
        }
        Self::from_pattern(pattern)
    }
}

#[inline(always)]
fn is_word(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

// \s includes vertical tab, which u8::is_ascii_whitespace does not
#[inline(always)]
fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0B | 0x0C)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_set_membership() {
        let set: ByteSet = b"az\xff".iter().copied().collect();
        assert!(set.contains(b'a'));
        assert!(set.contains(b'z'));
        assert!(set.contains(0xff));
        assert!(!set.contains(b'b'));
        assert_eq!(set.len(), 3);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![b'a', b'z', 0xff]);
    }

    #[test]
    fn test_byte_set_single() {
        let one: ByteSet = std::iter::once(b'x').collect();
        assert_eq!(one.single(), Some(b'x'));
        assert!(ByteSet::new().is_empty());
        assert_eq!(ByteSet::new().single(), None);
    }

    #[test]
    fn test_from_pattern() {
        assert_eq!(
            CharacterPattern::from_pattern("[0-9]"),
            Some(CharacterPattern::Digit)
        );
        assert_eq!(
            CharacterPattern::from_pattern("\\W"),
            Some(CharacterPattern::NonWord)
        );
        assert_eq!(CharacterPattern::from_pattern("[a-z]+"), None);
    }

    #[test]
    fn test_label_round_trips_through_from_pattern() {
        for class in [
            CharacterPattern::Digit,
            CharacterPattern::Word,
            CharacterPattern::Space,
            CharacterPattern::Punct,
            CharacterPattern::Blank,
        ] {
            assert_eq!(CharacterPattern::from_pattern(class.label()), Some(class));
        }
    }

    #[test]
    fn test_matches() {
        let word = CharacterPattern::Word;
        assert!(word.matches(b'a'));
        assert!(word.matches(b'_'));
        assert!(!word.matches(b'-'));

        assert!(CharacterPattern::Space.matches(0x0B));
        assert!(!CharacterPattern::NonSpace.matches(b'\n'));
        assert!(CharacterPattern::Punct.matches(b'!'));
        assert!(!CharacterPattern::Punct.matches(b'a'));
        assert!(CharacterPattern::Print.matches(b' '));
        assert!(!CharacterPattern::Graph.matches(b' '));
    }

    #[test]
    fn test_from_ascii_bracket() {
        assert_eq!(
            CharacterPattern::from_ascii_bracket("[0-9]"),
            Some(CharacterPattern::Digit)
        );
        assert_eq!(
            CharacterPattern::from_ascii_bracket("[A-Za-z]"),
            Some(CharacterPattern::Alpha)
        );
        assert_eq!(CharacterPattern::from_ascii_bracket("\\d"), None);
        assert_eq!(CharacterPattern::from_ascii_bracket("[:punct:]"), None);
        assert_eq!(CharacterPattern::from_ascii_bracket("[0-9]+"), None);
    }
}
