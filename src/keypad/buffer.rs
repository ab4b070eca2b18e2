//! Display buffer of the on-screen numeric keypad

/// Upper bound enforced on the buffer in integer mode
const INTEGER_MAX: u64 = 100;

/// A single keypad tap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Digit 0-9
    Digit(u8),
    /// Decimal point
    Point,
    /// Remove the last character
    Delete,
}

impl Key {
    /// Map a typed character to a key
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            '0'..='9' => Some(Self::Digit(c as u8 - b'0')),
            '.' | ',' => Some(Self::Point),
            '<' | '⌫' => Some(Self::Delete),
            _ => None,
        }
    }

    /// Map a key label (`"7"`, `"."`, `"del"`) to a key
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        if label.eq_ignore_ascii_case("del") || label.eq_ignore_ascii_case("delete") {
            return Some(Self::Delete);
        }
        let mut chars = label.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_char(c),
            _ => None,
        }
    }

    /// Symbol printed on the key cap
    pub fn symbol(self) -> char {
        match self {
            Self::Digit(d) => char::from_digit(u32::from(d), 10).unwrap_or('?'),
            Self::Point => '.',
            Self::Delete => '⌫',
        }
    }
}

/// 4x3 key grid; integer mode leaves the decimal point slot blank
pub const fn layout(integer_only: bool) -> [Option<Key>; 12] {
    [
        Some(Key::Digit(1)),
        Some(Key::Digit(2)),
        Some(Key::Digit(3)),
        Some(Key::Digit(4)),
        Some(Key::Digit(5)),
        Some(Key::Digit(6)),
        Some(Key::Digit(7)),
        Some(Key::Digit(8)),
        Some(Key::Digit(9)),
        if integer_only { None } else { Some(Key::Point) },
        Some(Key::Digit(0)),
        Some(Key::Delete),
    ]
}

/// Text shown on the keypad display; never empty
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeypadBuffer {
    text: String,
    integer_only: bool,
}

impl KeypadBuffer {
    /// Seed a buffer; an absent or non-numeric seed starts at `"0"`
    pub fn new(initial: Option<&str>, integer_only: bool) -> Self {
        let text = initial
            .map(str::trim)
            .filter(|s| is_numeric_seed(s))
            .map_or_else(|| "0".to_string(), |s| s.replace(',', "."));
        let mut buffer = Self { text, integer_only };
        buffer.reclamp();
        buffer
    }

    /// Current display text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether only whole numbers are accepted
    pub const fn integer_only(&self) -> bool {
        self.integer_only
    }

    /// Apply one tap
    pub fn press(&mut self, key: Key) {
        match key {
            Key::Digit(d) => {
                let Some(digit) = char::from_digit(u32::from(d), 10) else {
                    return;
                };
                if self.text == "0" {
                    self.text = digit.to_string();
                } else {
                    self.text.push(digit);
                }
            }
            Key::Point => {
                if self.integer_only || self.text.contains('.') {
                    return;
                }
                self.text.push('.');
            }
            Key::Delete => {
                self.text.pop();
                if self.text.is_empty() {
                    self.text.push('0');
                }
            }
        }
        self.reclamp();
    }

    /// Number the buffer confirms to; anything unparsable is 0
    #[allow(clippy::cast_precision_loss)]
    pub fn value(&self) -> f64 {
        if self.integer_only {
            return leading_integer(&self.text).map_or(0.0, |n| n.min(INTEGER_MAX) as f64);
        }
        self.text
            .replace(',', ".")
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .unwrap_or(0.0)
    }

    fn reclamp(&mut self) {
        if !self.integer_only {
            return;
        }
        if let Some(n) = leading_integer(&self.text) {
            self.text = n.min(INTEGER_MAX).to_string();
        }
    }
}

/// Digits with at most one decimal separator and at least one digit
fn is_numeric_seed(s: &str) -> bool {
    let separators = s.chars().filter(|c| matches!(c, '.' | ',')).count();
    separators <= 1
        && s.chars().any(|c| c.is_ascii_digit())
        && s.chars().all(|c| c.is_ascii_digit() || matches!(c, '.' | ','))
}

/// Value of the leading run of digits, saturating on overflow
fn leading_integer(s: &str) -> Option<u64> {
    let digits: Vec<u64> = s
        .chars()
        .map_while(|c| c.to_digit(10))
        .map(u64::from)
        .collect();
    if digits.is_empty() {
        return None;
    }
    Some(
        digits
            .into_iter()
            .fold(0u64, |acc, d| acc.saturating_mul(10).saturating_add(d)),
    )
}
