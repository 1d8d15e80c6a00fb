use unicode_general_category::{get_general_category, GeneralCategory};

use std::collections::{BTreeSet, HashSet};

/// Unicode-aware character classes used by the classification runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharClass {
    /// The Unicode `Alphabetic` property.
    Alphabetic,

    /// General categories `Lu`, `Ll`, `Lt`, `Lm` and `Lo`. Letter numbers
    /// and combining marks are alphabetic but not letters.
    Letter,

    /// General category `Nd`. Fractions, superscripts and roman numerals are
    /// numeric but not digits.
    Digit,

    LetterOrDigit,

    UpperCase,

    LowerCase,

    /// The Unicode `White_Space` property.
    WhiteSpace
}

impl CharClass {

    /// Returns true if `c` belongs to this class.
    pub fn matches(&self, c: char) -> bool {
        match self {
            CharClass::Alphabetic => c.is_alphabetic(),
            CharClass::Letter => is_letter(c),
            CharClass::Digit => is_digit(c),
            CharClass::LetterOrDigit => is_letter(c) || is_digit(c),
            CharClass::UpperCase => c.is_uppercase(),
            CharClass::LowerCase => c.is_lowercase(),
            CharClass::WhiteSpace => c.is_whitespace()
        }
    }
}

fn is_letter(c: char) -> bool {
    match get_general_category(c) {
        GeneralCategory::UppercaseLetter
        | GeneralCategory::LowercaseLetter
        | GeneralCategory::TitlecaseLetter
        | GeneralCategory::ModifierLetter
        | GeneralCategory::OtherLetter => true,
        _ => false
    }
}

fn is_digit(c: char) -> bool {
    c.is_ascii_digit() || get_general_category(c) == GeneralCategory::DecimalNumber
}

/// A finite set of characters supplied by the caller, e.g. the allowed set of
/// `many_one_of` or the excluded set of `many_none_of`.
pub trait CharSet {

    fn contains_char(&self, c: char) -> bool;
}

impl CharSet for str {

    fn contains_char(&self, c: char) -> bool {
        self.contains(c)
    }
}

impl CharSet for String {

    fn contains_char(&self, c: char) -> bool {
        self.as_str().contains(c)
    }
}

impl CharSet for char {

    fn contains_char(&self, c: char) -> bool {
        *self == c
    }
}

impl CharSet for [char] {

    fn contains_char(&self, c: char) -> bool {
        self.contains(&c)
    }
}

impl<const N: usize> CharSet for [char; N] {

    fn contains_char(&self, c: char) -> bool {
        self.contains(&c)
    }
}

impl CharSet for Vec<char> {

    fn contains_char(&self, c: char) -> bool {
        self.contains(&c)
    }
}

impl CharSet for HashSet<char> {

    fn contains_char(&self, c: char) -> bool {
        self.contains(&c)
    }
}

impl CharSet for BTreeSet<char> {

    fn contains_char(&self, c: char) -> bool {
        self.contains(&c)
    }
}

impl<S: CharSet + ?Sized> CharSet for &S {

    fn contains_char(&self, c: char) -> bool {
        (**self).contains_char(c)
    }
}

#[cfg(test)]
mod tests {

    use super::{CharClass, CharSet};

    use std::collections::HashSet;

    #[test]
    fn classes_are_unicode_aware() -> () {
        assert!(CharClass::Alphabetic.matches('ß'));
        assert!(CharClass::Letter.matches('ж'));
        assert!(CharClass::Digit.matches('٣'));
        assert!(CharClass::UpperCase.matches('Ä'));
        assert!(CharClass::LowerCase.matches('ä'));
        assert!(CharClass::WhiteSpace.matches('\u{3000}'));
        assert!(CharClass::LetterOrDigit.matches('7'));
        assert!(!CharClass::LetterOrDigit.matches('_'));
    }

    #[test]
    fn letter_numbers_are_alphabetic_but_not_letters() -> () {
        let roman_twelve = '\u{216B}';
        assert!(CharClass::Alphabetic.matches(roman_twelve));
        assert!(!CharClass::Letter.matches(roman_twelve));
        assert!(!CharClass::Digit.matches(roman_twelve));
        assert!(!CharClass::LetterOrDigit.matches(roman_twelve));
    }

    #[test]
    fn digits_are_decimal_numbers_only() -> () {
        for c in "0٣९７".chars() {
            assert!(CharClass::Digit.matches(c), "{:?} should be a digit", c);
        }
        for c in "½²³Ⅻ①".chars() {
            assert!(c.is_numeric());
            assert!(!CharClass::Digit.matches(c), "{:?} should not be a digit", c);
            assert!(!CharClass::LetterOrDigit.matches(c), "{:?} should not be a letter or digit", c);
        }
    }

    #[test]
    fn marks_are_alphabetic_but_not_letters() -> () {
        let vowel_sign_aa = '\u{093E}';
        assert!(CharClass::Alphabetic.matches(vowel_sign_aa));
        assert!(!CharClass::Letter.matches(vowel_sign_aa));
        assert!(!CharClass::LetterOrDigit.matches(vowel_sign_aa));
        assert!(CharClass::Letter.matches('ʰ'));
        assert!(CharClass::Letter.matches('ǅ'));
        assert!(CharClass::Letter.matches('中'));
    }

    #[test]
    fn char_sets_in_different_shapes_agree() -> () {
        let as_str = "+-*/";
        let as_array = ['+', '-', '*', '/'];
        let as_set: HashSet<char> = as_array.iter().cloned().collect();
        for c in "+-*/ab1 ".chars() {
            let expected = "+-*/".contains(c);
            assert_eq!(as_str.contains_char(c), expected);
            assert_eq!(as_array.contains_char(c), expected);
            assert_eq!(as_array[..].contains_char(c), expected);
            assert_eq!(as_set.contains_char(c), expected);
        }
        assert!('x'.contains_char('x'));
        assert!(!'x'.contains_char('y'));
    }
}
