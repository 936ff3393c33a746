//! Collation key for Japanese readings (yomi) and brewery/style names.
//!
//! Keys compare in three levels, like a dictionary: first the base letters (gojūon order for
//! kana, voicing and size ignored), then voicing marks, then small/large and
//! hiragana/katakana. So `か < が < き` and `ア < か`, whatever their code points are.
//! Across scripts: symbols < digits < Latin (case-folded) < kana < everything else.

use std::cmp::Ordering;

const CLASS_SYMBOL: u32 = 1;
const CLASS_DIGIT: u32 = 2;
const CLASS_LATIN: u32 = 3;
const CLASS_KANA: u32 = 4;
const CLASS_OTHER: u32 = 5;

const LONG_VOWEL: char = 'ー';

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SortKey {
    primary: Vec<u32>,
    secondary: Vec<u8>,
    tertiary: Vec<u8>,
}

#[derive(Debug, Clone, Copy)]
struct Element {
    class: u32,
    value: u32,
    voicing: u8,
    variant: u8,
}

impl Element {
    fn plain(class: u32, value: u32) -> Self {
        Self {
            class,
            value,
            voicing: 0,
            variant: 0,
        }
    }
}

impl SortKey {
    /// Build a key from display or reading text. Blank text has no key (sorts last).
    pub fn from_reading(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let elements = elements(text);
        Some(Self {
            primary: elements.iter().map(|e| (e.class << 24) | e.value).collect(),
            secondary: elements.iter().map(|e| e.voicing).collect(),
            tertiary: elements.iter().map(|e| e.variant).collect(),
        })
    }
}

/// Order two optional keys with missing keys after every present one.
pub fn cmp_nulls_last(a: Option<&SortKey>, b: Option<&SortKey>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn elements(text: &str) -> Vec<Element> {
    let mut out: Vec<Element> = Vec::with_capacity(text.len());
    for raw in text.chars() {
        let c = fold_width(raw);
        match c {
            // combining / half-width voicing marks modify the previous kana
            '\u{3099}' | '\u{FF9E}' | '\u{309B}' => {
                if let Some(last) = out.last_mut().filter(|e| e.class == CLASS_KANA) {
                    last.voicing = 1;
                    continue;
                }
                out.push(Element::plain(CLASS_SYMBOL, c as u32));
            }
            '\u{309A}' | '\u{FF9F}' | '\u{309C}' => {
                if let Some(last) = out.last_mut().filter(|e| e.class == CLASS_KANA) {
                    last.voicing = 2;
                    continue;
                }
                out.push(Element::plain(CLASS_SYMBOL, c as u32));
            }
            LONG_VOWEL => {
                let vowel = out
                    .last()
                    .filter(|e| e.class == CLASS_KANA)
                    .and_then(|e| char::from_u32(e.value))
                    .and_then(vowel_of);
                match vowel {
                    Some(v) => out.push(Element {
                        class: CLASS_KANA,
                        value: v as u32,
                        voicing: 0,
                        variant: 4,
                    }),
                    None => out.push(Element::plain(CLASS_SYMBOL, c as u32)),
                }
            }
            // iteration marks repeat the previous kana
            'ゝ' | 'ヽ' | 'ゞ' | 'ヾ' => {
                match out.last().copied().filter(|e| e.class == CLASS_KANA) {
                    Some(prev) => out.push(Element {
                        voicing: if matches!(c, 'ゞ' | 'ヾ') { 1 } else { prev.voicing },
                        ..prev
                    }),
                    None => out.push(Element::plain(CLASS_SYMBOL, c as u32)),
                }
            }
            _ => out.push(element_for(c)),
        }
    }
    out
}

fn element_for(c: char) -> Element {
    if c.is_ascii_digit() {
        return Element::plain(CLASS_DIGIT, c as u32);
    }
    if c.is_alphabetic() && (c.is_ascii() || is_latin(c)) {
        let lower = c.to_lowercase().next().unwrap_or(c);
        return Element {
            class: CLASS_LATIN,
            value: lower as u32,
            voicing: 0,
            variant: u8::from(c.is_uppercase()),
        };
    }
    if let Some((base, voicing, small, katakana)) = decompose_kana(c) {
        return Element {
            class: CLASS_KANA,
            value: base as u32,
            voicing,
            variant: (u8::from(!small) << 1) | u8::from(katakana),
        };
    }
    if c.is_alphanumeric() {
        return Element::plain(CLASS_OTHER, c as u32);
    }
    Element::plain(CLASS_SYMBOL, c as u32)
}

fn is_latin(c: char) -> bool {
    matches!(c as u32, 0x00C0..=0x024F)
}

/// Full-width ASCII and half-width katakana to their normal forms.
fn fold_width(c: char) -> char {
    let code = c as u32;
    match code {
        0xFF01..=0xFF5E => char::from_u32(code - 0xFEE0).unwrap_or(c),
        0x3000 => ' ',
        0xFF66..=0xFF9D => {
            let idx = (code - 0xFF66) as usize;
            HALF_WIDTH_KATAKANA.chars().nth(idx).unwrap_or(c)
        }
        _ => c,
    }
}

/// Full-width equivalents of U+FF66..=U+FF9D, in order.
const HALF_WIDTH_KATAKANA: &str =
    "ヲァィゥェォャュョッーアイウエオカキクケコサシスセソタチツテトナニヌネノハヒフヘホマミムメモヤユヨラリルレロワン";

/// Returns (base hiragana, voicing, is_small, is_katakana).
fn decompose_kana(c: char) -> Option<(char, u8, bool, bool)> {
    let code = c as u32;
    let (hira, katakana) = match code {
        0x3041..=0x3096 => (code, false),
        0x30A1..=0x30F6 => (code - 0x60, true),
        0x30F7..=0x30FA => {
            // ヷヸヹヺ: voiced ワヰヱヲ
            let base = ['わ', 'ゐ', 'ゑ', 'を'][(code - 0x30F7) as usize];
            return Some((base, 1, false, true));
        }
        _ => return None,
    };

    let (base, voicing, small) = match hira {
        0x3041 | 0x3043 | 0x3045 | 0x3047 | 0x3049 => (hira + 1, 0, true),
        0x3063 => (0x3064, 0, true),
        0x3083 | 0x3085 | 0x3087 => (hira + 1, 0, true),
        0x308E => (0x308F, 0, true),
        0x3095 => (0x304B, 0, true),
        0x3096 => (0x3051, 0, true),
        0x3094 => (0x3046, 1, false),
        0x304B..=0x3062 => {
            let off = hira - 0x304B;
            (0x304B + off / 2 * 2, (off % 2) as u8, false)
        }
        0x3064..=0x3069 => {
            let off = hira - 0x3064;
            (0x3064 + off / 2 * 2, (off % 2) as u8, false)
        }
        0x306F..=0x307D => {
            let off = hira - 0x306F;
            (0x306F + off / 3 * 3, (off % 3) as u8, false)
        }
        other => (other, 0, false),
    };
    char::from_u32(base).map(|b| (b, voicing, small, katakana))
}

fn vowel_of(base: char) -> Option<char> {
    const ROWS: [(&str, char); 5] = [
        ("あかさたなはまやらわ", 'あ'),
        ("いきしちにひみりゐ", 'い'),
        ("うくすつぬふむゆる", 'う'),
        ("えけせてねへめれゑ", 'え'),
        ("おこそとのほもよろを", 'お'),
    ];
    ROWS.iter()
        .find(|(row, _)| row.contains(base))
        .map(|(_, vowel)| *vowel)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> SortKey {
        SortKey::from_reading(s).unwrap()
    }

    #[test]
    fn voicing_is_secondary_to_base_letters() {
        assert!(key("か") < key("が"));
        assert!(key("が") < key("き"));
        assert!(key("ばか") < key("はな"), "base letters decide before voicing");
        assert!(key("ひ") < key("び"));
        assert!(key("び") < key("ぴ"));
    }

    #[test]
    fn gojuon_order_ignores_code_points() {
        // U+30A2 ア sits above U+304B か, but あ-row comes first
        assert!(key("アサヒ") < key("かぶと"));
        assert!(key("キリン") < key("さっぽろ"));
        assert!(key("ヤッホー") < key("よなよな"));
    }

    #[test]
    fn katakana_and_hiragana_share_primary_weights() {
        let hira = key("びーる");
        let kata = key("ビール");
        assert_eq!(hira.primary, kata.primary);
        assert!(hira < kata);
    }

    #[test]
    fn long_vowel_mark_takes_previous_vowel() {
        let k = key("ビール");
        let expected = key("びいる");
        assert_eq!(k.primary, expected.primary);
    }

    #[test]
    fn small_kana_sort_with_their_large_forms() {
        let small = key("きっと");
        let large = key("きつと");
        assert_eq!(small.primary, large.primary);
        assert!(small < large);
    }

    #[test]
    fn half_width_katakana_folds() {
        assert_eq!(key("ｷﾘﾝ").primary, key("キリン").primary);
        assert_eq!(key("ｶﾞ").primary, key("ガ").primary);
        assert_eq!(key("ｶﾞ").secondary, key("ガ").secondary);
    }

    #[test]
    fn scripts_order_latin_before_kana_before_kanji() {
        assert!(key("1") < key("a"));
        assert!(key("Zeta") < key("あ"));
        assert!(key("あ") < key("麦"));
        assert!(key("apple") < key("Banana"));
    }

    #[test]
    fn blank_readings_have_no_key_and_sort_last() {
        assert!(SortKey::from_reading("  ").is_none());
        let a = key("あ");
        assert_eq!(cmp_nulls_last(Some(&a), None), Ordering::Less);
        assert_eq!(cmp_nulls_last(None, Some(&a)), Ordering::Greater);
    }
}
