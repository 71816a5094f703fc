//! Static pinyin tables: valid syllables, initials, and the derived
//! division and completion tables.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;

/// All standard pinyin syllables (without tone markers).
///
/// `ü` finals are spelled with `v` (`lv`, `nve`); after j/q/x/y the `u`
/// spelling is canonical (`jue`, `xu`).
pub const PINYIN_SYLLABLES: &[&str] = &[
    "a", "ai", "an", "ang", "ao", "ba", "bai", "ban", "bang", "bao", "bei", "ben", "beng", "bi",
    "bian", "biao", "bie", "bin", "bing", "bo", "bu", "ca", "cai", "can", "cang", "cao", "ce",
    "cen", "ceng", "cha", "chai", "chan", "chang", "chao", "che", "chen", "cheng", "chi", "chong",
    "chou", "chu", "chuai", "chuan", "chuang", "chui", "chun", "chuo", "ci", "cong", "cou", "cu",
    "cuan", "cui", "cun", "cuo", "da", "dai", "dan", "dang", "dao", "de", "dei", "deng", "di",
    "dia", "dian", "diao", "die", "ding", "diu", "dong", "dou", "du", "duan", "dui", "dun", "duo",
    "e", "ei", "en", "er", "fa", "fan", "fang", "fei", "fen", "feng", "fo", "fou", "fu", "ga",
    "gai", "gan", "gang", "gao", "ge", "gei", "gen", "geng", "gong", "gou", "gu", "gua", "guai",
    "guan", "guang", "gui", "gun", "guo", "ha", "hai", "han", "hang", "hao", "he", "hei", "hen",
    "heng", "hong", "hou", "hu", "hua", "huai", "huan", "huang", "hui", "hun", "huo", "ji", "jia",
    "jian", "jiang", "jiao", "jie", "jin", "jing", "jiong", "jiu", "ju", "juan", "jue", "jun",
    "ka", "kai", "kan", "kang", "kao", "ke", "ken", "keng", "kong", "kou", "ku", "kua", "kuai",
    "kuan", "kuang", "kui", "kun", "kuo", "la", "lai", "lan", "lang", "lao", "le", "lei", "leng",
    "li", "lia", "lian", "liang", "liao", "lie", "lin", "ling", "liu", "lo", "long", "lou", "lu",
    "luan", "lun", "luo", "lv", "lve", "ma", "mai", "man", "mang", "mao", "me", "mei", "men",
    "meng", "mi", "mian", "miao", "mie", "min", "ming", "miu", "mo", "mou", "mu", "na", "nai",
    "nan", "nang", "nao", "ne", "nei", "nen", "neng", "ng", "ni", "nian", "niang", "niao", "nie",
    "nin", "ning", "niu", "nong", "nou", "nu", "nuan", "nuo", "nv", "nve", "o", "ou", "pa", "pai",
    "pan", "pang", "pao", "pei", "pen", "peng", "pi", "pian", "piao", "pie", "pin", "ping", "po",
    "pou", "pu", "qi", "qia", "qian", "qiang", "qiao", "qie", "qin", "qing", "qiong", "qiu", "qu",
    "quan", "que", "qun", "ran", "rang", "rao", "re", "ren", "reng", "ri", "rong", "rou", "ru",
    "ruan", "rui", "run", "ruo", "sa", "sai", "san", "sang", "sao", "se", "sen", "seng", "sha",
    "shai", "shan", "shang", "shao", "she", "shei", "shen", "sheng", "shi", "shou", "shu", "shua",
    "shuai", "shuan", "shuang", "shui", "shun", "shuo", "si", "song", "sou", "su", "suan", "sui",
    "sun", "suo", "ta", "tai", "tan", "tang", "tao", "te", "teng", "ti", "tian", "tiao", "tie",
    "ting", "tong", "tou", "tu", "tuan", "tui", "tun", "tuo", "wa", "wai", "wan", "wang", "wei",
    "wen", "weng", "wo", "wu", "xi", "xia", "xian", "xiang", "xiao", "xie", "xin", "xing", "xiong",
    "xiu", "xu", "xuan", "xue", "xun", "ya", "yan", "yang", "yao", "ye", "yi", "yin", "ying", "yo",
    "yong", "you", "yu", "yuan", "yue", "yun", "za", "zai", "zan", "zang", "zao", "ze", "zei",
    "zen", "zeng", "zha", "zhai", "zhan", "zhang", "zhao", "zhe", "zhen", "zheng", "zhi", "zhong",
    "zhou", "zhu", "zhua", "zhuai", "zhuan", "zhuang", "zhui", "zhun", "zhuo", "zi", "zong", "zou",
    "zu", "zuan", "zui", "zun", "zuo",
];

/// Initials that may be typed on their own as an abbreviation.
pub const INITIALS: &[&str] = &[
    "zh", "ch", "sh", "b", "p", "m", "f", "d", "t", "n", "l", "g", "k", "h", "j", "q", "x", "r",
    "z", "c", "s", "y", "w",
];

static SYLLABLE_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| PINYIN_SYLLABLES.iter().copied().collect());

/// Syllables that read as a syllable followed by a zero-initial one
/// (`xian` as `xi'an`, `tian` as `ti'an`).
static DIVIDED_TABLE: Lazy<HashMap<&'static str, Vec<(&'static str, &'static str)>>> =
    Lazy::new(|| {
        let mut m = HashMap::new();
        for &syllable in PINYIN_SYLLABLES {
            let splits: Vec<_> = (1..syllable.len())
                .filter_map(|k| {
                    let (a, b) = syllable.split_at(k);
                    let zero_initial = b.starts_with(['a', 'e', 'o']);
                    match (SYLLABLE_SET.get(a), SYLLABLE_SET.get(b)) {
                        (Some(a), Some(b)) if zero_initial => Some((*a, *b)),
                        _ => None,
                    }
                })
                .collect();
            if !splits.is_empty() {
                m.insert(syllable, splits);
            }
        }
        m
    });

/// Initial → syllables starting with exactly that initial.
static COMPLETIONS: Lazy<HashMap<&'static str, Vec<&'static str>>> = Lazy::new(|| {
    let mut m: HashMap<&'static str, Vec<&'static str>> = HashMap::new();
    for &syllable in PINYIN_SYLLABLES {
        if let Some(initial) = initial_of(syllable) {
            m.entry(initial).or_default().push(syllable);
        }
    }
    m
});

pub fn is_syllable(s: &str) -> bool {
    SYLLABLE_SET.contains(s)
}

/// Leading initial of `syllable`, `zh`/`ch`/`sh` taking precedence.
pub fn initial_of(syllable: &str) -> Option<&'static str> {
    INITIALS.iter().copied().find(|i| syllable.starts_with(i))
}

/// Two-syllable readings of a single syllable.
pub fn divisions(syllable: &str) -> &'static [(&'static str, &'static str)] {
    DIVIDED_TABLE
        .get(syllable)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Other splits of the joined spelling `left + right` into two syllables.
pub fn resplits(left: &str, right: &str) -> Vec<(String, String)> {
    let joined = format!("{left}{right}");
    (1..joined.len())
        .filter(|&k| k != left.len())
        .filter_map(|k| {
            let (a, b) = joined.split_at(k);
            (is_syllable(a) && is_syllable(b) && b != "ng").then(|| (a.to_string(), b.to_string()))
        })
        .collect()
}

/// Complete syllables abbreviated by `initial`.
pub fn completions(initial: &str) -> &'static [&'static str] {
    COMPLETIONS.get(initial).map(Vec::as_slice).unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syllable_table_is_sorted_and_unique() {
        let mut sorted = PINYIN_SYLLABLES.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), PINYIN_SYLLABLES.len());
    }

    #[test]
    fn syllable_table_is_separate_from_initials() {
        assert_eq!(PINYIN_SYLLABLES.len(), 405);
        assert_eq!(PINYIN_SYLLABLES.first(), Some(&"a"));
        assert_eq!(PINYIN_SYLLABLES.last(), Some(&"zuo"));
        assert!(!is_syllable("zh"));
        assert_eq!(INITIALS.len(), 23);
    }

    #[test]
    fn divided_table_contains_xian() {
        assert!(divisions("xian").contains(&("xi", "an")));
        assert!(divisions("tian").contains(&("ti", "an")));
        assert!(divisions("bing").is_empty());
    }

    #[test]
    fn resplit_moves_the_boundary() {
        assert_eq!(resplits("fang", "an"), vec![("fan".to_string(), "gan".to_string())]);
        assert!(resplits("ni", "hao").is_empty());
    }

    #[test]
    fn completions_respect_retroflex_initials() {
        assert!(completions("z").contains(&"zan"));
        assert!(!completions("z").contains(&"zhan"));
        assert!(completions("zh").contains(&"zhang"));
        assert!(completions("v").is_empty());
    }
}
