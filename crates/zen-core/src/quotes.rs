//! Fixed quote pools shared with the web frontend's screens, plus the local
//! master reply used when no remote master is reachable.

use rand::Rng;

/// Rotating zen quotes shown on the welcome and meditation screens.
pub const ZEN_QUOTES: [&str; 10] = [
    "心若冰清，天塌不惊。",
    "万法归一，一归何处？",
    "一花一世界，一叶一菩提。",
    "春有百花秋有月，夏有凉风冬有雪。",
    "心若无事便是禅。",
    "禅心一片清风明月。",
    "万缘放下，一念不生。",
    "明月松间照，清泉石上流。",
    "菩提本无树，明镜亦非台。",
    "静坐常思己过，闲谈莫论人非。",
];

/// Quotes attached to a realm level-up.
pub const LEVEL_UP_QUOTES: [&str; 4] = [
    "一花一世界，一叶一菩提。",
    "心若冰清，天塌不惊。",
    "万般皆是命，半点不由人。",
    "明心见性，本来面目。",
];

const REPLY_FRAMES: [&str; 3] = [
    "施主且坐。{}",
    "心中有惑，不妨先观此语：{}",
    "禅师轻抚茶盏，道：{}",
];

pub fn random_zen_quote(rng: &mut impl Rng) -> &'static str {
    ZEN_QUOTES[rng.random_range(0..ZEN_QUOTES.len())]
}

pub fn random_level_up_quote(rng: &mut impl Rng) -> &'static str {
    LEVEL_UP_QUOTES[rng.random_range(0..LEVEL_UP_QUOTES.len())]
}

/// Compose a local master reply: a quote in a short reflective frame.
/// An empty question gets the bare quote.
pub fn master_reply(message: &str, rng: &mut impl Rng) -> String {
    let quote = random_zen_quote(rng);
    if message.trim().is_empty() {
        return quote.to_string();
    }
    let frame = REPLY_FRAMES[rng.random_range(0..REPLY_FRAMES.len())];
    frame.replacen("{}", quote, 1)
}
