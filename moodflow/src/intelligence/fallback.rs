//! Fixed, language-appropriate text used whenever generated content is
//! missing or unparseable. The card must never render blank.

use crate::models::{Language, MusicSuggestion};

#[derive(Debug, Clone, Copy)]
pub struct Fallback {
    pub analysis: &'static str,
    pub affirmation: &'static str,
    pub news: &'static str,
    pub pet_comment: &'static str,
    pub music_title: &'static str,
    pub music_artist: &'static str,
    pub match_reason: &'static str,
    pub pattern_summary: &'static str,
    pub pattern_advice: &'static str,
    pub report_summary: &'static str,
    pub chef_advice: &'static str,
}

const ZH: Fallback = Fallback {
    analysis: "今天的你也值得被温柔对待，慢慢来，一切都会好起来的。",
    affirmation: "你已经做得很好了，给自己一个拥抱吧。",
    news: "研究发现，每天花几分钟记录心情，能让人更平静、更快乐。",
    pet_comment: "我一直在这里陪着你哦！",
    music_title: "晴天",
    music_artist: "周杰伦",
    match_reason: "符合你此刻的口味与心情",
    pattern_summary: "最近你似乎反复出现相似的感受。",
    pattern_advice: "试着留意这些时刻，给自己多一点休息和关照。",
    report_summary: "这段时间的记录已经整理好啦，继续好好吃饭、好好生活。",
    chef_advice: "保持多样的饮食，偶尔尝试一家新餐厅吧。",
};

const EN: Fallback = Fallback {
    analysis: "You deserve kindness today too. Take it slow; things will work out.",
    affirmation: "You are doing better than you think. Give yourself a hug.",
    news: "Studies suggest that jotting down your mood for a few minutes a day can make you calmer and happier.",
    pet_comment: "I'm right here with you!",
    music_title: "Here Comes the Sun",
    music_artist: "The Beatles",
    match_reason: "Matches what you're in the mood for",
    pattern_summary: "You seem to be running into a similar feeling again lately.",
    pattern_advice: "Notice when these moments show up and give yourself a little extra rest and care.",
    report_summary: "Your recent entries are all summed up. Keep eating well and living well.",
    chef_advice: "Keep your meals varied and try a new restaurant now and then.",
};

impl Fallback {
    pub fn for_language(language: Language) -> &'static Fallback {
        match language {
            Language::Zh => &ZH,
            Language::En => &EN,
        }
    }

    pub fn music(&self) -> MusicSuggestion {
        MusicSuggestion {
            title: self.music_title.to_string(),
            artist: self.music_artist.to_string(),
        }
    }
}
