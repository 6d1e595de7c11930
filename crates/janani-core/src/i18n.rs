//! 국제화 (i18n) 모듈.
//!
//! 10개 인도 언어 코드와 사전 기반 번역기를 제공한다.
//! 사전이 없는 언어는 영어로, 영어에도 없는 키는 키 자체로 대체된다.

use serde::{Deserialize, Serialize};

use crate::ports::translator::Translator;

/// 지원 언어
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Language {
    /// 영어 (기본값, 최종 대체 언어)
    #[default]
    English,
    Hindi,
    Marathi,
    Bengali,
    Telugu,
    Tamil,
    Gujarati,
    Kannada,
    Malayalam,
    Punjabi,
}

impl Language {
    /// 전체 언어 목록
    pub const ALL: [Language; 10] = [
        Language::English,
        Language::Hindi,
        Language::Marathi,
        Language::Bengali,
        Language::Telugu,
        Language::Tamil,
        Language::Gujarati,
        Language::Kannada,
        Language::Malayalam,
        Language::Punjabi,
    ];

    /// 언어 이름 (영어 표기, AI 프롬프트에 그대로 사용)
    pub fn name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Hindi => "Hindi",
            Language::Marathi => "Marathi",
            Language::Bengali => "Bengali",
            Language::Telugu => "Telugu",
            Language::Tamil => "Tamil",
            Language::Gujarati => "Gujarati",
            Language::Kannada => "Kannada",
            Language::Malayalam => "Malayalam",
            Language::Punjabi => "Punjabi",
        }
    }

    /// 이름으로 언어 조회 (대소문자 무시)
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|lang| lang.name().eq_ignore_ascii_case(name.trim()))
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// 번역 키 상수
pub mod keys {
    pub const BRIDGE: &str = "bridge";
    pub const BRIDGE_DESC: &str = "desc";
    pub const EMERGENCY: &str = "emergency";
    pub const UPCOMING: &str = "upcoming";
    pub const SUMMARY: &str = "summary";
    pub const CONNECTING: &str = "connecting";
    pub const JOIN: &str = "join";
    pub const NEW_CONSULT: &str = "newConsult";
    pub const DOCTOR: &str = "doctor";
    pub const REASON: &str = "reason";
    pub const CALL_SCHEDULED: &str = "callScheduled";
    pub const CALL_ENDED: &str = "callEnded";
    pub const HARDWARE_BLOCKED: &str = "hardwareBlocked";
    pub const HARDWARE_BLOCKED_DESC: &str = "hardwareBlockedDesc";
}

fn english(key: &str) -> Option<&'static str> {
    let text = match key {
        keys::BRIDGE => "Clinical Bridge",
        keys::BRIDGE_DESC => "Connect with doctors and ASHA workers instantly.",
        keys::EMERGENCY => "Emergency Call",
        keys::UPCOMING => "Scheduled Consults",
        keys::SUMMARY => "Janaki's Consult Notes",
        keys::CONNECTING => "Establishing Link",
        keys::JOIN => "Join Call",
        keys::NEW_CONSULT => "New Consult",
        keys::DOCTOR => "Select Doctor",
        keys::REASON => "Reason",
        keys::CALL_SCHEDULED => "Consult Scheduled",
        keys::CALL_ENDED => "Call Ended",
        keys::HARDWARE_BLOCKED => "Camera/Microphone Blocked",
        keys::HARDWARE_BLOCKED_DESC => {
            "Allow camera and microphone access, then start the call again."
        }
        _ => return None,
    };
    Some(text)
}

fn hindi(key: &str) -> Option<&'static str> {
    let text = match key {
        keys::BRIDGE => "क्लिनीकल ब्रिज",
        keys::BRIDGE_DESC => "डॉक्टरों और आशा कार्यकर्ताओं से तुरंत जुड़ें।",
        keys::EMERGENCY => "आपातकालीन कॉल",
        keys::UPCOMING => "निर्धारित परामर्श",
        keys::SUMMARY => "जानकी के परामर्श नोट्स",
        keys::CONNECTING => "लिंक स्थापित कर रहा है",
        keys::JOIN => "कॉल में शामिल हों",
        keys::NEW_CONSULT => "नया परामर्श",
        keys::DOCTOR => "डॉक्टर चुनें",
        keys::REASON => "कारण",
        keys::CALL_SCHEDULED => "परामर्श निर्धारित",
        keys::CALL_ENDED => "कॉल समाप्त",
        _ => return None,
    };
    Some(text)
}

/// 정적 사전 기반 번역기: `Translator` 포트 구현
///
/// 영어/힌디어 사전을 내장한다. 나머지 언어는 영어로 대체된다.
#[derive(Debug, Clone, Copy, Default)]
pub struct DictionaryTranslator;

impl DictionaryTranslator {
    /// 새 번역기 생성
    pub fn new() -> Self {
        Self
    }

    fn table(language: Language) -> Option<fn(&str) -> Option<&'static str>> {
        match language {
            Language::English => Some(english),
            Language::Hindi => Some(hindi),
            _ => None,
        }
    }
}

impl Translator for DictionaryTranslator {
    fn lookup(&self, key: &str, language: Language) -> String {
        Self::table(language)
            .and_then(|table| table(key))
            .or_else(|| english(key))
            .map(str::to_string)
            .unwrap_or_else(|| key.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hindi_lookup() {
        let t = DictionaryTranslator::new();
        assert_eq!(t.lookup(keys::EMERGENCY, Language::Hindi), "आपातकालीन कॉल");
    }

    #[test]
    fn missing_language_falls_back_to_english() {
        let t = DictionaryTranslator::new();
        assert_eq!(t.lookup(keys::BRIDGE, Language::Tamil), "Clinical Bridge");
    }

    #[test]
    fn missing_hindi_entry_falls_back_to_english() {
        let t = DictionaryTranslator::new();
        assert_eq!(
            t.lookup(keys::HARDWARE_BLOCKED, Language::Hindi),
            "Camera/Microphone Blocked"
        );
    }

    #[test]
    fn unknown_key_returns_key() {
        let t = DictionaryTranslator::new();
        assert_eq!(t.lookup("noSuchKey", Language::Bengali), "noSuchKey");
    }

    #[test]
    fn language_from_name() {
        assert_eq!(Language::from_name("hindi"), Some(Language::Hindi));
        assert_eq!(Language::from_name(" Punjabi "), Some(Language::Punjabi));
        assert_eq!(Language::from_name("Klingon"), None);
    }

    #[test]
    fn language_serializes_as_name() {
        let json = serde_json::to_string(&Language::Malayalam).unwrap();
        assert_eq!(json, "\"Malayalam\"");
    }
}
