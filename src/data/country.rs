//! Country names as shown to visitors (Japanese) and their flag icons. The source stores
//! English names; the filter works on those.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryInfo {
    #[serde(default)]
    pub local_name: Option<String>,
    #[serde(default)]
    pub flag_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CountryDirectory {
    entries: BTreeMap<String, CountryInfo>,
}

const BUILT_IN: &[(&str, &str, Option<&str>)] = &[
    ("Japan", "日本", Some("https://freesozai.jp/sozai/nation_flag/ntf_131/ntf_131.png")),
    ("Belgium", "ベルギー", Some("https://freesozai.jp/sozai/nation_flag/ntf_330/ntf_330.png")),
    ("Germany", "ドイツ", Some("https://freesozai.jp/sozai/nation_flag/ntf_322/ntf_322.png")),
    ("United States", "アメリカ", Some("https://freesozai.jp/sozai/nation_flag/ntf_401/ntf_401.png")),
    ("United Kingdom", "イギリス", Some("https://freesozai.jp/sozai/nation_flag/ntf_305/ntf_305.png")),
    ("Netherlands", "オランダ", Some("https://freesozai.jp/sozai/nation_flag/ntf_310/ntf_310.png")),
    ("Czech Republic", "チェコ", Some("https://freesozai.jp/sozai/nation_flag/ntf_320/ntf_320.png")),
    ("France", "フランス", Some("https://freesozai.jp/sozai/nation_flag/ntf_327/ntf_327.png")),
    ("Canada", "カナダ", Some("https://freesozai.jp/sozai/nation_flag/ntf_404/ntf_404.png")),
    ("Australia", "オーストラリア", None),
    ("Italy", "イタリア", Some("https://freesozai.jp/sozai/nation_flag/ntf_306/ntf_306.png")),
    ("Sweden", "スウェーデン", Some("https://freesozai.jp/sozai/nation_flag/ntf_315/ntf_315.svg")),
];

impl Default for CountryDirectory {
    fn default() -> Self {
        let entries = BUILT_IN
            .iter()
            .map(|(name, local, flag)| {
                (
                    name.to_string(),
                    CountryInfo {
                        local_name: Some(local.to_string()),
                        flag_url: flag.map(str::to_string),
                    },
                )
            })
            .collect();
        Self { entries }
    }
}

impl CountryDirectory {
    /// Overlay entries from config on top of this directory; set fields win.
    pub fn merged(mut self, overrides: &BTreeMap<String, CountryInfo>) -> Self {
        for (name, info) in overrides {
            let entry = self.entries.entry(name.clone()).or_default();
            if info.local_name.is_some() {
                entry.local_name = info.local_name.clone();
            }
            if info.flag_url.is_some() {
                entry.flag_url = info.flag_url.clone();
            }
        }
        self
    }

    pub fn local_name<'a>(&'a self, country: &'a str) -> &'a str {
        self.entries
            .get(country)
            .and_then(|c| c.local_name.as_deref())
            .unwrap_or(country)
    }

    pub fn flag_url(&self, country: &str) -> Option<&str> {
        self.entries.get(country).and_then(|c| c.flag_url.as_deref())
    }
}
