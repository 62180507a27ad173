use serde::{Deserialize, Serialize};

/// 内置知识库：规范问题 -> 回答（声明顺序即匹配优先级）
pub const SOFTSELL_ENTRIES: [(&str, &str); 4] = [
    (
        "how do i sell my software licenses?",
        "Selling your software licenses with SoftSell is easy! First, fill out our contact form with details about your licenses. Our team will evaluate them and provide a valuation within 24 hours. Once you accept our offer, we'll guide you through the secure transfer process and issue payment through your preferred method.",
    ),
    (
        "what types of licenses do you accept?",
        "We accept a wide range of software licenses including Microsoft (Office, Windows, Server), Adobe (Creative Cloud, Acrobat), Oracle (Database, Middleware), SAP, Autodesk, VMware, and many more. Both perpetual and subscription licenses can be evaluated, though the value and transferability depend on the specific license terms.",
    ),
    (
        "how long does the process take?",
        "The entire process typically takes 3-7 business days. We provide valuations within 24 hours of submission, and once you accept our offer, the payment is typically processed within 3-5 business days after successful license transfer.",
    ),
    (
        "is my data secure during the transfer?",
        "Absolutely! We take security very seriously. All communications and transfers are conducted through encrypted channels. We have strict data handling protocols in place and comply with all relevant data protection regulations. Your information is only used for the purpose of facilitating the license transfer process.",
    ),
];

/// 建议问题（仅作为 UI 快捷入口，与知识库无关）
pub const SOFTSELL_SUGGESTED_QUESTIONS: [&str; 4] = [
    "How do I sell my software licenses?",
    "What types of licenses do you accept?",
    "How long does the process take?",
    "Is my data secure during the transfer?",
];

/// 知识条目
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KnowledgeEntry {
    /// 规范问题（应为小写）
    pub key: String,
    /// 回答文本
    pub answer: String,
}

impl KnowledgeEntry {
    pub fn new(key: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            answer: answer.into(),
        }
    }

    /// 含大写字符的键无法通过正向包含命中（输入已被小写化），
    /// 仅在输入是键的子串时才可能反向命中
    pub fn has_uppercase_key(&self) -> bool {
        self.key.chars().any(char::is_uppercase)
    }
}

/// 知识库
///
/// 启动时加载一次，运行期间不可变。条目顺序即匹配顺序。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnowledgeBase {
    entries: Vec<KnowledgeEntry>,
}

impl KnowledgeBase {
    pub fn new(entries: Vec<KnowledgeEntry>) -> Self {
        Self { entries }
    }

    /// 空知识库，所有输入都会得到兜底回答
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn entries(&self) -> &[KnowledgeEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &KnowledgeEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::new(default_entries())
    }
}

impl FromIterator<KnowledgeEntry> for KnowledgeBase {
    fn from_iter<I: IntoIterator<Item = KnowledgeEntry>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// 内置条目的拥有副本
pub fn default_entries() -> Vec<KnowledgeEntry> {
    SOFTSELL_ENTRIES
        .iter()
        .map(|(key, answer)| KnowledgeEntry::new(*key, *answer))
        .collect()
}

/// 内置建议问题的拥有副本
pub fn default_suggested_questions() -> Vec<String> {
    SOFTSELL_SUGGESTED_QUESTIONS
        .iter()
        .map(|q| q.to_string())
        .collect()
}
