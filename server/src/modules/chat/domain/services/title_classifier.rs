use super::super::entities::DEFAULT_THREAD_TITLE;

/// 关键词分组 → 标题
#[derive(Debug, Clone, Copy)]
pub struct TitleRule {
    pub keywords: &'static [&'static str],
    pub label: &'static str,
}

/// 规则表，按顺序匹配，先命中者优先
pub const TITLE_RULES: &[TitleRule] = &[
    TitleRule {
        keywords: &[
            "code",
            "programming",
            "javascript",
            "python",
            "react",
            "development",
            "coding",
            "software",
        ],
        label: "Code Discussion",
    },
    TitleRule {
        keywords: &[
            "recipe", "cooking", "cook", "food", "meal", "dinner", "lunch", "breakfast",
        ],
        label: "Recipe & Cooking",
    },
    TitleRule {
        keywords: &["travel", "trip", "vacation", "flight", "hotel"],
        label: "Travel Planning",
    },
    TitleRule {
        keywords: &["health", "fitness", "exercise", "workout", "diet"],
        label: "Health & Fitness",
    },
    TitleRule {
        keywords: &["business", "marketing", "startup", "sales", "finance"],
        label: "Business Strategy",
    },
    TitleRule {
        keywords: &["write", "writing", "essay", "story", "poem", "blog"],
        label: "Writing Help",
    },
    TitleRule {
        keywords: &["math", "equation", "calculate", "algebra", "statistics"],
        label: "Math Help",
    },
    TitleRule {
        keywords: &["learn", "study", "explain", "homework", "teach"],
        label: "Learning & Education",
    },
];

const FALLBACK_WORDS: usize = 3;

/// 线程标题分类器
///
/// 领域服务：根据第一条用户消息推测标题
#[derive(Debug, Clone)]
pub struct TitleClassifier {
    rules: &'static [TitleRule],
}

impl Default for TitleClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl TitleClassifier {
    pub fn new() -> Self {
        Self { rules: TITLE_RULES }
    }

    /// 大小写不敏感的子串匹配；都未命中时取前三个词
    pub fn classify(&self, message: &str) -> String {
        let lower = message.to_lowercase();

        if let Some(rule) = self
            .rules
            .iter()
            .find(|rule| rule.keywords.iter().any(|k| lower.contains(*k)))
        {
            return rule.label.to_string();
        }

        Self::fallback_title(message)
    }

    fn fallback_title(message: &str) -> String {
        let words: Vec<&str> = message.split_whitespace().collect();
        if words.is_empty() {
            return DEFAULT_THREAD_TITLE.to_string();
        }

        let head = words[..words.len().min(FALLBACK_WORDS)].join(" ");
        if words.len() > FALLBACK_WORDS {
            format!("{}...", head)
        } else {
            head
        }
    }
}
