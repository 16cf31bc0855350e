//! LLM prompts for table reformatting, keyword expansion and triple extraction

use crate::config::PromptLanguage;
use serde_json::json;

/// Task tag heading the table reformat prompt
pub const REFORMAT_TASK: &str = "task: table_reformat";

/// Task tag heading the keyword expansion prompt
pub const KEYWORD_TASK: &str = "task: table_keywords";

/// Task tag heading the triple extraction prompt
pub const TRIPLE_TASK: &str = "task: table_triples";

/// Builds prompts in the configured language
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptBuilder {
    language: PromptLanguage,
}

impl PromptBuilder {
    /// Create a new prompt builder
    pub fn new(language: PromptLanguage) -> Self {
        Self { language }
    }

    /// Prompt asking for the table as a clean markdown grid
    pub fn reformat(&self, table_name: &str, markup: &str) -> String {
        let instructions = match self.language {
            PromptLanguage::En => REFORMAT_EN,
            PromptLanguage::Zh => REFORMAT_ZH,
        };

        let mut prompt = String::new();
        prompt.push_str(REFORMAT_TASK);
        prompt.push_str("\n\n");
        prompt.push_str(instructions);
        prompt.push_str("\n\n");
        if !table_name.is_empty() {
            prompt.push_str(&format!("Table: {}\n", table_name));
        }
        prompt.push_str("---\n");
        prompt.push_str(markup);
        prompt.push_str("\n---\n");
        prompt
    }

    /// Prompt asking for colloquial expansions of every keyword
    ///
    /// The keywords are passed as a JSON object so labels containing quotes
    /// or newlines survive intact.
    pub fn keywords<'a>(
        &self,
        table_name: &str,
        keywords: impl IntoIterator<Item = &'a String>,
    ) -> String {
        let instructions = match self.language {
            PromptLanguage::En => KEYWORDS_EN,
            PromptLanguage::Zh => KEYWORDS_ZH,
        };
        let input = json!({
            "context": table_name,
            "key_list": keywords.into_iter().collect::<Vec<_>>(),
        });

        format!(
            "{}\n\n{}\n\nInput:\n{}\n\n{}",
            KEYWORD_TASK, instructions, input, JSON_ONLY_REMINDER
        )
    }

    /// Prompt asking for subject/predicate/object triples from a table chunk
    pub fn triples(&self, table_name: &str, text: &str) -> String {
        let instructions = match self.language {
            PromptLanguage::En => TRIPLES_EN,
            PromptLanguage::Zh => TRIPLES_ZH,
        };

        let mut prompt = String::new();
        prompt.push_str(TRIPLE_TASK);
        prompt.push_str("\n\n");
        prompt.push_str(instructions);
        prompt.push_str("\n\n");
        if !table_name.is_empty() {
            prompt.push_str(&format!("Table: {}\n", table_name));
        }
        prompt.push_str("Text to analyze:\n---\n");
        prompt.push_str(text);
        prompt.push_str("\n---\n\n");
        prompt.push_str(TRIPLES_FORMAT);
        prompt.push_str("\n\n");
        prompt.push_str(JSON_ONLY_REMINDER);
        prompt
    }
}

const REFORMAT_EN: &str = r#"Rewrite the following table as a single markdown pipe table.

Rules:
- The first row must hold the column headers; merge stacked header rows into one
- The first column must hold the row labels
- Keep every value exactly as written, including signs, commas and percent marks
- Keep the leading hyphens that mark nested rows (e.g. "-Rent", "--Office rent")
- Leave cells empty when the source has no value
- Output only the table, no explanations"#;

const REFORMAT_ZH: &str = r#"请将下面的表格改写为一个 markdown 表格。

要求：
- 第一行为列标题，多行表头合并为一行
- 第一列为行标签
- 所有数值保持原样，包括正负号、千分位和百分号
- 保留表示子项的前导连字符（如 "-租金"、"--办公租金"）
- 原表中没有数值的单元格保持为空
- 只输出表格，不要解释"#;

const KEYWORDS_EN: &str = r#"For each keyword in "key_list", taken from the table named in "context", give at most two short colloquial phrasings a reader might use instead.

Output a JSON object keyed by the input keywords:
- If a keyword combines several concepts, map it to an object of {"sub keyword": ["colloquial", ...]}
- Otherwise map it to a list of colloquial phrasings
- For the table name itself, give a single colloquial table name as a string

Example:
{"Net profit attributable to shareholders": {"Net profit": ["profit", "earnings"]}, "Income statement": "P&L"}"#;

const KEYWORDS_ZH: &str = r#"对于 "key_list" 中的每个关键词（来自 "context" 所指的表格），给出最多两个读者可能使用的口语化说法。

输出一个以输入关键词为键的 JSON 对象：
- 若关键词包含多个概念，值为 {"子关键词": ["口语说法", ...]} 形式的对象
- 否则值为口语说法的列表
- 对表格名称本身，值为一个口语化的表名字符串

示例：
{"归属于母公司股东的净利润": {"净利润": ["利润", "赚的钱"]}, "利润表": "损益表"}"#;

const TRIPLES_EN: &str = r#"Extract the facts stated by the following table fragment as subject/predicate/object triples.

Rules:
- One fact per triple
- Use row labels and column headers to name subjects and predicates
- Keep values exactly as written, with their units
- Skip empty cells"#;

const TRIPLES_ZH: &str = r#"从下面的表格片段中抽取事实，表示为 主语/谓语/宾语 三元组。

要求：
- 每个三元组只表达一个事实
- 用行标签和列标题命名主语和谓语
- 数值保持原样，并带上单位
- 跳过空单元格"#;

const TRIPLES_FORMAT: &str = r#"Output format:
[
  {"subject": "entity", "predicate": "relationship", "object": "entity or value"}
]"#;

const JSON_ONLY_REMINDER: &str =
    "Remember: Return ONLY valid JSON, no markdown code blocks, no explanations.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reformat_prompt_includes_markup() {
        let prompt = PromptBuilder::default().reformat("Income", "<table><tr><td>1</td></tr></table>");
        assert!(prompt.starts_with(REFORMAT_TASK));
        assert!(prompt.contains("Table: Income"));
        assert!(prompt.contains("<td>1</td>"));
        assert!(prompt.contains("leading hyphens"));
    }

    #[test]
    fn test_keyword_prompt_embeds_json_input() {
        let keys = vec!["Cost".to_string(), "Re\"venue".to_string()];
        let prompt = PromptBuilder::default().keywords("Income", &keys);

        assert!(prompt.starts_with(KEYWORD_TASK));
        assert!(prompt.contains(r#""context":"Income""#));
        assert!(prompt.contains(r#""key_list":["Cost","Re\"venue"]"#));
    }

    #[test]
    fn test_triples_prompt() {
        let prompt = PromptBuilder::default().triples("", "| a | b |");
        assert!(prompt.starts_with(TRIPLE_TASK));
        assert!(!prompt.contains("Table:"));
        assert!(prompt.contains("| a | b |"));
        assert!(prompt.contains("\"predicate\""));
    }

    #[test]
    fn test_language_selection() {
        let zh = PromptBuilder::new(PromptLanguage::Zh);
        assert!(zh.reformat("t", "x").contains("markdown 表格"));
        assert!(zh.keywords("t", &Vec::<String>::new()).contains("口语化"));
        assert!(zh.triples("t", "x").contains("三元组"));
        // Task tags are language independent
        assert!(zh.triples("t", "x").starts_with(TRIPLE_TASK));
    }
}
